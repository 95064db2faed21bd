//! Presentation formatting for table cells.

use crate::measure::Bounds;
use crate::metrics::MetricValue;

/// Formats a number with thousands separators, keeping at most two decimal
/// places and trimming trailing fractional zeros.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();
    let int_part = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    let mut grouped = String::new();
    let digits = int_part.to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if cents > 0 {
        if cents % 10 == 0 {
            out.push_str(&format!(".{}", cents / 10));
        } else {
            out.push_str(&format!(".{cents:02}"));
        }
    }
    out
}

/// Formats a range with both bounds independently comma-grouped.
pub fn format_range(bounds: Bounds) -> String {
    format!("{} - {}", format_number(bounds.low), format_number(bounds.high))
}

/// Renders a metric value as a table cell.
pub fn format_cell(value: &MetricValue) -> String {
    match value {
        MetricValue::Number(n) => format_number(*n),
        MetricValue::Range(b) => format_range(*b),
        MetricValue::Text(s) => s.clone(),
        MetricValue::Missing => "-".to_string(),
    }
}
