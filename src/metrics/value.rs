//! Metric value domain and the rounding policy applied at function exits.

use std::fmt;

use crate::measure::Bounds;

/// A computed metric value as it flows between the calculator, the
/// aggregator, and the report synthesizer.
///
/// `Missing` stands in for absent input data and renders as `"-"`; `Text`
/// carries sentinels such as `"Varies"`. Range values keep both bounds
/// numeric until presentation so totals and sort keys stay exact.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Range(Bounds),
    Text(String),
    Missing,
}

impl MetricValue {
    /// Lifts an optional scalar, mapping `None` to `Missing`.
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => MetricValue::Number(v),
            None => MetricValue::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }

    /// Scalar view: the number itself, or a range's low bound.
    ///
    /// Sorting and scalar rollups both read ranges through their low bound.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Range(b) => Some(b.low),
            MetricValue::Text(_) | MetricValue::Missing => None,
        }
    }

    /// Folds another value into a running sum.
    ///
    /// A range on either side widens the sum to a range; a scalar joining a
    /// range contributes the degenerate interval `{v, v}`. Text and missing
    /// values contribute nothing.
    pub fn fold_sum(self, other: &MetricValue) -> MetricValue {
        let rhs = match other {
            MetricValue::Number(n) => Bounds::point(*n),
            MetricValue::Range(b) => *b,
            MetricValue::Text(_) | MetricValue::Missing => return self,
        };
        let widen = matches!(other, MetricValue::Range(_));
        match self {
            MetricValue::Number(n) if widen => MetricValue::Range(Bounds::point(n).add(rhs)),
            MetricValue::Number(n) => MetricValue::Number(n + rhs.low),
            MetricValue::Range(b) => MetricValue::Range(b.add(rhs)),
            MetricValue::Text(_) | MetricValue::Missing if widen => MetricValue::Range(rhs),
            MetricValue::Text(_) | MetricValue::Missing => MetricValue::Number(rhs.low),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Range(b) => write!(f, "{b}"),
            MetricValue::Text(s) => write!(f, "{s}"),
            MetricValue::Missing => write!(f, "-"),
        }
    }
}

/// Rounds money/energy up to the next whole unit, the rule applied wherever
/// a dollar or kBtu value leaves a metric function.
pub fn ceil_value(value: f64) -> f64 {
    value.ceil()
}

/// Rounds ratios, paybacks, and GHG figures to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds percentages to the nearest whole number.
pub fn round0(value: f64) -> f64 {
    value.round()
}
