//! Assembles a report table from a spec and a measure list.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::grouping::{
    MeasureGroup, filter_measures, group_by_category, group_by_category_and_location,
    group_by_key, location_label,
};
use crate::measure::Measure;
use crate::metrics::MetricValue;
use crate::table::columns::{
    COMPUTED_SORT_FIELDS, Column, RowTarget, cell_value, computed_field_sort,
};
use crate::table::format::format_cell;
use crate::table::spec::{Grouping, ReportSpec, SortOrder};

/// Column set used when a spec requests no headings.
pub const DEFAULT_HEADINGS: &[&str] = &[
    "name",
    "project-cost",
    "annual-savings",
    "energy-savings",
    "simple-payback",
    "incentive",
    "roi",
];

/// A synthesized table: resolved column labels plus formatted cell rows.
/// The HTML, spreadsheet, and PDF layers all consume this shape.
#[derive(Debug, Clone, Serialize)]
pub struct ReportTable {
    pub headings: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Builds one report table for a building.
pub fn build_table(
    spec: &ReportSpec,
    measures: &[Measure],
    building_id: &str,
    config: &EngineConfig,
) -> ReportTable {
    let heading_ids: Vec<&str> = if spec.headings.is_empty() {
        DEFAULT_HEADINGS.to_vec()
    } else {
        spec.headings.iter().map(String::as_str).collect()
    };
    let columns: Vec<Column> = heading_ids.iter().map(|h| Column::parse(h)).collect();

    let filtered = filter_measures(measures, &spec.filter, spec.include_description_only);
    let groups = build_groups(&filtered, spec.grouping, config);

    let targets: Vec<RowTarget<'_>> = match &groups {
        Some(groups) => groups.iter().map(RowTarget::Group).collect(),
        None => filtered.iter().map(|m| RowTarget::Measure(*m)).collect(),
    };
    let mut rows: Vec<(RowTarget<'_>, Vec<MetricValue>)> = targets
        .into_iter()
        .map(|target| {
            let cells = columns
                .iter()
                .map(|c| cell_value(c, &target, building_id))
                .collect();
            (target, cells)
        })
        .collect();

    if let Some(order_by) = spec.order_by.as_deref() {
        if let Some(index) = heading_ids.iter().position(|h| *h == order_by) {
            sort_rows(&mut rows, &columns[index], index, spec.order);
        }
    }

    let mut formatted: Vec<Vec<String>> = rows
        .iter()
        .map(|(_, cells)| cells.iter().map(format_cell).collect())
        .collect();

    if spec.total_row {
        formatted.push(totals_row(&columns, &rows));
    }

    let period = investment_period(&filtered, building_id);
    let headings = columns
        .iter()
        .map(|c| resolve_label(c, period, &filtered))
        .collect();

    debug!(
        columns = heading_ids.len(),
        rows = formatted.len(),
        grouping = ?spec.grouping,
        "built report table"
    );
    ReportTable {
        headings,
        rows: formatted,
    }
}

fn build_groups<'a>(
    filtered: &[&'a Measure],
    grouping: Grouping,
    config: &EngineConfig,
) -> Option<Vec<MeasureGroup<'a>>> {
    match grouping {
        Grouping::Individual => None,
        Grouping::GroupCategory => Some(group_by_category(filtered, &config.categories)),
        Grouping::GroupCategoryLocation => {
            Some(group_by_category_and_location(filtered, &config.categories))
        }
        Grouping::GroupProject => Some(group_by_key(filtered, |m| (m.display_name.clone(), None))),
        Grouping::GroupProjectLocation => Some(group_by_key(filtered, |m| {
            (m.display_name.clone(), location_label(m))
        })),
    }
}

/// Longest investment period across the table's leaves, for the NPV/SIR
/// column labels.
fn investment_period(measures: &[&Measure], building_id: &str) -> Option<u32> {
    let mut max_period = 0u32;
    let mut visit = |m: &Measure| {
        if let Some(run) = m.run_result(building_id) {
            let period = run
                .terminal_cash_flow()
                .map(|e| e.year)
                .filter(|y| *y > 0)
                .unwrap_or(run.cash_flows.len() as u32);
            max_period = max_period.max(period);
        }
    };
    fn walk<'a>(measures: &[&'a Measure], visit: &mut impl FnMut(&'a Measure)) {
        for m in measures {
            if m.is_package() {
                let children: Vec<&Measure> = m.children.iter().collect();
                walk(&children, visit);
            } else {
                visit(m);
            }
        }
    }
    walk(measures, &mut visit);
    (max_period > 0).then_some(max_period)
}

fn resolve_label(column: &Column, period: Option<u32>, measures: &[&Measure]) -> String {
    if let Column::Field(name) = column {
        // Prefer the field's configured label over the raw heading id.
        for measure in measures {
            if let Some(field) = measure.fields.iter().find(|f| &f.name == name) {
                if !field.label.is_empty() {
                    return field.label.clone();
                }
            }
        }
    }
    column.label(period)
}

enum SortKey {
    Num(f64),
    Text(String),
    Missing,
}

fn sort_rows(
    rows: &mut [(RowTarget<'_>, Vec<MetricValue>)],
    column: &Column,
    index: usize,
    order: SortOrder,
) {
    let key = |target: &RowTarget<'_>, cells: &[MetricValue]| -> SortKey {
        if let Column::Field(name) = column {
            if COMPUTED_SORT_FIELDS.contains(&name.as_str()) {
                return match computed_field_sort(target, name) {
                    Some(n) => SortKey::Num(n),
                    None => SortKey::Missing,
                };
            }
        }
        match &cells[index] {
            MetricValue::Number(n) => SortKey::Num(*n),
            MetricValue::Range(b) => SortKey::Num(b.low),
            MetricValue::Text(s) => SortKey::Text(s.to_lowercase()),
            MetricValue::Missing => SortKey::Missing,
        }
    };
    rows.sort_by(|(ta, ca), (tb, cb)| {
        let ordering = match (key(ta, ca), key(tb, cb)) {
            // Missing cells stay last regardless of direction.
            (SortKey::Missing, SortKey::Missing) => return Ordering::Equal,
            (SortKey::Missing, _) => return Ordering::Greater,
            (_, SortKey::Missing) => return Ordering::Less,
            (SortKey::Num(a), SortKey::Num(b)) => a.total_cmp(&b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(&b),
            (SortKey::Num(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Num(_)) => Ordering::Greater,
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Synthetic totals row: summable columns fold their cells (elementwise for
/// ranges), the leading identity column reads `"Total"`, everything else
/// `"-"`.
fn totals_row(columns: &[Column], rows: &[(RowTarget<'_>, Vec<MetricValue>)]) -> Vec<String> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            if column.is_summable() {
                let total = rows
                    .iter()
                    .fold(MetricValue::Missing, |acc, (_, cells)| {
                        acc.fold_sum(&cells[i])
                    });
                format_cell(&total)
            } else if i == 0 {
                "Total".to_string()
            } else {
                "-".to_string()
            }
        })
        .collect()
}
