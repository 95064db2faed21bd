//! Metric aggregation across sub-measure packages and presentation groups.
//!
//! Every leaf metric has an aggregate twin defined over a slice of measures,
//! so a package's children and a report group share one code path. Nested
//! packages recurse to arbitrary depth; observed data nests at most two
//! levels, but nothing here assumes that.

use crate::measure::{CostField, FuelKind, Measure};
use crate::metrics;
use crate::metrics::value::{MetricValue, round2};

/// Folds a per-measure value across a measure slice, recursing into
/// packages. `leaf` produces the value for a measure with no children.
fn fold_measures<F>(measures: &[&Measure], leaf: &F) -> MetricValue
where
    F: Fn(&Measure) -> MetricValue,
{
    let mut total = MetricValue::Missing;
    for measure in measures {
        let value = if measure.is_package() {
            let children: Vec<&Measure> = measure.children.iter().collect();
            fold_measures(&children, leaf)
        } else {
            leaf(measure)
        };
        total = total.fold_sum(&value);
    }
    total
}

/// Scalar sum variant of [`fold_measures`]: missing values contribute 0 and
/// an empty slice sums to 0.
fn sum_measures<F>(measures: &[&Measure], leaf: &F) -> f64
where
    F: Fn(&Measure) -> Option<f64>,
{
    let as_value = |m: &Measure| MetricValue::from_option(leaf(m));
    fold_measures(measures, &as_value)
        .as_scalar()
        .unwrap_or(0.0)
}

/// Collects one value per direct child, recursing a nested package into its
/// own aggregate. Used by the non-sum aggregations (median, ROI).
fn per_child_values<F, G>(measures: &[&Measure], leaf: &F, package: &G) -> Vec<f64>
where
    F: Fn(&Measure) -> f64,
    G: Fn(&[&Measure]) -> f64,
{
    measures
        .iter()
        .map(|m| {
            if m.is_package() {
                let children: Vec<&Measure> = m.children.iter().collect();
                package(&children)
            } else {
                leaf(m)
            }
        })
        .collect()
}

/// Visits every leaf descendant of the slice.
fn for_each_leaf<'a, F>(measures: &[&'a Measure], visit: &mut F)
where
    F: FnMut(&'a Measure),
{
    for measure in measures {
        if measure.is_package() {
            let children: Vec<&Measure> = measure.children.iter().collect();
            for_each_leaf(&children, visit);
        } else {
            visit(measure);
        }
    }
}

/// Summed project cost in dollars.
pub fn total_project_cost(measures: &[&Measure]) -> f64 {
    sum_measures(measures, &|m| metrics::project_cost(&m.initial_values))
}

/// Summed utility incentive in dollars.
pub fn total_incentive(measures: &[&Measure], building_id: &str) -> f64 {
    sum_measures(measures, &|m| {
        m.run_result(building_id).and_then(metrics::incentive)
    })
}

/// Summed maintenance savings in dollars.
pub fn total_maintenance_savings(measures: &[&Measure]) -> f64 {
    sum_measures(measures, &|m| m.initial_values.maintenance_savings)
}

/// Summed annual savings; widens to a range when any contributing run is
/// range-mode, keeping the first contributor's declared mode.
pub fn total_annual_savings(measures: &[&Measure], building_id: &str) -> MetricValue {
    let total = fold_measures(measures, &|m| {
        m.run_result(building_id)
            .map(metrics::annual_savings)
            .unwrap_or(MetricValue::Missing)
    });
    if total.is_missing() {
        MetricValue::Number(0.0)
    } else {
        total
    }
}

/// Summed energy savings in kBtu; range-aware like
/// [`total_annual_savings`].
pub fn total_energy_savings(measures: &[&Measure], building_id: &str) -> MetricValue {
    let total = fold_measures(measures, &|m| {
        m.run_result(building_id)
            .map(metrics::energy_savings)
            .unwrap_or(MetricValue::Missing)
    });
    if total.is_missing() {
        MetricValue::Number(0.0)
    } else {
        total
    }
}

/// Summed fuel-specific savings.
pub fn total_energy_savings_by_fuel(
    measures: &[&Measure],
    building_id: &str,
    requested: FuelKind,
) -> f64 {
    sum_measures(measures, &|m| {
        m.run_result(building_id)
            .and_then(|run| metrics::energy_savings_by_fuel(run, m.fuel, requested))
    })
}

/// Summed greenhouse-gas savings (mtCO2e).
pub fn total_ghg_savings(measures: &[&Measure], building_id: &str) -> f64 {
    sum_measures(measures, &|m| {
        m.run_result(building_id).and_then(metrics::ghg_savings)
    })
}

/// Summed avoided greenhouse-gas cost in dollars.
pub fn total_ghg_cost(measures: &[&Measure], building_id: &str) -> f64 {
    sum_measures(measures, &|m| {
        m.run_result(building_id).and_then(metrics::ghg_cost)
    })
}

/// Summed effective useful life in years.
pub fn total_eul(measures: &[&Measure], building_id: &str) -> f64 {
    sum_measures(measures, &|m| m.run_result(building_id).and_then(metrics::eul))
}

/// Median of the non-zero per-child paybacks, in years.
///
/// Payback is the one metric where summing children would be meaningless,
/// so packages report the median child horizon instead.
pub fn total_simple_payback(measures: &[&Measure], building_id: &str) -> f64 {
    let values = per_child_values(
        measures,
        &|m| {
            m.run_result(building_id)
                .map(metrics::simple_payback)
                .unwrap_or(0.0)
        },
        &|children| total_simple_payback(children, building_id),
    );
    let mut nonzero: Vec<f64> = values.into_iter().filter(|v| *v != 0.0).collect();
    if nonzero.is_empty() {
        return 0.0;
    }
    nonzero.sort_by(|a, b| a.total_cmp(b));
    let mid = nonzero.len() / 2;
    let median = if nonzero.len() % 2 == 1 {
        nonzero[mid]
    } else {
        (nonzero[mid - 1] + nonzero[mid]) / 2.0
    };
    round2(median)
}

/// Sum of the per-child ROI percentages, clamped at 0.
///
/// This is the source system's literal behavior: ROI is NOT recomputed from
/// aggregate cost and savings, each child's percentage is added as-is.
pub fn total_roi(measures: &[&Measure], building_id: &str) -> f64 {
    let values = per_child_values(
        measures,
        &|m| {
            m.run_result(building_id)
                .and_then(|run| metrics::roi(&m.initial_values, run))
                .unwrap_or(0.0)
        },
        &|children| total_roi(children, building_id),
    );
    values.iter().sum::<f64>().max(0.0)
}

/// Summed net present value, clamped at 0.
pub fn total_npv(measures: &[&Measure], building_id: &str) -> f64 {
    sum_measures(measures, &|m| m.run_result(building_id).and_then(metrics::npv)).max(0.0)
}

/// Package-level savings-to-investment ratio.
///
/// Computed from the present value summed across every leaf's whole
/// cash-flow sequence, divided by the summed leaf project cost; the terminal
/// per-leaf SIR values are not additive.
pub fn total_sir(measures: &[&Measure], building_id: &str) -> f64 {
    if matches!(
        total_annual_savings(measures, building_id),
        MetricValue::Number(n) if n <= 0.0
    ) {
        return 0.0;
    }
    let mut pv_sum = 0.0;
    let mut cost_sum = 0.0;
    for_each_leaf(measures, &mut |m| {
        if let Some(run) = m.run_result(building_id) {
            pv_sum += run.present_value_total();
        }
        cost_sum += metrics::project_cost(&m.initial_values).unwrap_or(0.0);
    });
    if cost_sum <= 0.0 {
        return 0.0;
    }
    round2(pv_sum / cost_sum).max(0.0)
}

/// Aggregates one cost-breakdown input across a package.
///
/// Returns 0 when no leaf declares the field, the value itself when all
/// declaring leaves agree, and the `"Varies"` sentinel otherwise.
pub fn total_cost_field(measures: &[&Measure], field: CostField) -> MetricValue {
    let mut declared: Vec<f64> = Vec::new();
    for_each_leaf(measures, &mut |m| {
        if let Some(value) = m.initial_values.cost_field(field) {
            declared.push(value);
        }
    });
    match declared.as_slice() {
        [] => MetricValue::Number(0.0),
        [first, rest @ ..] => {
            if rest.iter().all(|v| v == first) {
                MetricValue::Number(*first)
            } else {
                MetricValue::Text("Varies".to_string())
            }
        }
    }
}
