//! Per-measure metric computation: one pure function per derived metric.

pub mod calculator;
pub mod value;

pub use calculator::{
    KWH_TO_KBTU, THERM_TO_KBTU, annual_savings, energy_savings, energy_savings_by_fuel,
    energy_savings_kbtu, eul, ghg_cost, ghg_savings, incentive, npv, project_cost, roi,
    simple_payback, sir,
};
pub use value::MetricValue;

use crate::measure::{InitialValues, RunResult};

/// Resolves one metric by name for narrative and ad-hoc rendering.
///
/// Unknown names resolve to [`MetricValue::Missing`], matching the report
/// synthesizer's treatment of unresolvable headings.
pub fn compute_metric(name: &str, run: &RunResult, initial: &InitialValues) -> MetricValue {
    match name {
        "project-cost" => MetricValue::from_option(project_cost(initial)),
        "incentive" => MetricValue::from_option(incentive(run)),
        "annual-savings" => annual_savings(run),
        "energy-savings" => energy_savings(run),
        "maintenance-savings" => MetricValue::from_option(initial.maintenance_savings),
        "simple-payback" => MetricValue::Number(simple_payback(run)),
        "sir" => MetricValue::from_option(sir(run)),
        "npv" => MetricValue::from_option(npv(run)),
        "roi" => MetricValue::from_option(roi(initial, run)),
        "ghg-savings" => MetricValue::from_option(ghg_savings(run)),
        "ghg-cost" => MetricValue::from_option(ghg_cost(run)),
        "eul" => MetricValue::from_option(eul(run)),
        _ => MetricValue::Missing,
    }
}
