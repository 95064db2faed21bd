//! Building-level summary across all in-scope measures.
//!
//! Sums the aggregate forms of cost, savings, GHG, and demand, then derives
//! the environmental-equivalence figures shown in narrative overview
//! sections. Fields whose underlying sum is exactly 0 resolve to `None` so
//! the rendering layer hides them.

use std::fmt;

use serde::Serialize;

use crate::aggregate;
use crate::config::EngineConfig;
use crate::measure::{Bounds, Building, FuelKind, Measure};
use crate::metrics::value::{MetricValue, round0, round2};

/// Building-level rollup handed to narrative overview sections.
#[derive(Debug, Clone, Serialize)]
pub struct RollupSummary {
    /// Number of in-scope measures; zero-meaningful, never hidden.
    pub measure_count: usize,
    pub project_cost: Option<f64>,
    pub incentive: Option<f64>,
    pub annual_savings: Option<f64>,
    pub energy_savings: Option<f64>,
    pub demand_savings: Option<f64>,
    pub ghg_savings: Option<f64>,
    /// Equivalent passenger vehicles driven for a year.
    pub vehicles_driven: Option<f64>,
    /// Equivalent barrels of oil consumed.
    pub oil_barrels_consumed: Option<f64>,
    /// Equivalent railcars of coal burned.
    pub coal_railcars_burned: Option<f64>,
    /// Sales revenue equivalent to the annual savings, given the building
    /// industry's net margin.
    pub sales_margin: Option<f64>,
    /// Min-max span of the non-zero per-measure paybacks.
    pub simple_payback_range: Option<Bounds>,
}

/// Computes the rollup for a building over an already-filtered measure list.
pub fn building_rollup(
    measures: &[Measure],
    building: &Building,
    config: &EngineConfig,
) -> RollupSummary {
    let refs: Vec<&Measure> = measures.iter().collect();
    let building_id = building.id.as_str();

    let project_cost = nonzero(aggregate::total_project_cost(&refs));
    let incentive = nonzero(aggregate::total_incentive(&refs, building_id));
    let annual_savings = nonzero(scalar_total(aggregate::total_annual_savings(
        &refs,
        building_id,
    )));
    let energy_savings = nonzero(scalar_total(aggregate::total_energy_savings(
        &refs,
        building_id,
    )));
    let demand_savings = nonzero(aggregate::total_energy_savings_by_fuel(
        &refs,
        building_id,
        FuelKind::Demand,
    ));
    let ghg = nonzero(aggregate::total_ghg_savings(&refs, building_id));

    let factors = &config.factors;
    let vehicles_driven = ghg.map(|g| round2(g / factors.ghg_per_vehicle_driven));
    let oil_barrels_consumed = ghg.map(|g| round2(g / factors.ghg_per_oil_barrel));
    let coal_railcars_burned = ghg.map(|g| round2(g / factors.ghg_per_coal_railcar));

    let sales_margin = annual_savings.and_then(|annual| {
        let industry = building.industry.as_deref()?;
        let margin = config.industry_margins.net_margin(industry)?;
        let equivalent = annual / margin * 100.0;
        equivalent.is_finite().then(|| round0(equivalent))
    });

    RollupSummary {
        measure_count: refs.len(),
        project_cost,
        incentive,
        annual_savings,
        energy_savings,
        demand_savings,
        ghg_savings: ghg,
        vehicles_driven,
        oil_barrels_consumed,
        coal_railcars_burned,
        sales_margin,
        simple_payback_range: payback_range(&refs, building_id),
    }
}

/// Scalar view of a range-aware total: ranges contribute their low bound.
fn scalar_total(value: MetricValue) -> f64 {
    value.as_scalar().unwrap_or(0.0)
}

fn nonzero(value: f64) -> Option<f64> {
    (value != 0.0).then_some(value)
}

fn payback_range(measures: &[&Measure], building_id: &str) -> Option<Bounds> {
    let mut paybacks: Vec<f64> = measures
        .iter()
        .map(|m| aggregate::total_simple_payback(&[m], building_id))
        .filter(|p| *p != 0.0)
        .collect();
    if paybacks.is_empty() {
        return None;
    }
    paybacks.sort_by(|a, b| a.total_cmp(b));
    Some(Bounds {
        low: paybacks[0],
        high: paybacks[paybacks.len() - 1],
    })
}

impl fmt::Display for RollupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Building Rollup ---")?;
        writeln!(f, "Measures:          {}", self.measure_count)?;
        if let Some(cost) = self.project_cost {
            writeln!(f, "Project cost:      ${cost:.0}")?;
        }
        if let Some(annual) = self.annual_savings {
            writeln!(f, "Annual savings:    ${annual:.0}")?;
        }
        if let Some(energy) = self.energy_savings {
            writeln!(f, "Energy savings:    {energy:.0} kBtu")?;
        }
        if let Some(ghg) = self.ghg_savings {
            writeln!(f, "GHG savings:       {ghg:.2} mtCO2e")?;
        }
        if let Some(range) = self.simple_payback_range {
            writeln!(f, "Payback:           {:.2}-{:.2} yr", range.low, range.high)?;
        }
        Ok(())
    }
}
