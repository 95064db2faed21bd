//! Shared fixtures for the integration tests.

use retrofit_report::measure::{
    AnnualCharges, Building, Bounds, CashFlowEntry, ChargeBounds, InitialValues, Measure,
    RunResult, SavingsOutcome,
};

/// Building id used by every fixture run result.
pub const B1: &str = "building-1";

/// Default building ("HQ", food-service industry).
pub fn building() -> Building {
    Building {
        id: B1.into(),
        name: "HQ".into(),
        industry: Some("Food Service".into()),
    }
}

/// Direct-mode leaf measure with one electric annual-savings charge.
pub fn direct_leaf(
    name: &str,
    category: &str,
    cost: f64,
    incentive: f64,
    annual: f64,
    maintenance: f64,
) -> Measure {
    let mut measure = Measure {
        display_name: name.into(),
        measure_type: "measure".into(),
        category: category.into(),
        initial_values: InitialValues {
            project_cost: Some(cost),
            maintenance_savings: Some(maintenance),
            ..InitialValues::default()
        },
        ..Measure::default()
    };
    measure.run_results.insert(
        B1.into(),
        RunResult {
            savings: SavingsOutcome::Direct {
                energy_savings: None,
                annual_savings: Some(AnnualCharges {
                    electric_charge: Some(annual),
                    gas_charge: None,
                }),
            },
            utility_incentive: (incentive != 0.0).then_some(incentive),
            ..RunResult::default()
        },
    );
    measure
}

/// Range-mode leaf measure with an electric annual-savings interval.
pub fn range_leaf(name: &str, category: &str, low: f64, high: f64) -> Measure {
    let mut measure = Measure {
        display_name: name.into(),
        measure_type: "measure".into(),
        category: category.into(),
        ..Measure::default()
    };
    measure.run_results.insert(
        B1.into(),
        RunResult {
            savings: SavingsOutcome::Range {
                energy_savings: None,
                annual_savings: Some(ChargeBounds {
                    electric_charge: Some(Bounds { low, high }),
                    gas_charge: None,
                }),
            },
            ..RunResult::default()
        },
    );
    measure
}

/// Package measure wrapping the given children.
pub fn package(name: &str, category: &str, children: Vec<Measure>) -> Measure {
    Measure {
        display_name: name.into(),
        measure_type: "measure".into(),
        category: category.into(),
        children,
        ..Measure::default()
    }
}

/// Attaches a simulator payback and a two-year cash-flow sequence to the
/// measure's run result.
pub fn with_cash_flows(mut measure: Measure, payback: f64, pv: [f64; 2], npv: f64, sir: f64) -> Measure {
    let run = measure
        .run_results
        .get_mut(B1)
        .expect("fixture leaf has a run result");
    run.simple_payback = Some(payback);
    run.cash_flows = vec![
        CashFlowEntry {
            year: 1,
            pv: Some(pv[0]),
            npv: None,
            sir: None,
        },
        CashFlowEntry {
            year: 2,
            pv: Some(pv[1]),
            npv: Some(npv),
            sir: Some(sir),
        },
    ];
    measure
}
