//! Leaf metric functions over one run result and one set of cost inputs.
//!
//! Every function here is total: absent or malformed input degrades to
//! `None`/`0`/[`MetricValue::Missing`] per field, never a panic. Range-mode
//! runs are routed through the [`SavingsOutcome`] tag, so a scalar-shaped
//! accessor can never read a range field as a number.

use crate::measure::{
    Bounds, EnergySavings, Fuel, FuelKind, InitialValues, RunResult, SavingsOutcome,
};
use crate::metrics::value::{MetricValue, ceil_value, round0, round2};

/// Site-energy content of one kWh of electricity, in kBtu.
pub const KWH_TO_KBTU: f64 = 3.412;

/// Site-energy content of one therm of natural gas, in kBtu.
pub const THERM_TO_KBTU: f64 = 99.9761;

/// Total project cost in dollars, rounded up.
pub fn project_cost(initial: &InitialValues) -> Option<f64> {
    initial.project_cost.map(ceil_value)
}

/// Utility incentive in dollars, rounded up.
pub fn incentive(run: &RunResult) -> Option<f64> {
    run.utility_incentive.map(ceil_value)
}

/// Annual dollar savings across utility charges.
///
/// Direct mode yields the ceiling of the summed charges; range mode yields
/// an interval whose bounds are each independently summed and ceiled.
pub fn annual_savings(run: &RunResult) -> MetricValue {
    match &run.savings {
        SavingsOutcome::Direct {
            annual_savings: Some(charges),
            ..
        } => {
            let total = charges.electric_charge.unwrap_or(0.0) + charges.gas_charge.unwrap_or(0.0);
            MetricValue::Number(ceil_value(total))
        }
        SavingsOutcome::Range {
            annual_savings: Some(charges),
            ..
        } => {
            let electric = charges.electric_charge.unwrap_or_default();
            let gas = charges.gas_charge.unwrap_or_default();
            MetricValue::Range(Bounds {
                low: ceil_value(electric.low + gas.low),
                high: ceil_value(electric.high + gas.high),
            })
        }
        SavingsOutcome::Direct { .. } | SavingsOutcome::Range { .. } => MetricValue::Missing,
    }
}

/// Whether the run's annual savings fails the positive-savings gate that
/// guards payback, SIR, NPV, and ROI.
///
/// Absent savings counts as non-positive; a range never does, since an
/// interval carries no single sign.
pub(crate) fn annual_savings_nonpositive(run: &RunResult) -> bool {
    match annual_savings(run) {
        MetricValue::Number(n) => n <= 0.0,
        MetricValue::Missing => true,
        MetricValue::Range(_) | MetricValue::Text(_) => false,
    }
}

/// Simple payback in years, to 2 decimals, floored at 0.
///
/// Zero when annual savings is non-positive, so a measure that saves nothing
/// never reports a payback horizon.
pub fn simple_payback(run: &RunResult) -> f64 {
    if annual_savings_nonpositive(run) {
        return 0.0;
    }
    run.simple_payback
        .map(|p| round2(p).max(0.0))
        .unwrap_or(0.0)
}

/// Savings-to-investment ratio from the terminal cash-flow entry.
pub fn sir(run: &RunResult) -> Option<f64> {
    if annual_savings_nonpositive(run) {
        return Some(0.0);
    }
    run.terminal_cash_flow().and_then(|e| e.sir).map(round2)
}

/// Net present value from the terminal cash-flow entry, rounded up.
pub fn npv(run: &RunResult) -> Option<f64> {
    if annual_savings_nonpositive(run) {
        return Some(0.0);
    }
    run.terminal_cash_flow().and_then(|e| e.npv).map(ceil_value)
}

/// Annual greenhouse-gas savings (mtCO2e), to 2 decimals.
pub fn ghg_savings(run: &RunResult) -> Option<f64> {
    run.ghg.map(round2)
}

/// Avoided greenhouse-gas cost in dollars, to 2 decimals.
pub fn ghg_cost(run: &RunResult) -> Option<f64> {
    run.ghg_cost.map(round2)
}

/// Effective useful life in years, to 2 decimals.
pub fn eul(run: &RunResult) -> Option<f64> {
    match &run.savings {
        SavingsOutcome::Direct {
            energy_savings: Some(EnergySavings::ByFuel(by_fuel)),
            ..
        } => by_fuel.eul.map(round2),
        _ => None,
    }
}

/// Return on investment as a whole percentage:
/// `100 * (annual savings + maintenance savings) / (project cost - incentive)`.
///
/// `None` when annual savings is non-positive, when the project cost is
/// unknown, or when the denominator degenerates (cost equal to incentive).
pub fn roi(initial: &InitialValues, run: &RunResult) -> Option<f64> {
    if annual_savings_nonpositive(run) {
        return None;
    }
    let annual = annual_savings(run).as_scalar()?;
    let cost = initial.project_cost?;
    let maintenance = initial.maintenance_savings.unwrap_or(0.0);
    let denominator = cost - run.utility_incentive.unwrap_or(0.0);
    let ratio = 100.0 * (annual + maintenance) / denominator;
    ratio.is_finite().then(|| round0(ratio))
}

/// Combined site-energy savings in kBtu, to 2 decimals.
///
/// The conversion factors are load-bearing: downstream narrative text and
/// historical reports were generated with exactly these constants.
pub fn energy_savings_kbtu(electric_kwh: f64, gas_therms: f64) -> f64 {
    round2(electric_kwh * KWH_TO_KBTU + gas_therms * THERM_TO_KBTU)
}

/// Total energy savings for display: a kBtu scalar, a kBtu conversion of a
/// per-fuel breakdown, or a range.
pub fn energy_savings(run: &RunResult) -> MetricValue {
    match &run.savings {
        SavingsOutcome::Direct {
            energy_savings: Some(EnergySavings::Total(total)),
            ..
        } => MetricValue::Number(ceil_value(*total)),
        SavingsOutcome::Direct {
            energy_savings: Some(EnergySavings::ByFuel(by_fuel)),
            ..
        } => MetricValue::Number(energy_savings_kbtu(
            by_fuel.electric.unwrap_or(0.0),
            by_fuel.gas.unwrap_or(0.0),
        )),
        SavingsOutcome::Range {
            energy_savings: Some(bounds),
            ..
        } => MetricValue::Range(Bounds {
            low: ceil_value(bounds.low),
            high: ceil_value(bounds.high),
        }),
        SavingsOutcome::Direct { .. } | SavingsOutcome::Range { .. } => MetricValue::Missing,
    }
}

/// Fuel-specific energy savings.
///
/// Resolves a breakdown field directly; a bare scalar resolves only when the
/// measure's single declared fuel matches the requested fuel. Range-mode
/// runs carry no per-fuel split.
pub fn energy_savings_by_fuel(
    run: &RunResult,
    declared_fuel: Option<Fuel>,
    requested: FuelKind,
) -> Option<f64> {
    match &run.savings {
        SavingsOutcome::Direct {
            energy_savings: Some(EnergySavings::ByFuel(by_fuel)),
            ..
        } => match requested {
            FuelKind::Electric => by_fuel.electric,
            FuelKind::Gas => by_fuel.gas,
            FuelKind::Water => by_fuel.water,
            FuelKind::Demand => by_fuel.demand,
        },
        SavingsOutcome::Direct {
            energy_savings: Some(EnergySavings::Total(total)),
            ..
        } => match (declared_fuel, requested.as_fuel()) {
            (Some(declared), Some(requested)) if declared == requested => Some(*total),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{AnnualCharges, CashFlowEntry, ChargeBounds, FuelBreakdown};

    fn direct_run(electric: f64, gas: f64) -> RunResult {
        RunResult {
            savings: SavingsOutcome::Direct {
                energy_savings: None,
                annual_savings: Some(AnnualCharges {
                    electric_charge: Some(electric),
                    gas_charge: Some(gas),
                }),
            },
            ..RunResult::default()
        }
    }

    fn range_run() -> RunResult {
        RunResult {
            savings: SavingsOutcome::Range {
                energy_savings: Some(Bounds { low: 900.4, high: 1500.0 }),
                annual_savings: Some(ChargeBounds {
                    electric_charge: Some(Bounds { low: 80.2, high: 120.0 }),
                    gas_charge: Some(Bounds { low: 10.0, high: 25.5 }),
                }),
            },
            ..RunResult::default()
        }
    }

    #[test]
    fn annual_savings_ceils_direct_charges() {
        assert_eq!(
            annual_savings(&direct_run(120.2, 30.1)),
            MetricValue::Number(151.0)
        );
    }

    #[test]
    fn annual_savings_missing_when_absent() {
        assert_eq!(annual_savings(&RunResult::default()), MetricValue::Missing);
    }

    #[test]
    fn range_mode_propagates_through_savings_metrics() {
        let run = range_run();
        assert_eq!(
            annual_savings(&run),
            MetricValue::Range(Bounds { low: 91.0, high: 146.0 })
        );
        assert_eq!(
            energy_savings(&run),
            MetricValue::Range(Bounds { low: 901.0, high: 1500.0 })
        );
        // A range never trips the non-positive clamp.
        assert!(!annual_savings_nonpositive(&run));
    }

    #[test]
    fn zero_savings_clamps_financial_metrics() {
        let mut run = direct_run(0.0, 0.0);
        run.simple_payback = Some(6.5);
        run.cash_flows = vec![CashFlowEntry {
            year: 1,
            pv: Some(10.0),
            npv: Some(500.0),
            sir: Some(2.0),
        }];
        assert_eq!(simple_payback(&run), 0.0);
        assert_eq!(sir(&run), Some(0.0));
        assert_eq!(npv(&run), Some(0.0));
        assert_eq!(
            roi(
                &InitialValues {
                    project_cost: Some(1000.0),
                    ..InitialValues::default()
                },
                &run
            ),
            None
        );
    }

    #[test]
    fn payback_rounds_and_floors() {
        let mut run = direct_run(100.0, 0.0);
        run.simple_payback = Some(3.14159);
        assert_eq!(simple_payback(&run), 3.14);
        run.simple_payback = Some(-2.0);
        assert_eq!(simple_payback(&run), 0.0);
    }

    #[test]
    fn sir_and_npv_read_terminal_entry() {
        let mut run = direct_run(100.0, 0.0);
        run.cash_flows = vec![
            CashFlowEntry { year: 1, pv: Some(95.0), npv: None, sir: None },
            CashFlowEntry {
                year: 2,
                pv: Some(90.0),
                npv: Some(120.4),
                sir: Some(1.347),
            },
        ];
        assert_eq!(sir(&run), Some(1.35));
        assert_eq!(npv(&run), Some(121.0));
    }

    #[test]
    fn roi_matches_source_formula() {
        let mut run = direct_run(300.0, 0.0);
        run.utility_incentive = Some(100.0);
        let initial = InitialValues {
            project_cost: Some(1000.0),
            ..InitialValues::default()
        };
        // 100 * 300 / (1000 - 100) = 33.33 -> 33
        assert_eq!(roi(&initial, &run), Some(33.0));
    }

    #[test]
    fn roi_degenerate_denominator_is_none() {
        let mut run = direct_run(300.0, 0.0);
        run.utility_incentive = Some(1000.0);
        let initial = InitialValues {
            project_cost: Some(1000.0),
            ..InitialValues::default()
        };
        assert_eq!(roi(&initial, &run), None);
    }

    #[test]
    fn kbtu_conversion_invariant() {
        assert_eq!(energy_savings_kbtu(1000.0, 0.0), 3412.00);
        assert_eq!(energy_savings_kbtu(0.0, 100.0), 9997.61);
    }

    #[test]
    fn by_fuel_resolution() {
        let run = RunResult {
            savings: SavingsOutcome::Direct {
                energy_savings: Some(EnergySavings::ByFuel(FuelBreakdown {
                    electric: Some(1200.0),
                    gas: Some(30.0),
                    demand: Some(4.5),
                    ..FuelBreakdown::default()
                })),
                annual_savings: None,
            },
            ..RunResult::default()
        };
        assert_eq!(
            energy_savings_by_fuel(&run, None, FuelKind::Electric),
            Some(1200.0)
        );
        assert_eq!(
            energy_savings_by_fuel(&run, None, FuelKind::Demand),
            Some(4.5)
        );
        assert_eq!(energy_savings_by_fuel(&run, None, FuelKind::Water), None);
    }

    #[test]
    fn scalar_savings_requires_matching_declared_fuel() {
        let run = RunResult {
            savings: SavingsOutcome::Direct {
                energy_savings: Some(EnergySavings::Total(4500.0)),
                annual_savings: None,
            },
            ..RunResult::default()
        };
        assert_eq!(
            energy_savings_by_fuel(&run, Some(Fuel::Gas), FuelKind::Gas),
            Some(4500.0)
        );
        assert_eq!(
            energy_savings_by_fuel(&run, Some(Fuel::Gas), FuelKind::Electric),
            None
        );
        assert_eq!(energy_savings_by_fuel(&run, None, FuelKind::Gas), None);
    }

    #[test]
    fn eul_reads_breakdown_only() {
        let run = RunResult {
            savings: SavingsOutcome::Direct {
                energy_savings: Some(EnergySavings::ByFuel(FuelBreakdown {
                    eul: Some(15.456),
                    ..FuelBreakdown::default()
                })),
                annual_savings: None,
            },
            ..RunResult::default()
        };
        assert_eq!(eul(&run), Some(15.46));
        assert_eq!(eul(&range_run()), None);
    }
}
