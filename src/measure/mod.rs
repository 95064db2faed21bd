//! Measure graph domain types shared by every computation stage.

pub mod types;

pub use types::{
    AnnualCharges, Bounds, Building, CashFlowEntry, ChargeBounds, CostField, EnergySavings,
    FieldSpec, FieldValue, Fuel, FuelBreakdown, FuelKind, InitialValues, Measure, RunResult,
    SavingsOutcome,
};
