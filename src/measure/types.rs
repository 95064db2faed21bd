//! Core domain types: measures, per-building run results, and cost inputs.
//!
//! The persistence layer hands the engine a fully resolved measure graph as
//! JSON documents; everything here derives [`serde::Deserialize`] with the
//! source document's camelCase field names. The engine treats the graph as a
//! read-only snapshot and never writes back.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A retrofit measure: either a leaf intervention with its own simulation
/// results, or a package whose metrics are derived entirely from `children`.
///
/// A measure with a non-empty `children` list is a *package*; packages never
/// carry their own run results. A measure with no children is a *leaf* and
/// carries one [`RunResult`] per building it was simulated for.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Measure {
    /// Document id assigned by the persistence layer.
    pub id: String,
    /// Human-readable measure name shown in reports.
    pub display_name: String,
    /// Measure type (e.g. `"measure"`, `"incentive"`, `"description"`).
    pub measure_type: String,
    /// Presentation category (e.g. `"Lighting"`, `"Controls"`).
    pub category: String,
    /// End-use application (e.g. `"hvac"`, `"water heating"`).
    pub application: String,
    /// Technology family within the application.
    pub technology: String,
    /// Declared fuel for measures whose energy savings is a bare scalar.
    pub fuel: Option<Fuel>,
    /// Structured location references.
    pub location_ids: Vec<String>,
    /// Legacy location display names; preferred over `location_ids` when
    /// both are present.
    pub locations: Vec<String>,
    /// Editable attribute schema with existing/replacement values.
    pub fields: Vec<FieldSpec>,
    /// Cost-breakdown inputs entered when the measure was created.
    pub initial_values: InitialValues,
    /// Sub-measures; non-empty makes this measure a package.
    pub children: Vec<Measure>,
    /// Primary simulation results, keyed by building id.
    pub run_results: BTreeMap<String, RunResult>,
    /// Lazily rated results cached separately from the primary slot.
    pub run_results_with_rate: BTreeMap<String, RunResult>,
    /// Narrative description for report text sections.
    pub description: Option<String>,
}

impl Measure {
    /// Whether this measure is a package of sub-measures.
    pub fn is_package(&self) -> bool {
        !self.children.is_empty()
    }

    /// Resolves the run result for a building, falling back to the lazily
    /// rated slot when the primary slot has no entry for the building.
    pub fn run_result(&self, building_id: &str) -> Option<&RunResult> {
        self.run_results
            .get(building_id)
            .or_else(|| self.run_results_with_rate.get(building_id))
    }
}

/// Simulated financial/energy outcome for one leaf measure and one building.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunResult {
    /// Savings fields, shaped by the run's calculation mode.
    #[serde(flatten)]
    pub savings: SavingsOutcome,
    /// Utility incentive in dollars.
    pub utility_incentive: Option<f64>,
    /// Simulator-provided simple payback in years.
    pub simple_payback: Option<f64>,
    /// One entry per investment-period year; the terminal entry carries the
    /// cumulative NPV and SIR.
    pub cash_flows: Vec<CashFlowEntry>,
    /// Annual greenhouse-gas reduction (metric tons CO2e).
    pub ghg: Option<f64>,
    /// Cost of the avoided greenhouse gas in dollars.
    pub ghg_cost: Option<f64>,
}

impl RunResult {
    /// Terminal cash-flow entry, if any.
    pub fn terminal_cash_flow(&self) -> Option<&CashFlowEntry> {
        self.cash_flows.last()
    }

    /// Sum of present value across the whole cash-flow sequence.
    ///
    /// Package-level SIR is computed from this sum, not from the terminal
    /// entry's SIR.
    pub fn present_value_total(&self) -> f64 {
        self.cash_flows.iter().filter_map(|e| e.pv).sum()
    }
}

/// Savings fields of a run result, discriminated by calculation mode.
///
/// The source documents overload `energySavings`/`annualSavings` to hold
/// either point estimates or `{minSavings, maxSavings}` pairs depending on a
/// sibling `calculationMode` string. Deserializing into a tagged union makes
/// every consumption site match exhaustively instead of probing field shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "calculationMode", rename_all = "camelCase")]
pub enum SavingsOutcome {
    /// Point-estimate mode.
    #[serde(rename_all = "camelCase")]
    Direct {
        /// kBtu-equivalent scalar, or a per-fuel breakdown.
        energy_savings: Option<EnergySavings>,
        /// Per-charge annual dollar savings.
        annual_savings: Option<AnnualCharges>,
    },
    /// Range-estimate mode: every savings field is a `{low, high}` interval.
    #[serde(rename_all = "camelCase")]
    Range {
        energy_savings: Option<Bounds>,
        annual_savings: Option<ChargeBounds>,
    },
}

impl Default for SavingsOutcome {
    fn default() -> Self {
        SavingsOutcome::Direct {
            energy_savings: None,
            annual_savings: None,
        }
    }
}

/// Direct-mode energy savings: a single kBtu-equivalent number for
/// single-fuel measures, or a per-fuel breakdown.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnergySavings {
    Total(f64),
    ByFuel(FuelBreakdown),
}

/// Per-fuel energy savings record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FuelBreakdown {
    /// Electric savings (kWh).
    pub electric: Option<f64>,
    /// Gas savings (therms).
    pub gas: Option<f64>,
    /// Water savings (kGal).
    pub water: Option<f64>,
    /// Peak demand savings (kW).
    pub demand: Option<f64>,
    /// Effective useful life (years).
    pub eul: Option<f64>,
}

/// Direct-mode annual dollar savings, split by utility charge.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnualCharges {
    pub electric_charge: Option<f64>,
    pub gas_charge: Option<f64>,
}

/// Range-mode annual dollar savings: an interval per utility charge.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChargeBounds {
    pub electric_charge: Option<Bounds>,
    pub gas_charge: Option<Bounds>,
}

/// A `{low, high}` interval, the unit of range-mode arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Bounds {
    #[serde(rename = "minSavings")]
    pub low: f64,
    #[serde(rename = "maxSavings")]
    pub high: f64,
}

impl Bounds {
    /// Interval containing exactly one point, for folding scalars into
    /// range sums.
    pub fn point(value: f64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    /// Elementwise sum.
    pub fn add(self, other: Bounds) -> Self {
        Self {
            low: self.low + other.low,
            high: self.high + other.high,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.low, self.high)
    }
}

/// One investment-period year of a run result's cash-flow sequence.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CashFlowEntry {
    pub year: u32,
    /// Present value of this year's savings.
    #[serde(rename = "PV")]
    pub pv: Option<f64>,
    /// Cumulative net present value; meaningful on the terminal entry.
    #[serde(rename = "NPV")]
    pub npv: Option<f64>,
    /// Cumulative savings-to-investment ratio; meaningful on the terminal
    /// entry.
    #[serde(rename = "SIR")]
    pub sir: Option<f64>,
}

/// Cost-breakdown inputs entered for a measure. Absent fields are treated as
/// zero by the sum metrics and as undeclared by the Varies aggregation.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitialValues {
    pub project_cost: Option<f64>,
    pub maintenance_savings: Option<f64>,
    pub material_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub design_cost: Option<f64>,
    pub contingency_cost: Option<f64>,
    pub financing_cost: Option<f64>,
    pub installation_cost: Option<f64>,
    pub permit_cost: Option<f64>,
    pub overhead_cost: Option<f64>,
}

/// One named input of the cost breakdown, addressable by report columns and
/// the package-level Varies aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostField {
    Material,
    Labor,
    Design,
    Contingency,
    Financing,
    Installation,
    Permit,
    Overhead,
}

impl InitialValues {
    /// Reads one cost-breakdown input by field.
    pub fn cost_field(&self, field: CostField) -> Option<f64> {
        match field {
            CostField::Material => self.material_cost,
            CostField::Labor => self.labor_cost,
            CostField::Design => self.design_cost,
            CostField::Contingency => self.contingency_cost,
            CostField::Financing => self.financing_cost,
            CostField::Installation => self.installation_cost,
            CostField::Permit => self.permit_cost,
            CostField::Overhead => self.overhead_cost,
        }
    }
}

/// Editable measure attribute with existing/replacement equipment values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldSpec {
    /// Stable field key used in report headings.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Value on the existing equipment, if applicable.
    pub existing: Option<FieldValue>,
    /// Value on the replacement equipment, if applicable.
    pub replacement: Option<FieldValue>,
}

/// A measure-field value: numeric for engineering fields, free text
/// otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, parsing text that happens to be a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Declared fuel of a single-fuel measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fuel {
    Electric,
    Gas,
    Water,
}

/// Fuel axis requested by a report column. `Demand` only ever resolves from
/// a per-fuel breakdown; it has no single-fuel scalar form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelKind {
    Electric,
    Gas,
    Water,
    Demand,
}

impl FuelKind {
    /// The declared-fuel equivalent, if one exists.
    pub fn as_fuel(self) -> Option<Fuel> {
        match self {
            FuelKind::Electric => Some(Fuel::Electric),
            FuelKind::Gas => Some(Fuel::Gas),
            FuelKind::Water => Some(Fuel::Water),
            FuelKind::Demand => None,
        }
    }
}

/// Building context for the rollup summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Building {
    pub id: String,
    pub name: String,
    /// Industry classification used for the sales-margin lookup.
    pub industry: Option<String>,
}
