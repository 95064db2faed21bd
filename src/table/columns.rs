//! Heading-name dispatch: resolving column identifiers to labels and cells.

use crate::aggregate;
use crate::grouping::{MeasureGroup, location_label};
use crate::measure::{CostField, FieldSpec, FieldValue, FuelKind, Measure, RunResult};
use crate::metrics::{self, MetricValue};

/// Measure-field columns whose rows sort by a computed numeric value rather
/// than the rendered cell (lighting fixture schedules mix text and numbers).
pub const COMPUTED_SORT_FIELDS: &[&str] = &["annual-operating-hours", "fixture-wattage"];

/// Non-metric columns read straight off the measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityColumn {
    Name,
    Description,
    Category,
    Application,
    Technology,
    Location,
}

/// Calculator/aggregator-backed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricColumn {
    ProjectCost,
    Incentive,
    AnnualSavings,
    EnergySavings,
    ElectricSavings,
    GasSavings,
    WaterSavings,
    DemandSavings,
    Eul,
    SimplePayback,
    Sir,
    Npv,
    Roi,
    GhgSavings,
    GhgCost,
    MaintenanceSavings,
}

/// A resolved report column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Identity(IdentityColumn),
    Metric(MetricColumn),
    Cost(CostField),
    /// Measure-field lookup; also the fallback for unresolvable headings,
    /// which keep their column and render `"-"` in every row.
    Field(String),
}

impl Column {
    /// Resolves a heading identifier to a column.
    pub fn parse(heading: &str) -> Column {
        use IdentityColumn as I;
        use MetricColumn as M;
        match heading {
            "name" => Column::Identity(I::Name),
            "description" => Column::Identity(I::Description),
            "category" => Column::Identity(I::Category),
            "application" => Column::Identity(I::Application),
            "technology" => Column::Identity(I::Technology),
            "location" => Column::Identity(I::Location),
            "project-cost" => Column::Metric(M::ProjectCost),
            "incentive" => Column::Metric(M::Incentive),
            "annual-savings" => Column::Metric(M::AnnualSavings),
            "energy-savings" => Column::Metric(M::EnergySavings),
            "electric-savings" => Column::Metric(M::ElectricSavings),
            "gas-savings" => Column::Metric(M::GasSavings),
            "water-savings" => Column::Metric(M::WaterSavings),
            "demand-savings" => Column::Metric(M::DemandSavings),
            "eul" => Column::Metric(M::Eul),
            "simple-payback" => Column::Metric(M::SimplePayback),
            "sir" => Column::Metric(M::Sir),
            "npv" => Column::Metric(M::Npv),
            "roi" => Column::Metric(M::Roi),
            "ghg-savings" => Column::Metric(M::GhgSavings),
            "ghg-cost" => Column::Metric(M::GhgCost),
            "maintenance-savings" => Column::Metric(M::MaintenanceSavings),
            "material-cost" => Column::Cost(CostField::Material),
            "labor-cost" => Column::Cost(CostField::Labor),
            "design-cost" => Column::Cost(CostField::Design),
            "contingency-cost" => Column::Cost(CostField::Contingency),
            "financing-cost" => Column::Cost(CostField::Financing),
            "installation-cost" => Column::Cost(CostField::Installation),
            "permit-cost" => Column::Cost(CostField::Permit),
            "overhead-cost" => Column::Cost(CostField::Overhead),
            other => Column::Field(other.to_string()),
        }
    }

    /// Column label. NPV and SIR labels carry the investment period when the
    /// table's measures define one.
    pub fn label(&self, investment_period: Option<u32>) -> String {
        use IdentityColumn as I;
        use MetricColumn as M;
        match self {
            Column::Identity(I::Name) => "Name".into(),
            Column::Identity(I::Description) => "Description".into(),
            Column::Identity(I::Category) => "Category".into(),
            Column::Identity(I::Application) => "Application".into(),
            Column::Identity(I::Technology) => "Technology".into(),
            Column::Identity(I::Location) => "Location".into(),
            Column::Metric(M::ProjectCost) => "Project Cost".into(),
            Column::Metric(M::Incentive) => "Utility Incentive".into(),
            Column::Metric(M::AnnualSavings) => "Annual Cost Savings".into(),
            Column::Metric(M::EnergySavings) => "Energy Savings (kBtu)".into(),
            Column::Metric(M::ElectricSavings) => "Electric Savings (kWh)".into(),
            Column::Metric(M::GasSavings) => "Gas Savings (therms)".into(),
            Column::Metric(M::WaterSavings) => "Water Savings (kGal)".into(),
            Column::Metric(M::DemandSavings) => "Demand Savings (kW)".into(),
            Column::Metric(M::Eul) => "EUL (years)".into(),
            Column::Metric(M::SimplePayback) => "Simple Payback".into(),
            Column::Metric(M::Sir) => match investment_period {
                Some(n) => format!("SIR ({n}-year)"),
                None => "SIR".into(),
            },
            Column::Metric(M::Npv) => match investment_period {
                Some(n) => format!("NPV ({n}-year)"),
                None => "NPV".into(),
            },
            Column::Metric(M::Roi) => "ROI (%)".into(),
            Column::Metric(M::GhgSavings) => "GHG Savings (mtCO2e)".into(),
            Column::Metric(M::GhgCost) => "GHG Cost".into(),
            Column::Metric(M::MaintenanceSavings) => "Maintenance Savings".into(),
            Column::Cost(CostField::Material) => "Material Cost".into(),
            Column::Cost(CostField::Labor) => "Labor Cost".into(),
            Column::Cost(CostField::Design) => "Design Cost".into(),
            Column::Cost(CostField::Contingency) => "Contingency Cost".into(),
            Column::Cost(CostField::Financing) => "Financing Cost".into(),
            Column::Cost(CostField::Installation) => "Installation Cost".into(),
            Column::Cost(CostField::Permit) => "Permit Cost".into(),
            Column::Cost(CostField::Overhead) => "Overhead Cost".into(),
            Column::Field(name) => name.clone(),
        }
    }

    /// Whether totals should sum this column.
    pub fn is_summable(&self) -> bool {
        matches!(self, Column::Metric(_) | Column::Cost(_))
    }
}

/// What a table row describes: a single measure or a presentation group.
#[derive(Debug, Clone, Copy)]
pub enum RowTarget<'a> {
    Measure(&'a Measure),
    Group(&'a MeasureGroup<'a>),
}

impl<'a> RowTarget<'a> {
    fn members(&self) -> Vec<&'a Measure> {
        match self {
            RowTarget::Measure(m) => vec![m],
            RowTarget::Group(g) => g.measures.clone(),
        }
    }
}

/// Resolves one cell.
pub fn cell_value(column: &Column, target: &RowTarget<'_>, building_id: &str) -> MetricValue {
    match (column, target) {
        (Column::Identity(id), RowTarget::Measure(m)) => measure_identity(*id, m),
        (Column::Identity(id), RowTarget::Group(g)) => group_identity(*id, g),
        (Column::Metric(metric), RowTarget::Measure(m)) => {
            if m.is_package() {
                let children: Vec<&Measure> = m.children.iter().collect();
                aggregate_metric(*metric, &children, building_id)
            } else {
                leaf_metric(*metric, m, building_id)
            }
        }
        (Column::Metric(metric), RowTarget::Group(g)) => {
            aggregate_metric(*metric, &g.measures, building_id)
        }
        (Column::Cost(field), RowTarget::Measure(m)) if !m.is_package() => {
            MetricValue::Number(m.initial_values.cost_field(*field).unwrap_or(0.0))
        }
        (Column::Cost(field), _) => aggregate::total_cost_field(&target.members(), *field),
        (Column::Field(name), _) => common_value(&target.members(), |m| field_cell(m, name)),
    }
}

/// Sort key for the computed-sort fixture fields: the replacement equipment
/// value when present, else the existing one.
pub fn computed_field_sort(target: &RowTarget<'_>, field_name: &str) -> Option<f64> {
    target.members().iter().find_map(|m| {
        let field = find_field(m, field_name)?;
        field
            .replacement
            .as_ref()
            .or(field.existing.as_ref())
            .and_then(FieldValue::as_number)
    })
}

fn measure_identity(column: IdentityColumn, measure: &Measure) -> MetricValue {
    let text = match column {
        IdentityColumn::Name => Some(measure.display_name.clone()),
        IdentityColumn::Description => measure.description.clone(),
        IdentityColumn::Category => non_empty(&measure.category),
        IdentityColumn::Application => non_empty(&measure.application),
        IdentityColumn::Technology => non_empty(&measure.technology),
        IdentityColumn::Location => location_label(measure),
    };
    text.map(MetricValue::Text).unwrap_or(MetricValue::Missing)
}

fn group_identity(column: IdentityColumn, group: &MeasureGroup<'_>) -> MetricValue {
    match column {
        IdentityColumn::Name => MetricValue::Text(group.key.clone()),
        IdentityColumn::Description => group
            .description
            .clone()
            .map(MetricValue::Text)
            .unwrap_or_else(|| common_value(&group.measures, |m| measure_identity(column, m))),
        IdentityColumn::Location => group
            .location
            .clone()
            .map(MetricValue::Text)
            .unwrap_or_else(|| common_value(&group.measures, |m| measure_identity(column, m))),
        IdentityColumn::Category | IdentityColumn::Application | IdentityColumn::Technology => {
            common_value(&group.measures, |m| measure_identity(column, m))
        }
    }
}

/// The members' shared value, or `Missing` when members disagree. Column
/// sets are uniform across rows, so a divergent group still gets a cell.
fn common_value<F>(measures: &[&Measure], f: F) -> MetricValue
where
    F: Fn(&Measure) -> MetricValue,
{
    let mut values = measures.iter().map(|m| f(m));
    let Some(first) = values.next() else {
        return MetricValue::Missing;
    };
    if values.all(|v| v == first) {
        first
    } else {
        MetricValue::Missing
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

fn find_field<'a>(measure: &'a Measure, name: &str) -> Option<&'a FieldSpec> {
    measure.fields.iter().find(|f| f.name == name)
}

fn field_cell(measure: &Measure, name: &str) -> MetricValue {
    let Some(field) = find_field(measure, name) else {
        return MetricValue::Missing;
    };
    match (&field.existing, &field.replacement) {
        (Some(existing), Some(replacement)) => {
            MetricValue::Text(format!("{existing} / {replacement}"))
        }
        (Some(FieldValue::Number(n)), None) | (None, Some(FieldValue::Number(n))) => {
            MetricValue::Number(*n)
        }
        (Some(FieldValue::Text(s)), None) | (None, Some(FieldValue::Text(s))) => {
            MetricValue::Text(s.clone())
        }
        (None, None) => MetricValue::Missing,
    }
}

fn leaf_metric(column: MetricColumn, measure: &Measure, building_id: &str) -> MetricValue {
    use MetricColumn as M;
    let initial = &measure.initial_values;
    let run = measure.run_result(building_id);
    let from_run =
        |f: &dyn Fn(&RunResult) -> MetricValue| run.map(f).unwrap_or(MetricValue::Missing);
    let by_fuel = |kind: FuelKind| {
        from_run(&|r| {
            MetricValue::from_option(metrics::energy_savings_by_fuel(r, measure.fuel, kind))
        })
    };
    match column {
        M::ProjectCost => MetricValue::from_option(metrics::project_cost(initial)),
        M::MaintenanceSavings => MetricValue::from_option(initial.maintenance_savings),
        M::Incentive => from_run(&|r| MetricValue::from_option(metrics::incentive(r))),
        M::AnnualSavings => from_run(&|r| metrics::annual_savings(r)),
        M::EnergySavings => from_run(&|r| metrics::energy_savings(r)),
        M::ElectricSavings => by_fuel(FuelKind::Electric),
        M::GasSavings => by_fuel(FuelKind::Gas),
        M::WaterSavings => by_fuel(FuelKind::Water),
        M::DemandSavings => by_fuel(FuelKind::Demand),
        M::Eul => from_run(&|r| MetricValue::from_option(metrics::eul(r))),
        M::SimplePayback => from_run(&|r| MetricValue::Number(metrics::simple_payback(r))),
        M::Sir => from_run(&|r| MetricValue::from_option(metrics::sir(r))),
        M::Npv => from_run(&|r| MetricValue::from_option(metrics::npv(r))),
        M::Roi => from_run(&|r| MetricValue::from_option(metrics::roi(initial, r))),
        M::GhgSavings => from_run(&|r| MetricValue::from_option(metrics::ghg_savings(r))),
        M::GhgCost => from_run(&|r| MetricValue::from_option(metrics::ghg_cost(r))),
    }
}

fn aggregate_metric(
    column: MetricColumn,
    measures: &[&Measure],
    building_id: &str,
) -> MetricValue {
    use MetricColumn as M;
    match column {
        M::ProjectCost => MetricValue::Number(aggregate::total_project_cost(measures)),
        M::Incentive => MetricValue::Number(aggregate::total_incentive(measures, building_id)),
        M::AnnualSavings => aggregate::total_annual_savings(measures, building_id),
        M::EnergySavings => aggregate::total_energy_savings(measures, building_id),
        M::ElectricSavings => MetricValue::Number(aggregate::total_energy_savings_by_fuel(
            measures,
            building_id,
            FuelKind::Electric,
        )),
        M::GasSavings => MetricValue::Number(aggregate::total_energy_savings_by_fuel(
            measures,
            building_id,
            FuelKind::Gas,
        )),
        M::WaterSavings => MetricValue::Number(aggregate::total_energy_savings_by_fuel(
            measures,
            building_id,
            FuelKind::Water,
        )),
        M::DemandSavings => MetricValue::Number(aggregate::total_energy_savings_by_fuel(
            measures,
            building_id,
            FuelKind::Demand,
        )),
        M::Eul => MetricValue::Number(aggregate::total_eul(measures, building_id)),
        M::SimplePayback => {
            MetricValue::Number(aggregate::total_simple_payback(measures, building_id))
        }
        M::Sir => MetricValue::Number(aggregate::total_sir(measures, building_id)),
        M::Npv => MetricValue::Number(aggregate::total_npv(measures, building_id)),
        M::Roi => MetricValue::Number(aggregate::total_roi(measures, building_id)),
        M::GhgSavings => MetricValue::Number(aggregate::total_ghg_savings(measures, building_id)),
        M::GhgCost => MetricValue::Number(aggregate::total_ghg_cost(measures, building_id)),
        M::MaintenanceSavings => {
            MetricValue::Number(aggregate::total_maintenance_savings(measures))
        }
    }
}
