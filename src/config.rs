//! Operator-maintained engine configuration: category catalogs, unit and
//! GHG conversion factors, and the industry net-margin table.
//!
//! All of it is externally supplied static data; every struct carries
//! defaults matching the hard-coded tables the engine falls back to, and
//! loads from TOML.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::metrics::{KWH_TO_KBTU, THERM_TO_KBTU};

/// Annual greenhouse-gas footprint of one passenger vehicle (mtCO2e).
pub const GHG_PER_VEHICLE_DRIVEN: f64 = 4.67;

/// Greenhouse gas from consuming one barrel of oil (mtCO2e).
pub const GHG_PER_OIL_BARREL: f64 = 0.43;

/// Greenhouse gas from burning one railcar of coal (mtCO2e).
pub const GHG_PER_COAL_RAILCAR: f64 = 183.22;

/// Fallback category display order used when no catalog is supplied.
pub const DEFAULT_CATEGORY_ORDER: [&str; 24] = [
    "Commissioning",
    "Building Envelope",
    "Insulation",
    "Windows & Doors",
    "Air Sealing",
    "Controls",
    "HVAC Systems",
    "Heating Plant",
    "Cooling Plant",
    "Ventilation",
    "Heat Recovery",
    "Domestic Hot Water",
    "Lighting",
    "Lighting Controls",
    "Plug Loads",
    "Appliances",
    "Refrigeration",
    "Kitchen Equipment",
    "Motors & Drives",
    "Compressed Air",
    "Renewables",
    "Water Conservation",
    "Behavioral",
    "Operations & Maintenance",
];

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"categories[2].name"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// One report category: filter membership, narrative description, and
/// display position.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryConfig {
    /// Category name as it appears on measures.
    pub name: String,
    /// Narrative description attached to the category's report section.
    pub description: Option<String>,
    /// Display position; lower sorts first. Catalog order breaks ties.
    pub order: Option<u32>,
    /// Presentation styling hint for the rendering layer.
    pub highlight: Option<String>,
}

/// Ordered category catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryCatalog {
    pub categories: Vec<CategoryConfig>,
}

impl CategoryCatalog {
    /// Parses a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "categories".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a catalog from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let catalog: Self = toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })?;
        if let Some(err) = catalog.validate().into_iter().next() {
            return Err(err);
        }
        Ok(catalog)
    }

    /// Validates all entries and returns a list of errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (i, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("categories[{i}].name"),
                    message: "must not be empty".into(),
                });
            }
        }
        errors
    }

    /// Display position of a category name, case-insensitive.
    ///
    /// Falls back to [`DEFAULT_CATEGORY_ORDER`] when the catalog is empty;
    /// `None` sorts the category after every configured one.
    pub fn position(&self, name: &str) -> Option<usize> {
        if self.categories.is_empty() {
            return DEFAULT_CATEGORY_ORDER
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name));
        }
        let mut ordered: Vec<(usize, &CategoryConfig)> = self.categories.iter().enumerate().collect();
        ordered.sort_by_key(|(i, c)| (c.order.unwrap_or(u32::MAX), *i));
        ordered
            .iter()
            .position(|(_, c)| c.name.eq_ignore_ascii_case(name))
    }

    /// Configured description for a category, if any.
    pub fn description(&self, name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .and_then(|c| c.description.as_deref())
    }
}

/// Unit and environmental-equivalence conversion factors.
///
/// The defaults are the load-bearing literals historical reports were
/// generated with; per-deployment overrides replace the struct wholesale
/// rather than patching globals.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionFactors {
    pub kwh_to_kbtu: f64,
    pub therm_to_kbtu: f64,
    pub ghg_per_vehicle_driven: f64,
    pub ghg_per_oil_barrel: f64,
    pub ghg_per_coal_railcar: f64,
}

impl Default for ConversionFactors {
    fn default() -> Self {
        Self {
            kwh_to_kbtu: KWH_TO_KBTU,
            therm_to_kbtu: THERM_TO_KBTU,
            ghg_per_vehicle_driven: GHG_PER_VEHICLE_DRIVEN,
            ghg_per_oil_barrel: GHG_PER_OIL_BARREL,
            ghg_per_coal_railcar: GHG_PER_COAL_RAILCAR,
        }
    }
}

/// Industry classification to net-margin lookup for the sales-margin
/// equivalence in the building rollup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndustryMargins {
    /// Industry name to net margin in percent (e.g. `5.2`).
    pub margins: BTreeMap<String, f64>,
}

impl IndustryMargins {
    /// Parses a margin table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "margins".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a margin table from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Net margin for an industry, case-insensitive.
    pub fn net_margin(&self, industry: &str) -> Option<f64> {
        self.margins
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(industry))
            .map(|(_, margin)| *margin)
    }
}

/// Everything the public facade needs beyond the measure graph itself.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub categories: CategoryCatalog,
    pub factors: ConversionFactors,
    pub industry_margins: IndustryMargins,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_has_24_categories() {
        assert_eq!(DEFAULT_CATEGORY_ORDER.len(), 24);
        // Controls precedes Lighting independent of alphabetics.
        let catalog = CategoryCatalog::default();
        assert!(catalog.position("Controls") < catalog.position("Lighting"));
    }

    #[test]
    fn catalog_position_respects_order_field() {
        let catalog = CategoryCatalog::from_toml_str(
            r#"
            [[categories]]
            name = "Lighting"
            order = 2

            [[categories]]
            name = "Controls"
            order = 1
            description = "Scheduling and setpoint measures."
            "#,
        )
        .expect("valid catalog");
        assert_eq!(catalog.position("controls"), Some(0));
        assert_eq!(catalog.position("Lighting"), Some(1));
        assert_eq!(catalog.position("Renewables"), None);
        assert_eq!(
            catalog.description("Controls"),
            Some("Scheduling and setpoint measures.")
        );
    }

    #[test]
    fn empty_category_name_rejected() {
        let err = CategoryCatalog::from_toml_str("[[categories]]\nname = \"\"")
            .expect_err("must fail");
        assert!(err.field.contains("categories[0].name"));
    }

    #[test]
    fn conversion_factor_defaults_are_the_literals() {
        let factors = ConversionFactors::default();
        assert_eq!(factors.kwh_to_kbtu, 3.412);
        assert_eq!(factors.therm_to_kbtu, 99.9761);
        assert_eq!(factors.ghg_per_vehicle_driven, 4.67);
        assert_eq!(factors.ghg_per_oil_barrel, 0.43);
        assert_eq!(factors.ghg_per_coal_railcar, 183.22);
    }

    #[test]
    fn margin_lookup_is_case_insensitive() {
        let margins =
            IndustryMargins::from_toml_str("[margins]\n\"Food Service\" = 5.2").expect("valid");
        assert_eq!(margins.net_margin("food service"), Some(5.2));
        assert_eq!(margins.net_margin("Retail"), None);
    }
}
