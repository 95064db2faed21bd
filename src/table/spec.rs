//! Declarative report specification parsed from user-facing configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::grouping::MeasureFilter;

/// How the synthesizer turns the filtered measure list into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grouping {
    /// One row per measure.
    #[default]
    Individual,
    /// One row per category.
    GroupCategory,
    /// One row per `(category, location)` pair.
    GroupCategoryLocation,
    /// One row per measure name, merging duplicates across locations.
    GroupProject,
    /// One row per `(measure name, location)` pair.
    GroupProjectLocation,
}

/// Row sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Declarative table configuration: which columns, which measures, how
/// grouped, how sorted, whether to append a totals row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ReportSpec {
    /// Ordered column identifiers; empty selects the built-in default set.
    pub headings: Vec<String>,
    pub filter: MeasureFilter,
    pub grouping: Grouping,
    pub order: SortOrder,
    /// Column identifier to sort rows by; `None` keeps grouping order.
    pub order_by: Option<String>,
    /// Append a synthetic totals row.
    pub total_row: bool,
    /// Keep narrative-only `"description"` measures in the table.
    pub include_description_only: bool,
}

impl ReportSpec {
    /// Parses a report spec from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "report".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a report spec from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let spec: Self = toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })?;
        if let Some(err) = spec.validate().into_iter().next() {
            return Err(err);
        }
        Ok(spec)
    }

    /// Parses a report spec from a JSON string, the shape stored by the
    /// report configuration UI.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the JSON is invalid.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let spec: Self = serde_json::from_str(s).map_err(|e| ConfigError {
            field: "json".to_string(),
            message: e.to_string(),
        })?;
        if let Some(err) = spec.validate().into_iter().next() {
            return Err(err);
        }
        Ok(spec)
    }

    /// Validates the spec and returns a list of errors.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (i, heading) in self.headings.iter().enumerate() {
            if heading.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("headings[{i}]"),
                    message: "must not be empty".into(),
                });
            } else if self.headings[..i].contains(heading) {
                errors.push(ConfigError {
                    field: format!("headings[{i}]"),
                    message: format!("duplicate heading \"{heading}\""),
                });
            }
        }
        if let Some(order_by) = &self.order_by {
            if order_by.trim().is_empty() {
                errors.push(ConfigError {
                    field: "orderBy".into(),
                    message: "must not be empty when present".into(),
                });
            }
        }
        errors
    }
}
