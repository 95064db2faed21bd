//! Financial and energy-savings aggregation engine for retrofit reports.
//!
//! Turns per-measure simulation output into the derived metrics (ROI,
//! payback, NPV, SIR, GHG, incentive, energy/cost savings) shown in every
//! report, aggregates them across sub-measure packages, groups and filters
//! measures for presentation, and resolves declarative column specs into
//! concrete table rows. Pure computation over an already-loaded measure
//! graph: no queries, no I/O, no shared state between report requests.

pub mod aggregate;
pub mod config;
pub mod grouping;
/// Measure graph and run-result domain types.
pub mod measure;
pub mod metrics;
pub mod rollup;
pub mod table;

pub use config::{CategoryCatalog, ConfigError, ConversionFactors, EngineConfig, IndustryMargins};
pub use metrics::{MetricValue, compute_metric};
pub use rollup::{RollupSummary, building_rollup};
pub use table::{ReportSpec, ReportTable, build_table};
