//! Tabular report synthesis: spec parsing, heading dispatch, row building.

pub mod builder;
pub mod columns;
pub mod format;
pub mod spec;

pub use builder::{DEFAULT_HEADINGS, ReportTable, build_table};
pub use columns::{Column, RowTarget};
pub use spec::{Grouping, ReportSpec, SortOrder};
