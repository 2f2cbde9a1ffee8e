//! Output formatting module
//!
//! Renders resolutions, wiring plans and task sets.

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};
