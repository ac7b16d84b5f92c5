//! Terminal rendering of execution progress and results
//!
//! Live progress lines, the results table, summaries and JSON snapshots.
//! The CSV report lives in `results`.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
