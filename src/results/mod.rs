//! Result ledger, summary aggregation and report export
//!
//! The orchestrator is the only writer of the ledger; everything in this
//! module besides [`ResultLedger::set`] and the clears is read-only.

#![allow(dead_code)]

mod ledger;
mod report;
mod summary;

pub use ledger::ResultLedger;
pub use report::{export, Report, REPORT_COLUMNS, SUMMARY_MARKER};
pub use summary::{success_rate, summarize};
