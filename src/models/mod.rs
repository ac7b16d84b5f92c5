//! Data models for test orchestration
//!
//! This module contains all data structures shared across the application.

mod test_case;
mod test_result;

pub use test_case::{Batch, GenerationRequest, TestCase, TestCaseType};
pub use test_result::{ExecutionRecord, ExecutionStatus, Summary, Verdict};
