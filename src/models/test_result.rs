//! Execution result models
//!
//! Defines execution status, verdicts, per-test records and the derived summary.

#![allow(dead_code)]

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of a simulated execution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    Failed,
    Skipped,
}

impl Verdict {
    pub fn all() -> [Verdict; 3] {
        [Verdict::Passed, Verdict::Failed, Verdict::Skipped]
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExecutionStatus::from(*self).fmt(f)
    }
}

/// Execution status of a single test case
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    #[default]
    NotExecuted,
    Executing,
    Passed,
    Failed,
    Skipped,
}

impl ExecutionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionStatus::NotExecuted => "Not Executed",
            ExecutionStatus::Executing => "Executing...",
            ExecutionStatus::Passed => "Passed",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Skipped => "Skipped",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ExecutionStatus::NotExecuted => "·",
            ExecutionStatus::Executing => "…",
            ExecutionStatus::Passed => "✓",
            ExecutionStatus::Failed => "✗",
            ExecutionStatus::Skipped => "○",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Passed | ExecutionStatus::Failed | ExecutionStatus::Skipped
        )
    }

    /// Whether `next` is a legal successor of this status.
    ///
    /// Leaving a terminal status requires clearing the ledger, which removes the record.
    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        match self {
            ExecutionStatus::NotExecuted => next == ExecutionStatus::Executing,
            ExecutionStatus::Executing => next.is_terminal(),
            _ => false,
        }
    }
}

impl From<Verdict> for ExecutionStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Passed => ExecutionStatus::Passed,
            Verdict::Failed => ExecutionStatus::Failed,
            Verdict::Skipped => ExecutionStatus::Skipped,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current execution state of one test case
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub status: ExecutionStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionRecord {
    pub fn executing(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: ExecutionStatus::Executing,
            timestamp,
            execution_time_ms: None,
        }
    }

    pub fn finished(verdict: Verdict, timestamp: DateTime<Utc>, execution_time_ms: u64) -> Self {
        Self {
            status: verdict.into(),
            timestamp,
            execution_time_ms: Some(execution_time_ms),
        }
    }

    /// Timestamp as ISO-8601 with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for ExecutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.symbol(), self.status)?;
        if let Some(ms) = self.execution_time_ms {
            write!(f, " [{ms}ms]")?;
        }
        Ok(())
    }
}

/// Aggregate counts for a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub success_rate_percent: u32,
}

impl Summary {
    /// Number of test cases with a terminal record
    pub fn finished(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn is_complete(&self) -> bool {
        self.finished() == self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Passed: {} | Failed: {} | Skipped: {} | Success Rate: {}%",
            self.total, self.passed, self.failed, self.skipped, self.success_rate_percent
        )
    }
}
