//! Sequential execution orchestrator
//!
//! Drives every test case of a batch through `Executing` to a verdict, one at
//! a time, in batch order. Durations are simulated with cooperative sleeps.
//! After each sleep the run re-checks the session epoch and stops writing as
//! soon as the batch it started with has been replaced or cleared.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::events::ExecutionEvent;
use super::session::Shared;
use crate::models::{Batch, ExecutionRecord, Summary, TestCase, TestCaseType};
use crate::utils::Timer;

/// Simulated timing of an orchestration run, in milliseconds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionTiming {
    /// Delay before the first test so observers can attach
    pub start_delay_ms: u64,
    /// Pause between two consecutive tests
    pub pacing_ms: u64,
    /// Lower bound (inclusive) of a simulated test duration
    pub min_duration_ms: u64,
    /// Upper bound (exclusive) of a simulated test duration
    pub max_duration_ms: u64,
}

impl Default for ExecutionTiming {
    fn default() -> Self {
        Self {
            start_delay_ms: 1000,
            pacing_ms: 500,
            min_duration_ms: 1000,
            max_duration_ms: 3000,
        }
    }
}

impl ExecutionTiming {
    /// Map a uniform draw onto `[min_duration_ms, max_duration_ms)`
    pub fn duration_for(&self, draw: f64) -> f64 {
        let span = self.max_duration_ms.saturating_sub(self.min_duration_ms) as f64;
        self.min_duration_ms as f64 + draw * span
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_duration_ms > self.max_duration_ms {
            anyhow::bail!(
                "min_duration_ms ({}) must not exceed max_duration_ms ({})",
                self.min_duration_ms,
                self.max_duration_ms
            );
        }
        Ok(())
    }
}

/// How an orchestration run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every test case reached a verdict
    Completed { epoch: u64, summary: Summary },
    /// The batch was replaced, reset or cleared mid-run
    Abandoned { epoch: u64 },
    /// A run for the current batch is already in flight
    AlreadyRunning { epoch: u64 },
    /// No batch, or an empty one
    NothingToRun,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// One orchestration run over a snapshot of a batch
pub struct Orchestrator {
    shared: Arc<Shared>,
    epoch: u64,
    category: TestCaseType,
    test_cases: Vec<TestCase>,
}

impl Orchestrator {
    pub(super) fn new(shared: Arc<Shared>, epoch: u64, batch: &Batch) -> Self {
        Self {
            shared,
            epoch,
            category: batch.category(),
            test_cases: batch.test_cases.clone(),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Execute the whole batch. Never fails; stale runs end as `Abandoned`.
    pub async fn run(self) -> RunOutcome {
        let timer = Timer::start(format!("run {}", self.epoch));
        let timing = self.shared.timing().clone();
        let total = self.test_cases.len();

        info!(
            "Starting run {} ({}, {} test cases)",
            self.epoch, self.category, total
        );
        self.shared.emit(ExecutionEvent::RunStarted {
            epoch: self.epoch,
            total,
        });

        sleep(Duration::from_millis(timing.start_delay_ms)).await;

        for (index, test_case) in self.test_cases.iter().enumerate() {
            if !self.shared.is_current(self.epoch) {
                return self.abandon(index);
            }

            let duration_ms = timing.duration_for(self.shared.next_draw());

            let started = self.shared.write_if_current(
                self.epoch,
                &test_case.id,
                ExecutionRecord::executing(Utc::now()),
            );
            if !started {
                return self.abandon(index);
            }
            debug!("[{}/{}] {} executing", index + 1, total, test_case.id);
            self.shared.emit(ExecutionEvent::TestStarted {
                epoch: self.epoch,
                index,
                id: test_case.id.clone(),
            });

            sleep(Duration::from_secs_f64(duration_ms / 1000.0)).await;

            let verdict = self
                .shared
                .policy()
                .decide_outcome(self.category, self.shared.next_draw());
            let execution_time_ms = duration_ms.round() as u64;

            let finished = self.shared.write_if_current(
                self.epoch,
                &test_case.id,
                ExecutionRecord::finished(verdict, Utc::now(), execution_time_ms),
            );
            if !finished {
                return self.abandon(index);
            }
            debug!(
                "[{}/{}] {} {} in {}ms",
                index + 1,
                total,
                test_case.id,
                verdict,
                execution_time_ms
            );
            self.shared.emit(ExecutionEvent::TestFinished {
                epoch: self.epoch,
                index,
                id: test_case.id.clone(),
                verdict,
                execution_time_ms,
            });

            if index + 1 < total {
                sleep(Duration::from_millis(timing.pacing_ms)).await;
            }
        }

        match self.shared.finish_run(self.epoch) {
            Some(summary) => {
                info!(
                    "Run {} completed in {}ms - {}",
                    self.epoch,
                    timer.elapsed_ms(),
                    summary
                );
                self.shared.emit(ExecutionEvent::RunCompleted {
                    epoch: self.epoch,
                    summary,
                });
                RunOutcome::Completed {
                    epoch: self.epoch,
                    summary,
                }
            }
            None => self.abandon(total),
        }
    }

    fn abandon(&self, reached: usize) -> RunOutcome {
        warn!(
            "Run {} abandoned after {}/{} test cases: batch changed",
            self.epoch,
            reached,
            self.test_cases.len()
        );
        self.shared.release_run(self.epoch);
        self.shared
            .emit(ExecutionEvent::RunAbandoned { epoch: self.epoch });
        RunOutcome::Abandoned { epoch: self.epoch }
    }
}
