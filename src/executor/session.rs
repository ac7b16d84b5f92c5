//! Session state
//!
//! A [`Session`] owns the current batch, its result ledger and the epoch
//! counter. Installing a batch, resetting, or clearing results bumps the
//! epoch; an orchestration run only writes while the epoch it captured at
//! start is still current.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::events::{EventEmitter, ExecutionEvent};
use super::orchestrator::{ExecutionTiming, Orchestrator, RunOutcome};
use crate::generator::{check_shape, GenerationError, TestCaseSource};
use crate::models::{Batch, ExecutionRecord, GenerationRequest, Summary, TestCase};
use crate::outcome::{DrawSource, OutcomePolicy};
use crate::results::{self, Report, ResultLedger};

#[derive(Default)]
struct SessionState {
    epoch: u64,
    batch: Option<Batch>,
    ledger: ResultLedger,
    active_run: Option<u64>,
    run_handle: Option<JoinHandle<RunOutcome>>,
}

impl SessionState {
    /// Invalidate any in-flight run
    fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.active_run = None;
        // Dropping the handle detaches the stale task; it stops at its next epoch check.
        self.run_handle = None;
        self.epoch
    }

    fn summary(&self) -> Summary {
        let test_cases = self
            .batch
            .as_ref()
            .map(|b| b.test_cases.as_slice())
            .unwrap_or_default();
        results::summarize(test_cases, &self.ledger)
    }
}

/// State shared between the session and its orchestration task
pub(super) struct Shared {
    state: Mutex<SessionState>,
    draws: Mutex<Box<dyn DrawSource>>,
    timing: ExecutionTiming,
    policy: OutcomePolicy,
    events: EventEmitter,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn timing(&self) -> &ExecutionTiming {
        &self.timing
    }

    pub(super) fn policy(&self) -> &OutcomePolicy {
        &self.policy
    }

    pub(super) fn emit(&self, event: ExecutionEvent) {
        self.events.emit(event);
    }

    pub(super) fn next_draw(&self) -> f64 {
        self.draws
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_draw()
    }

    pub(super) fn is_current(&self, epoch: u64) -> bool {
        self.lock().epoch == epoch
    }

    /// Replace the record for `id` if `epoch` is still current.
    ///
    /// The epoch check and the write happen under one guard.
    pub(super) fn write_if_current(&self, epoch: u64, id: &str, record: ExecutionRecord) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            return false;
        }
        state.ledger.set(id, record);
        true
    }

    /// Mark the run finished; returns the batch summary if it is still current
    pub(super) fn finish_run(&self, epoch: u64) -> Option<Summary> {
        let mut state = self.lock();
        if state.epoch != epoch {
            return None;
        }
        if state.active_run == Some(epoch) {
            state.active_run = None;
        }
        Some(state.summary())
    }

    pub(super) fn release_run(&self, epoch: u64) {
        let mut state = self.lock();
        if state.active_run == Some(epoch) {
            state.active_run = None;
        }
    }
}

enum StartResult {
    Started,
    AlreadyRunning(u64),
    NothingToRun,
}

/// Read-only view of a session at one instant
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub epoch: u64,
    pub request: Option<GenerationRequest>,
    pub test_cases: Vec<TestCase>,
    pub ledger: ResultLedger,
    pub summary: Summary,
    pub running: bool,
}

/// Owner of the current batch and its ledger
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    pub fn new(
        timing: ExecutionTiming,
        policy: OutcomePolicy,
        draws: impl DrawSource + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::default()),
                draws: Mutex::new(Box::new(draws)),
                timing,
                policy,
                events: EventEmitter::new(),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.shared.events.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.shared.lock().epoch
    }

    /// Request a batch from `source` and install it.
    ///
    /// On any error the current batch and ledger are left untouched.
    pub async fn generate<S>(
        &self,
        source: &S,
        request: GenerationRequest,
    ) -> Result<u64, GenerationError>
    where
        S: TestCaseSource + ?Sized,
    {
        let request = request
            .validated()
            .map_err(GenerationError::InvalidRequest)?;

        info!(
            "Requesting {} {} for '{}' from {}",
            request.num_test_cases,
            request.test_case_type,
            request.module_name,
            source.name()
        );

        let test_cases = source.fetch(&request).await.map_err(|e| {
            warn!("Test case generation failed: {}", e);
            e
        })?;
        check_shape(&test_cases).map_err(|e| {
            warn!("Rejected generated batch: {}", e);
            e
        })?;

        Ok(self.replace_batch(Batch::new(request, test_cases)))
    }

    /// Install a new batch, discarding the previous one and its results.
    ///
    /// A non-empty batch starts executing automatically. Returns the new epoch.
    pub fn replace_batch(&self, batch: Batch) -> u64 {
        let mut state = self.shared.lock();
        let epoch = state.bump_epoch();
        state.ledger.clear_all();
        info!(
            "Installed batch {} with {} test cases ({})",
            epoch,
            batch.len(),
            batch.category()
        );
        state.batch = Some(batch);

        self.start_locked(&mut state);
        epoch
    }

    /// Empty the ledger, keeping the test cases. Cancels an in-flight run.
    pub fn clear_results(&self) {
        let mut state = self.shared.lock();
        let epoch = state.bump_epoch();
        state.ledger.clear();
        info!("Cleared results (epoch {})", epoch);
    }

    /// Drop the batch and its ledger. Cancels an in-flight run.
    pub fn reset(&self) {
        let mut state = self.shared.lock();
        let epoch = state.bump_epoch();
        state.batch = None;
        state.ledger.clear_all();
        info!("Session reset (epoch {})", epoch);
    }

    /// Execute the current batch and wait for the run to end.
    ///
    /// Results of an earlier pass are cleared first. Does nothing while a
    /// run for the current batch is still in flight.
    pub async fn run_all(&self) -> RunOutcome {
        {
            let mut state = self.shared.lock();
            if state.active_run == Some(state.epoch) {
                return RunOutcome::AlreadyRunning { epoch: state.epoch };
            }
            if !state.ledger.is_empty() {
                state.bump_epoch();
                state.ledger.clear();
            }
            match self.start_locked(&mut state) {
                StartResult::Started => {}
                StartResult::AlreadyRunning(epoch) => return RunOutcome::AlreadyRunning { epoch },
                StartResult::NothingToRun => return RunOutcome::NothingToRun,
            }
        }

        self.wait_for_run().await.unwrap_or(RunOutcome::NothingToRun)
    }

    /// Wait for the current run, if any, to complete or be abandoned
    pub async fn wait_for_run(&self) -> Option<RunOutcome> {
        let handle = self.shared.lock().run_handle.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Orchestration task failed: {}", e);
                None
            }
        }
    }

    pub fn is_running(&self) -> bool {
        let state = self.shared.lock();
        state.active_run == Some(state.epoch)
    }

    pub fn batch(&self) -> Option<Batch> {
        self.shared.lock().batch.clone()
    }

    pub fn record(&self, id: &str) -> Option<ExecutionRecord> {
        self.shared.lock().ledger.get(id).cloned()
    }

    pub fn summary(&self) -> Summary {
        self.shared.lock().summary()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.lock();
        SessionSnapshot {
            epoch: state.epoch,
            request: state.batch.as_ref().map(|b| b.request.clone()),
            test_cases: state
                .batch
                .as_ref()
                .map(|b| b.test_cases.clone())
                .unwrap_or_default(),
            ledger: state.ledger.clone(),
            summary: state.summary(),
            running: state.active_run == Some(state.epoch),
        }
    }

    /// Export the current batch with its results; `None` without a batch
    pub fn export_report(&self) -> Option<Report> {
        let state = self.shared.lock();
        let batch = state.batch.as_ref()?;
        let summary = state.summary();
        let content = results::export(
            &batch.test_cases,
            &state.ledger,
            &summary,
            &batch.request.url,
        );
        Some(Report::new(&batch.request.module_name, content))
    }

    fn start_locked(&self, state: &mut SessionState) -> StartResult {
        let epoch = state.epoch;
        if state.active_run == Some(epoch) {
            return StartResult::AlreadyRunning(epoch);
        }
        let Some(batch) = state.batch.as_ref().filter(|b| !b.is_empty()) else {
            return StartResult::NothingToRun;
        };
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime available; batch {} will not run", epoch);
                return StartResult::NothingToRun;
            }
        };

        let orchestrator = Orchestrator::new(self.shared.clone(), epoch, batch);
        state.active_run = Some(epoch);
        state.run_handle = Some(runtime.spawn(orchestrator.run()));
        StartResult::Started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExecutionStatus, TestCaseType, Verdict};
    use crate::outcome::{RandomDraws, ScriptedDraws};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::{sleep, Instant};

    fn batch(prefix: &str, category: TestCaseType, n: usize) -> Batch {
        let request = GenerationRequest::new(category, category.default_module()).with_count(n as u32);
        let test_cases = (1..=n)
            .map(|i| {
                TestCase::new(
                    format!("{prefix}_{i:03}"),
                    format!("Verify case {i}"),
                    "Module is accessible",
                    "1. Navigate\n2. Verify",
                )
            })
            .collect();
        Batch::new(request, test_cases)
    }

    /// Every test takes 2000ms; `verdict_draw` picks the verdict
    fn scripted_session(verdict_draw: f64) -> Session {
        Session::new(
            ExecutionTiming::default(),
            OutcomePolicy::default(),
            ScriptedDraws::new(vec![0.5, verdict_draw]),
        )
    }

    fn random_session() -> Session {
        Session::new(
            ExecutionTiming::default(),
            OutcomePolicy::default(),
            RandomDraws::seeded(7),
        )
    }

    fn drain(rx: &mut broadcast::Receiver<ExecutionEvent>) -> Vec<ExecutionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    struct FixedSource(Result<Vec<TestCase>, GenerationError>);

    #[async_trait]
    impl TestCaseSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch(
            &self,
            _request: &GenerationRequest,
        ) -> Result<Vec<TestCase>, GenerationError> {
            self.0.clone()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_of_eight_functional_cases() {
        let session = random_session();
        session.replace_batch(batch("TC", TestCaseType::Functional, 8));
        assert!(session.is_running());

        let outcome = session.wait_for_run().await.unwrap();
        let RunOutcome::Completed { summary, .. } = outcome else {
            panic!("run did not complete: {outcome:?}");
        };
        assert_eq!(summary.total, 8);
        assert_eq!(summary.passed + summary.failed + summary.skipped, 8);
        assert!(!session.is_running());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.ledger.len(), 8);
        assert!(!snapshot.ledger.has_executing());
        for test_case in &snapshot.test_cases {
            let record = snapshot.ledger.get(&test_case.id).unwrap();
            assert!(record.status.is_terminal());
            let ms = record.execution_time_ms.unwrap();
            assert!((1000..=3000).contains(&ms), "{} took {ms}ms", test_case.id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_timing_is_sequential() {
        let session = scripted_session(0.1);
        let start = Instant::now();
        session.replace_batch(batch("TC", TestCaseType::Functional, 3));

        let outcome = session.wait_for_run().await.unwrap();
        assert!(outcome.is_completed());

        // start delay + 3 x 2000ms + 2 x 500ms pacing
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(8000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(8100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_each_status() {
        let session = scripted_session(0.1);
        session.replace_batch(batch("TC", TestCaseType::Functional, 2));

        sleep(Duration::from_millis(999)).await;
        assert!(session.record("TC_001").is_none());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(
            session.record("TC_001").unwrap().status,
            ExecutionStatus::Executing
        );
        assert!(session.record("TC_002").is_none());

        sleep(Duration::from_millis(2000)).await;
        let first = session.record("TC_001").unwrap();
        assert_eq!(first.status, ExecutionStatus::Passed);
        assert_eq!(first.execution_time_ms, Some(2000));
        assert!(session.record("TC_002").is_none());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(
            session.record("TC_002").unwrap().status,
            ExecutionStatus::Executing
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_follow_batch_order() {
        let session = scripted_session(0.85);
        let mut rx = session.subscribe();
        let epoch = session.replace_batch(batch("TC", TestCaseType::Functional, 4));
        session.wait_for_run().await.unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.first(), Some(&ExecutionEvent::RunStarted { epoch, total: 4 }));
        assert!(matches!(events.last(), Some(ExecutionEvent::RunCompleted { .. })));

        let per_test = &events[1..events.len() - 1];
        assert_eq!(per_test.len(), 8);
        for (i, pair) in per_test.chunks(2).enumerate() {
            let id = format!("TC_{:03}", i + 1);
            assert_eq!(
                pair[0],
                ExecutionEvent::TestStarted {
                    epoch,
                    index: i,
                    id: id.clone()
                }
            );
            assert_eq!(
                pair[1],
                ExecutionEvent::TestFinished {
                    epoch,
                    index: i,
                    id,
                    verdict: Verdict::Failed,
                    execution_time_ms: 2000,
                }
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_verdicts_follow_category_bands() {
        // 0.65 fails a Security batch but passes a Regression batch
        let session = scripted_session(0.65);
        session.replace_batch(batch("SEC", TestCaseType::Security, 5));
        let RunOutcome::Completed { summary, .. } = session.wait_for_run().await.unwrap() else {
            panic!("security run did not complete");
        };
        assert_eq!(summary.failed, 5);
        assert_eq!(summary.success_rate_percent, 0);

        session.replace_batch(batch("REG", TestCaseType::Regression, 5));
        let RunOutcome::Completed { summary, .. } = session.wait_for_run().await.unwrap() else {
            panic!("regression run did not complete");
        };
        assert_eq!(summary.passed, 5);
        assert_eq!(summary.success_rate_percent, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_batch_abandons_stale_run() {
        let session = random_session();
        let mut rx = session.subscribe();

        let old = session.replace_batch(batch("OLD", TestCaseType::Performance, 5));
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(
            session.record("OLD_001").unwrap().status,
            ExecutionStatus::Executing
        );

        let new = session.replace_batch(batch("NEW", TestCaseType::Performance, 5));
        assert!(new > old);
        assert!(session.snapshot().ledger.is_empty());

        let outcome = session.wait_for_run().await.unwrap();
        assert!(outcome.is_completed());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.ledger.len(), 5);
        assert!(snapshot.ledger.iter().all(|(id, _)| id.starts_with("NEW_")));
        assert_eq!(snapshot.summary.finished(), 5);

        let stale: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.epoch() == old)
            .collect();
        assert!(matches!(stale.last(), Some(ExecutionEvent::RunAbandoned { .. })));
        assert!(!stale
            .iter()
            .any(|e| matches!(e, ExecutionEvent::TestFinished { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_results_keeps_test_cases() {
        let session = random_session();
        let original = batch("TC", TestCaseType::Usability, 5);
        session.replace_batch(original.clone());
        session.wait_for_run().await.unwrap();
        assert_eq!(session.snapshot().ledger.len(), 5);

        session.clear_results();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.ledger.len(), 0);
        assert_eq!(snapshot.test_cases, original.test_cases);
        assert_eq!(snapshot.summary.total, 5);
        assert_eq!(snapshot.summary.finished(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_results_mid_run_stops_writes() {
        let session = random_session();
        session.replace_batch(batch("TC", TestCaseType::Functional, 5));
        sleep(Duration::from_millis(1500)).await;

        session.clear_results();
        assert!(!session.is_running());

        sleep(Duration::from_secs(30)).await;
        assert!(session.snapshot().ledger.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_empties_everything() {
        let session = random_session();
        session.replace_batch(batch("TC", TestCaseType::Functional, 5));
        sleep(Duration::from_millis(1500)).await;

        session.reset();
        sleep(Duration::from_secs(30)).await;

        let snapshot = session.snapshot();
        assert!(snapshot.request.is_none());
        assert!(snapshot.test_cases.is_empty());
        assert!(snapshot.ledger.is_empty());
        assert_eq!(snapshot.summary, Summary::default());
        assert!(session.export_report().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_all_reruns_completed_batch() {
        let session = scripted_session(0.1);
        let first = session.replace_batch(batch("TC", TestCaseType::Functional, 5));
        session.wait_for_run().await.unwrap();

        let outcome = session.run_all().await;
        let RunOutcome::Completed { epoch, summary } = outcome else {
            panic!("manual run did not complete: {outcome:?}");
        };
        assert!(epoch > first);
        assert_eq!(summary.passed, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_all_while_running() {
        let session = random_session();
        let epoch = session.replace_batch(batch("TC", TestCaseType::Functional, 5));

        assert_eq!(session.run_all().await, RunOutcome::AlreadyRunning { epoch });
        assert!(session.wait_for_run().await.unwrap().is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_is_a_no_op() {
        let session = random_session();
        assert_eq!(session.run_all().await, RunOutcome::NothingToRun);

        session.replace_batch(batch("TC", TestCaseType::Functional, 0));
        assert!(!session.is_running());
        assert!(session.wait_for_run().await.is_none());
        assert_eq!(session.run_all().await, RunOutcome::NothingToRun);

        let report = session.export_report().unwrap();
        assert!(report
            .content
            .ends_with("SUMMARY,Total: 0,Passed: 0,Failed: 0,Skipped: 0,Success Rate: 0%"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_installs_batch() {
        let session = scripted_session(0.1);
        let source = FixedSource(Ok(batch("GEN", TestCaseType::Security, 5).test_cases));
        let request = GenerationRequest::new(TestCaseType::Security, "  Injection ");

        let epoch = session.generate(&source, request).await.unwrap();
        assert_eq!(session.epoch(), epoch);

        let installed = session.batch().unwrap();
        assert_eq!(installed.request.module_name, "Injection");
        assert_eq!(installed.len(), 5);

        session.wait_for_run().await.unwrap();
        let report = session.export_report().unwrap();
        assert_eq!(report.file_name, "test_cases_Injection_with_results.csv");
        assert!(report.content.contains("Success Rate: 100%"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_failure_keeps_previous_batch() {
        let session = scripted_session(0.1);
        let previous = batch("TC", TestCaseType::Functional, 5);
        let epoch = session.replace_batch(previous.clone());
        session.wait_for_run().await.unwrap();

        let failing = FixedSource(Err(GenerationError::Upstream(
            "AI service error".to_string(),
        )));
        let err = session
            .generate(&failing, GenerationRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::Upstream("AI service error".to_string()));

        let empty = FixedSource(Ok(Vec::new()));
        let err = session
            .generate(&empty, GenerationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedShape(_)));
        assert!(!session.is_running());

        let duplicated = FixedSource(Ok(vec![
            TestCase::new("DUP", "a", "b", "c"),
            TestCase::new("DUP", "d", "e", "f"),
        ]));
        let err = session
            .generate(&duplicated, GenerationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedShape(_)));

        assert_eq!(session.epoch(), epoch);
        assert_eq!(session.batch().unwrap(), previous);
        assert_eq!(session.summary().finished(), 5);
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_request() {
        let session = random_session();
        let source = FixedSource(Ok(Vec::new()));
        let request = GenerationRequest::default().with_count(50);

        let err = session.generate(&source, request).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRequest(_)));
        assert!(session.batch().is_none());
    }
}
