//! Summary aggregation over a batch and its ledger

use crate::models::{ExecutionStatus, Summary, TestCase};
use crate::results::ResultLedger;

/// Count verdicts for the given test cases.
///
/// `total` is the batch size; test cases without a terminal record only
/// contribute to it. Ledger entries for ids outside the batch are ignored.
pub fn summarize(test_cases: &[TestCase], ledger: &ResultLedger) -> Summary {
    let mut summary = Summary {
        total: test_cases.len(),
        ..Summary::default()
    };

    for test_case in test_cases {
        match ledger.status(&test_case.id) {
            ExecutionStatus::Passed => summary.passed += 1,
            ExecutionStatus::Failed => summary.failed += 1,
            ExecutionStatus::Skipped => summary.skipped += 1,
            ExecutionStatus::NotExecuted | ExecutionStatus::Executing => {}
        }
    }

    summary.success_rate_percent = success_rate(summary.passed, summary.total);
    summary
}

/// `round(passed / total * 100)`, 0 for an empty batch
pub fn success_rate(passed: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((passed as f64 / total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExecutionRecord, Verdict};
    use chrono::Utc;

    fn cases(n: usize) -> Vec<TestCase> {
        (1..=n)
            .map(|i| TestCase::new(format!("TC_{i:03}"), "d", "p", "s"))
            .collect()
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize(&[], &ResultLedger::new());
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.success_rate_percent, 0);
    }

    #[test]
    fn test_partial_ledger() {
        let cases = cases(4);
        let mut ledger = ResultLedger::new();
        let now = Utc::now();
        ledger.set("TC_001", ExecutionRecord::finished(Verdict::Passed, now, 1000));
        ledger.set("TC_002", ExecutionRecord::executing(now));
        ledger.set("STALE", ExecutionRecord::finished(Verdict::Passed, now, 1000));

        let summary = summarize(&cases, &ledger);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.finished(), 1);
        assert_eq!(summary.success_rate_percent, 25);
    }

    #[test]
    fn test_rounding_and_idempotence() {
        let cases = cases(3);
        let mut ledger = ResultLedger::new();
        let now = Utc::now();
        ledger.set("TC_001", ExecutionRecord::finished(Verdict::Passed, now, 1000));
        ledger.set("TC_002", ExecutionRecord::finished(Verdict::Passed, now, 1000));
        ledger.set("TC_003", ExecutionRecord::finished(Verdict::Skipped, now, 1000));

        let first = summarize(&cases, &ledger);
        assert_eq!(first.success_rate_percent, 67);
        assert!(first.is_complete());

        let mut reversed = cases.clone();
        reversed.reverse();
        assert_eq!(summarize(&reversed, &ledger), first);
        assert_eq!(summarize(&cases, &ledger), first);
    }

    #[test]
    fn test_success_rate_half_rounds_up() {
        assert_eq!(success_rate(1, 8), 13);
        assert_eq!(success_rate(5, 8), 63);
        assert_eq!(success_rate(8, 8), 100);
        assert_eq!(success_rate(0, 0), 0);
    }
}
