//! Outcome model for simulated executions
//!
//! Maps a test case category and a uniform draw in `[0, 1)` to a verdict.
//! Each category partitions the unit interval into three contiguous bands,
//! in the fixed order Passed, Failed, Skipped.

#![allow(dead_code)]

mod draw;

pub use draw::{DrawSource, RandomDraws};

#[cfg(test)]
pub use draw::ScriptedDraws;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{TestCaseType, Verdict};

/// Band boundaries for one category.
///
/// `[0, passed_below)` passes, `[passed_below, failed_below)` fails,
/// `[failed_below, 1)` is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBands {
    pub passed_below: f64,
    pub failed_below: f64,
}

impl OutcomeBands {
    pub const fn new(passed_below: f64, failed_below: f64) -> Self {
        Self {
            passed_below,
            failed_below,
        }
    }

    /// Verdict for a draw. Draws outside `[0, 1)` land in the nearest edge band.
    pub fn decide(&self, draw: f64) -> Verdict {
        if draw < self.passed_below {
            Verdict::Passed
        } else if draw < self.failed_below {
            Verdict::Failed
        } else {
            Verdict::Skipped
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.passed_below
            && self.passed_below <= self.failed_below
            && self.failed_below <= 1.0;
        if !ordered {
            anyhow::bail!(
                "Invalid outcome bands: expected 0 <= passed_below ({}) <= failed_below ({}) <= 1",
                self.passed_below,
                self.failed_below
            );
        }
        Ok(())
    }
}

/// Per-category outcome bands
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomePolicy {
    pub performance: OutcomeBands,
    pub security: OutcomeBands,
    pub regression: OutcomeBands,
    /// Functional, usability and any unrecognised category
    pub default: OutcomeBands,
}

impl Default for OutcomePolicy {
    fn default() -> Self {
        Self {
            performance: OutcomeBands::new(0.4, 0.7),
            security: OutcomeBands::new(0.6, 0.8),
            regression: OutcomeBands::new(0.7, 0.85),
            default: OutcomeBands::new(0.8, 0.9),
        }
    }
}

impl OutcomePolicy {
    pub fn bands_for(&self, category: TestCaseType) -> &OutcomeBands {
        match category {
            TestCaseType::Performance => &self.performance,
            TestCaseType::Security => &self.security,
            TestCaseType::Regression => &self.regression,
            TestCaseType::Functional | TestCaseType::Usability => &self.default,
        }
    }

    pub fn decide_outcome(&self, category: TestCaseType, draw: f64) -> Verdict {
        self.bands_for(category).decide(draw)
    }

    /// Same as [`decide_outcome`](Self::decide_outcome) but keyed by the wire
    /// label; unknown labels use the default bands.
    pub fn decide_outcome_for_label(&self, label: &str, draw: f64) -> Verdict {
        match TestCaseType::from_label(label) {
            Some(category) => self.decide_outcome(category, draw),
            None => self.default.decide(draw),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.performance.validate()?;
        self.security.validate()?;
        self.regression.validate()?;
        self.default.validate()
    }
}
