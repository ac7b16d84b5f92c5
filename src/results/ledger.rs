//! Result ledger
//!
//! Current execution record per test case id. Only the latest state is kept.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{ExecutionRecord, ExecutionStatus};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultLedger {
    records: HashMap<String, ExecutionRecord>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ExecutionRecord> {
        self.records.get(id)
    }

    /// Status for an id; absent records read as `NotExecuted`
    pub fn status(&self, id: &str) -> ExecutionStatus {
        self.get(id)
            .map(|r| r.status)
            .unwrap_or(ExecutionStatus::NotExecuted)
    }

    /// Insert or replace the record for `id`, leaving other entries untouched
    pub fn set(&mut self, id: impl Into<String>, record: ExecutionRecord) {
        self.records.insert(id.into(), record);
    }

    /// Explicit reset of results; the batch itself is kept by the caller
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drop every record because the batch they belong to was replaced
    pub fn clear_all(&mut self) {
        self.records = HashMap::new();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExecutionRecord)> {
        self.records.iter()
    }

    /// Whether any test case is currently in flight
    pub fn has_executing(&self) -> bool {
        self.records
            .values()
            .any(|r| r.status == ExecutionStatus::Executing)
    }
}
