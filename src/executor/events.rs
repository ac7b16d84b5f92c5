//! Execution events for live progress reporting

#![allow(dead_code)]

use tokio::sync::broadcast;

use crate::models::{Summary, Verdict};

/// Events emitted by an orchestration run.
///
/// Every event carries the epoch of the run that produced it. Per-test events
/// are only sent for ledger writes that actually landed.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    RunStarted {
        epoch: u64,
        total: usize,
    },
    TestStarted {
        epoch: u64,
        index: usize,
        id: String,
    },
    TestFinished {
        epoch: u64,
        index: usize,
        id: String,
        verdict: Verdict,
        execution_time_ms: u64,
    },
    RunCompleted {
        epoch: u64,
        summary: Summary,
    },
    RunAbandoned {
        epoch: u64,
    },
}

impl ExecutionEvent {
    pub fn epoch(&self) -> u64 {
        match self {
            ExecutionEvent::RunStarted { epoch, .. }
            | ExecutionEvent::TestStarted { epoch, .. }
            | ExecutionEvent::TestFinished { epoch, .. }
            | ExecutionEvent::RunCompleted { epoch, .. }
            | ExecutionEvent::RunAbandoned { epoch } => *epoch,
        }
    }

    /// Whether this event ends a run
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ExecutionEvent::RunCompleted { .. } | ExecutionEvent::RunAbandoned { .. }
        )
    }
}

/// Broadcasts events to any number of observers
pub struct EventEmitter {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventEmitter {
    const CAPACITY: usize = 256;

    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(Self::CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ExecutionEvent) {
        // No receivers is fine; the ledger stays the source of truth.
        let _ = self.sender.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
