//! Timer utilities
//!
//! Uses the tokio clock so measurements follow paused time in tests.

#![allow(dead_code)]

use std::time::Duration;
use tokio::time::Instant;

/// Simple timer for measuring elapsed time
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timer_follows_tokio_clock() {
        let timer = Timer::start("test");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.elapsed_ms(), 1500);
        assert_eq!(timer.label(), "test");
    }
}
