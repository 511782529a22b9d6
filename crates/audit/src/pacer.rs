//! Pacer - fixed pause between consecutive batches

use std::time::Duration;
use tracing::trace;

/// Default pause between delete batches
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

/// Sleeps a fixed interval before every batch except the first
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    batches: usize,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_PAUSE)
    }
}

impl Pacer {
    /// Create a pacer; a zero interval disables pausing
    pub fn new(interval: Duration) -> Self {
        Self { interval, batches: 0 }
    }

    /// Pacer that never sleeps
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of batches started so far
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Wait before starting the next batch
    pub async fn wait(&mut self) {
        if self.batches > 0 && self.is_enabled() {
            trace!(pause_ms = self.interval.as_millis() as u64, "pausing between batches");
            tokio::time::sleep(self.interval).await;
        }
        self.batches += 1;
    }

    /// Start counting again from the first batch
    pub fn reset(&mut self) {
        self.batches = 0;
    }
}
