//! Batch results

use serde::Serialize;

/// Result of one batch, reported to progress observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Zero-based batch index
    pub index: usize,
    pub total_batches: usize,
    /// Rows sent in this batch
    pub rows: usize,
    /// Rows the server reported as written or deleted
    pub written: usize,
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A batch that failed; the run continued past it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub index: usize,
    pub rows: usize,
    pub error: String,
}

/// Summary of a batched insert or delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_rows: usize,
    pub batches: usize,
    pub written_rows: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// True when every batch succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Rows contained in failed batches
    pub fn failed_rows(&self) -> usize {
        self.failures.iter().map(|f| f.rows).sum()
    }

    pub(crate) fn record(&mut self, outcome: &BatchOutcome) {
        self.batches += 1;
        self.written_rows += outcome.written;
        if let Some(error) = &outcome.error {
            self.failures.push(BatchFailure {
                index: outcome.index,
                rows: outcome.rows,
                error: error.clone(),
            });
        }
    }
}
