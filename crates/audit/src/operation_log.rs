//! OperationLog - record of every request issued against the endpoint

use serde::{Deserialize, Serialize};
use shared::RestError;
use std::collections::VecDeque;

/// One issued request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEntry {
    pub timestamp: String,
    pub method: String,
    pub table: String,
    pub success: bool,
    /// HTTP status of a rejected request; unset on success and transport errors
    pub status: Option<u16>,
    pub rows: Option<usize>,
    pub error: Option<String>,
}

/// Bounded operation log
#[derive(Debug)]
pub struct OperationLog {
    entries: VecDeque<OperationEntry>,
    max_entries: usize,
}

impl OperationLog {
    /// Create a new OperationLog
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1024)),
            max_entries: max_entries.max(1),
        }
    }

    /// Log an entry, evicting the oldest when full
    pub fn log(&mut self, entry: OperationEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Log a successful request
    pub fn log_success(&mut self, method: &str, table: &str, rows: Option<usize>) {
        self.log(OperationEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            method: method.to_string(),
            table: table.to_string(),
            success: true,
            status: None,
            rows,
            error: None,
        });
    }

    /// Log a failed request
    pub fn log_failure(&mut self, method: &str, table: &str, error: &RestError) {
        self.log(OperationEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            method: method.to_string(),
            table: table.to_string(),
            success: false,
            status: error.status(),
            rows: None,
            error: Some(error.to_string()),
        });
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<&OperationEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Get recent failures, newest first
    pub fn get_recent_failures(&self, limit: usize) -> Vec<&OperationEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| !e.success)
            .take(limit)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> OperationStats {
        OperationStats {
            total_entries: self.entries.len(),
            failure_count: self.entries.iter().filter(|e| !e.success).count(),
            rows_touched: self.entries.iter().filter_map(|e| e.rows).sum(),
        }
    }

    /// Export as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }
}

/// Operation statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStats {
    pub total_entries: usize,
    pub failure_count: usize,
    pub rows_touched: usize,
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new(10000)
    }
}
