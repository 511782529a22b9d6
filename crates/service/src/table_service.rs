//! TableService - table operations on top of a TableGateway

use crate::batch::{BatchOutcome, BatchReport};
use audit::{OperationLog, Pacer};
use gateway::TableGateway;
use query::{Filter, QueryParams};
use serde::Serialize;
use shared::{MutationOutcome, RestError, Result, Row};
use std::time::Duration;
use tracing::{info, warn};

/// TableService configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Rows per POST in batched inserts
    pub insert_chunk_size: usize,
    /// Ids per `in.(...)` DELETE
    pub delete_batch_size: usize,
    /// Rows per `Range` page in fetch-all
    pub page_size: usize,
    /// Pause between delete batches
    pub delete_pause: Duration,
    /// Operation log capacity
    pub log_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            insert_chunk_size: 50,
            delete_batch_size: 50,
            page_size: 1000,
            delete_pause: audit::DEFAULT_PAUSE,
            log_capacity: 10000,
        }
    }
}

/// Row count plus a few sample rows of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub count: u64,
    pub sample: Vec<Row>,
}

/// TableService - sequential table operations with logging
pub struct TableService<G: TableGateway> {
    gateway: G,
    config: ServiceConfig,
    log: OperationLog,
}

impl<G: TableGateway> TableService<G> {
    /// Create a new TableService
    pub fn new(gateway: G, config: ServiceConfig) -> Self {
        let log = OperationLog::new(config.log_capacity);
        Self { gateway, config, log }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Change the pause between delete batches
    pub fn set_delete_pause(&mut self, pause: Duration) {
        self.config.delete_pause = pause;
    }

    /// Log of every request issued so far
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    fn track<T>(&mut self, method: &str, table: &str, result: Result<T>, rows: impl Fn(&T) -> Option<usize>) -> Result<T> {
        match &result {
            Ok(value) => self.log.log_success(method, table, rows(value)),
            Err(e) => self.log.log_failure(method, table, e),
        }
        result
    }

    // ============== Single requests ==============

    /// Read rows matching `params`
    pub async fn execute(&mut self, table: &str, params: &QueryParams) -> Result<Vec<Row>> {
        let result = self.gateway.execute(table, params).await;
        self.track("GET", table, result, |rows| Some(rows.len()))
    }

    /// Exact count of rows matching `params`
    pub async fn count(&mut self, table: &str, params: &QueryParams) -> Result<u64> {
        let result = self.gateway.count(table, params).await;
        self.track("HEAD", table, result, |_| None)
    }

    /// Insert rows in a single request
    pub async fn insert(&mut self, table: &str, rows: &[Row]) -> Result<Vec<Row>> {
        let result = self.gateway.insert(table, rows).await;
        self.track("POST", table, result, |rows| Some(rows.len()))
    }

    /// Patch rows matching `filters`
    pub async fn update(&mut self, table: &str, patch: &Row, filters: &QueryParams) -> Result<MutationOutcome> {
        let result = self.gateway.update(table, patch, filters).await;
        self.track("PATCH", table, result, MutationOutcome::affected)
    }

    /// Delete rows matching `filters`
    pub async fn delete(&mut self, table: &str, filters: &QueryParams) -> Result<MutationOutcome> {
        let result = self.gateway.delete(table, filters).await;
        self.track("DELETE", table, result, MutationOutcome::affected)
    }

    // ============== Multi-request operations ==============

    /// Count plus the first `sample` rows
    pub async fn inspect(&mut self, table: &str, sample: usize) -> Result<TableSummary> {
        let count = self.count(table, &QueryParams::new()).await?;
        let sample = if sample == 0 {
            Vec::new()
        } else {
            self.execute(table, &QueryParams::new().limit(sample)).await?
        };

        Ok(TableSummary {
            table: table.to_string(),
            count,
            sample,
        })
    }

    /// Read every matching row, one `Range` page at a time.
    ///
    /// The server may return fewer rows than asked for (`max-rows`), so the
    /// offset advances by the rows actually received. Stops on an empty page
    /// or once the reported total is reached.
    pub async fn fetch_all(&mut self, table: &str, params: &QueryParams, page_size: Option<usize>) -> Result<Vec<Row>> {
        let page_size = page_size.unwrap_or(self.config.page_size);
        if page_size == 0 {
            return Err(RestError::Config("page size must be greater than zero".to_string()));
        }

        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let result = self.gateway.fetch_page(table, params, offset, page_size).await;
            let page = self.track("GET", table, result, |page| Some(page.rows.len()))?;

            let fetched = page.rows.len();
            let total = page.total();
            rows.extend(page.rows);
            info!(table, offset, fetched, loaded = rows.len(), ?total, "page loaded");

            if fetched == 0 {
                break;
            }
            offset += fetched;
            if total.is_some_and(|total| offset as u64 >= total) {
                break;
            }
        }

        Ok(rows)
    }

    /// Insert rows in chunks of `chunk_size`.
    ///
    /// A failing chunk is recorded in the report and the run continues
    /// with the next one.
    pub async fn insert_batched<F>(
        &mut self,
        table: &str,
        rows: &[Row],
        chunk_size: Option<usize>,
        mut on_batch: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&BatchOutcome),
    {
        let chunk_size = chunk_size.unwrap_or(self.config.insert_chunk_size);
        if chunk_size == 0 {
            return Err(RestError::Config("chunk size must be greater than zero".to_string()));
        }

        let total_batches = rows.len().div_ceil(chunk_size);
        let mut report = BatchReport {
            total_rows: rows.len(),
            ..Default::default()
        };

        for (index, chunk) in rows.chunks(chunk_size).enumerate() {
            let outcome = match self.insert(table, chunk).await {
                Ok(inserted) => {
                    // No representation means the server did not echo rows back.
                    let written = if inserted.is_empty() { chunk.len() } else { inserted.len() };
                    info!(table, batch = index + 1, total_batches, rows = written, "batch inserted");
                    BatchOutcome {
                        index,
                        total_batches,
                        rows: chunk.len(),
                        written,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(table, batch = index + 1, total_batches, error = %e, "batch insert failed");
                    BatchOutcome {
                        index,
                        total_batches,
                        rows: chunk.len(),
                        written: 0,
                        error: Some(e.to_string()),
                    }
                }
            };

            report.record(&outcome);
            on_batch(&outcome);
        }

        Ok(report)
    }

    /// Delete rows whose `column` is in `ids`, `batch_size` ids per request.
    ///
    /// Batches are separated by the configured pause. A failing batch is
    /// recorded and the run continues.
    pub async fn delete_in_batches<F>(
        &mut self,
        table: &str,
        column: &str,
        ids: &[String],
        batch_size: Option<usize>,
        mut on_batch: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&BatchOutcome),
    {
        let batch_size = batch_size.unwrap_or(self.config.delete_batch_size);
        if batch_size == 0 {
            return Err(RestError::Config("batch size must be greater than zero".to_string()));
        }

        let total_batches = ids.len().div_ceil(batch_size);
        let mut pacer = Pacer::new(self.config.delete_pause);
        let mut report = BatchReport {
            total_rows: ids.len(),
            ..Default::default()
        };

        for (index, batch) in ids.chunks(batch_size).enumerate() {
            pacer.wait().await;

            let filters = QueryParams::new().filter(Filter::in_list(column, batch));
            let outcome = match self.delete(table, &filters).await {
                Ok(deleted) => {
                    let written = deleted.affected().unwrap_or(batch.len());
                    info!(table, batch = index + 1, total_batches, rows = written, "batch deleted");
                    BatchOutcome {
                        index,
                        total_batches,
                        rows: batch.len(),
                        written,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(table, batch = index + 1, total_batches, error = %e, "batch delete failed");
                    BatchOutcome {
                        index,
                        total_batches,
                        rows: batch.len(),
                        written: 0,
                        error: Some(e.to_string()),
                    }
                }
            };

            report.record(&outcome);
            on_batch(&outcome);
        }

        Ok(report)
    }
}
