//! TableGateway - the port every table access goes through

use async_trait::async_trait;
use query::{ContentRange, QueryParams};
use shared::{MutationOutcome, RestError, Result, Row};

/// One page of a `Range`-driven read
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub rows: Vec<Row>,
    /// Reported range and total, when the server sent one
    pub content_range: Option<ContentRange>,
}

impl Page {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            content_range: None,
        }
    }

    pub fn total(&self) -> Option<u64> {
        self.content_range.and_then(|cr| cr.total)
    }
}

/// Table access over a PostgREST-style API
///
/// Calls are independent: no retries, no transactions across calls.
/// Callers own idempotence and partial batch failures.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Read rows (`GET`). Accepts 200 and 206.
    async fn execute(&self, table: &str, params: &QueryParams) -> Result<Vec<Row>>;

    /// Read `limit` rows starting at `offset` through the `Range` header
    async fn fetch_page(
        &self,
        table: &str,
        params: &QueryParams,
        offset: usize,
        limit: usize,
    ) -> Result<Page>;

    /// Exact number of rows matching the filters of `params`
    async fn count(&self, table: &str, params: &QueryParams) -> Result<u64>;

    /// Insert rows (`POST`). Accepts 200 and 201.
    async fn insert(&self, table: &str, rows: &[Row]) -> Result<Vec<Row>>;

    /// Patch matching rows (`PATCH`). Accepts 200 and 204.
    async fn update(&self, table: &str, patch: &Row, filters: &QueryParams) -> Result<MutationOutcome>;

    /// Delete matching rows (`DELETE`). Accepts 200 and 204.
    async fn delete(&self, table: &str, filters: &QueryParams) -> Result<MutationOutcome>;
}

/// Reject a PATCH/DELETE that carries no row filter
pub fn ensure_filtered(method: &str, table: &str, filters: &QueryParams) -> Result<()> {
    if filters.has_filters() {
        Ok(())
    } else {
        Err(RestError::UnfilteredMutation {
            method: method.to_string(),
            table: table.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query::Filter;

    #[test]
    fn test_ensure_filtered() {
        assert!(ensure_filtered("DELETE", "artisti", &QueryParams::new()).is_err());
        assert!(ensure_filtered("DELETE", "artisti", &QueryParams::new().filter(Filter::eq("id", 1))).is_ok());
    }

    #[test]
    fn test_page_total() {
        let page = Page {
            rows: Vec::new(),
            content_range: Some(ContentRange::parse("*/12").unwrap()),
        };
        assert_eq!(page.total(), Some(12));
        assert_eq!(Page::empty().total(), None);
    }
}
