//! Range handling for paging and exact counts
//!
//! Requests page with `Range: start-end` (inclusive). Responses report
//! `Content-Range: start-end/total`, where either side may be `*`.

use shared::{RestError, Result};

/// Parsed `Content-Range` response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// Inclusive row range of this response, `None` for `*`
    pub range: Option<(u64, u64)>,
    /// Total matching rows, `None` when the server did not count
    pub total: Option<u64>,
}

impl ContentRange {
    /// Parse `0-9/42`, `*/0` or `0-9/*`
    pub fn parse(header: &str) -> Result<Self> {
        let invalid = || RestError::ContentRange(header.to_string());

        // Some proxies prefix the unit.
        let value = header.trim();
        let value = value.strip_prefix("items ").unwrap_or(value);

        let (range, total) = value.split_once('/').ok_or_else(invalid)?;

        let range = match range.trim() {
            "*" => None,
            r => {
                let (start, end) = r.split_once('-').ok_or_else(invalid)?;
                let start: u64 = start.trim().parse().map_err(|_| invalid())?;
                let end: u64 = end.trim().parse().map_err(|_| invalid())?;
                if end < start {
                    return Err(invalid());
                }
                Some((start, end))
            }
        };

        let total = match total.trim() {
            "*" => None,
            t => Some(t.parse().map_err(|_| invalid())?),
        };

        Ok(Self { range, total })
    }

    /// Number of rows in this response
    pub fn len(&self) -> u64 {
        self.range.map(|(start, end)| end - start + 1).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `Range` request header value for `limit` rows starting at `offset`
pub fn range_header(offset: usize, limit: usize) -> Result<String> {
    if limit == 0 {
        return Err(RestError::Config("page size must be greater than zero".to_string()));
    }
    Ok(format!("{}-{}", offset, offset + limit - 1))
}
