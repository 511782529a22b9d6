//! In-memory TableGateway
//!
//! Evaluates the same filter operators the REST endpoint understands
//! against rows held in process. Useful for testing and dry runs.

use crate::table_gateway::{ensure_filtered, Page, TableGateway};
use async_trait::async_trait;
use query::{ContentRange, Filter, IsValue, Operator, Order, QueryParams};
use serde_json::Value;
use shared::{MutationOutcome, RestError, Result, Row, StatusError};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// In-memory table store
///
/// Thread-safe implementation using RwLock. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
    unique: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) a table with the given rows
    pub fn with_table(self, table: impl Into<String>, rows: Vec<Row>) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            tables.insert(table.into(), rows);
        }
        self
    }

    /// Declare `column` unique in `table`; a conflicting insert fails with 409
    pub fn with_unique(self, table: impl Into<String>, column: impl Into<String>) -> Self {
        if let Ok(mut unique) = self.unique.write() {
            unique.insert(table.into(), column.into());
        }
        self
    }

    /// Snapshot of a table's rows
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.get(table).cloned())
            .unwrap_or_default()
    }

    fn lock_error() -> RestError {
        RestError::Transport("in-memory store lock poisoned".to_string())
    }

    fn missing_table(method: &str, table: &str) -> RestError {
        StatusError {
            method: method.to_string(),
            table: table.to_string(),
            status: 404,
            body: format!(r#"{{"message":"relation \"{}\" does not exist"}}"#, table),
        }
        .into()
    }

    /// Filtered and ordered rows, before select and paging
    fn matching(&self, method: &str, table: &str, params: &QueryParams) -> Result<Vec<Row>> {
        let tables = self.tables.read().map_err(|_| Self::lock_error())?;
        let rows = tables.get(table).ok_or_else(|| Self::missing_table(method, table))?;

        let mut matched: Vec<Row> = rows
            .iter()
            .filter(|row| params.filter_list().iter().all(|f| matches_filter(row, f)))
            .cloned()
            .collect();

        if !params.order_list().is_empty() {
            matched.sort_by(|a, b| compare_rows(a, b, params.order_list()));
        }

        Ok(matched)
    }
}

/// Cell at `column` (JSON paths allowed); `None` for SQL null or missing
fn cell<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    let mut parts = column.split("->");
    let head = parts.next()?;
    let mut value = row.get(head)?;

    for part in parts {
        let key = part.trim_start_matches('>');
        value = value.get(key)?;
    }

    match value {
        Value::Null => None,
        value => Some(value),
    }
}

/// Text form of a cell as PostgREST renders it
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numbers compare numerically; everything else compares as text.
fn compare_cell(cell: &Value, operand: &str) -> Ordering {
    match (cell.as_f64(), operand.parse::<f64>()) {
        (Some(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => text(cell).as_str().cmp(operand),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => text(a).cmp(&text(b)),
    }
}

/// Simple pattern matching (`*` wildcard), as the `like` operators use it
fn pattern_match(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    let flags = if case_insensitive { "(?i)" } else { "" };

    regex::Regex::new(&format!("{}^{}$", flags, escaped.join(".*")))
        .map(|r| r.is_match(text))
        .unwrap_or(false)
}

fn matches_filter(row: &Row, filter: &Filter) -> bool {
    let matched = match (filter.operator(), cell(row, filter.column())) {
        (Operator::Is(IsValue::Null), cell) => cell.is_none(),
        (Operator::Is(IsValue::True), cell) => cell == Some(&Value::Bool(true)),
        (Operator::Is(IsValue::False), cell) => cell == Some(&Value::Bool(false)),
        // Comparisons against null are never true.
        (_, None) => false,
        (Operator::Eq(v), Some(c)) => compare_cell(c, v) == Ordering::Equal,
        (Operator::Neq(v), Some(c)) => compare_cell(c, v) != Ordering::Equal,
        (Operator::Gt(v), Some(c)) => compare_cell(c, v) == Ordering::Greater,
        (Operator::Gte(v), Some(c)) => compare_cell(c, v) != Ordering::Less,
        (Operator::Lt(v), Some(c)) => compare_cell(c, v) == Ordering::Less,
        (Operator::Lte(v), Some(c)) => compare_cell(c, v) != Ordering::Greater,
        (Operator::Like(p), Some(c)) => pattern_match(p, &text(c), false),
        (Operator::Ilike(p), Some(c)) => pattern_match(p, &text(c), true),
        (Operator::In(values), Some(c)) => values.iter().any(|v| compare_cell(c, v) == Ordering::Equal),
    };

    matched != filter.is_negated()
}

fn compare_rows(a: &Row, b: &Row, order: &[Order]) -> Ordering {
    for key in order {
        let ordering = match (cell(a, &key.column), cell(b, &key.column)) {
            (Some(x), Some(y)) => compare_values(x, y),
            // Nulls sort last ascending, as in PostgreSQL.
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        let ordering = if key.descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(rows: Vec<Row>, columns: &[String]) -> Vec<Row> {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return rows;
    }
    rows.into_iter()
        .map(|row| {
            columns
                .iter()
                .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                .collect()
        })
        .collect()
}

fn window(rows: Vec<Row>, offset: usize, limit: Option<usize>) -> Vec<Row> {
    let iter = rows.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

#[async_trait]
impl TableGateway for MemoryGateway {
    async fn execute(&self, table: &str, params: &QueryParams) -> Result<Vec<Row>> {
        let rows = self.matching("GET", table, params)?;
        let rows = window(rows, params.offset_value().unwrap_or(0), params.limit_value());
        Ok(project(rows, params.selected_columns()))
    }

    async fn fetch_page(
        &self,
        table: &str,
        params: &QueryParams,
        offset: usize,
        limit: usize,
    ) -> Result<Page> {
        query::range_header(offset, limit)?;

        let rows = self.matching("GET", table, &params.without_paging())?;
        let total = rows.len() as u64;
        let rows = window(rows, offset, Some(limit));

        let range = if rows.is_empty() {
            None
        } else {
            Some((offset as u64, (offset + rows.len() - 1) as u64))
        };

        Ok(Page {
            rows: project(rows, params.selected_columns()),
            content_range: Some(ContentRange { range, total: Some(total) }),
        })
    }

    async fn count(&self, table: &str, params: &QueryParams) -> Result<u64> {
        Ok(self.matching("HEAD", table, &params.filters_only())?.len() as u64)
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let unique = self.unique.read().map_err(|_| Self::lock_error())?.get(table).cloned();
        let mut tables = self.tables.write().map_err(|_| Self::lock_error())?;
        let existing = tables.entry(table.to_string()).or_default();

        // All or nothing, like a single INSERT statement.
        if let Some(column) = unique {
            let mut seen: HashSet<String> = existing.iter().filter_map(|r| cell(r, &column)).map(text).collect();
            for row in rows {
                if let Some(key) = cell(row, &column).map(text) {
                    if seen.contains(&key) {
                        return Err(StatusError {
                            method: "POST".to_string(),
                            table: table.to_string(),
                            status: 409,
                            body: format!(
                                r#"{{"code":"23505","message":"duplicate key value violates unique constraint","details":"Key ({})=({}) already exists."}}"#,
                                column, key
                            ),
                        }
                        .into());
                    }
                    seen.insert(key);
                }
            }
        }

        existing.extend(rows.iter().cloned());
        Ok(rows.to_vec())
    }

    async fn update(&self, table: &str, patch: &Row, filters: &QueryParams) -> Result<MutationOutcome> {
        ensure_filtered("PATCH", table, filters)?;

        let mut tables = self.tables.write().map_err(|_| Self::lock_error())?;
        let rows = tables.get_mut(table).ok_or_else(|| Self::missing_table("PATCH", table))?;

        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if filters.filter_list().iter().all(|f| matches_filter(row, f)) {
                for (key, value) in patch {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }

        Ok(MutationOutcome::Rows(updated))
    }

    async fn delete(&self, table: &str, filters: &QueryParams) -> Result<MutationOutcome> {
        ensure_filtered("DELETE", table, filters)?;

        let mut tables = self.tables.write().map_err(|_| Self::lock_error())?;
        let rows = tables.get_mut(table).ok_or_else(|| Self::missing_table("DELETE", table))?;

        let (deleted, kept): (Vec<Row>, Vec<Row>) = rows
            .drain(..)
            .partition(|row| filters.filter_list().iter().all(|f| matches_filter(row, f)));
        *rows = kept;

        Ok(MutationOutcome::Rows(deleted))
    }
}
