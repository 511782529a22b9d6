//! CLI Commands

pub mod count;
pub mod delete;
pub mod fetch_all;
pub mod init;
pub mod insert;
pub mod inspect;
pub mod query;
pub mod update;

pub use count::CountCommand;
pub use delete::DeleteCommand;
pub use fetch_all::FetchAllCommand;
pub use init::InitCommand;
pub use insert::InsertCommand;
pub use inspect::InspectCommand;
pub use query::QueryCommand;
pub use update::UpdateCommand;

use anyhow::Context as _;
use clap::Args;
use ::query::{Filter, Order, QueryParams};
use serde_json::Value;
use shared::Row;
use std::path::Path;

/// Filter options shared by the read commands
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Filter as `column=op.value` (e.g. `nome=ilike.*rossi*`), repeatable
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Equality filter as `column=value`, repeatable
    #[arg(long = "eq")]
    pub equalities: Vec<String>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> anyhow::Result<Vec<Filter>> {
        let mut filters = Vec::with_capacity(self.filters.len() + self.equalities.len());
        for expression in &self.filters {
            filters.push(Filter::parse(expression)?);
        }
        for assignment in &self.equalities {
            let (column, value) = parse_assignment(assignment)?;
            filters.push(Filter::eq(column, value));
        }
        Ok(filters)
    }
}

/// Build query parameters from the common read options
pub fn build_params(
    select: Option<&str>,
    filters: &FilterArgs,
    order: &[String],
) -> anyhow::Result<QueryParams> {
    let mut params = QueryParams::new().filters(filters.to_filters()?);
    if let Some(select) = select {
        params = params.select_str(select);
    }
    for expression in order {
        params = params.order(Order::parse(expression)?);
    }
    Ok(params)
}

/// Split `column=value`
pub fn parse_assignment(assignment: &str) -> anyhow::Result<(String, String)> {
    match assignment.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => anyhow::bail!("Expected column=value, got '{}'", assignment),
    }
}

/// Read a JSON payload given inline or as `@path`
pub fn read_payload(data: &str) -> anyhow::Result<Value> {
    let text = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read {}", path))?,
        None => data.to_string(),
    };
    serde_json::from_str(&text).context("Payload is not valid JSON")
}

/// Payload as a list of rows (an object or an array of objects)
pub fn read_rows(data: &str) -> anyhow::Result<Vec<Row>> {
    Ok(shared::rows_from_value(read_payload(data)?)?)
}
