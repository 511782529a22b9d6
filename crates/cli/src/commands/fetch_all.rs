//! restdb fetch-all command

use super::{build_params, FilterArgs};
use crate::context::Context;
use crate::output;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FetchAllCommand {
    /// Table name
    pub table: String,

    /// Columns to return, comma-separated
    #[arg(short, long)]
    pub select: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Sort as `column` or `column.desc`, repeatable
    #[arg(short, long)]
    pub order: Vec<String>,

    /// Rows per page (default 1000)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Write the rows as a JSON array to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl FetchAllCommand {
    pub async fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let params = build_params(self.select.as_deref(), &self.filters, &self.order)?;
        let rows = ctx.service.fetch_all(&self.table, &params, self.page_size).await?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, serde_json::to_string_pretty(&rows)?)?;
                println!("✓ Wrote {} row(s) to {}", rows.len(), path.display());
                Ok(())
            }
            None => output::print_rows(&rows, ctx.json),
        }
    }
}
