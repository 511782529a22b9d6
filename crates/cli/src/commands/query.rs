//! restdb query command

use super::{build_params, FilterArgs};
use crate::context::Context;
use crate::output;
use clap::Args;

#[derive(Debug, Args)]
pub struct QueryCommand {
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

    #[arg(short, long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub offset: Option<usize>,
}

impl QueryCommand {
    pub async fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let mut params = build_params(self.select.as_deref(), &self.filters, &self.order)?;
        if let Some(limit) = self.limit {
            params = params.limit(limit);
        }
        if let Some(offset) = self.offset {
            params = params.offset(offset);
        }

        let rows = ctx.service.execute(&self.table, &params).await?;
        output::print_rows(&rows, ctx.json)
    }
}
