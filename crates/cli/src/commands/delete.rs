//! restdb delete command

use super::{build_params, FilterArgs};
use crate::context::Context;
use crate::output;
use clap::Args;
use dialoguer::Confirm;
use shared::MutationOutcome;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Table name
    pub table: String,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Delete by id list: column matched against --ids
    #[arg(long = "in", requires = "ids", conflicts_with_all = ["filters", "equalities"])]
    pub in_column: Option<String>,

    /// Comma-separated ids for --in
    #[arg(long, value_delimiter = ',', requires = "in_column")]
    pub ids: Vec<String>,

    /// Ids per request (default 50)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause between batches in milliseconds (default 100)
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl DeleteCommand {
    pub async fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        match &self.in_column {
            Some(column) => self.delete_ids(ctx, column).await,
            None => self.delete_filtered(ctx).await,
        }
    }

    async fn delete_filtered(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let params = build_params(None, &self.filters, &[])?;
        if !params.has_filters() {
            anyhow::bail!("Refusing to delete without a filter (use --eq, --filter or --in)");
        }

        let matching = ctx.service.count(&self.table, &params).await?;
        if matching == 0 {
            println!("No rows match");
            return Ok(());
        }
        if !self.confirm(&format!("Delete {} row(s) from {}?", matching, self.table))? {
            println!("Cancelled");
            return Ok(());
        }

        match ctx.service.delete(&self.table, &params).await? {
            MutationOutcome::Rows(rows) if ctx.json => output::print_json(&rows),
            outcome => {
                let deleted = outcome.affected().unwrap_or(matching as usize);
                println!("✓ Deleted {} row(s) from {}", deleted, self.table);
                Ok(())
            }
        }
    }

    async fn delete_ids(&self, ctx: &mut Context, column: &str) -> anyhow::Result<()> {
        let ids: Vec<String> = self
            .ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            println!("No ids given");
            return Ok(());
        }

        if !self.confirm(&format!("Delete up to {} row(s) from {} by {}?", ids.len(), self.table, column))? {
            println!("Cancelled");
            return Ok(());
        }

        if let Some(pause_ms) = self.pause_ms {
            ctx.service.set_delete_pause(Duration::from_millis(pause_ms));
        }

        let json = ctx.json;
        let report = ctx
            .service
            .delete_in_batches(&self.table, column, &ids, self.batch_size, |outcome| {
                if !json {
                    match &outcome.error {
                        Some(error) => eprintln!("  batch {}/{} failed: {}", outcome.index + 1, outcome.total_batches, error),
                        None => println!("  batch {}/{}: {} row(s)", outcome.index + 1, outcome.total_batches, outcome.written),
                    }
                }
            })
            .await?;

        output::print_report("Deleted", &report, json)?;
        if !report.is_complete() {
            anyhow::bail!("{} batch(es) failed", report.failures.len());
        }
        Ok(())
    }

    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        if self.yes {
            return Ok(true);
        }
        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }
}
