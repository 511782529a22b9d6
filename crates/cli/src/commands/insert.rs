//! restdb insert command

use super::read_rows;
use crate::context::Context;
use crate::output;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Args)]
pub struct InsertCommand {
    /// Table name
    pub table: String,

    /// JSON object or array of objects, inline or as @file
    #[arg(short, long)]
    pub data: String,

    /// Rows per request (default 50)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl InsertCommand {
    pub async fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let rows = read_rows(&self.data)?;
        if rows.is_empty() {
            println!("Nothing to insert");
            return Ok(());
        }

        let chunk_size = self.chunk_size.unwrap_or(ctx.service.config().insert_chunk_size);
        let progress = if ctx.json {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(rows.len().div_ceil(chunk_size.max(1)) as u64);
            bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} batches {msg}")?);
            bar
        };

        let report = ctx
            .service
            .insert_batched(&self.table, &rows, Some(chunk_size), |outcome| {
                if let Some(error) = &outcome.error {
                    progress.println(format!("batch {} failed: {}", outcome.index + 1, error));
                }
                progress.inc(1);
            })
            .await?;
        progress.finish_and_clear();

        output::print_report("Inserted", &report, ctx.json)?;
        if !report.is_complete() {
            anyhow::bail!("{} of {} row(s) were not inserted", report.failed_rows(), report.total_rows);
        }
        Ok(())
    }
}
