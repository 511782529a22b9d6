//! restdb update command

use super::{build_params, read_payload, FilterArgs};
use crate::context::Context;
use crate::output;
use clap::Args;
use serde_json::Value;
use shared::MutationOutcome;

#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Table name
    pub table: String,

    /// JSON object with the new column values, inline or as @file
    #[arg(short, long)]
    pub data: String,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl UpdateCommand {
    pub async fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let patch = match read_payload(&self.data)? {
            Value::Object(patch) => patch,
            other => anyhow::bail!("Update data must be a JSON object, got {}", other),
        };
        let params = build_params(None, &self.filters, &[])?;

        match ctx.service.update(&self.table, &patch, &params).await? {
            MutationOutcome::Rows(rows) => output::print_rows(&rows, ctx.json),
            MutationOutcome::Applied => {
                println!("✓ Update applied to {}", self.table);
                Ok(())
            }
        }
    }
}
