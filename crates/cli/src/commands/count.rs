//! restdb count command

use super::{build_params, FilterArgs};
use crate::context::Context;
use crate::output;
use clap::Args;

#[derive(Debug, Args)]
pub struct CountCommand {
    /// Table name
    pub table: String,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl CountCommand {
    pub async fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let params = build_params(None, &self.filters, &[])?;
        let count = ctx.service.count(&self.table, &params).await?;

        if ctx.json {
            output::print_json(&serde_json::json!({ "table": self.table, "count": count }))
        } else {
            println!("{}: {} row(s)", self.table, count);
            Ok(())
        }
    }
}
