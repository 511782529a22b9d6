//! restdb inspect command

use crate::context::Context;
use crate::output;
use clap::Args;
use console::style;

#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Tables to inspect
    #[arg(required = true)]
    pub tables: Vec<String>,

    /// Sample rows to show per table
    #[arg(long, default_value_t = 5)]
    pub sample: usize,
}

impl InspectCommand {
    pub async fn run(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let mut summaries = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            summaries.push(ctx.service.inspect(table, self.sample).await?);
        }

        if ctx.json {
            return output::print_json(&summaries);
        }

        for summary in &summaries {
            println!("{} {} row(s)", style(&summary.table).bold().cyan(), summary.count);
            for (i, row) in summary.sample.iter().enumerate() {
                println!("{}", output::format_row(i, row));
            }
            println!();
        }
        Ok(())
    }
}
