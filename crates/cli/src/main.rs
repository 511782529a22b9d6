//! restdb - command-line client for PostgREST tables
//!
//! Usage:
//!   restdb init [dir]                          - Write a restdb.json template
//!   restdb query <table> --filter col=op.val   - Read rows
//!   restdb count <table>                       - Count rows
//!   restdb inspect <table>...                  - Count plus sample rows
//!   restdb fetch-all <table>                   - Read every row, page by page
//!   restdb insert <table> --data @rows.json    - Insert rows in chunks
//!   restdb update <table> --data '{..}' --eq col=val
//!   restdb delete <table> --in id --ids 1,2,3  - Delete in paced batches

use clap::{ArgAction, Parser, Subcommand};
use cli::commands::{
    CountCommand, DeleteCommand, FetchAllCommand, InitCommand, InsertCommand, InspectCommand,
    QueryCommand, UpdateCommand,
};
use cli::context::{ConnectionArgs, Context};
use console::style;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restdb")]
#[command(about = "restdb - query and maintain PostgREST tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a restdb.json config template
    Init(InitCommand),
    /// Read rows matching filters
    Query(QueryCommand),
    /// Count rows matching filters
    Count(CountCommand),
    /// Show row counts and sample rows
    Inspect(InspectCommand),
    /// Read every matching row using Range paging
    FetchAll(FetchAllCommand),
    /// Insert rows in chunks
    Insert(InsertCommand),
    /// Update rows matching filters
    Update(UpdateCommand),
    /// Delete rows by filter or by id list
    Delete(DeleteCommand),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Init(cmd) = &cli.command {
        return cmd.run();
    }

    let mut ctx = Context::from_args(&cli.connection, cli.json)?;

    let result = match &cli.command {
        Commands::Init(_) => Ok(()),
        Commands::Query(cmd) => cmd.run(&mut ctx).await,
        Commands::Count(cmd) => cmd.run(&mut ctx).await,
        Commands::Inspect(cmd) => cmd.run(&mut ctx).await,
        Commands::FetchAll(cmd) => cmd.run(&mut ctx).await,
        Commands::Insert(cmd) => cmd.run(&mut ctx).await,
        Commands::Update(cmd) => cmd.run(&mut ctx).await,
        Commands::Delete(cmd) => cmd.run(&mut ctx).await,
    };

    let stats = ctx.service.log().get_stats();
    info!(
        requests = stats.total_entries,
        failures = stats.failure_count,
        rows = stats.rows_touched,
        "session finished"
    );
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
