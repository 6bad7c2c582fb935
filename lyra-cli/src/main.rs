//! Lyra CLI - Command-line interface
//!
//! Runs the media server and inspects how catalog entries resolve on disk.

mod commands;

use clap::Parser;
use lyra_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "A range-streaming audio server for a portfolio site")]
struct Cli {
    /// Console log level; full debug logs always go to logs/lyra-last-run.log
    #[arg(long, global = true, value_enum, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), None)?;

    commands::handle_command(cli.command).await?;

    Ok(())
}
