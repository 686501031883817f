use clap::Parser;
use std::process::ExitCode;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "sealcheck")]
#[command(about = "Tamper-evidence scoring and provenance capsule checks", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let default_directive = if cli.verbose { "debug" } else { "warn" };
    sealcheck_utils::tracing::init_with_default(default_directive)
        .map_err(|e| eyre::eyre!("failed to initialise logging: {e}"))?;

    cli.command.execute().await
}
