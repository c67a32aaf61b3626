use anyhow::Result;
use clap::Parser;
use iconprep::cli::{Cli, Commands};
use iconprep::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { name } => commands::init::run(&cli, name),
        Commands::Prepare { dry_run } => commands::prepare::run(&cli, *dry_run).await,
        Commands::Check => commands::check::run(&cli),
    }
}
