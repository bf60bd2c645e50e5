//! medtrack CLI - medical device inventory and maintenance tracker
//!
//! Entry point for the `medtrack` command-line tool:
//! - Run the HTTP API (`serve`), against PostgreSQL or in memory
//! - Create/update the database schema (`migrate`)
//! - Print the dashboard statistics snapshot (`stats`)
//! - Show the effective configuration (`config`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "medtrack",
    author,
    version,
    about = "Medical device inventory, maintenance history and documents over a JSON API",
    long_about = "Track medical devices, their maintenance records and document references. \
                  Serves a JSON API under /api and aggregates dashboard statistics."
)]
struct Cli {
    /// Config file (default: ~/.medtrack/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or update the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Print the statistics snapshot as JSON
    Stats(commands::stats::StatsArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    commands::load_dotenv();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &config).await?,
        Commands::Migrate(args) => commands::run_migrate(args, &config).await?,
        Commands::Stats(args) => commands::run_stats(args, &config).await?,
        Commands::Config => commands::run_config(&config)?,
    }
    Ok(())
}
