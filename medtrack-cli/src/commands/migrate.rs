//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use medtrack_core::MedtrackConfig;
use medtrack_server::db::migrations;

use super::DatabaseArgs;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create or update the schema. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs, config: &MedtrackConfig) -> Result<()> {
    let store = args.database.connect(config).await?;
    migrations::run(store.pool())
        .await
        .context("Failed to run migrations")?;

    println!("Schema is up to date");
    Ok(())
}
