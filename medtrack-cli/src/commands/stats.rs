//! Print the dashboard statistics snapshot as JSON

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use medtrack_core::MedtrackConfig;
use medtrack_server::db::StatisticsRepository;

use super::{statistics_settings, DatabaseArgs};

#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

pub async fn run_stats(args: StatsArgs, config: &MedtrackConfig) -> Result<()> {
    let store = args.database.connect(config).await?;
    let query = statistics_settings(config)?.query(Utc::now());

    let snapshot = store
        .statistics(&query)
        .await
        .context("Failed to compute statistics")?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
