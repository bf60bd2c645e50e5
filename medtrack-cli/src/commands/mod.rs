//! Command implementations for the medtrack CLI

pub mod config;
pub mod migrate;
pub mod serve;
pub mod stats;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use medtrack_core::MedtrackConfig;
use medtrack_server::db::{create_pool_with_options, PgStore};
use medtrack_server::StatisticsSettings;

pub use config::run_config;
pub use migrate::run_migrate;
pub use serve::run_serve;
pub use stats::run_stats;

/// Database connection flags shared by the commands that talk to PostgreSQL
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

impl DatabaseArgs {
    /// Flag first, then config (which already folds in the environment).
    pub fn resolve(&self, config: &MedtrackConfig) -> Result<String> {
        self.database_url
            .clone()
            .or_else(|| config.database.url.clone())
            .context(
                "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, \
                 [database].url in config, or ~/.medtrack/.env",
            )
    }

    pub async fn connect(&self, config: &MedtrackConfig) -> Result<PgStore> {
        let url = self.resolve(config)?;
        let pool = create_pool_with_options(&url, config.database.max_connections)
            .await
            .context("Failed to create database pool")?;
        Ok(PgStore::new(pool))
    }
}

/// Load `.env` files from the current directory and `~/.medtrack/.env`.
///
/// Neither overwrites variables that are already set.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded .env from current directory: {}", path.display());
    }

    if let Some(home) = dirs::home_dir() {
        let env_file = home.join(".medtrack").join(".env");
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => debug!("Loaded .env from {}", env_file.display()),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }
}

/// Effective configuration: file, then environment.
pub fn load_config(path: Option<&Path>) -> Result<MedtrackConfig> {
    let config = MedtrackConfig::load(path).context("Failed to load configuration")?;
    info!(
        path = %path.map(Path::to_path_buf).unwrap_or_else(MedtrackConfig::default_path).display(),
        "configuration loaded"
    );
    Ok(config)
}

pub fn statistics_settings(config: &MedtrackConfig) -> Result<StatisticsSettings> {
    Ok(StatisticsSettings {
        timezone: config.statistics.tz()?,
        due_soon_days: config.statistics.due_soon_days,
        recent_limit: config.statistics.recent_activity_limit as usize,
    })
}
