//! HTTP server command
//!
//! Runs the medtrack API against PostgreSQL, or against the in-process store
//! with `--memory`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use medtrack_core::MedtrackConfig;
use medtrack_server::db::{migrations, MemoryStore, Store};
use medtrack_server::http::{run_server, ServerConfig};

use super::{statistics_settings, DatabaseArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: server.bind from config, 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Keep everything in memory instead of PostgreSQL (data is lost on exit).
    /// Any database URL is ignored.
    #[arg(long)]
    pub memory: bool,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Skip creating/updating the schema on startup
    #[arg(long)]
    pub no_migrate: bool,
}

impl ServeArgs {
    fn server_config(&self, config: &MedtrackConfig) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind.unwrap_or(config.server.bind),
            cors_permissive: self.cors_permissive || config.server.cors_permissive,
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &MedtrackConfig) -> Result<()> {
    let store: Arc<dyn Store> = if args.memory {
        tracing::warn!("Using the in-memory store - data will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let store = args.database.connect(config).await?;
        if args.no_migrate {
            tracing::info!("Skipping migrations (--no-migrate)");
        } else {
            migrations::run(store.pool())
                .await
                .context("Failed to run migrations")?;
        }
        Arc::new(store)
    };

    let server_config = args.server_config(config);
    let statistics = statistics_settings(config)?;

    // Blocks until shutdown
    run_server(store, statistics, server_config)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServeArgs {
        ServeArgs::try_parse_from(std::iter::once("serve").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_config() {
        let mut config = MedtrackConfig::default();
        config.server.request_timeout_secs = 5;

        let server = parse(&["--bind", "0.0.0.0:9100", "--cors-permissive"]).server_config(&config);
        assert_eq!(server.bind_addr.port(), 9100);
        assert!(server.cors_permissive);
        assert_eq!(server.request_timeout, Duration::from_secs(5));

        let server = parse(&[]).server_config(&config);
        assert_eq!(server.bind_addr, config.server.bind);
        assert!(!server.cors_permissive);
    }

    #[test]
    fn memory_flag_parses() {
        let args = parse(&["--memory", "--no-migrate"]);
        assert!(args.memory);
        assert!(args.no_migrate);
    }
}
