//! Show the effective configuration

use anyhow::{Context, Result};
use medtrack_core::MedtrackConfig;

/// Print the merged configuration (file + environment) as TOML.
pub fn run_config(config: &MedtrackConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    print!("{}", text);
    Ok(())
}
