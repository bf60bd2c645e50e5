//! Configuration for the medtrack server
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults
//! 2. `~/.medtrack/config.toml` (or an explicit `--config` path)
//! 3. environment: `DATABASE_URL`, `MEDTRACK_BIND`, `MEDTRACK_TIMEZONE`
//! 4. CLI flags (applied by the binary)

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path} (invalid TOML): {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedtrackConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub statistics: StatisticsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// Allow any CORS origin instead of localhost only
    pub cors_permissive: bool,
    pub request_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSection {
    /// IANA timezone that defines "today"
    pub timezone: String,
    pub due_soon_days: u32,
    pub recent_activity_limit: u32,
}

impl Default for StatisticsSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            due_soon_days: 30,
            recent_activity_limit: 5,
        }
    }
}

impl StatisticsSection {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "statistics.timezone",
                value: self.timezone.clone(),
            })
    }
}

impl MedtrackConfig {
    /// Default config file path: ~/.medtrack/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".medtrack")
            .join("config.toml")
    }

    /// Load config from `path`, or from the default path if it exists.
    ///
    /// An explicit path must exist; the default one is optional.
    /// Environment overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    tracing::debug!(path = %default.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a key lookup (the process environment in practice).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(url);
        }

        if let Some(bind) = lookup("MEDTRACK_BIND").filter(|v| !v.is_empty()) {
            self.server.bind = bind.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MEDTRACK_BIND",
                value: bind.clone(),
            })?;
        }

        if let Some(tz) = lookup("MEDTRACK_TIMEZONE").filter(|v| !v.is_empty()) {
            self.statistics.timezone = tz;
        }

        Ok(())
    }

    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.statistics.tz()?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "database.max_connections",
                value: "0".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = MedtrackConfig::default();
        assert_eq!(config.server.bind.port(), 8000);
        assert!(!config.server.cors_permissive);
        assert_eq!(config.statistics.due_soon_days, 30);
        assert_eq!(config.statistics.recent_activity_limit, 5);
        assert_eq!(config.statistics.tz().unwrap(), chrono_tz::UTC);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [database]
            url = "postgres://localhost/medtrack_test"

            [statistics]
            timezone = "America/Bogota"
            "#
        )
        .unwrap();

        let config = MedtrackConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/medtrack_test")
        );
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.statistics.due_soon_days, 30);
        assert_eq!(config.statistics.tz().unwrap(), chrono_tz::America::Bogota);
    }

    #[test]
    fn explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = MedtrackConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind = ").unwrap();
        let err = MedtrackConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_take_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://db/override"),
            ("MEDTRACK_BIND", "0.0.0.0:9000"),
            ("MEDTRACK_TIMEZONE", "Europe/Madrid"),
        ]);
        let mut config = MedtrackConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database.url.as_deref(), Some("postgres://db/override"));
        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.statistics.timezone, "Europe/Madrid");
    }

    #[test]
    fn bad_bind_override() {
        let mut config = MedtrackConfig::default();
        let err = config
            .apply_overrides(|key| (key == "MEDTRACK_BIND").then(|| "not-an-addr".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "MEDTRACK_BIND",
                ..
            }
        ));
    }

    #[test]
    fn unknown_timezone_fails_validation() {
        let mut config = MedtrackConfig::default();
        config.statistics.timezone = "Mars/Olympus".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn serializes_back_to_toml() {
        let text = toml::to_string(&MedtrackConfig::default()).unwrap();
        let parsed: MedtrackConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, MedtrackConfig::default());
    }
}
