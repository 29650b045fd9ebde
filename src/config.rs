use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::limits;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub search: SearchConfig,

    pub absence: AbsenceConfig,

    pub scheduler: SchedulerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/davarr.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Base URL of the groupware web frontend that search results deep-link
    /// into, without a trailing slash.
    pub web_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6878,
            cors_allowed_origins: vec![
                "http://localhost:6878".to_string(),
                "http://127.0.0.1:6878".to_string(),
            ],
            web_base_url: "http://localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// App ids that are enabled instance-wide. A provider whose app is not
    /// listed here returns empty results for every user.
    pub enabled_apps: Vec<String>,

    /// Page size used when a query does not specify a limit.
    pub default_limit: u64,

    /// Upper bound on the page size a caller may request.
    pub max_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled_apps: vec![
                crate::constants::apps::CONTACTS.to_string(),
                crate::constants::apps::CALENDAR.to_string(),
                crate::constants::apps::TASKS.to_string(),
            ],
            default_limit: limits::DEFAULT_SEARCH_LIMIT,
            max_limit: limits::MAX_SEARCH_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsenceConfig {
    /// IANA timezone used for users without a timezone setting.
    pub default_timezone: String,
}

impl Default for AbsenceConfig {
    fn default() -> Self {
        Self {
            default_timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    /// How often the job runner drains due one-shot jobs.
    pub tick_seconds: u32,

    /// Optional cron expression overriding the fixed tick interval.
    pub cron_expression: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_seconds: 60,
            cron_expression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "davarr".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_config_path();
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("davarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".davarr").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.scheduler.enabled
            && self.scheduler.tick_seconds == 0
            && self.scheduler.cron_expression.is_none()
        {
            anyhow::bail!("Scheduler tick must be > 0 or cron expression must be set");
        }

        if self.search.default_limit == 0 || self.search.default_limit > self.search.max_limit {
            anyhow::bail!(
                "search.default_limit must be between 1 and search.max_limit ({})",
                self.search.max_limit
            );
        }

        if self
            .absence
            .default_timezone
            .parse::<chrono_tz::Tz>()
            .is_err()
        {
            anyhow::bail!(
                "absence.default_timezone is not a valid IANA timezone: {}",
                self.absence.default_timezone
            );
        }

        Ok(())
    }

    /// Whether an app id is enabled instance-wide.
    #[must_use]
    pub fn app_enabled(&self, app_id: &str) -> bool {
        self.search.enabled_apps.iter().any(|a| a == app_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scheduler.tick_seconds, 60);
        assert_eq!(config.search.default_limit, 5);
        assert_eq!(config.absence.default_timezone, "UTC");
        assert!(config.app_enabled("calendar"));
        assert!(!config.app_enabled("mail"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[scheduler]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [search]
            enabled_apps = ["calendar"]

            [absence]
            default_timezone = "Europe/Vienna"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(config.app_enabled("calendar"));
        assert!(!config.app_enabled("contacts"));
        assert_eq!(config.absence.default_timezone, "Europe/Vienna");

        assert_eq!(config.server.port, 6878);
    }

    #[test]
    fn test_validate_rejects_bad_timezone() {
        let mut config = Config::default();
        config.absence.default_timezone = "Not/AZone".to_string();
        assert!(config.validate().is_err());
    }
}
