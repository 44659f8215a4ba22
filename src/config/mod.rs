//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Ranking and retention limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Max rows any ranking returns.
    #[serde(default = "default_max_list_len")]
    pub max_list_len: usize,

    /// Page size for the per-level hero listing.
    #[serde(default = "default_level_page_size")]
    pub level_page_size: usize,

    /// Trailing window for the best-gain rankings, in days.
    #[serde(default = "default_best_window_days")]
    pub best_window_days: i64,

    /// Consecutive snapshots further apart than this don't form a
    /// comparison pair in the best-gain walk.
    #[serde(default = "default_max_gap_hours")]
    pub max_gap_hours: f64,

    /// How many snapshots `prune` keeps.
    #[serde(default = "default_keep_snapshots")]
    pub keep_snapshots: usize,
}

fn default_max_list_len() -> usize {
    1000
}

fn default_level_page_size() -> usize {
    100
}

fn default_best_window_days() -> i64 {
    30
}

fn default_max_gap_hours() -> f64 {
    26.0
}

fn default_keep_snapshots() -> usize {
    40
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_list_len: default_max_list_len(),
            level_page_size: default_level_page_size(),
            best_window_days: default_best_window_days(),
            max_gap_hours: default_max_gap_hours(),
            keep_snapshots: default_keep_snapshots(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            limits: LimitsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_list_len == 0 {
            return Err(ConfigError::ValidationError(
                "max_list_len must be greater than 0".to_string(),
            ));
        }

        if self.limits.level_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "level_page_size must be greater than 0".to_string(),
            ));
        }

        if self.limits.best_window_days <= 0 {
            return Err(ConfigError::ValidationError(
                "best_window_days must be greater than 0".to_string(),
            ));
        }

        if self.limits.max_gap_hours <= 0.0 {
            return Err(ConfigError::ValidationError(
                "max_gap_hours must be greater than 0".to_string(),
            ));
        }

        if self.limits.keep_snapshots < 2 {
            return Err(ConfigError::ValidationError(
                "keep_snapshots must be at least 2".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.limits.max_list_len, 1000);
        assert_eq!(config.limits.best_window_days, 30);
        assert_eq!(config.limits.max_gap_hours, 26.0);
        assert_eq!(config.limits.keep_snapshots, 40);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_window() {
        let mut config = AppConfig::default();
        config.limits.best_window_days = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_retention() {
        let mut config = AppConfig::default();
        config.limits.keep_snapshots = 1;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            data_dir = "/var/lib/ratings"

            [limits]
            max_list_len = 250
            "#,
        )
        .unwrap();

        assert_eq!(parsed.data_dir, PathBuf::from("/var/lib/ratings"));
        assert_eq!(parsed.limits.max_list_len, 250);
        assert_eq!(parsed.limits.max_gap_hours, 26.0);
        assert_eq!(parsed.server.host, "127.0.0.1");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
    }
}
