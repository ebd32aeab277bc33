//! Main application configuration
//!
//! This module defines the primary configuration structures for the rating
//! pipeline, including TOML file loading, environment variable overrides and
//! validation.

use crate::config::rating::{KFactorSettings, RatingConfig};
use crate::report::ReportFormat;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub source: SourceSettings,
    pub rating: RatingConfig,
    pub report: ReportSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where game records come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Archive URL prefix; the game id is appended
    pub base_url: String,
    /// Read `{id}.pgn` files from this directory instead of the archive
    pub directory: Option<PathBuf>,
    /// Id of the first game to fetch
    pub first_game_id: u64,
    /// Upper bound on the number of records fetched in one run
    pub max_games: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Retries for transient fetch failures before giving up
    pub max_retry_attempts: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

/// Output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub format: ReportFormat,
    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,
    /// Write Prometheus text exposition here after the run
    pub metrics_output: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "bughouse-elo".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://bughouse.pro/dyn/pgn/".to_string(),
            directory: None,
            first_game_id: 1,
            max_games: 5000,
            request_timeout_seconds: 30,
            max_retry_attempts: 2,
            retry_delay_ms: 500,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Source settings
        if let Ok(url) = env::var("SOURCE_BASE_URL") {
            self.source.base_url = url;
        }
        if let Ok(dir) = env::var("SOURCE_DIRECTORY") {
            self.source.directory = Some(PathBuf::from(dir));
        }
        if let Ok(first) = env::var("FIRST_GAME_ID") {
            self.source.first_game_id = first
                .parse()
                .map_err(|_| anyhow!("Invalid FIRST_GAME_ID value: {}", first))?;
        }
        if let Ok(max_games) = env::var("MAX_GAMES") {
            self.source.max_games = max_games
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_GAMES value: {}", max_games))?;
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECONDS") {
            self.source.request_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid REQUEST_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(retries) = env::var("MAX_RETRY_ATTEMPTS") {
            self.source.max_retry_attempts = retries
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_RETRY_ATTEMPTS value: {}", retries))?;
        }
        if let Ok(delay) = env::var("RETRY_DELAY_MS") {
            self.source.retry_delay_ms = delay
                .parse()
                .map_err(|_| anyhow!("Invalid RETRY_DELAY_MS value: {}", delay))?;
        }

        // Rating settings
        if let Ok(start) = env::var("START_RATING") {
            self.rating.start_rating = start
                .parse()
                .map_err(|_| anyhow!("Invalid START_RATING value: {}", start))?;
        }
        if let Ok(base) = env::var("MATCH_ID_BASE") {
            self.rating.match_id_base = base
                .parse()
                .map_err(|_| anyhow!("Invalid MATCH_ID_BASE value: {}", base))?;
        }
        if let Ok(raw_k) = env::var("K_FACTOR") {
            let k: f64 = raw_k
                .parse()
                .map_err(|_| anyhow!("Invalid K_FACTOR value: {}", raw_k))?;
            self.rating.k_factor = KFactorSettings::Constant { k };
        }

        // Report settings
        if let Ok(format) = env::var("REPORT_FORMAT") {
            self.report.format = format.parse()?;
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate source settings
    if config.source.directory.is_none() && config.source.base_url.is_empty() {
        return Err(anyhow!("Source base URL cannot be empty"));
    }
    if config.source.max_games == 0 {
        return Err(anyhow!("Max games must be greater than 0"));
    }
    if config.source.request_timeout_seconds == 0 {
        return Err(anyhow!("Request timeout must be greater than 0"));
    }

    config.rating.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.source.first_game_id, 1);
        assert_eq!(config.source.max_games, 5000);
        assert_eq!(config.rating.start_rating, 1600.0);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.source.max_games = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.source.base_url.clear();
        assert!(validate_config(&config).is_err());

        // A directory source does not need a URL
        config.source.directory = Some(PathBuf::from("games"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [source]
            max_games = 25

            [report]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.max_games, 25);
        assert_eq!(config.source.first_game_id, 1);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.service.log_level, "info");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_request_timeout() {
        let config = AppConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
