//! Main application configuration
//!
//! This module defines the primary configuration structures for the duel-room
//! coordinator, including environment variable loading and validation.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub network: NetworkSettings,
    pub game: GameSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// Interval between periodic stats reports in seconds
    pub stats_interval_seconds: u64,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Address the coordinator listens on
    pub host: String,
    /// Port the coordinator listens on
    pub port: u16,
}

/// Match-play settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    /// Round wins required to take a match (2 = best-of-3)
    pub rounds_to_win: u8,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "duel-room".to_string(),
            log_level: "info".to_string(),
            shutdown_timeout_seconds: 30,
            stats_interval_seconds: 30,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self { rounds_to_win: 2 }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(interval) = env::var("STATS_INTERVAL_SECONDS") {
            config.service.stats_interval_seconds = interval
                .parse()
                .map_err(|_| anyhow!("Invalid STATS_INTERVAL_SECONDS value: {}", interval))?;
        }

        // Network settings
        if let Ok(host) = env::var("LISTEN_HOST") {
            config.network.host = host;
        }
        if let Ok(port) = env::var("LISTEN_PORT") {
            config.network.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid LISTEN_PORT value: {}", port))?;
        }

        // Game settings
        if let Ok(rounds) = env::var("ROUNDS_TO_WIN") {
            config.game.rounds_to_win = rounds
                .parse()
                .map_err(|_| anyhow!("Invalid ROUNDS_TO_WIN value: {}", rounds))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get stats reporting interval as Duration
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.service.stats_interval_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate listener settings
    if config.network.host.is_empty() {
        return Err(anyhow!("Listen host cannot be empty"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.service.stats_interval_seconds == 0 {
        return Err(anyhow!("Stats interval must be greater than 0"));
    }

    // Validate game settings
    if config.game.rounds_to_win == 0 {
        return Err(anyhow!("Rounds to win must be greater than 0"));
    }

    Ok(())
}
