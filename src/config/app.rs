//! Main application configuration
//!
//! This module defines the configuration structures for the tictac-room game
//! service, including environment variable loading and validation.

use crate::arena::DEFAULT_BOARD_SIZES;
use crate::error::GameError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub game: GameSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for health check endpoint
    pub health_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// Serve the health and metrics endpoints
    pub enable_health_server: bool,
}

/// Game rules and leaderboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Board edge lengths participants may choose
    pub board_sizes: Vec<usize>,
    /// Fixed seed for bot decisions, random when unset
    pub bot_seed: Option<u64>,
    /// Leaderboard capacity
    pub leaderboard_max_entries: usize,
    /// Standings shown by the leaderboard command, 0 shows all
    pub leaderboard_limit: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "tictac-room".to_string(),
            log_level: "info".to_string(),
            health_port: 8080,
            shutdown_timeout_seconds: 30,
            enable_health_server: true,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_sizes: DEFAULT_BOARD_SIZES.to_vec(),
            bot_seed: None,
            leaderboard_max_entries: 10_000,
            leaderboard_limit: 10,
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
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HEALTH_PORT") {
            self.service.health_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HEALTH_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(enabled) = env::var("ENABLE_HEALTH_SERVER") {
            self.service.enable_health_server = enabled
                .parse()
                .map_err(|_| anyhow!("Invalid ENABLE_HEALTH_SERVER value: {}", enabled))?;
        }

        // Game settings
        if let Ok(sizes) = env::var("BOARD_SIZES") {
            self.game.board_sizes = parse_board_sizes(&sizes)?;
        }
        if let Ok(seed) = env::var("BOT_SEED") {
            self.game.bot_seed = Some(
                seed.parse()
                    .map_err(|_| anyhow!("Invalid BOT_SEED value: {}", seed))?,
            );
        }
        if let Ok(max_entries) = env::var("LEADERBOARD_MAX_ENTRIES") {
            self.game.leaderboard_max_entries = max_entries
                .parse()
                .map_err(|_| anyhow!("Invalid LEADERBOARD_MAX_ENTRIES value: {}", max_entries))?;
        }

        if let Ok(limit) = env::var("LEADERBOARD_LIMIT") {
            self.game.leaderboard_limit = limit
                .parse()
                .map_err(|_| anyhow!("Invalid LEADERBOARD_LIMIT value: {}", limit))?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

/// Parse a comma separated list such as `3,4`
pub fn parse_board_sizes(value: &str) -> Result<Vec<usize>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse()
                .map_err(|_| anyhow!("Invalid BOARD_SIZES entry: {}", part))
        })
        .collect()
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let invalid = |message: String| -> anyhow::Error {
        GameError::ConfigurationError { message }.into()
    };

    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => {
            return Err(invalid(format!(
                "Invalid log level: {}",
                config.service.log_level
            )))
        }
    }

    if config.service.name.is_empty() {
        return Err(invalid("Service name cannot be empty".to_string()));
    }
    if config.service.health_port == 0 {
        return Err(invalid("Health port cannot be 0".to_string()));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(invalid(
            "Shutdown timeout must be greater than 0".to_string(),
        ));
    }

    // Validate game settings
    if config.game.board_sizes.is_empty() {
        return Err(invalid("At least one board size is required".to_string()));
    }
    if let Some(size) = config
        .game
        .board_sizes
        .iter()
        .find(|size| !DEFAULT_BOARD_SIZES.contains(size))
    {
        return Err(invalid(format!(
            "Unsupported board size {} (supported: 3, 4)",
            size
        )));
    }
    if config.game.leaderboard_max_entries == 0 {
        return Err(invalid(
            "Leaderboard capacity must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
