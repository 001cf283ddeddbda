//! Configuration management for the tictac-room service
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for the game service.

pub mod app;

// Re-export commonly used types
pub use app::{parse_board_sizes, validate_config, AppConfig, GameSettings, ServiceSettings};
