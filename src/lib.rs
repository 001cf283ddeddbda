//! tictac-room - Tic-tac-toe game service
//!
//! This crate provides tic-tac-toe sessions on 3x3 and 4x4 boards against a
//! seeded bot or a queued human opponent, with a win leaderboard, a console
//! transport and Prometheus metrics.

pub mod arena;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod matchmaking;
pub mod metrics;
pub mod registry;
pub mod service;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{GameError, Result};
pub use types::*;

// Re-export key components
pub use arena::{ArenaManager, MatchOutcome, MoveOutcome};
pub use board::Board;
pub use game::GameSession;
pub use transport::{GameService, Notice, Notifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
