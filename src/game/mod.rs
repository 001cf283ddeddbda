//! Game sessions and the bot opponent
//!
//! This module contains the per-match state machine, the one-ply bot
//! heuristic, and the seedable random source used for its tie-breaking.

pub mod bot;
pub mod rng;
pub mod session;

// Re-export commonly used types
pub use rng::SessionRng;
pub use session::{GameSession, SessionState};
