//! Arena coordination
//!
//! The arena is the single entry point the transport layer talks to: match
//! requests, moves, surrenders, exits and board lookups all pass through the
//! `ArenaManager`, which keeps the queue and registry consistent.

pub mod manager;
pub mod outcome;

// Re-export commonly used types
pub use manager::{ArenaManager, DEFAULT_BOARD_SIZES};
pub use outcome::{
    ArenaStats, ExitOutcome, MatchOutcome, MoveOutcome, MoveReport, Resolution, SessionView,
    SurrenderOutcome,
};
