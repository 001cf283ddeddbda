//! Participant to session mapping
//!
//! The registry links each participant in a match to the session they play
//! in. Both sides of a player-vs-player match reference the same session.

pub mod sessions;

pub use sessions::{SessionEntry, SessionRegistry, SharedSession, Teardown};
