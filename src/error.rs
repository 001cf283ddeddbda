//! Error types for the game service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Rejected moves are not errors: they come back as
//! `MoveOutcome::Rejected` from the arena.

use crate::types::ParticipantId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific game scenarios
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid move: {reason}")]
    InvalidMove { reason: String },

    #[error("No active session or queue entry for participant {participant_id}")]
    NoActiveSession { participant_id: ParticipantId },

    #[error("Participant lookup failed for {participant_id}: {message}")]
    OpponentLookupFailure {
        participant_id: ParticipantId,
        message: String,
    },

    #[error("Participant {participant_id} already has an active session")]
    AlreadyInSession { participant_id: ParticipantId },

    #[error("Unsupported board size: {size}")]
    InvalidBoardSize { size: usize },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl GameError {
    /// Build the error used when a lock guarding shared state is poisoned
    pub(crate) fn lock_poisoned(what: &str) -> Self {
        GameError::InternalError {
            message: format!("Failed to acquire {} lock", what),
        }
    }
}

/// Check whether an `anyhow` error is the `NoActiveSession` case
pub fn is_no_active_session(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<GameError>(),
        Some(GameError::NoActiveSession { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_active_session_detection() {
        let err: anyhow::Error = GameError::NoActiveSession { participant_id: 7 }.into();
        assert!(is_no_active_session(&err));

        let other: anyhow::Error = GameError::InvalidBoardSize { size: 5 }.into();
        assert!(!is_no_active_session(&other));
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::OpponentLookupFailure {
            participant_id: 42,
            message: "chat not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Participant lookup failed for 42: chat not found"
        );
    }
}
