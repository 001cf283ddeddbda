//! Leaderboard of human wins
//!
//! Wins are counted per display identifier. Looking up the identifier can
//! fail; that only costs the winner a point and never affects the game.

pub mod directory;
pub mod storage;

pub use directory::{InMemoryDirectory, ParticipantDirectory, ParticipantProfile};
pub use storage::{InMemoryLeaderboard, LeaderboardEntry, LeaderboardStorage};

use crate::error::GameError;
use crate::types::ParticipantId;
use tracing::{info, warn};

/// Credit a win to a participant, returning their new total
///
/// Returns `None` when the profile lookup or the storage update failed.
pub async fn credit_win(
    directory: &dyn ParticipantDirectory,
    storage: &dyn LeaderboardStorage,
    participant_id: ParticipantId,
) -> Option<u64> {
    let profile = match directory.lookup(participant_id).await {
        Ok(profile) => profile,
        Err(e) => {
            let failure = match e.downcast::<GameError>() {
                Ok(failure @ GameError::OpponentLookupFailure { .. }) => failure,
                Ok(other) => GameError::OpponentLookupFailure {
                    participant_id,
                    message: other.to_string(),
                },
                Err(other) => GameError::OpponentLookupFailure {
                    participant_id,
                    message: other.to_string(),
                },
            };
            warn!("Skipping leaderboard update: {}", failure);
            return None;
        }
    };

    let identifier = profile.display_identifier(participant_id);
    match storage.record_win(&identifier) {
        Ok(wins) => {
            info!("Leaderboard: {} now has {} wins", identifier, wins);
            Some(wins)
        }
        Err(e) => {
            warn!("Failed to record win for {}: {}", identifier, e);
            None
        }
    }
}

/// Take the top `limit` standings, or everything when `limit` is zero
pub fn top_standings(
    storage: &dyn LeaderboardStorage,
    limit: usize,
) -> crate::error::Result<Vec<LeaderboardEntry>> {
    let mut standings = storage.standings()?;
    if limit > 0 {
        standings.truncate(limit);
    }
    Ok(standings)
}
