//! Participant profile lookup
//!
//! The chat platform owns usernames and first names. The leaderboard only
//! needs them to build a display identifier, so the lookup sits behind a trait.

use crate::error::{GameError, Result};
use crate::types::ParticipantId;
use crate::utils::display_identifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Public profile fields of a participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl ParticipantProfile {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            first_name: None,
        }
    }

    pub fn with_first_name(first_name: impl Into<String>) -> Self {
        Self {
            username: None,
            first_name: Some(first_name.into()),
        }
    }

    /// Leaderboard identifier for this profile
    pub fn display_identifier(&self, participant_id: ParticipantId) -> String {
        display_identifier(
            participant_id,
            self.username.as_deref(),
            self.first_name.as_deref(),
        )
    }
}

/// Trait for resolving participant profiles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Fetch the profile of a participant
    async fn lookup(&self, participant_id: ParticipantId) -> Result<ParticipantProfile>;
}

/// Directory backed by a map, filled by the transport as participants show up
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: RwLock<HashMap<ParticipantId, ParticipantProfile>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile
    pub fn upsert(&self, participant_id: ParticipantId, profile: ParticipantProfile) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| GameError::lock_poisoned("directory write"))?;
        profiles.insert(participant_id, profile);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.profiles.read().map(|p| p.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryDirectory {
    async fn lookup(&self, participant_id: ParticipantId) -> Result<ParticipantProfile> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| GameError::lock_poisoned("directory read"))?;

        let profile = profiles
            .get(&participant_id)
            .cloned()
            .ok_or_else(|| GameError::OpponentLookupFailure {
                participant_id,
                message: "participant not known to directory".to_string(),
            })?;
        Ok(profile)
    }
}
