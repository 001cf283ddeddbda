//! Leaderboard storage interface and in-memory implementation

use crate::error::{GameError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Win counter for one display identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub identifier: String,
    pub wins: u64,
    pub last_win: DateTime<Utc>,
}

/// Trait for leaderboard storage operations
pub trait LeaderboardStorage: Send + Sync {
    /// Add one win for `identifier`, returning the new total
    fn record_win(&self, identifier: &str) -> Result<u64>;

    /// Wins recorded for `identifier`, zero when unknown
    fn wins(&self, identifier: &str) -> Result<u64>;

    /// All entries, most wins first, ties broken by identifier
    fn standings(&self) -> Result<Vec<LeaderboardEntry>>;

    /// Number of identifiers with at least one win
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory leaderboard
#[derive(Debug)]
pub struct InMemoryLeaderboard {
    entries: RwLock<HashMap<String, LeaderboardEntry>>,
    max_entries: usize,
}

impl InMemoryLeaderboard {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    /// Drop the entries with the oldest last win once over capacity
    fn evict_if_needed(entries: &mut HashMap<String, LeaderboardEntry>, max_entries: usize) {
        if entries.len() <= max_entries {
            return;
        }

        let mut by_age: Vec<_> = entries
            .values()
            .map(|entry| (entry.last_win, entry.identifier.clone()))
            .collect();
        by_age.sort();

        let to_remove = entries.len() - max_entries;
        for (_, identifier) in by_age.into_iter().take(to_remove) {
            entries.remove(&identifier);
        }
    }
}

impl Default for InMemoryLeaderboard {
    fn default() -> Self {
        Self::new(10000)
    }
}

impl LeaderboardStorage for InMemoryLeaderboard {
    fn record_win(&self, identifier: &str) -> Result<u64> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| GameError::lock_poisoned("leaderboard write"))?;

        let now = Utc::now();
        let entry = entries
            .entry(identifier.to_string())
            .or_insert_with(|| LeaderboardEntry {
                identifier: identifier.to_string(),
                wins: 0,
                last_win: now,
            });
        entry.wins += 1;
        entry.last_win = now;
        let wins = entry.wins;

        Self::evict_if_needed(&mut entries, self.max_entries);
        Ok(wins)
    }

    fn wins(&self, identifier: &str) -> Result<u64> {
        let entries = self
            .entries
            .read()
            .map_err(|_| GameError::lock_poisoned("leaderboard read"))?;

        Ok(entries.get(identifier).map_or(0, |entry| entry.wins))
    }

    fn standings(&self) -> Result<Vec<LeaderboardEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| GameError::lock_poisoned("leaderboard read"))?;

        let mut standings: Vec<_> = entries.values().cloned().collect();
        standings.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(standings)
    }

    fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| GameError::lock_poisoned("leaderboard read"))?;

        Ok(entries.len())
    }
}
