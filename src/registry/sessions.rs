//! Session registry implementation

use crate::game::{GameSession, SessionRng};
use crate::types::{GameMode, ParticipantId, SessionId, Symbol, UiHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Session handle shared by both participants of a match
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Registry record for one participant
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub session: SharedSession,
    pub session_id: SessionId,
    pub mode: GameMode,
    /// Symbol this participant plays
    pub symbol: Symbol,
    /// Human opponent, `None` against the bot
    pub opponent: Option<ParticipantId>,
    /// Last rendered board message, owned by the transport layer
    pub ui_handle: Option<UiHandle>,
}

/// Entries removed by a teardown
#[derive(Debug, Clone)]
pub struct Teardown {
    pub participant: SessionEntry,
    /// Opponent id when their entry was removed too
    pub opponent: Option<ParticipantId>,
}

/// Map from participant to active session
#[derive(Debug, Default)]
pub struct SessionRegistry {
    entries: HashMap<ParticipantId, SessionEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bot match for a single participant
    pub fn create_bot_session(
        &mut self,
        participant_id: ParticipantId,
        symbol: Symbol,
        size: usize,
        rng: SessionRng,
    ) -> SharedSession {
        let session = GameSession::against_bot(size, symbol, rng);
        let session_id = session.id();
        info!(
            "Created bot session {} for participant {} (size {}, plays {}, seed {})",
            session_id,
            participant_id,
            size,
            symbol,
            session.rng_seed()
        );

        let shared = Arc::new(Mutex::new(session));
        self.entries.insert(
            participant_id,
            SessionEntry {
                session: shared.clone(),
                session_id,
                mode: GameMode::PlayerVsBot,
                symbol,
                opponent: None,
                ui_handle: None,
            },
        );
        shared
    }

    /// Register a match between two participants; `first` plays the starting symbol
    pub fn create_pvp_session(
        &mut self,
        first: ParticipantId,
        second: ParticipantId,
        size: usize,
        rng: SessionRng,
    ) -> SharedSession {
        let session = GameSession::between_players(size, rng);
        let session_id = session.id();
        info!(
            "Created pvp session {} between {} ({}) and {} ({}) on size {}",
            session_id,
            first,
            Symbol::STARTING,
            second,
            Symbol::STARTING.opponent(),
            size
        );

        let shared = Arc::new(Mutex::new(session));
        for (participant, opponent, symbol) in [
            (first, second, Symbol::STARTING),
            (second, first, Symbol::STARTING.opponent()),
        ] {
            self.entries.insert(
                participant,
                SessionEntry {
                    session: shared.clone(),
                    session_id,
                    mode: GameMode::PlayerVsPlayer,
                    symbol,
                    opponent: Some(opponent),
                    ui_handle: None,
                },
            );
        }
        shared
    }

    pub fn get_session(&self, participant_id: ParticipantId) -> Option<&SessionEntry> {
        self.entries.get(&participant_id)
    }

    pub fn contains(&self, participant_id: ParticipantId) -> bool {
        self.entries.contains_key(&participant_id)
    }

    /// Store the transport's message reference; false when the participant has no entry
    pub fn set_ui_handle(&mut self, participant_id: ParticipantId, handle: UiHandle) -> bool {
        match self.entries.get_mut(&participant_id) {
            Some(entry) => {
                entry.ui_handle = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Remove a participant and, when paired, the opponent's entry for the same session
    pub fn teardown(&mut self, participant_id: ParticipantId) -> Option<Teardown> {
        let entry = self.entries.remove(&participant_id)?;

        let opponent = match entry.opponent {
            Some(opponent_id)
                if self
                    .entries
                    .get(&opponent_id)
                    .is_some_and(|other| Arc::ptr_eq(&other.session, &entry.session)) =>
            {
                self.entries.remove(&opponent_id);
                Some(opponent_id)
            }
            _ => None,
        };

        debug!(
            "Tore down session {} for participant {} (opponent removed: {:?})",
            entry.session_id, participant_id, opponent
        );

        Some(Teardown {
            participant: entry,
            opponent,
        })
    }

    /// Number of registered participants
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct live sessions
    pub fn active_sessions(&self) -> usize {
        let mut ids: Vec<SessionId> = self.entries.values().map(|e| e.session_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}
