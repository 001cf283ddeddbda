//! Arena manager implementation
//!
//! This module provides the ArenaManager that ties the matchmaking queue,
//! the session registry and the individual game sessions together behind the
//! operations the transport layer calls.

use crate::arena::outcome::{
    ArenaStats, ExitOutcome, MatchOutcome, MoveOutcome, MoveReport, Resolution, SessionView,
    SurrenderOutcome,
};
use crate::board::Board;
use crate::error::{GameError, Result};
use crate::game::{GameSession, SessionRng, SessionState};
use crate::matchmaking::PlayerQueue;
use crate::metrics::collector::{MoveActor, SessionEndReason};
use crate::metrics::MetricsCollector;
use crate::registry::{SessionEntry, SessionRegistry, SharedSession, Teardown};
use crate::types::{OpponentPreference, ParticipantId, RejectReason, Symbol, UiHandle};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Board sizes offered when nothing else is configured
pub const DEFAULT_BOARD_SIZES: [usize; 2] = [3, 4];

/// Coordinates queues, registry and sessions for all participants
///
/// Locks are always taken in the order queue, registry, session.
#[derive(Clone)]
pub struct ArenaManager {
    /// Participants waiting for a human opponent
    queue: Arc<Mutex<PlayerQueue>>,
    /// Participant to session mapping
    registry: Arc<RwLock<SessionRegistry>>,
    /// Hands out one seed per new session
    seed_source: Arc<Mutex<SessionRng>>,
    /// Board sizes a participant may ask for
    allowed_sizes: Vec<usize>,
    /// Manager statistics
    stats: Arc<RwLock<ArenaStats>>,
    /// Metrics collector for recording game activity
    metrics_collector: Arc<MetricsCollector>,
}

impl ArenaManager {
    /// Create a new arena manager with its own metrics collector
    pub fn new(allowed_sizes: Vec<usize>, seed: Option<u64>) -> Self {
        let metrics_collector = Arc::new(MetricsCollector::new().unwrap_or_else(|_| {
            warn!("Failed to create metrics collector, using default");
            MetricsCollector::default()
        }));

        Self::with_metrics(allowed_sizes, seed, metrics_collector)
    }

    /// Create a new arena manager reporting into `metrics_collector`
    ///
    /// A fixed `seed` makes every bot decision reproducible across runs.
    pub fn with_metrics(
        allowed_sizes: Vec<usize>,
        seed: Option<u64>,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        let seed_source = match seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_random(),
        };
        info!(
            "Arena ready for board sizes {:?} (seed source {})",
            allowed_sizes,
            seed_source.seed()
        );

        Self {
            queue: Arc::new(Mutex::new(PlayerQueue::new())),
            registry: Arc::new(RwLock::new(SessionRegistry::new())),
            seed_source: Arc::new(Mutex::new(seed_source)),
            allowed_sizes,
            stats: Arc::new(RwLock::new(ArenaStats::default())),
            metrics_collector,
        }
    }

    pub fn allowed_sizes(&self) -> &[usize] {
        &self.allowed_sizes
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    /// Start a bot game, or queue for a human opponent and pair if one is waiting
    pub fn request_match(
        &self,
        participant_id: ParticipantId,
        size: usize,
        preference: OpponentPreference,
    ) -> Result<MatchOutcome> {
        let timer = self.metrics_collector.start_timer();

        if !self.allowed_sizes.contains(&size) {
            return Err(GameError::InvalidBoardSize { size }.into());
        }

        let rng = self.next_session_rng()?;

        let (outcome, active_sessions) = {
            let mut queue = self.lock_queue()?;
            let mut registry = self.write_registry()?;

            if registry.contains(participant_id) {
                return Err(GameError::AlreadyInSession { participant_id }.into());
            }

            let outcome = match preference {
                OpponentPreference::Bot { symbol } => {
                    if let Some(previous) = queue.remove_everywhere(participant_id) {
                        debug!(
                            "Participant {} left the size {} queue for a bot game",
                            participant_id, previous
                        );
                        self.metrics_collector
                            .update_players_waiting(previous, queue.waiting(previous));
                    }
                    self.start_bot_session(&mut registry, participant_id, symbol, size, rng)?
                }
                OpponentPreference::Human => {
                    self.queue_or_pair(&mut queue, &mut registry, participant_id, size, rng)?
                }
            };

            (outcome, registry.active_sessions())
        };

        if !matches!(outcome, MatchOutcome::Queued { .. }) {
            self.update_stats(|stats| stats.sessions_created += 1)?;
        }
        self.metrics_collector.update_active_sessions(active_sessions);
        self.metrics_collector.record_match_request(timer.stop());

        Ok(outcome)
    }

    fn start_bot_session(
        &self,
        registry: &mut SessionRegistry,
        participant_id: ParticipantId,
        symbol: Symbol,
        size: usize,
        rng: SessionRng,
    ) -> Result<MatchOutcome> {
        let shared = registry.create_bot_session(participant_id, symbol, size, rng);
        let mut session = Self::lock_session(&shared)?;

        let bot_opening = session.bot_move();
        if let Some(position) = bot_opening {
            debug!("Bot opened session {} at {}", session.id(), position);
            self.metrics_collector.record_move(MoveActor::Bot);
            self.update_stats(|stats| stats.moves_applied += 1)?;
        }

        self.metrics_collector
            .record_session_started(session.mode(), size);
        debug!("Bot session {} ready for participant {}", session.id(), participant_id);

        Ok(MatchOutcome::BotSessionStarted {
            session_id: session.id(),
            symbol,
            bot_opening,
            board: session.board().clone(),
        })
    }

    fn queue_or_pair(
        &self,
        queue: &mut PlayerQueue,
        registry: &mut SessionRegistry,
        participant_id: ParticipantId,
        size: usize,
        rng: SessionRng,
    ) -> Result<MatchOutcome> {
        // A participant waits in one bucket at a time.
        if let Some(previous) = queue
            .queued_size(participant_id)
            .filter(|&queued| queued != size)
        {
            queue.remove(participant_id, previous);
            self.metrics_collector
                .update_players_waiting(previous, queue.waiting(previous));
            debug!(
                "Participant {} moved from size {} to size {}",
                participant_id, previous, size
            );
        }

        if queue.enqueue(participant_id, size) {
            self.metrics_collector.record_queue_join(size);
        }

        let outcome = match queue.pair_opponent(participant_id, size) {
            Some(opponent) => {
                let shared = registry.create_pvp_session(participant_id, opponent, size, rng);
                let session = Self::lock_session(&shared)?;

                info!(
                    "Paired participant {} (X) with {} (O) on size {}",
                    participant_id, opponent, size
                );
                self.metrics_collector.record_pairing(size);
                self.metrics_collector
                    .record_session_started(session.mode(), size);

                MatchOutcome::Paired {
                    session_id: session.id(),
                    opponent,
                    symbol: Symbol::STARTING,
                    board: session.board().clone(),
                }
            }
            None => {
                let position = queue.position(participant_id, size).unwrap_or_default();
                info!(
                    "Participant {} waiting for size {} at position {}",
                    participant_id, size, position
                );
                MatchOutcome::Queued { size, position }
            }
        };

        self.metrics_collector
            .update_players_waiting(size, queue.waiting(size));
        Ok(outcome)
    }

    /// Apply a participant's move and, in bot mode, the bot's answer
    pub fn submit_move(&self, participant_id: ParticipantId, position: usize) -> Result<MoveOutcome> {
        let timer = self.metrics_collector.start_timer();
        let (entry, opponent_ui_handle) = {
            let registry = self.read_registry()?;
            let entry = registry
                .get_session(participant_id)
                .cloned()
                .ok_or(GameError::NoActiveSession { participant_id })?;
            let opponent_ui_handle = entry
                .opponent
                .and_then(|opponent| registry.get_session(opponent))
                .and_then(|other| other.ui_handle);
            (entry, opponent_ui_handle)
        };

        let report = {
            let mut session = Self::lock_session(&entry.session)?;

            // A surrender or exit may have ended the match after the lookup.
            if session.is_closed() {
                debug!(
                    "Dropped move {} from participant {}: session {} already ended",
                    position,
                    participant_id,
                    session.id()
                );
                return Err(GameError::NoActiveSession { participant_id }.into());
            }

            if let Err(reason) = Self::check_turn(&session, &entry, position) {
                debug!(
                    "Rejected move {} from participant {}: {}",
                    position, participant_id, reason
                );
                self.metrics_collector.record_rejected_move(reason);
                return Ok(MoveOutcome::Rejected { reason });
            }

            session.make_move(position);
            self.metrics_collector.record_move(MoveActor::Human);
            debug!(
                "Participant {} played {} in session {}",
                participant_id,
                position,
                session.id()
            );

            let bot_reply = if session.state() == SessionState::InProgress {
                session.bot_move()
            } else {
                None
            };
            if let Some(reply) = bot_reply {
                self.metrics_collector.record_move(MoveActor::Bot);
                debug!("Bot replied {} in session {}", reply, session.id());
            }

            let resolution = match session.state() {
                SessionState::InProgress => Resolution::InProgress,
                SessionState::Won(symbol) => {
                    session.close();
                    let winner = (symbol == entry.symbol).then_some(participant_id);
                    info!(
                        "Session {} won by {} (participant: {:?})",
                        session.id(),
                        symbol,
                        winner
                    );
                    Resolution::Won { symbol, winner }
                }
                SessionState::Draw => {
                    let full_board = session.board().clone();
                    let bot_opening = session.reset_board();
                    if bot_opening.is_some() {
                        self.metrics_collector.record_move(MoveActor::Bot);
                    }
                    info!("Session {} drawn, board cleared", session.id());
                    self.metrics_collector.record_draw_reset();
                    Resolution::DrawReset {
                        full_board,
                        bot_opening,
                    }
                }
            };

            MoveReport {
                position,
                opponent: entry.opponent,
                bot_reply,
                resolution,
                board: session.board().clone(),
                ui_handle: entry.ui_handle,
                opponent_ui_handle,
            }
        };

        let won = matches!(report.resolution, Resolution::Won { .. });
        let drawn = matches!(report.resolution, Resolution::DrawReset { .. });
        let moves = 1 + u64::from(report.bot_reply.is_some())
            + u64::from(matches!(
                report.resolution,
                Resolution::DrawReset {
                    bot_opening: Some(_),
                    ..
                }
            ));
        self.update_stats(|stats| {
            stats.moves_applied += moves;
            if won {
                stats.games_won += 1;
            }
            if drawn {
                stats.draw_resets += 1;
            }
        })?;

        if won {
            let mut registry = self.write_registry()?;
            let still_linked = registry
                .get_session(participant_id)
                .is_some_and(|current| current.session_id == entry.session_id);
            if still_linked {
                registry.teardown(participant_id);
            }
            self.metrics_collector
                .record_session_ended(SessionEndReason::Won);
            self.metrics_collector
                .update_active_sessions(registry.active_sessions());
        }

        self.metrics_collector.record_move_processing(timer.stop());
        Ok(MoveOutcome::Applied(report))
    }

    fn check_turn(
        session: &GameSession,
        entry: &SessionEntry,
        position: usize,
    ) -> std::result::Result<(), RejectReason> {
        if session.state() == SessionState::InProgress && session.current_turn() != entry.symbol {
            return Err(RejectReason::NotYourTurn);
        }
        session.validate_move(position)
    }

    /// End the participant's session for both sides
    pub fn surrender(&self, participant_id: ParticipantId) -> Result<SurrenderOutcome> {
        let (torn, active_sessions) = {
            let mut registry = self.write_registry()?;
            let torn = Self::close_and_teardown(&mut registry, participant_id)?
                .ok_or(GameError::NoActiveSession { participant_id })?;
            (torn, registry.active_sessions())
        };

        info!(
            "Participant {} surrendered session {}",
            participant_id, torn.participant.session_id
        );
        self.update_stats(|stats| stats.surrenders += 1)?;
        self.metrics_collector
            .record_session_ended(SessionEndReason::Surrender);
        self.metrics_collector.update_active_sessions(active_sessions);

        Ok(SurrenderOutcome {
            opponent: torn.opponent,
        })
    }

    /// Leave the current session, or the queue when not playing
    pub fn exit_queue_or_session(&self, participant_id: ParticipantId) -> Result<ExitOutcome> {
        let mut queue = self.lock_queue()?;
        let mut registry = self.write_registry()?;

        if let Some(torn) = Self::close_and_teardown(&mut registry, participant_id)? {
            info!(
                "Participant {} left session {}",
                participant_id, torn.participant.session_id
            );
            self.update_stats(|stats| stats.exits += 1)?;
            self.metrics_collector
                .record_session_ended(SessionEndReason::Exit);
            self.metrics_collector
                .update_active_sessions(registry.active_sessions());
            return Ok(ExitOutcome::LeftSession {
                opponent: torn.opponent,
            });
        }

        match queue.remove_everywhere(participant_id) {
            Some(size) => {
                info!("Participant {} left the size {} queue", participant_id, size);
                self.metrics_collector.record_queue_exit(size);
                self.metrics_collector
                    .update_players_waiting(size, queue.waiting(size));
                Ok(ExitOutcome::LeftQueue { size })
            }
            None => Err(GameError::NoActiveSession { participant_id }.into()),
        }
    }

    /// Close the participant's session and drop both registry entries
    ///
    /// `None` when there is no entry or the session was already closed by a
    /// winning move whose teardown has not run yet.
    fn close_and_teardown(
        registry: &mut SessionRegistry,
        participant_id: ParticipantId,
    ) -> Result<Option<Teardown>> {
        let Some(shared) = registry
            .get_session(participant_id)
            .map(|entry| entry.session.clone())
        else {
            return Ok(None);
        };

        {
            let mut session = Self::lock_session(&shared)?;
            if session.is_closed() {
                return Ok(None);
            }
            session.close();
        }

        Ok(registry.teardown(participant_id))
    }

    /// Snapshot of the participant's board
    pub fn current_board(&self, participant_id: ParticipantId) -> Result<Board> {
        let entry = self.entry_for(participant_id)?;
        let session = Self::lock_session(&entry.session)?;
        Ok(session.board().clone())
    }

    /// Snapshot of everything the transport needs to render a participant's game
    pub fn session_view(&self, participant_id: ParticipantId) -> Result<SessionView> {
        let entry = self.entry_for(participant_id)?;
        let session = Self::lock_session(&entry.session)?;

        Ok(SessionView {
            session_id: entry.session_id,
            mode: entry.mode,
            symbol: entry.symbol,
            opponent: entry.opponent,
            current_turn: session.current_turn(),
            state: session.state(),
            board: session.board().clone(),
            ui_handle: entry.ui_handle,
        })
    }

    /// Remember the message that currently shows the participant's board
    pub fn set_ui_handle(&self, participant_id: ParticipantId, handle: UiHandle) -> Result<()> {
        if self.write_registry()?.set_ui_handle(participant_id, handle) {
            Ok(())
        } else {
            Err(GameError::NoActiveSession { participant_id }.into())
        }
    }

    /// Stored message reference, `None` without a session or before the first render
    pub fn ui_handle(&self, participant_id: ParticipantId) -> Result<Option<UiHandle>> {
        Ok(self
            .read_registry()?
            .get_session(participant_id)
            .and_then(|entry| entry.ui_handle))
    }

    /// Whether the participant has a registry entry
    pub fn in_session(&self, participant_id: ParticipantId) -> Result<bool> {
        Ok(self.read_registry()?.contains(participant_id))
    }

    /// Get current arena statistics
    pub fn stats(&self) -> Result<ArenaStats> {
        let mut stats = self
            .stats
            .read()
            .map_err(|_| GameError::lock_poisoned("stats"))?
            .clone();

        let queue = self.lock_queue()?;
        let registry = self.read_registry()?;
        stats.active_sessions = registry.active_sessions();
        stats.players_waiting = queue.waiting_by_size();

        Ok(stats)
    }

    fn entry_for(&self, participant_id: ParticipantId) -> Result<SessionEntry> {
        let entry = self
            .read_registry()?
            .get_session(participant_id)
            .cloned()
            .ok_or(GameError::NoActiveSession { participant_id })?;
        Ok(entry)
    }

    fn next_session_rng(&self) -> Result<SessionRng> {
        let mut source = self
            .seed_source
            .lock()
            .map_err(|_| GameError::lock_poisoned("seed source"))?;
        Ok(SessionRng::new(source.next_seed()))
    }

    fn update_stats(&self, update: impl FnOnce(&mut ArenaStats)) -> Result<()> {
        let mut stats = self
            .stats
            .write()
            .map_err(|_| GameError::lock_poisoned("stats"))?;
        update(&mut stats);
        Ok(())
    }

    fn lock_queue(&self) -> Result<MutexGuard<'_, PlayerQueue>> {
        Ok(self
            .queue
            .lock()
            .map_err(|_| GameError::lock_poisoned("queue"))?)
    }

    fn read_registry(&self) -> Result<RwLockReadGuard<'_, SessionRegistry>> {
        Ok(self
            .registry
            .read()
            .map_err(|_| GameError::lock_poisoned("registry"))?)
    }

    fn write_registry(&self) -> Result<RwLockWriteGuard<'_, SessionRegistry>> {
        Ok(self
            .registry
            .write()
            .map_err(|_| GameError::lock_poisoned("registry"))?)
    }

    fn lock_session(session: &SharedSession) -> Result<MutexGuard<'_, GameSession>> {
        Ok(session
            .lock()
            .map_err(|_| GameError::lock_poisoned("session"))?)
    }
}

impl Default for ArenaManager {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZES.to_vec(), None)
    }
}
