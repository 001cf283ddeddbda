//! Command handlers between a chat transport and the arena
//!
//! Each handler calls the arena first and only talks to the notifier once the
//! arena call has returned, so no core lock is held while messages go out.
//! Delivery failures are logged; game state is never rolled back for them.

use crate::arena::{ArenaManager, ExitOutcome, MatchOutcome, MoveOutcome, MoveReport, Resolution};
use crate::board::Board;
use crate::error::{GameError, Result};
use crate::leaderboard::{credit_win, top_standings, LeaderboardStorage, ParticipantDirectory};
use crate::transport::notifier::{BoardView, Notice, Notifier};
use crate::types::{GameMode, OpponentPreference, ParticipantId, RejectReason, UiHandle};
use std::sync::Arc;
use tracing::{debug, warn};

/// Game command handlers shared by every transport
pub struct GameService {
    arena: Arc<ArenaManager>,
    notifier: Arc<dyn Notifier>,
    directory: Arc<dyn ParticipantDirectory>,
    leaderboard: Arc<dyn LeaderboardStorage>,
    /// Standings shown after a win or on request, zero for all
    leaderboard_limit: usize,
}

impl GameService {
    pub fn new(
        arena: Arc<ArenaManager>,
        notifier: Arc<dyn Notifier>,
        directory: Arc<dyn ParticipantDirectory>,
        leaderboard: Arc<dyn LeaderboardStorage>,
    ) -> Self {
        Self {
            arena,
            notifier,
            directory,
            leaderboard,
            leaderboard_limit: 10,
        }
    }

    pub fn with_leaderboard_limit(mut self, limit: usize) -> Self {
        self.leaderboard_limit = limit;
        self
    }

    pub fn arena(&self) -> Arc<ArenaManager> {
        self.arena.clone()
    }

    pub fn leaderboard(&self) -> Arc<dyn LeaderboardStorage> {
        self.leaderboard.clone()
    }

    /// Handle a "play" request
    pub async fn handle_match_request(
        &self,
        participant_id: ParticipantId,
        size: usize,
        preference: OpponentPreference,
    ) -> Result<()> {
        self.arena.metrics().record_command("play");

        let outcome = match self.arena.request_match(participant_id, size, preference) {
            Ok(outcome) => outcome,
            Err(e) => {
                let notice = match e.downcast_ref::<GameError>() {
                    Some(GameError::AlreadyInSession { .. }) => Notice::GameAlreadyInProgress,
                    Some(GameError::InvalidBoardSize { size }) => {
                        Notice::UnsupportedSize { size: *size }
                    }
                    _ => return Err(e),
                };
                self.send(participant_id, notice).await;
                return Ok(());
            }
        };

        match outcome {
            MatchOutcome::BotSessionStarted { symbol, board, .. } => {
                self.send(
                    participant_id,
                    Notice::MatchStarted {
                        symbol,
                        mode: GameMode::PlayerVsBot,
                        opponent: None,
                    },
                )
                .await;
                self.render(participant_id, board, None, true).await;
            }
            MatchOutcome::Paired {
                opponent,
                symbol,
                board,
                ..
            } => {
                for (recipient, their_symbol, their_opponent) in [
                    (participant_id, symbol, opponent),
                    (opponent, symbol.opponent(), participant_id),
                ] {
                    self.send(
                        recipient,
                        Notice::MatchStarted {
                            symbol: their_symbol,
                            mode: GameMode::PlayerVsPlayer,
                            opponent: Some(their_opponent),
                        },
                    )
                    .await;
                    self.render(recipient, board.clone(), None, true).await;
                }
            }
            MatchOutcome::Queued { size, position } => {
                self.send(participant_id, Notice::Queued { size, position })
                    .await;
            }
        }

        Ok(())
    }

    /// Handle a cell click
    pub async fn handle_move(&self, participant_id: ParticipantId, position: usize) -> Result<()> {
        self.arena.metrics().record_command("move");

        let report = match self.arena.submit_move(participant_id, position) {
            Ok(MoveOutcome::Applied(report)) => report,
            Ok(MoveOutcome::Rejected { reason }) => {
                let notice = match reason {
                    RejectReason::NotYourTurn => Notice::NotYourTurn,
                    RejectReason::Occupied | RejectReason::OutOfRange => Notice::CellUnavailable,
                    RejectReason::GameResolved => Notice::NoActiveGame,
                };
                self.send(participant_id, notice).await;
                return Ok(());
            }
            Err(e) if crate::error::is_no_active_session(&e) => {
                self.send(participant_id, Notice::NoActiveGame).await;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        // Handles come from the move's own snapshot: a win removes the registry entries.
        let mut audience = vec![(participant_id, report.ui_handle)];
        if let Some(opponent) = report.opponent {
            audience.push((opponent, report.opponent_ui_handle));
        }

        self.publish_move(&audience, report).await;
        Ok(())
    }

    async fn publish_move(&self, audience: &[(ParticipantId, Option<UiHandle>)], report: MoveReport) {
        match report.resolution {
            Resolution::InProgress => {
                for &(recipient, handle) in audience {
                    self.render(recipient, report.board.clone(), handle, true)
                        .await;
                }
            }
            Resolution::DrawReset { full_board, .. } => {
                for &(recipient, handle) in audience {
                    let shown = self
                        .render(recipient, full_board.clone(), handle, false)
                        .await;
                    self.send(recipient, Notice::BoardCleared).await;
                    self.render(recipient, report.board.clone(), shown.or(handle), true)
                        .await;
                }
            }
            Resolution::Won { symbol, winner } => {
                for &(recipient, handle) in audience {
                    self.render(recipient, report.board.clone(), handle, false)
                        .await;
                    self.send(recipient, Notice::GameOver { winner: symbol })
                        .await;
                }

                if let Some(winner) = winner {
                    credit_win(
                        self.directory.as_ref(),
                        self.leaderboard.as_ref(),
                        winner,
                    )
                    .await;

                    match top_standings(self.leaderboard.as_ref(), self.leaderboard_limit) {
                        Ok(entries) => {
                            for &(recipient, _) in audience {
                                self.send(
                                    recipient,
                                    Notice::Leaderboard {
                                        entries: entries.clone(),
                                    },
                                )
                                .await;
                            }
                        }
                        Err(e) => warn!("Failed to read leaderboard after win: {}", e),
                    }
                }
            }
        }
    }

    /// Handle a surrender button
    pub async fn handle_surrender(&self, participant_id: ParticipantId) -> Result<()> {
        self.arena.metrics().record_command("surrender");

        match self.arena.surrender(participant_id) {
            Ok(outcome) => {
                self.send(participant_id, Notice::Surrendered).await;
                if let Some(opponent) = outcome.opponent {
                    self.send(opponent, Notice::OpponentSurrendered).await;
                }
                Ok(())
            }
            Err(e) if crate::error::is_no_active_session(&e) => {
                self.send(participant_id, Notice::NoActiveGame).await;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Handle an exit request from a game or a queue
    pub async fn handle_exit(&self, participant_id: ParticipantId) -> Result<()> {
        self.arena.metrics().record_command("exit");

        match self.arena.exit_queue_or_session(participant_id) {
            Ok(ExitOutcome::LeftSession { opponent }) => {
                self.send(participant_id, Notice::ExitedGame).await;
                if let Some(opponent) = opponent {
                    self.send(opponent, Notice::OpponentLeft).await;
                }
                Ok(())
            }
            Ok(ExitOutcome::LeftQueue { size }) => {
                self.send(participant_id, Notice::LeftQueue { size }).await;
                Ok(())
            }
            Err(e) if crate::error::is_no_active_session(&e) => {
                self.send(participant_id, Notice::Invite).await;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Re-render the participant's board
    pub async fn handle_board(&self, participant_id: ParticipantId) -> Result<()> {
        self.arena.metrics().record_command("board");

        match self.arena.session_view(participant_id) {
            Ok(view) => {
                let interactive = view.is_participant_turn();
                self.render(participant_id, view.board, view.ui_handle, interactive)
                    .await;
                Ok(())
            }
            Err(e) if crate::error::is_no_active_session(&e) => {
                self.send(participant_id, Notice::NoActiveGame).await;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Send the current standings
    pub async fn handle_leaderboard(&self, participant_id: ParticipantId) -> Result<()> {
        self.arena.metrics().record_command("leaderboard");

        let entries = top_standings(self.leaderboard.as_ref(), self.leaderboard_limit)?;
        self.send(participant_id, Notice::Leaderboard { entries })
            .await;
        Ok(())
    }

    async fn send(&self, participant_id: ParticipantId, notice: Notice) {
        debug!("Notifying participant {}: {:?}", participant_id, notice);
        if let Err(e) = self.notifier.notify(participant_id, notice).await {
            warn!("Failed to notify participant {}: {}", participant_id, e);
        }
    }

    /// Present a board and remember where it is shown
    async fn render(
        &self,
        participant_id: ParticipantId,
        board: Board,
        ui_handle: Option<UiHandle>,
        interactive: bool,
    ) -> Option<UiHandle> {
        let view = BoardView {
            board,
            ui_handle,
            interactive,
        };

        match self.notifier.present_board(participant_id, view).await {
            Ok(handle) => {
                if let Err(e) = self.arena.set_ui_handle(participant_id, handle) {
                    // Expected once a finished game has been torn down.
                    debug!(
                        "Not storing board handle for participant {}: {}",
                        participant_id, e
                    );
                }
                Some(handle)
            }
            Err(e) => {
                warn!(
                    "Failed to present board to participant {}: {}",
                    participant_id, e
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("leaderboard_limit", &self.leaderboard_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::DEFAULT_BOARD_SIZES;
    use crate::leaderboard::{InMemoryDirectory, InMemoryLeaderboard, ParticipantProfile};
    use crate::types::Symbol;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        notices: Mutex<Vec<(ParticipantId, Notice)>>,
        boards: Mutex<Vec<(ParticipantId, BoardView)>>,
        next_handle: AtomicI64,
    }

    impl Recorder {
        fn notices_for(&self, participant_id: ParticipantId) -> Vec<Notice> {
            self.notices
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| *id == participant_id)
                .map(|(_, notice)| notice.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn notify(&self, participant_id: ParticipantId, notice: Notice) -> Result<()> {
            self.notices.lock().unwrap().push((participant_id, notice));
            Ok(())
        }

        async fn present_board(
            &self,
            participant_id: ParticipantId,
            view: BoardView,
        ) -> Result<UiHandle> {
            let handle = view
                .ui_handle
                .unwrap_or_else(|| self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
            self.boards.lock().unwrap().push((participant_id, view));
            Ok(handle)
        }
    }

    fn service() -> (GameService, Arc<Recorder>, Arc<InMemoryDirectory>) {
        let arena = Arc::new(ArenaManager::new(DEFAULT_BOARD_SIZES.to_vec(), Some(5)));
        let recorder = Arc::new(Recorder::default());
        let directory = Arc::new(InMemoryDirectory::new());
        let service = GameService::new(
            arena,
            recorder.clone(),
            directory.clone(),
            Arc::new(InMemoryLeaderboard::default()),
        );
        (service, recorder, directory)
    }

    #[tokio::test]
    async fn test_pairing_notifies_both_sides() {
        let (service, recorder, _) = service();
        service
            .handle_match_request(1, 3, OpponentPreference::Human)
            .await
            .unwrap();
        service
            .handle_match_request(2, 3, OpponentPreference::Human)
            .await
            .unwrap();

        assert_eq!(
            recorder.notices_for(1),
            vec![
                Notice::Queued {
                    size: 3,
                    position: 0
                },
                Notice::MatchStarted {
                    symbol: Symbol::O,
                    mode: GameMode::PlayerVsPlayer,
                    opponent: Some(2)
                }
            ]
        );
        assert_eq!(service.arena().ui_handle(1).unwrap(), Some(2));
        assert_eq!(service.arena().ui_handle(2).unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_board_edits_reuse_handle() {
        let (service, recorder, _) = service();
        service
            .handle_match_request(4, 3, OpponentPreference::Bot { symbol: Symbol::X })
            .await
            .unwrap();
        service.handle_move(4, 0).await.unwrap();

        let boards = recorder.boards.lock().unwrap();
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[0].1.ui_handle, None);
        assert_eq!(boards[1].1.ui_handle, Some(1));
    }

    #[tokio::test]
    async fn test_win_credits_leaderboard() {
        let (service, recorder, directory) = service();
        directory
            .upsert(2, ParticipantProfile::with_username("@champ"))
            .unwrap();
        service
            .handle_match_request(1, 3, OpponentPreference::Human)
            .await
            .unwrap();
        service
            .handle_match_request(2, 3, OpponentPreference::Human)
            .await
            .unwrap();

        for (participant, position) in [(2, 0), (1, 3), (2, 1), (1, 4), (2, 2)] {
            service.handle_move(participant, position).await.unwrap();
        }

        assert_eq!(service.leaderboard().wins("champ").unwrap(), 1);
        let notices = recorder.notices_for(1);
        assert!(notices.contains(&Notice::GameOver { winner: Symbol::X }));
        assert!(notices
            .iter()
            .any(|notice| matches!(notice, Notice::Leaderboard { entries } if entries.len() == 1)));
    }

    #[tokio::test]
    async fn test_rejections_map_to_notices() {
        let (service, recorder, _) = service();
        service.handle_move(9, 0).await.unwrap();
        service
            .handle_match_request(1, 3, OpponentPreference::Human)
            .await
            .unwrap();
        service
            .handle_match_request(2, 3, OpponentPreference::Human)
            .await
            .unwrap();
        service.handle_move(1, 0).await.unwrap();
        service.handle_move(2, 0).await.unwrap();
        service.handle_move(1, 0).await.unwrap();

        assert_eq!(recorder.notices_for(9), vec![Notice::NoActiveGame]);
        let notices = recorder.notices_for(1);
        assert!(notices.contains(&Notice::NotYourTurn));
        assert!(notices.contains(&Notice::CellUnavailable));
    }

    #[tokio::test]
    async fn test_exit_without_anything_sends_invite() {
        let (service, recorder, _) = service();
        service.handle_exit(3).await.unwrap();
        service.handle_surrender(3).await.unwrap();

        assert_eq!(
            recorder.notices_for(3),
            vec![Notice::Invite, Notice::NoActiveGame]
        );
    }

    #[tokio::test]
    async fn test_already_playing_and_bad_size() {
        let (service, recorder, _) = service();
        service
            .handle_match_request(5, 3, OpponentPreference::Bot { symbol: Symbol::O })
            .await
            .unwrap();
        service
            .handle_match_request(5, 3, OpponentPreference::Human)
            .await
            .unwrap();
        service
            .handle_match_request(6, 7, OpponentPreference::Human)
            .await
            .unwrap();

        assert!(recorder
            .notices_for(5)
            .contains(&Notice::GameAlreadyInProgress));
        assert_eq!(
            recorder.notices_for(6),
            vec![Notice::UnsupportedSize { size: 7 }]
        );
    }
}
