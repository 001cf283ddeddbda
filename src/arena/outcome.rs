//! Results returned by arena operations
//!
//! These carry everything the transport layer needs to notify both sides of a
//! match without reaching back into the arena.

use crate::board::Board;
use crate::game::SessionState;
use crate::types::{GameMode, ParticipantId, RejectReason, SessionId, Symbol, UiHandle};
use serde::{Deserialize, Serialize};

/// Result of asking for a match
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// A bot session was created; `bot_opening` is set when the bot plays X
    BotSessionStarted {
        session_id: SessionId,
        symbol: Symbol,
        bot_opening: Option<usize>,
        board: Board,
    },
    /// The requester was paired with the longest waiting participant
    Paired {
        session_id: SessionId,
        opponent: ParticipantId,
        symbol: Symbol,
        board: Board,
    },
    /// Nobody else is waiting for this size yet
    Queued { size: usize, position: usize },
}

/// Result of submitting a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The move was not applied and nothing changed
    Rejected { reason: RejectReason },
    Applied(MoveReport),
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied(_))
    }
}

/// Details of an applied move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub position: usize,
    /// Human opponent to notify, `None` in bot mode
    pub opponent: Option<ParticipantId>,
    /// Cell the bot answered with, if it moved
    pub bot_reply: Option<usize>,
    pub resolution: Resolution,
    /// Board after the move, the bot reply and any reset
    pub board: Board,
    /// Mover's stored message reference at the time of the move
    pub ui_handle: Option<UiHandle>,
    pub opponent_ui_handle: Option<UiHandle>,
}

/// How the game stands after a move
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    InProgress,
    /// The session is over and both registry entries are gone
    Won {
        symbol: Symbol,
        /// Winning participant, `None` when the bot won
        winner: Option<ParticipantId>,
    },
    /// The board filled up and was cleared; the match goes on
    DrawReset {
        full_board: Board,
        bot_opening: Option<usize>,
    },
}

/// Result of a surrender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurrenderOutcome {
    pub opponent: Option<ParticipantId>,
}

/// Result of an exit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    LeftSession { opponent: Option<ParticipantId> },
    LeftQueue { size: usize },
}

/// Point-in-time view of a participant's session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session_id: SessionId,
    pub mode: GameMode,
    pub symbol: Symbol,
    pub opponent: Option<ParticipantId>,
    pub current_turn: Symbol,
    pub state: SessionState,
    pub board: Board,
    pub ui_handle: Option<UiHandle>,
}

impl SessionView {
    /// Whether the participant may move right now
    pub fn is_participant_turn(&self) -> bool {
        self.state == SessionState::InProgress && self.current_turn == self.symbol
    }
}

/// Arena counters exposed on the stats endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaStats {
    /// Total sessions created
    pub sessions_created: u64,
    /// Total moves applied, bot replies included
    pub moves_applied: u64,
    /// Total boards cleared after a draw
    pub draw_resets: u64,
    pub games_won: u64,
    pub surrenders: u64,
    pub exits: u64,
    /// Current number of live sessions
    pub active_sessions: usize,
    /// Waiting participants per board size, ascending by size
    pub players_waiting: Vec<(usize, usize)>,
}
