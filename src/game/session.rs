//! Game session state machine
//!
//! A session owns one board and advances it one authorized move at a time.
//! Draws do not end a session: the board is cleared and play continues.

use crate::board::{Board, WinDetector};
use crate::game::bot;
use crate::game::rng::SessionRng;
use crate::types::{win_length_for, GameMode, RejectReason, SessionId, Symbol, Winner};
use crate::utils::{current_timestamp, generate_session_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Observable state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Moves are still being accepted
    InProgress,
    /// A symbol completed a line (terminal)
    Won(Symbol),
    /// Board filled without a line; `reset_board` resumes play
    Draw,
}

/// Mutable state of a single match
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    size: usize,
    win_length: usize,
    board: Board,
    detector: WinDetector,
    current_turn: Symbol,
    mode: GameMode,
    participant_symbol: Symbol,
    opponent_symbol: Symbol,
    winner: Option<Winner>,
    rng: SessionRng,
    moves_played: u64,
    created_at: DateTime<Utc>,
    /// Set once the match ended for both sides; no further moves land
    closed: bool,
}

impl GameSession {
    /// Create a session where the participant plays `participant_symbol`
    pub fn new(size: usize, mode: GameMode, participant_symbol: Symbol, rng: SessionRng) -> Self {
        let win_length = win_length_for(size);
        Self {
            id: generate_session_id(),
            size,
            win_length,
            board: Board::new(size),
            detector: WinDetector::new(size, win_length),
            current_turn: Symbol::STARTING,
            mode,
            participant_symbol,
            opponent_symbol: participant_symbol.opponent(),
            winner: None,
            rng,
            moves_played: 0,
            created_at: current_timestamp(),
            closed: false,
        }
    }

    /// Session against the bot; the bot takes the symbol the participant did not choose
    pub fn against_bot(size: usize, participant_symbol: Symbol, rng: SessionRng) -> Self {
        Self::new(size, GameMode::PlayerVsBot, participant_symbol, rng)
    }

    /// Session between two participants, `X` belongs to the first one
    pub fn between_players(size: usize, rng: SessionRng) -> Self {
        Self::new(size, GameMode::PlayerVsPlayer, Symbol::X, rng)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Symbol {
        self.current_turn
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn participant_symbol(&self) -> Symbol {
        self.participant_symbol
    }

    pub fn opponent_symbol(&self) -> Symbol {
        self.opponent_symbol
    }

    /// The bot's symbol, only in bot mode
    pub fn bot_symbol(&self) -> Option<Symbol> {
        (self.mode == GameMode::PlayerVsBot).then_some(self.opponent_symbol)
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn moves_played(&self) -> u64 {
        self.moves_played
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn rng_seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn state(&self) -> SessionState {
        match self.winner {
            None => SessionState::InProgress,
            Some(Winner::Symbol(symbol)) => SessionState::Won(symbol),
            Some(Winner::Draw) => SessionState::Draw,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Mark the match as ended by a win, a surrender or an exit
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether the bot is the side to move
    pub fn is_bot_turn(&self) -> bool {
        self.winner.is_none() && self.bot_symbol() == Some(self.current_turn)
    }

    /// Check a move for the side to move without applying it
    pub fn validate_move(&self, position: usize) -> Result<(), RejectReason> {
        if self.closed || self.winner.is_some() {
            return Err(RejectReason::GameResolved);
        }
        match self.board.get(position) {
            None => Err(RejectReason::OutOfRange),
            Some(cell) if !cell.is_empty() => Err(RejectReason::Occupied),
            Some(_) => Ok(()),
        }
    }

    /// Place the current turn's symbol at `position`
    ///
    /// Returns false and leaves the session untouched when the cell is taken,
    /// out of range, or the game is already resolved. After a winning move the
    /// turn does not switch.
    pub fn make_move(&mut self, position: usize) -> bool {
        if self.validate_move(position).is_err() {
            return false;
        }

        let mover = self.current_turn;
        self.board.place(position, mover);
        self.moves_played += 1;

        if self.detector.is_winner(&self.board, mover) {
            self.winner = Some(Winner::Symbol(mover));
            debug!("Session {} won by {} at {}", self.id, mover, position);
        } else if self.detector.is_draw(&self.board) {
            self.winner = Some(Winner::Draw);
            debug!("Session {} drawn after move at {}", self.id, position);
        } else {
            self.current_turn = mover.opponent();
        }

        true
    }

    /// Clear a drawn board and restart from the starting symbol
    ///
    /// No-op unless the session is in the `Draw` state. When the bot owns the
    /// starting symbol it opens immediately; the opening cell is returned.
    pub fn reset_board(&mut self) -> Option<usize> {
        if self.winner != Some(Winner::Draw) {
            return None;
        }

        self.board.clear();
        self.winner = None;
        self.current_turn = Symbol::STARTING;
        debug!("Session {} board reset after draw", self.id);

        if self.bot_symbol() == Some(Symbol::STARTING) {
            self.bot_move()
        } else {
            None
        }
    }

    /// Let the bot play its heuristic move; `None` when it is not the bot's turn
    pub fn bot_move(&mut self) -> Option<usize> {
        let bot_symbol = self.bot_symbol()?;
        if !self.is_bot_turn() {
            return None;
        }

        let position = bot::choose_move(&self.board, &self.detector, bot_symbol, &mut self.rng)?;
        self.make_move(position).then_some(position)
    }
}
