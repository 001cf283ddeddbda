//! Bot move heuristic
//!
//! The bot looks one ply ahead only: take a win, block a loss, otherwise play
//! the center of an odd board or any empty cell.

use crate::board::{Board, Cell, WinDetector};
use crate::game::rng::SessionRng;
use crate::types::Symbol;

/// Candidate moves found by the one-ply scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Cells that complete a line for the bot
    pub winning: Vec<usize>,
    /// Cells that would complete a line for the opponent
    pub blocking: Vec<usize>,
}

/// Scan every empty cell for immediate wins and forced blocks
pub fn scan_candidates(board: &Board, detector: &WinDetector, bot_symbol: Symbol) -> Candidates {
    let opponent = bot_symbol.opponent();
    let mut candidates = Candidates::default();

    for position in board.empty_positions() {
        if detector.is_winner(&board.with_mark(position, bot_symbol), bot_symbol) {
            candidates.winning.push(position);
        }
        if detector.is_winner(&board.with_mark(position, opponent), opponent) {
            candidates.blocking.push(position);
        }
    }

    candidates
}

/// Pick the bot's next cell, `None` when the board is full
///
/// With both wins and blocks available a coin flip decides which set is used;
/// the cell is then drawn uniformly from that set.
pub fn choose_move(
    board: &Board,
    detector: &WinDetector,
    bot_symbol: Symbol,
    rng: &mut SessionRng,
) -> Option<usize> {
    let Candidates { winning, blocking } = scan_candidates(board, detector, bot_symbol);

    let pool = match (winning.is_empty(), blocking.is_empty()) {
        (false, false) => {
            if rng.random_bool() {
                winning
            } else {
                blocking
            }
        }
        (false, true) => winning,
        (true, false) => blocking,
        (true, true) => {
            let center = board.center().filter(|&c| board.get(c) == Some(Cell::Empty));
            if center.is_some() {
                return center;
            }
            board.empty_positions()
        }
    };

    rng.choose(&pool)
}
