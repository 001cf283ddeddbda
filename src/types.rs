//! Common types used throughout the game service

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable identifier of a chat participant
pub type ParticipantId = i64;

/// Opaque reference to the last rendered board message of a participant
pub type UiHandle = i64;

/// Unique identifier for game sessions
pub type SessionId = Uuid;

/// One of the two marks a participant can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The symbol that always moves first
    pub const STARTING: Symbol = Symbol::X;

    /// The other symbol
    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::X => write!(f, "X"),
            Symbol::O => write!(f, "O"),
        }
    }
}

/// Final outcome recorded on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Symbol(Symbol),
    Draw,
}

/// Who a session is played against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    PlayerVsPlayer,
    PlayerVsBot,
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::PlayerVsPlayer => write!(f, "pvp"),
            GameMode::PlayerVsBot => write!(f, "bot"),
        }
    }
}

/// Opponent requested when asking for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentPreference {
    /// Play against the built-in bot with the chosen symbol
    Bot { symbol: Symbol },
    /// Wait in the queue for another participant
    Human,
}

/// Why a move request was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    NotYourTurn,
    Occupied,
    OutOfRange,
    GameResolved,
}

impl RejectReason {
    /// Label used for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotYourTurn => "not_your_turn",
            RejectReason::Occupied => "occupied",
            RejectReason::OutOfRange => "out_of_range",
            RejectReason::GameResolved => "game_resolved",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Win length used for a board of the given edge length
///
/// Both supported boards play three-in-a-row; a 4x4 board does not need four.
pub fn win_length_for(size: usize) -> usize {
    match size {
        3 | 4 => 3,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_opponent() {
        assert_eq!(Symbol::X.opponent(), Symbol::O);
        assert_eq!(Symbol::O.opponent(), Symbol::X);
        assert_eq!(Symbol::STARTING, Symbol::X);
    }

    #[test]
    fn test_win_length_is_three_for_supported_sizes() {
        assert_eq!(win_length_for(3), 3);
        assert_eq!(win_length_for(4), 3);
        assert_eq!(win_length_for(5), 5);
    }
}
