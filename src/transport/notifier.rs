//! Outbound messages to participants

use crate::board::Board;
use crate::error::Result;
use crate::leaderboard::LeaderboardEntry;
use crate::types::{GameMode, ParticipantId, Symbol, UiHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything the service tells a participant outside of board renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    Invite,
    Queued { size: usize, position: usize },
    LeftQueue { size: usize },
    UnsupportedSize { size: usize },
    MatchStarted {
        symbol: Symbol,
        mode: GameMode,
        opponent: Option<ParticipantId>,
    },
    NotYourTurn,
    CellUnavailable,
    NoActiveGame,
    GameAlreadyInProgress,
    /// The board filled up without a winner and was cleared
    BoardCleared,
    GameOver { winner: Symbol },
    Surrendered,
    OpponentSurrendered,
    ExitedGame,
    OpponentLeft,
    Leaderboard { entries: Vec<LeaderboardEntry> },
}

impl Notice {
    /// Plain text rendering
    pub fn text(&self) -> String {
        match self {
            Notice::Invite => "Hi! Want to play tic-tac-toe?".to_string(),
            Notice::Queued { size, position } => format!(
                "You are in the {size}x{size} queue (position {}). Waiting for another player.",
                position + 1
            ),
            Notice::LeftQueue { size } => {
                format!("You left the {size}x{size} queue. See you next time!")
            }
            Notice::UnsupportedSize { size } => {
                format!("A {size}x{size} board is not available.")
            }
            Notice::MatchStarted {
                symbol, mode, ..
            } => match mode {
                GameMode::PlayerVsBot => format!("You play {}. Game on against the bot!", symbol),
                GameMode::PlayerVsPlayer => format!("The game starts! You play {}.", symbol),
            },
            Notice::NotYourTurn => "It is not your turn.".to_string(),
            Notice::CellUnavailable => "That cell is taken. Pick another one.".to_string(),
            Notice::NoActiveGame => "No game found. Start a new one.".to_string(),
            Notice::GameAlreadyInProgress => {
                "A game is already running. Finish it first.".to_string()
            }
            Notice::BoardCleared => {
                "The board is full. It has been cleared and the game goes on.".to_string()
            }
            Notice::GameOver { winner } => format!("Winner: {}", winner),
            Notice::Surrendered => "You surrendered. Game over. See you next time!".to_string(),
            Notice::OpponentSurrendered => {
                "Your opponent surrendered. You win! See you next time.".to_string()
            }
            Notice::ExitedGame => "You left the game. See you next time!".to_string(),
            Notice::OpponentLeft => "Your opponent left the game. Game over.".to_string(),
            Notice::Leaderboard { entries } => render_leaderboard(entries),
        }
    }
}

fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "The leaderboard is empty. Play a game to get on it!".to_string();
    }

    let mut text = String::from("Leaderboard:\n");
    for (rank, entry) in entries.iter().enumerate() {
        text.push_str(&format!(
            "{}. @{} - wins: {}\n",
            rank + 1,
            entry.identifier,
            entry.wins
        ));
    }
    text
}

/// A board render request
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub board: Board,
    /// Message to edit instead of sending a new one
    pub ui_handle: Option<UiHandle>,
    /// Whether empty cells accept moves
    pub interactive: bool,
}

impl BoardView {
    /// Cells that can be clicked in this render
    pub fn playable_positions(&self) -> Vec<usize> {
        if self.interactive {
            self.board.empty_positions()
        } else {
            Vec::new()
        }
    }

    /// Grid text, one row per line
    pub fn render(&self) -> String {
        self.board.to_string()
    }
}

/// Trait for delivering notices and boards to participants
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a notice
    async fn notify(&self, participant_id: ParticipantId, notice: Notice) -> Result<()>;

    /// Show a board, editing `view.ui_handle` when set; returns the handle now showing it
    async fn present_board(&self, participant_id: ParticipantId, view: BoardView)
        -> Result<UiHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_leaderboard_text() {
        let empty = Notice::Leaderboard { entries: vec![] };
        assert!(empty.text().contains("empty"));

        let entries = vec![
            LeaderboardEntry {
                identifier: "alice".to_string(),
                wins: 3,
                last_win: Utc::now(),
            },
            LeaderboardEntry {
                identifier: "bob".to_string(),
                wins: 1,
                last_win: Utc::now(),
            },
        ];
        let text = Notice::Leaderboard { entries }.text();
        assert!(text.contains("1. @alice - wins: 3"));
        assert!(text.contains("2. @bob - wins: 1"));
    }

    #[test]
    fn test_board_view_render() {
        let mut board = Board::new(3);
        board.place(0, Symbol::X);
        board.place(4, Symbol::O);

        let view = BoardView {
            board,
            ui_handle: None,
            interactive: false,
        };
        assert_eq!(view.render(), "X..\n.O.\n...\n");
        assert!(view.playable_positions().is_empty());
    }

    #[test]
    fn test_queue_position_is_one_based() {
        let text = Notice::Queued {
            size: 4,
            position: 0,
        }
        .text();
        assert!(text.contains("4x4"));
        assert!(text.contains("position 1"));
    }
}
