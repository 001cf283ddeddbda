//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tictac_room::arena::ArenaManager;
use tictac_room::board::{Board, Cell};
use tictac_room::error::Result;
use tictac_room::leaderboard::{InMemoryDirectory, InMemoryLeaderboard, ParticipantProfile};
use tictac_room::transport::{BoardView, GameService, Notice, Notifier};
use tictac_room::types::{ParticipantId, Symbol, UiHandle};

/// Everything a notifier was asked to deliver
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Notice(Notice),
    Board(BoardView),
}

/// Notifier that captures deliveries instead of sending them
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<(ParticipantId, Delivery)>>>,
    next_handle: AtomicI64,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries in the order they were made
    pub fn deliveries(&self) -> Vec<(ParticipantId, Delivery)> {
        self.deliveries
            .lock()
            .map(|deliveries| deliveries.clone())
            .unwrap_or_default()
    }

    /// Notices sent to one participant
    pub fn notices_for(&self, participant_id: ParticipantId) -> Vec<Notice> {
        self.deliveries()
            .into_iter()
            .filter_map(|(id, delivery)| match delivery {
                Delivery::Notice(notice) if id == participant_id => Some(notice),
                _ => None,
            })
            .collect()
    }

    /// Boards presented to one participant
    pub fn boards_for(&self, participant_id: ParticipantId) -> Vec<BoardView> {
        self.deliveries()
            .into_iter()
            .filter_map(|(id, delivery)| match delivery {
                Delivery::Board(view) if id == participant_id => Some(view),
                _ => None,
            })
            .collect()
    }

    pub fn last_board_for(&self, participant_id: ParticipantId) -> Option<BoardView> {
        self.boards_for(participant_id).pop()
    }

    pub fn clear(&self) {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.clear();
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, participant_id: ParticipantId, notice: Notice) -> Result<()> {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push((participant_id, Delivery::Notice(notice)));
        }
        Ok(())
    }

    async fn present_board(&self, participant_id: ParticipantId, view: BoardView) -> Result<UiHandle> {
        let handle = view
            .ui_handle
            .unwrap_or_else(|| self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push((participant_id, Delivery::Board(view)));
        }
        Ok(handle)
    }
}

/// A complete service wired to in-memory collaborators
pub struct TestSystem {
    pub service: GameService,
    pub arena: Arc<ArenaManager>,
    pub notifier: Arc<RecordingNotifier>,
    pub directory: Arc<InMemoryDirectory>,
    pub leaderboard: Arc<InMemoryLeaderboard>,
}

pub fn create_test_system(seed: u64) -> TestSystem {
    let arena = Arc::new(ArenaManager::new(vec![3, 4], Some(seed)));
    let notifier = Arc::new(RecordingNotifier::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let leaderboard = Arc::new(InMemoryLeaderboard::new(100));

    let service = GameService::new(
        arena.clone(),
        notifier.clone(),
        directory.clone(),
        leaderboard.clone(),
    );

    TestSystem {
        service,
        arena,
        notifier,
        directory,
        leaderboard,
    }
}

/// Register a username for a participant
pub fn name(directory: &InMemoryDirectory, participant_id: ParticipantId, username: &str) {
    directory
        .upsert(participant_id, ParticipantProfile::with_username(username))
        .expect("directory upsert");
}

/// Build a board from a layout string such as `"XX. OO. ..."`
pub fn board_from(size: usize, layout: &str) -> Board {
    let cells = layout
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'X' => Cell::Mark(Symbol::X),
            'O' => Cell::Mark(Symbol::O),
            _ => Cell::Empty,
        })
        .collect();
    Board::from_cells(size, cells).expect("layout matches size")
}

/// Alternating moves X, O, X, ... that fill a 3x3 board without a line
pub const DRAW_3X3: [usize; 9] = [0, 1, 2, 4, 3, 5, 7, 6, 8];
