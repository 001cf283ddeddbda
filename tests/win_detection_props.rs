//! Property tests for win detection, session rules and the bot heuristic

use proptest::prelude::*;
use tictac_room::board::{Board, Cell, WinDetector};
use tictac_room::game::bot::choose_move;
use tictac_room::game::{GameSession, SessionRng, SessionState};
use tictac_room::types::{win_length_for, Symbol};

/// Direction scan that does not share code with the line enumeration
fn scan_for_run(board: &Board, symbol: Symbol, win_length: usize) -> bool {
    let size = board.size() as isize;
    let directions = [(0isize, 1isize), (1, 0), (1, 1), (1, -1)];

    for row in 0..size {
        for col in 0..size {
            for (dr, dc) in directions {
                let run = (0..win_length as isize).all(|step| {
                    let r = row + dr * step;
                    let c = col + dc * step;
                    r >= 0
                        && r < size
                        && c >= 0
                        && c < size
                        && board.get((r * size + c) as usize) == Some(Cell::Mark(symbol))
                });
                if run {
                    return true;
                }
            }
        }
    }
    false
}

fn arb_board(size: usize) -> impl Strategy<Value = Board> {
    prop::collection::vec(0u8..3, size * size).prop_map(move |raw| {
        let cells = raw
            .into_iter()
            .map(|v| match v {
                1 => Cell::Mark(Symbol::X),
                2 => Cell::Mark(Symbol::O),
                _ => Cell::Empty,
            })
            .collect();
        Board::from_cells(size, cells).expect("cell count matches size")
    })
}

fn arb_sized_board() -> impl Strategy<Value = Board> {
    prop_oneof![arb_board(3), arb_board(4)]
}

proptest! {
    #[test]
    fn winner_matches_direction_scan(board in arb_sized_board()) {
        let win_length = win_length_for(board.size());
        let detector = WinDetector::new(board.size(), win_length);

        for symbol in [Symbol::X, Symbol::O] {
            prop_assert_eq!(
                detector.is_winner(&board, symbol),
                scan_for_run(&board, symbol, win_length)
            );
        }
    }

    #[test]
    fn draw_means_full_without_line(board in arb_sized_board()) {
        let detector = WinDetector::new(board.size(), win_length_for(board.size()));
        let expected = board.is_full()
            && !detector.is_winner(&board, Symbol::X)
            && !detector.is_winner(&board, Symbol::O);
        prop_assert_eq!(detector.is_draw(&board), expected);
    }

    #[test]
    fn session_moves_keep_invariants(
        size in prop_oneof![Just(3usize), Just(4usize)],
        moves in prop::collection::vec(0usize..20, 0..40),
        seed in any::<u64>(),
    ) {
        let mut session = GameSession::between_players(size, SessionRng::new(seed));

        for position in moves {
            let before_board = session.board().clone();
            let before_turn = session.current_turn();
            let before_state = session.state();

            if session.make_move(position) {
                prop_assert_eq!(before_state, SessionState::InProgress);
                prop_assert_eq!(session.board().get(position), Some(Cell::Mark(before_turn)));
                match session.state() {
                    SessionState::InProgress => {
                        prop_assert_eq!(session.current_turn(), before_turn.opponent())
                    }
                    _ => prop_assert_eq!(session.current_turn(), before_turn),
                }
            } else {
                prop_assert_eq!(session.board(), &before_board);
                prop_assert_eq!(session.current_turn(), before_turn);
                prop_assert_eq!(session.state(), before_state);
            }

            if session.state() == SessionState::Draw {
                session.reset_board();
                prop_assert!(session.board().empty_positions().len() == size * size);
            }

            let cells = session.board().cells();
            let xs = cells.iter().filter(|c| **c == Cell::Mark(Symbol::X)).count();
            let os = cells.iter().filter(|c| **c == Cell::Mark(Symbol::O)).count();
            prop_assert!(xs == os || xs == os + 1);
        }
    }

    #[test]
    fn bot_picks_empty_cell_and_takes_lone_win(board in arb_sized_board(), seed in any::<u64>()) {
        let detector = WinDetector::new(board.size(), win_length_for(board.size()));
        let mut rng = SessionRng::new(seed);

        match choose_move(&board, &detector, Symbol::O, &mut rng) {
            None => prop_assert!(board.is_full()),
            Some(position) => {
                prop_assert_eq!(board.get(position), Some(Cell::Empty));

                let wins: Vec<usize> = board
                    .empty_positions()
                    .into_iter()
                    .filter(|&p| detector.is_winner(&board.with_mark(p, Symbol::O), Symbol::O))
                    .collect();
                let blocks: Vec<usize> = board
                    .empty_positions()
                    .into_iter()
                    .filter(|&p| detector.is_winner(&board.with_mark(p, Symbol::X), Symbol::X))
                    .collect();

                if !wins.is_empty() && blocks.is_empty() {
                    prop_assert!(wins.contains(&position));
                }
                if wins.is_empty() && !blocks.is_empty() {
                    prop_assert!(blocks.contains(&position));
                }
                if !wins.is_empty() && !blocks.is_empty() {
                    prop_assert!(wins.contains(&position) || blocks.contains(&position));
                }
            }
        }
    }
}
