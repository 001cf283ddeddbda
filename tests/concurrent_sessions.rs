//! Concurrency tests: many participants hitting one arena at once

mod fixtures;

use fixtures::create_test_system;
use futures::future::join_all;
use std::sync::{Arc, Barrier};
use std::thread;
use tictac_room::arena::{ArenaManager, MatchOutcome, MoveOutcome, Resolution};
use tictac_room::types::{OpponentPreference, Symbol};
use tokio_test::assert_ok;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queue_requests_pair_everyone() {
    let arena = Arc::new(ArenaManager::new(vec![3, 4], Some(21)));

    let handles = (0..100i64).map(|participant| {
        let arena = arena.clone();
        tokio::spawn(async move {
            let size = if participant % 2 == 0 { 3 } else { 4 };
            arena.request_match(participant, size, OpponentPreference::Human)
        })
    });

    let mut paired = 0;
    for result in join_all(handles).await {
        let outcome = assert_ok!(result.expect("task panicked"));
        if matches!(outcome, MatchOutcome::Paired { .. }) {
            paired += 1;
        }
    }

    // 50 requests per size, each pairing consumes two of them
    assert_eq!(paired, 50);
    let stats = assert_ok!(arena.stats());
    assert_eq!(stats.active_sessions, 50);
    assert!(stats.players_waiting.iter().all(|(_, waiting)| *waiting == 0));
    for participant in 0..100 {
        assert!(assert_ok!(arena.in_session(participant)));
    }
}

/// Play first free cell until the game is won or the move budget runs out
fn play_against_bot(arena: &ArenaManager, participant: i64) -> bool {
    for _ in 0..200 {
        let board = match arena.current_board(participant) {
            Ok(board) => board,
            Err(_) => return true,
        };
        let Some(&position) = board.empty_positions().first() else {
            return false;
        };

        match arena.submit_move(participant, position) {
            Ok(MoveOutcome::Applied(report)) => {
                if matches!(report.resolution, Resolution::Won { .. }) {
                    return true;
                }
            }
            Ok(MoveOutcome::Rejected { reason }) => panic!("move rejected: {}", reason),
            Err(_) => return true,
        }
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bot_games_stay_isolated() {
    let arena = Arc::new(ArenaManager::new(vec![3, 4], Some(99)));

    let handles = (0..20i64).map(|participant| {
        let arena = arena.clone();
        tokio::spawn(async move {
            let size = if participant % 2 == 0 { 3 } else { 4 };
            arena
                .request_match(participant, size, OpponentPreference::Bot { symbol: Symbol::X })
                .expect("bot session");
            let finished = play_against_bot(&arena, participant);
            if !finished {
                arena.surrender(participant).expect("surrender");
            }
            finished
        })
    });

    for result in join_all(handles).await {
        result.expect("task panicked");
    }

    let stats = assert_ok!(arena.stats());
    assert_eq!(stats.active_sessions, 0);
    assert_eq!(stats.sessions_created, 20);
    assert_eq!(stats.games_won + stats.surrenders, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commands_through_service() {
    let system = Arc::new(create_test_system(5));

    let requests = (0..10i64).map(|participant| {
        let system = system.clone();
        async move {
            system
                .service
                .handle_match_request(participant, 3, OpponentPreference::Human)
                .await
        }
    });
    for result in join_all(requests).await {
        assert_ok!(result);
    }
    assert_eq!(assert_ok!(system.arena.stats()).active_sessions, 5);

    let exits = (0..10i64).map(|participant| {
        let system = system.clone();
        async move { system.service.handle_exit(participant).await }
    });
    for result in join_all(exits).await {
        assert_ok!(result);
    }

    // Each pair is torn down by whichever side exits first
    let stats = assert_ok!(system.arena.stats());
    assert_eq!(stats.active_sessions, 0);
    assert_eq!(stats.exits, 5);
}

#[test]
fn test_surrender_races_winning_move() {
    for round in 0..2_000u64 {
        let arena = Arc::new(ArenaManager::new(vec![3, 4], Some(round)));
        arena
            .request_match(1, 3, OpponentPreference::Human)
            .unwrap();
        arena
            .request_match(2, 3, OpponentPreference::Human)
            .unwrap();
        // 2 plays X and is one move from the top row
        for (participant, position) in [(2, 0), (1, 3), (2, 1), (1, 4)] {
            assert!(arena.submit_move(participant, position).unwrap().is_applied());
        }

        let barrier = Arc::new(Barrier::new(2));
        let surrender = {
            let arena = arena.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                arena.surrender(1).is_ok()
            })
        };

        barrier.wait();
        let won = matches!(
            arena.submit_move(2, 2),
            Ok(MoveOutcome::Applied(report)) if matches!(report.resolution, Resolution::Won { .. })
        );
        let surrendered = surrender.join().expect("surrender thread panicked");

        assert!(
            won != surrendered,
            "round {}: won={} surrendered={}",
            round,
            won,
            surrendered
        );
        let stats = arena.stats().unwrap();
        assert_eq!(stats.active_sessions, 0);
        assert_eq!(stats.games_won + stats.surrenders, 1);
    }
}
