//! The public engine contract: iterative deepening under a clock,
//! book-move passthrough, and the service-facing report shape.

use courier::board::Board;
use courier::moves::movegen::generate_moves;
use courier::moves::types::find_uci_move;
use courier::search::engine::{Engine, EngineError, MoveInfo};
use std::str::FromStr;
use std::time::Duration;

#[test]
fn one_second_search_from_a_real_opening_reaches_useful_depth() {
    // 1. e4 e5, white to move with a one-second budget
    let mut board = Board::new();
    for uci in ["e2e4", "e7e5"] {
        let (legal, _) = generate_moves(&board);
        board.make_move(&find_uci_move(uci, &legal).unwrap());
    }

    let mut engine = Engine::new(64);
    let report = engine
        .find_best_move(&board, board.side_to_move, Duration::from_secs(1), None)
        .expect("an opening position always has moves");

    let (legal, _) = generate_moves(&board);
    assert!(legal.contains(&report.mv), "engine move must be legal");
    assert!(report.depth.unwrap() >= 2);
    assert!(report.nodes.unwrap() > 0);
    assert!(!report.is_book);
}

#[test]
fn generous_budget_always_produces_a_move() {
    for fen in [
        "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/8/8/8/8/2k5/8/K7 w - - 0 1",
    ] {
        let board = Board::from_str(fen).unwrap();
        let mut engine = Engine::new(2);
        let report = engine
            .find_best_move(&board, board.side_to_move, Duration::from_secs(60), None)
            .expect("every test position has at least one legal move");
        let (legal, _) = generate_moves(&board);
        assert!(legal.contains(&report.mv), "illegal move from {}", fen);
    }
}

#[test]
fn supplied_book_move_is_returned_unsearched() {
    let board = Board::new();
    let (legal, _) = generate_moves(&board);
    let book = find_uci_move("e2e4", &legal).unwrap();

    let mut engine = Engine::new(64);
    let report = engine
        .find_best_move(&board, board.side_to_move, Duration::from_secs(1), Some(book))
        .unwrap();

    assert!(report.is_book);
    assert_eq!(report.mv, book);
    assert_eq!(report.depth, None);
    assert_eq!(report.nodes, None);
}

#[test]
fn illegal_book_move_falls_back_to_the_search() {
    // a legal move for a different position: e2e4 again after e4 e5
    let mut board = Board::new();
    let (legal, _) = generate_moves(&board);
    let stale_book = find_uci_move("e2e4", &legal).unwrap();
    board.make_move(&stale_book);

    let mut engine = Engine::new(2);
    let report = engine
        .find_best_move(&board, board.side_to_move, Duration::from_secs(30), Some(stale_book))
        .unwrap();

    assert!(!report.is_book);
    let (legal_now, _) = generate_moves(&board);
    assert!(legal_now.contains(&report.mv));
}

#[test]
fn terminal_position_reports_no_move_found() {
    // stalemate: nothing to play
    let board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let mut engine = Engine::new(2);
    let err = engine
        .find_best_move(&board, board.side_to_move, Duration::from_secs(5), None)
        .unwrap_err();
    assert_eq!(err, EngineError::NoMoveFound);
}

#[test]
fn caller_board_is_untouched_by_the_search() {
    let board = Board::from_str(
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 2 3",
    )
    .unwrap();
    let snapshot = board.clone();

    let mut engine = Engine::new(3);
    engine
        .find_best_move(&board, board.side_to_move, Duration::from_secs(60), None)
        .unwrap();
    assert_eq!(board, snapshot);
}

#[test]
fn move_info_serializes_the_dispatcher_fields() {
    let board = Board::new();
    let mut engine = Engine::new(2);
    let report = engine
        .find_best_move(&board, board.side_to_move, Duration::from_secs(30), None)
        .unwrap();

    let info = MoveInfo::from(&report);
    assert_eq!(info.mv, report.mv.to_uci());
    assert_eq!(info.depth, Some(2));
    assert!(!info.is_book);
}

#[test]
fn repeated_searches_reuse_the_engine() {
    // play a short engine-vs-engine sequence through one instance;
    // killer/history/TT state carries across calls without corrupting
    // anything
    let mut board = Board::new();
    let mut engine = Engine::new(3);

    for _ in 0..6 {
        let report = engine
            .find_best_move(&board, board.side_to_move, Duration::from_secs(60), None)
            .expect("midgame positions have moves");
        let (legal, _) = generate_moves(&board);
        assert!(legal.contains(&report.mv));
        board.make_move(&report.mv);
        assert_eq!(board.zobrist, board.compute_zobrist_full());
    }
}
