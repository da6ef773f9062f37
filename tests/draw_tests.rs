//! Repetition and fifty-move bookkeeping over real move sequences.

use courier::board::Board;
use courier::moves::movegen::generate_moves;
use courier::moves::types::find_uci_move;
use courier::status::{GameStatus, position_status};
use std::str::FromStr;

fn play(board: &mut Board, uci: &str) {
    let (legal, _) = generate_moves(board);
    let mv = find_uci_move(uci, &legal)
        .unwrap_or_else(|| panic!("{} should be legal in {}", uci, board.to_fen()));
    board.make_move(&mv);
}

#[test]
fn knight_shuffle_is_a_repetition() {
    let mut board = Board::new();
    for uci in [
        "g1f3", "g8f6", "f3g1", "f6g8", // first return to the start
        "g1f3", "g8f6", "f3g1", "f6g8", // and again
    ] {
        play(&mut board, uci);
    }
    assert!(board.is_repetition());
    // start position seen three times in total: threefold
    assert!(board.is_threefold());
    assert_eq!(position_status(&board), GameStatus::DrawThreefold);
}

#[test]
fn repetition_is_detected_on_the_first_return() {
    let mut board = Board::new();
    assert!(!board.is_repetition());
    for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        play(&mut board, uci);
    }
    assert!(board.is_repetition());
    assert!(!board.is_threefold());
}

#[test]
fn pawn_moves_reset_the_repetition_window() {
    let mut board = Board::new();
    for uci in ["g1f3", "g8f6", "f3g1", "f6g8", "e2e4"] {
        play(&mut board, uci);
    }
    // the pawn move is irreversible; nothing since it repeats
    assert!(!board.is_repetition());
}

#[test]
fn fifty_move_counter_accumulates_to_the_draw() {
    let mut board = Board::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 98 80").unwrap();
    assert!(!board.fifty_move_met());
    play(&mut board, "a1a2");
    play(&mut board, "e8d8");
    assert!(board.fifty_move_met());
    assert_eq!(position_status(&board), GameStatus::DrawFiftyMove);
}

#[test]
fn capture_resets_the_fifty_move_counter() {
    let mut board = Board::from_str("4k3/8/8/8/8/8/5r2/R3K3 w - - 99 80").unwrap();
    play(&mut board, "a1a2");
    assert!(board.fifty_move_met());
    let mut board = Board::from_str("4k3/8/8/8/8/8/5r2/R4K2 w - - 99 80").unwrap();
    play(&mut board, "f1f2"); // king takes the rook
    assert_eq!(board.half_move, 0);
}
