//! Game-status classification for the service layer. The search only
//! ever reports draws as score 0; turning a position into "this game
//! is over, and why" happens here.

use crate::board::{Board, Color, Piece, PieceKind};
use crate::moves::movegen::generate_moves;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    InPlay,
    Checkmate,
    Stalemate,
    DrawFiftyMove,
    DrawThreefold,
    DrawDeadPosition,
}

fn minor_count(board: &Board, color: Color) -> usize {
    board.piece_lists[Piece::new(color, PieceKind::Bishop).code()].len()
        + board.piece_lists[Piece::new(color, PieceKind::Knight).code()].len()
}

/// Neither side retains mating material: bare kings, a single minor
/// piece, one minor each, or two knights against a bare king.
pub fn is_insufficient_material(board: &Board) -> bool {
    for color in [Color::White, Color::Black] {
        for kind in [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen] {
            if !board.piece_lists[Piece::new(color, kind).code()].is_empty() {
                return false;
            }
        }
    }

    let white_minors = minor_count(board, Color::White);
    let black_minors = minor_count(board, Color::Black);
    let white_knights =
        board.piece_lists[Piece::new(Color::White, PieceKind::Knight).code()].len();
    let black_knights =
        board.piece_lists[Piece::new(Color::Black, PieceKind::Knight).code()].len();

    match white_minors + black_minors {
        0 | 1 => true,
        2 => {
            // KNN vs K cannot force mate; one minor each cannot either.
            // Two minors on one side (KBB, KBN) can mate.
            white_knights == 2 || black_knights == 2 || (white_minors == 1 && black_minors == 1)
        }
        _ => false,
    }
}

/// Classify the current position. Draw rules are checked before the
/// move-based outcomes so a mate-on-the-board in a dead-drawn position
/// never arises.
pub fn position_status(board: &Board) -> GameStatus {
    if board.is_threefold() {
        return GameStatus::DrawThreefold;
    }
    if board.fifty_move_met() {
        return GameStatus::DrawFiftyMove;
    }
    if is_insufficient_material(board) {
        return GameStatus::DrawDeadPosition;
    }

    let (legal, check_count) = generate_moves(board);
    if legal.is_empty() {
        if check_count > 0 {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    } else {
        GameStatus::InPlay
    }
}
