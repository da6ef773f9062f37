//! Legal move generation.
//!
//! Pseudo-legal destinations are enumerated per piece, then filtered
//! against the analyzer's threat map, check list and pin list. No
//! make-and-probe pass exists; every returned move is fully legal.

use crate::board::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Cell, Color, Piece, PieceKind};
use crate::moves::analysis::{Check, checks_and_pins, threat_map};
use crate::moves::ep_victim_square;
use crate::moves::types::{Move, PROMOTION_KINDS, StateSnapshot};
use crate::square::{
    BISHOP_DIRS, BLACK_PAWN_ATTACKS, KING_DELTAS, KNIGHT_DELTAS, NORTH, QUEEN_DIRS, ROOK_DIRS,
    SOUTH, Square, WHITE_PAWN_ATTACKS,
};

// Castling geometry. The king's destination doubles as the castle
// identifier on the move record.
const WHITE_KS_DEST: Square = Square::from_file_rank(6, 1); // g1
const WHITE_QS_DEST: Square = Square::from_file_rank(2, 1); // c1
const BLACK_KS_DEST: Square = Square::from_file_rank(6, 8); // g8
const BLACK_QS_DEST: Square = Square::from_file_rank(2, 8); // c8

struct CastleLane {
    right: u8,
    /// squares that must be empty between king and rook
    empty: &'static [Square],
    /// squares the king crosses that must not be attacked
    safe: &'static [Square],
    dest: Square,
}

const WHITE_LANES: [CastleLane; 2] = [
    CastleLane {
        right: CASTLE_WK,
        empty: &[Square::from_file_rank(5, 1), Square::from_file_rank(6, 1)],
        safe: &[Square::from_file_rank(5, 1), Square::from_file_rank(6, 1)],
        dest: WHITE_KS_DEST,
    },
    CastleLane {
        right: CASTLE_WQ,
        empty: &[
            Square::from_file_rank(1, 1),
            Square::from_file_rank(2, 1),
            Square::from_file_rank(3, 1),
        ],
        // the b-file is crossed by the rook only
        safe: &[Square::from_file_rank(2, 1), Square::from_file_rank(3, 1)],
        dest: WHITE_QS_DEST,
    },
];

const BLACK_LANES: [CastleLane; 2] = [
    CastleLane {
        right: CASTLE_BK,
        empty: &[Square::from_file_rank(5, 8), Square::from_file_rank(6, 8)],
        safe: &[Square::from_file_rank(5, 8), Square::from_file_rank(6, 8)],
        dest: BLACK_KS_DEST,
    },
    CastleLane {
        right: CASTLE_BQ,
        empty: &[
            Square::from_file_rank(1, 8),
            Square::from_file_rank(2, 8),
            Square::from_file_rank(3, 8),
        ],
        safe: &[Square::from_file_rank(2, 8), Square::from_file_rank(3, 8)],
        dest: BLACK_QS_DEST,
    },
];

fn non_sliding_destinations(board: &Board, from: Square, deltas: &[i16], out: &mut Vec<Square>) {
    for &delta in deltas {
        let target = from.offset(delta);
        if board.cell(target) != Cell::OffBoard {
            out.push(target);
        }
    }
}

fn sliding_destinations(board: &Board, from: Square, dirs: &[i16], out: &mut Vec<Square>) {
    for &dir in dirs {
        let mut target = from.offset(dir);
        loop {
            let cell = board.cell(target);
            if cell == Cell::OffBoard {
                break;
            }
            out.push(target);
            if !cell.is_empty() {
                break;
            }
            target = target.offset(dir);
        }
    }
}

/// Advances onto empty squares (two from the home rank iff both are
/// clear), captures onto enemy pieces, and the en-passant target when
/// it lies on a capture diagonal.
fn pawn_destinations(board: &Board, side: Color, from: Square, out: &mut Vec<Square>) {
    let (advance, attacks, home_rank) = match side {
        Color::White => (NORTH, WHITE_PAWN_ATTACKS, 2),
        Color::Black => (SOUTH, BLACK_PAWN_ATTACKS, 7),
    };

    let one = from.offset(advance);
    if board.cell(one).is_empty() {
        out.push(one);
        if from.rank() == home_rank {
            let two = one.offset(advance);
            if board.cell(two).is_empty() {
                out.push(two);
            }
        }
    }

    for &delta in &attacks {
        let target = from.offset(delta);
        match board.cell(target) {
            Cell::Occupied(p) if p.color != side => out.push(target),
            _ => {
                if Some(target) == board.en_passant {
                    out.push(target);
                }
            }
        }
    }
}

/// Returns the fully legal moves for the side to move, along with the
/// number of checks currently delivered against it.
pub fn generate_moves(board: &Board) -> (Vec<Move>, u32) {
    let side = board.side_to_move;
    let enemy = side.opposite();
    let (threats, check_count) = threat_map(board, enemy);
    let king_sq = board.king_square(side);
    let snapshot = StateSnapshot::of(board);

    let mut moves = Vec::with_capacity(48);

    // Double check: nothing but a king move can help.
    if check_count >= 2 {
        let king = Piece::new(side, PieceKind::King);
        for &delta in &KING_DELTAS {
            let to = king_sq.offset(delta);
            let cell = board.cell(to);
            if cell == Cell::OffBoard || threats.contains(to) {
                continue;
            }
            match cell.piece() {
                Some(p) if p.color == side => continue,
                captured => moves.push(Move {
                    piece: king,
                    from: king_sq,
                    to,
                    captured,
                    is_en_passant: false,
                    is_castle: false,
                    promotion: None,
                    undo: snapshot,
                }),
            }
        }
        return (moves, check_count);
    }

    let (checks, pins) = checks_and_pins(board, king_sq);
    let single_check: Option<&Check> = checks.first();

    let promotion_rank = match side {
        Color::White => 8,
        Color::Black => 1,
    };

    let mut dests: Vec<Square> = Vec::with_capacity(28);

    for idx in 21..99u8 {
        let from = Square::from_index(idx);
        let piece = match board.cell(from) {
            Cell::Occupied(p) if p.color == side => p,
            _ => continue,
        };

        dests.clear();
        match piece.kind {
            PieceKind::Knight => non_sliding_destinations(board, from, &KNIGHT_DELTAS, &mut dests),
            PieceKind::King => non_sliding_destinations(board, from, &KING_DELTAS, &mut dests),
            PieceKind::Bishop => sliding_destinations(board, from, &BISHOP_DIRS, &mut dests),
            PieceKind::Rook => sliding_destinations(board, from, &ROOK_DIRS, &mut dests),
            PieceKind::Queen => sliding_destinations(board, from, &QUEEN_DIRS, &mut dests),
            PieceKind::Pawn => pawn_destinations(board, side, from, &mut dests),
        }

        'dest: for &to in &dests {
            let is_en_passant = piece.kind == PieceKind::Pawn && Some(to) == board.en_passant;

            // 1) check filter: a non-king move must capture the checker
            //    or block a sliding check
            if let Some(check) = single_check
                && piece.kind != PieceKind::King
            {
                let captures_checker = to == check.checker
                    || (is_en_passant && ep_victim_square(side, to) == check.checker);
                let blocks = check.is_sliding && check.path.contains(to);
                if !captures_checker && !blocks {
                    continue 'dest;
                }
            }

            // 2) the king may not step onto an attacked square
            if piece.kind == PieceKind::King && threats.contains(to) {
                continue 'dest;
            }

            // 3) a pinned piece stays on its pin ray
            if let Some(pin) = pins.iter().find(|p| p.pinned == from)
                && !pin.path.contains(to)
            {
                continue 'dest;
            }

            // 4) never onto a friendly piece
            let captured_on_to = match board.cell(to).piece() {
                Some(p) if p.color == side => continue 'dest,
                occupant => occupant,
            };

            if piece.kind != PieceKind::Pawn {
                moves.push(Move {
                    piece,
                    from,
                    to,
                    captured: captured_on_to,
                    is_en_passant: false,
                    is_castle: false,
                    promotion: None,
                    undo: snapshot,
                });
            } else if is_en_passant {
                moves.push(Move {
                    piece,
                    from,
                    to,
                    captured: Some(Piece::new(enemy, PieceKind::Pawn)),
                    is_en_passant: true,
                    is_castle: false,
                    promotion: None,
                    undo: snapshot,
                });
            } else if to.rank() == promotion_rank {
                for kind in PROMOTION_KINDS {
                    moves.push(Move {
                        piece,
                        from,
                        to,
                        captured: captured_on_to,
                        is_en_passant: false,
                        is_castle: false,
                        promotion: Some(Piece::new(side, kind)),
                        undo: snapshot,
                    });
                }
            } else {
                moves.push(Move {
                    piece,
                    from,
                    to,
                    captured: captured_on_to,
                    is_en_passant: false,
                    is_castle: false,
                    promotion: None,
                    undo: snapshot,
                });
            }
        }
    }

    // Castling: legal only when not in check, with the lane clear and
    // every square the king crosses unattacked.
    if single_check.is_none() {
        let lanes = match side {
            Color::White => &WHITE_LANES,
            Color::Black => &BLACK_LANES,
        };
        for lane in lanes {
            if !board.has_castling(lane.right) {
                continue;
            }
            if lane.empty.iter().any(|&sq| !board.cell(sq).is_empty()) {
                continue;
            }
            if lane.safe.iter().any(|&sq| threats.contains(sq)) {
                continue;
            }
            moves.push(Move {
                piece: Piece::new(side, PieceKind::King),
                from: king_sq,
                to: lane.dest,
                captured: None,
                is_en_passant: false,
                is_castle: true,
                promotion: None,
                undo: snapshot,
            });
        }
    }

    (moves, check_count)
}
