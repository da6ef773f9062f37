//! Static evaluation: tapered material + piece-square tables, with
//! mobility, king attack pressure and pawn-shield adjustments. Scores
//! are centipawns from white's perspective and the function never
//! mutates the board.

use crate::board::{Board, Cell, Color, Piece, PieceKind};
use crate::search::pesto;
use crate::square::{
    BISHOP_DIRS, KING_DELTAS, KNIGHT_DELTAS, QUEEN_DIRS, ROOK_DIRS, Square, SquareSet,
};

const MAX_PHASE: i32 = 24;
const KING_BASE: i32 = 20000;
const MOBILITY_WEIGHT: i32 = 2;

/// Penalty by total attack score accumulated against a king's ring.
const KING_ATTACK_PENALTIES: [i32; 10] = [0, 5, 15, 40, 70, 100, 150, 200, 250, 300];

/// Ring attack bonuses per attacker kind.
const QUEEN_RING_BONUS: i32 = 5;
const ROOK_RING_BONUS: i32 = 4;
const MINOR_RING_BONUS: i32 = 2;

const SHIELD_MISSING_PENALTY: i32 = 25;
const SHIELD_PUSHED_PENALTY: i32 = 15;

fn king_ring(king: Square) -> SquareSet {
    KING_DELTAS.iter().map(|&d| king.offset(d)).collect()
}

/// Evaluate the position. Positive favors white.
pub fn evaluate(board: &Board) -> i32 {
    let mut phase = 0i32;
    // indexed by Color as usize
    let mut mg = [0i32; 2];
    let mut eg = [0i32; 2];
    let mut mobility = [0i32; 2];
    let mut ring_attack = [0i32; 2];

    let kings = [
        board.king_square(Color::White),
        board.king_square(Color::Black),
    ];
    let rings = [king_ring(kings[0]), king_ring(kings[1])];

    for code in 0..12 {
        let piece = Piece::from_code(code);
        let us = piece.color as usize;
        let enemy_ring = rings[1 - us];
        let (mg_table, eg_table) = pesto::tables(piece.kind);
        let base = match piece.kind {
            PieceKind::King => KING_BASE,
            kind => kind.value(),
        };
        let ring_bonus = match piece.kind {
            PieceKind::Queen => QUEEN_RING_BONUS,
            PieceKind::Rook => ROOK_RING_BONUS,
            PieceKind::Bishop | PieceKind::Knight => MINOR_RING_BONUS,
            _ => 0,
        };

        for &sq in &board.piece_lists[code] {
            let pst_index = match piece.color {
                Color::White => sq.to_64(),
                Color::Black => sq.flip_vertical().to_64(),
            };
            mg[us] += base + mg_table[pst_index];
            eg[us] += base + eg_table[pst_index];
            phase += piece.kind.phase_weight();

            match piece.kind {
                PieceKind::Pawn => {}
                PieceKind::King => {
                    for &delta in &KING_DELTAS {
                        if board.cell(sq.offset(delta)).is_empty() {
                            mobility[us] += 1;
                        }
                    }
                }
                PieceKind::Knight => {
                    for &delta in &KNIGHT_DELTAS {
                        let target = sq.offset(delta);
                        let cell = board.cell(target);
                        if cell == Cell::OffBoard {
                            continue;
                        }
                        if enemy_ring.contains(target) {
                            ring_attack[us] += ring_bonus;
                        }
                        if cell.is_empty() {
                            mobility[us] += 1;
                        }
                    }
                }
                PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
                    let dirs: &[i16] = match piece.kind {
                        PieceKind::Bishop => &BISHOP_DIRS,
                        PieceKind::Rook => &ROOK_DIRS,
                        _ => &QUEEN_DIRS,
                    };
                    for &dir in dirs {
                        let mut target = sq.offset(dir);
                        loop {
                            let cell = board.cell(target);
                            if cell == Cell::OffBoard {
                                break;
                            }
                            if enemy_ring.contains(target) {
                                ring_attack[us] += ring_bonus;
                            }
                            if !cell.is_empty() {
                                break;
                            }
                            mobility[us] += 1;
                            target = target.offset(dir);
                        }
                    }
                }
            }
        }
    }

    let phase = phase.min(MAX_PHASE);
    let interpolate = |mg: i32, eg: i32| (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE;
    let white_interp = interpolate(mg[0], eg[0]);
    let black_interp = interpolate(mg[1], eg[1]);

    let mobility_adjustment = MOBILITY_WEIGHT * (mobility[0] - mobility[1]);

    // King safety: pawn-shield penalties for a king on its back rank,
    // plus the bounded ring-pressure penalty; both fade out of the
    // evaluation as material leaves the board.
    let mut penalty = [0i32; 2];
    penalty[0] += shield_penalty(board, kings[0], Color::White);
    penalty[1] += shield_penalty(board, kings[1], Color::Black);
    penalty[0] += KING_ATTACK_PENALTIES[ring_attack[1].min(9) as usize];
    penalty[1] += KING_ATTACK_PENALTIES[ring_attack[0].min(9) as usize];
    let white_tapered = penalty[0] * phase / MAX_PHASE;
    let black_tapered = penalty[1] * phase / MAX_PHASE;
    let king_safety_adjustment = black_tapered - white_tapered;

    (white_interp - black_interp) + mobility_adjustment + king_safety_adjustment
}

/// Penalize missing shield pawns on the three files around a king that
/// still sits on its back rank. A pawn one step forward is full cover,
/// a pawn two steps forward partial, neither costs the most.
fn shield_penalty(board: &Board, king: Square, color: Color) -> i32 {
    let (back_rank, near_rank, far_rank) = match color {
        Color::White => (1, 2, 3),
        Color::Black => (8, 7, 6),
    };
    if king.rank() != back_rank {
        return 0;
    }

    let own_pawn = Cell::Occupied(Piece::new(color, PieceKind::Pawn));
    let near_row = (10 - near_rank) * 10;
    let far_row = (10 - far_rank) * 10;
    let mut penalty = 0;
    // mailbox columns, so the off-board neighbors of a corner king
    // count as shieldless files
    let king_col = king.index() % 10;
    for col in king_col - 1..=king_col + 1 {
        let near = Square::from_index(near_row + col);
        let far = Square::from_index(far_row + col);
        if board.cell(near) != own_pawn {
            if board.cell(far) != own_pawn {
                penalty += SHIELD_MISSING_PENALTY;
            } else {
                penalty += SHIELD_PUSHED_PENALTY;
            }
        }
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(evaluate(&Board::new()), 0);
    }

    #[test]
    fn lone_kings_are_near_zero() {
        let b = Board::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(evaluate(&b).abs() < 50);
    }

    #[test]
    fn extra_queen_dominates_the_score() {
        let b = Board::from_str("4k3/8/8/8/8/8/4Q3/4K3 w - - 0 1").unwrap();
        assert!(evaluate(&b) > 700);
    }

    #[test]
    fn color_mirror_negates_the_score() {
        // scholar's-mate threat position and its color/rank mirror
        let b = Board::from_str(
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 2 3",
        )
        .unwrap();
        let mirrored = Board::from_str(
            "rnb1k1nr/pppp1ppp/5q2/2b1p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3",
        )
        .unwrap();
        assert_eq!(evaluate(&b), -evaluate(&mirrored));
    }

    #[test]
    fn broken_pawn_shield_is_penalized() {
        // enough material stays on the board that king safety matters
        let intact = Board::from_str("rq4k1/5ppp/8/8/8/8/5PPP/RQ4K1 w - - 0 1").unwrap();
        let broken = Board::from_str("rq4k1/5ppp/8/7P/8/8/5PP1/RQ4K1 w - - 0 1").unwrap();
        assert!(evaluate(&broken) < evaluate(&intact));
    }
}
