//! Threat, check and pin analysis.
//!
//! The generator never makes a move to test its legality; instead this
//! module computes, for the side to move, every square the opponent
//! attacks, every check currently delivered, and every absolute pin.
//! The generator then filters pseudo-legal destinations against that.

use crate::board::{Board, Cell, Color, Piece, PieceKind};
use crate::square::{
    BISHOP_DIRS, BLACK_PAWN_ATTACKS, KING_DELTAS, KNIGHT_DELTAS, QUEEN_DIRS, ROOK_DIRS, Square,
    SquareSet, WHITE_PAWN_ATTACKS,
};

/// One check against the side to move. `path` holds the squares
/// strictly between a sliding checker and the king (a block on any of
/// them resolves the check); for knight and pawn checks it is empty
/// and only capturing the checker helps.
#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub checker: Square,
    pub path: SquareSet,
    pub is_sliding: bool,
}

/// An absolute pin against the side to move. `path` is every square
/// the pinned piece may occupy without exposing the king: the ray
/// between king and pinner, pinner's square included.
#[derive(Debug, Clone, Copy)]
pub struct Pin {
    pub pinner: Square,
    pub pinned: Square,
    pub path: SquareSet,
}

#[inline]
fn pawn_attack_deltas(color: Color) -> [i16; 2] {
    match color {
        Color::White => WHITE_PAWN_ATTACKS,
        Color::Black => BLACK_PAWN_ATTACKS,
    }
}

/// Every square attacked by `enemy`, plus the number of times the
/// friendly king is attacked (0, 1, or 2+ for double check).
///
/// Sliding rays deliberately pass through the friendly king: the king
/// cannot step backwards along the ray it is checked on, so those
/// x-ray squares must read as attacked.
pub fn threat_map(board: &Board, enemy: Color) -> (SquareSet, u32) {
    let mut map = SquareSet::EMPTY;
    let mut check_count = 0u32;
    let friendly_king = board.king_square(enemy.opposite());

    let mut mark = |map: &mut SquareSet, sq: Square| {
        map.insert(sq);
        if sq == friendly_king {
            check_count += 1;
        }
    };

    for kind_idx in 0..6 {
        let piece = Piece::from_code(enemy as usize * 6 + kind_idx);
        for &from in &board.piece_lists[piece.code()] {
            match piece.kind {
                PieceKind::Knight => {
                    for &delta in &KNIGHT_DELTAS {
                        let target = from.offset(delta);
                        if board.cell(target) != Cell::OffBoard {
                            mark(&mut map, target);
                        }
                    }
                }
                PieceKind::King => {
                    for &delta in &KING_DELTAS {
                        let target = from.offset(delta);
                        if board.cell(target) != Cell::OffBoard {
                            mark(&mut map, target);
                        }
                    }
                }
                PieceKind::Pawn => {
                    // only the two diagonal capture squares; advances
                    // attack nothing
                    for &delta in &pawn_attack_deltas(enemy) {
                        let target = from.offset(delta);
                        if board.cell(target) != Cell::OffBoard {
                            mark(&mut map, target);
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
                        let mut target = from.offset(dir);
                        loop {
                            let cell = board.cell(target);
                            if cell == Cell::OffBoard {
                                break;
                            }
                            mark(&mut map, target);
                            // stop on any piece except the friendly
                            // king, which the ray x-rays through
                            if !cell.is_empty() && target != friendly_king {
                                break;
                            }
                            target = target.offset(dir);
                        }
                    }
                }
            }
        }
    }

    (map, check_count)
}

/// Cast rays outward from the friendly king in the eight queen
/// directions to find sliding checks and pins, then probe the knight
/// and pawn attack squares for contact checks.
pub fn checks_and_pins(board: &Board, king: Square) -> (Vec<Check>, Vec<Pin>) {
    let side = board.side_to_move;
    let enemy = side.opposite();
    let mut checks = Vec::new();
    let mut pins = Vec::new();

    for (dir_idx, &dir) in QUEEN_DIRS.iter().enumerate() {
        let orthogonal = dir_idx < 4;
        let mut friendlies_in_ray = 0;
        let mut closest_friendly = None;
        let mut check_path = SquareSet::EMPTY;
        let mut pin_path = SquareSet::EMPTY;

        let mut current = king.offset(dir);
        loop {
            match board.cell(current) {
                Cell::OffBoard => break,
                Cell::Empty => match friendlies_in_ray {
                    0 => check_path.insert(current),
                    _ => pin_path.insert(current),
                },
                Cell::Occupied(piece) if piece.color == side => {
                    friendlies_in_ray += 1;
                    match friendlies_in_ray {
                        1 => closest_friendly = Some(current),
                        // two friendlies shield the king on this ray
                        _ => break,
                    }
                }
                Cell::Occupied(piece) => {
                    let slides_here = match piece.kind {
                        PieceKind::Queen => true,
                        PieceKind::Rook => orthogonal,
                        PieceKind::Bishop => !orthogonal,
                        _ => false,
                    };
                    if slides_here {
                        match friendlies_in_ray {
                            0 => checks.push(Check {
                                checker: current,
                                path: check_path,
                                is_sliding: true,
                            }),
                            _ => {
                                let mut path = pin_path | check_path;
                                path.insert(current);
                                pins.push(Pin {
                                    pinner: current,
                                    pinned: closest_friendly
                                        .expect("pin recorded without a pinned piece"),
                                    path,
                                });
                            }
                        }
                    }
                    break;
                }
            }
            current = current.offset(dir);
        }
    }

    let enemy_knight = Piece::new(enemy, PieceKind::Knight);
    for &delta in &KNIGHT_DELTAS {
        let from = king.offset(delta);
        if board.cell(from) == Cell::Occupied(enemy_knight) {
            checks.push(Check {
                checker: from,
                path: SquareSet::EMPTY,
                is_sliding: false,
            });
        }
    }

    // the friendly attack deltas, read in reverse, locate enemy pawns
    // that bear on the king
    let enemy_pawn = Piece::new(enemy, PieceKind::Pawn);
    for &delta in &pawn_attack_deltas(side) {
        let from = king.offset(delta);
        if board.cell(from) == Cell::Occupied(enemy_pawn) {
            checks.push(Check {
                checker: from,
                path: SquareSet::EMPTY,
                is_sliding: false,
            });
        }
    }

    (checks, pins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rook_check_has_blockable_path() {
        let b = Board::from_str("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
        let (checks, pins) = checks_and_pins(&b, b.king_square(Color::White));
        assert_eq!(checks.len(), 1);
        assert!(checks[0].is_sliding);
        assert_eq!(checks[0].checker, "a1".parse().unwrap());
        assert_eq!(checks[0].path.len(), 3); // b1, c1, d1
        assert!(pins.is_empty());
    }

    #[test]
    fn knight_check_has_no_path() {
        let b = Board::from_str("4k3/8/8/8/8/3n4/8/4K3 w - - 0 1").unwrap();
        let (checks, _) = checks_and_pins(&b, b.king_square(Color::White));
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].is_sliding);
        assert!(checks[0].path.is_empty());
    }

    #[test]
    fn bishop_pin_path_includes_pinner() {
        // bishop a5 pins the d2 pawn against the white king on e1
        let b = Board::from_str("4k3/8/8/b7/8/8/3P4/4K3 w - - 0 1").unwrap();
        let (checks, pins) = checks_and_pins(&b, b.king_square(Color::White));
        assert!(checks.is_empty());
        assert_eq!(pins.len(), 1);
        let pin = &pins[0];
        assert_eq!(pin.pinned, "d2".parse().unwrap());
        assert_eq!(pin.pinner, "a5".parse().unwrap());
        assert!(pin.path.contains("a5".parse().unwrap()));
        assert!(pin.path.contains("c3".parse().unwrap()));
        assert!(!pin.path.contains("e2".parse().unwrap()));
    }

    #[test]
    fn two_friendlies_block_the_pin() {
        let b = Board::from_str("4k3/8/8/b7/8/2P5/3P4/4K3 w - - 0 1").unwrap();
        let (_, pins) = checks_and_pins(&b, b.king_square(Color::White));
        assert!(pins.is_empty());
    }

    #[test]
    fn threat_map_xrays_through_king() {
        // the rook on e8 attacks e1 *and* the squares behind the
        // checked king along the file would-be-evasion square included
        let b = Board::from_str("4r3/8/8/8/8/8/4K3/7k w - - 0 1").unwrap();
        let (map, check_count) = threat_map(&b, Color::Black);
        assert_eq!(check_count, 1);
        assert!(map.contains("e2".parse().unwrap()));
        assert!(map.contains("e1".parse().unwrap())); // x-ray past the king
    }

    #[test]
    fn double_check_counted_twice() {
        let b = Board::from_str("4k3/8/8/8/8/5n2/8/r3K3 w - - 0 1").unwrap();
        let (_, check_count) = threat_map(&b, Color::Black);
        assert_eq!(check_count, 2);
    }

    #[test]
    fn pawn_threats_are_diagonal_only() {
        let b = Board::from_str("4k3/8/8/8/3p4/8/8/4K3 w - - 0 1").unwrap();
        let (map, _) = threat_map(&b, Color::Black);
        assert!(map.contains("c3".parse().unwrap()));
        assert!(map.contains("e3".parse().unwrap()));
        assert!(!map.contains("d3".parse().unwrap())); // advance, not attack
    }
}
