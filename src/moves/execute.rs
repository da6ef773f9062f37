//! Move execution and reversal.
//!
//! `make_move` mutates the board in place, maintaining the mailbox,
//! the piece lists and the zobrist hash incrementally, and pushes the
//! new hash onto the history. `unmake_move` restores the prior state
//! exactly, using the snapshot the move carries.

use crate::board::{
    Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Cell, Color, Piece, PieceKind,
};
use crate::hash::zobrist::zobrist_keys;
use crate::moves::ep_victim_square;
use crate::moves::types::Move;
use crate::square::Square;

const WHITE_ROOK_KS_HOME: Square = Square::from_file_rank(7, 1); // h1
const WHITE_ROOK_QS_HOME: Square = Square::from_file_rank(0, 1); // a1
const BLACK_ROOK_KS_HOME: Square = Square::from_file_rank(7, 8); // h8
const BLACK_ROOK_QS_HOME: Square = Square::from_file_rank(0, 8); // a8

/// Rook relocation for a castle, keyed by the king's landing square.
fn rook_lane(king_dest: Square) -> (Square, Square) {
    match (king_dest.file(), king_dest.rank()) {
        (6, 1) => (WHITE_ROOK_KS_HOME, Square::from_file_rank(5, 1)),
        (2, 1) => (WHITE_ROOK_QS_HOME, Square::from_file_rank(3, 1)),
        (6, 8) => (BLACK_ROOK_KS_HOME, Square::from_file_rank(5, 8)),
        (2, 8) => (BLACK_ROOK_QS_HOME, Square::from_file_rank(3, 8)),
        _ => panic!("not a castle destination: {}", king_dest),
    }
}

impl Board {
    /// Apply a move produced by the generator for this exact position.
    pub fn make_move(&mut self, mv: &Move) {
        let keys = zobrist_keys();
        let piece = mv.piece;
        let side = self.side_to_move;

        if mv.is_castle {
            let rook = Piece::new(side, PieceKind::Rook);
            let (rook_from, rook_to) = rook_lane(mv.to);

            self.set_cell(mv.from, Cell::Empty);
            self.set_cell(mv.to, Cell::Occupied(piece));
            self.set_cell(rook_from, Cell::Empty);
            self.set_cell(rook_to, Cell::Occupied(rook));

            self.list_move(piece, mv.from, mv.to);
            self.list_move(rook, rook_from, rook_to);

            self.zobrist ^= keys.piece[piece.code()][mv.from.to_64()];
            self.zobrist ^= keys.piece[piece.code()][mv.to.to_64()];
            self.zobrist ^= keys.piece[rook.code()][rook_from.to_64()];
            self.zobrist ^= keys.piece[rook.code()][rook_to.to_64()];
        } else if mv.is_en_passant {
            let captured = mv.captured.expect("en passant always captures a pawn");
            let victim_sq = ep_victim_square(side, mv.to);

            self.set_cell(mv.from, Cell::Empty);
            self.set_cell(mv.to, Cell::Occupied(piece));
            self.set_cell(victim_sq, Cell::Empty);

            self.list_move(piece, mv.from, mv.to);
            self.list_remove(captured, victim_sq);

            self.zobrist ^= keys.piece[piece.code()][mv.from.to_64()];
            self.zobrist ^= keys.piece[piece.code()][mv.to.to_64()];
            self.zobrist ^= keys.piece[captured.code()][victim_sq.to_64()];
        } else {
            self.set_cell(mv.from, Cell::Empty);
            self.zobrist ^= keys.piece[piece.code()][mv.from.to_64()];

            if let Some(captured) = mv.captured {
                self.list_remove(captured, mv.to);
                self.zobrist ^= keys.piece[captured.code()][mv.to.to_64()];
            }

            if let Some(promo) = mv.promotion {
                self.set_cell(mv.to, Cell::Occupied(promo));
                self.list_remove(piece, mv.from);
                self.list_push(promo, mv.to);
                self.zobrist ^= keys.piece[promo.code()][mv.to.to_64()];
            } else {
                self.set_cell(mv.to, Cell::Occupied(piece));
                self.list_move(piece, mv.from, mv.to);
                self.zobrist ^= keys.piece[piece.code()][mv.to.to_64()];
            }
        }

        self.ply += 1;
        self.side_to_move = side.opposite();
        self.zobrist ^= keys.side_to_move;

        if piece.kind == PieceKind::Pawn || mv.captured.is_some() {
            self.half_move = 0;
        } else {
            self.half_move += 1;
        }

        // En-passant target: clear the old one, set a fresh one only
        // after a double pawn push.
        if let Some(old_ep) = self.en_passant {
            self.zobrist ^= keys.ep_file[old_ep.file() as usize];
        }
        self.en_passant = None;
        if piece.kind == PieceKind::Pawn {
            let double_push = match side {
                Color::White => mv.from.rank() == 2 && mv.to.rank() == 4,
                Color::Black => mv.from.rank() == 7 && mv.to.rank() == 5,
            };
            if double_push {
                let skipped = ep_victim_square(side, mv.to);
                self.en_passant = Some(skipped);
                self.zobrist ^= keys.ep_file[skipped.file() as usize];
            }
        }

        // Castling rights: rehash via the 4-bit combination. Rights
        // fall when the king moves, and whenever a home corner no
        // longer holds its rook (covers rook moves and rook captures).
        let old_rights = self.castling_rights;
        if mv.is_castle || piece.kind == PieceKind::King {
            self.castling_rights &= match side {
                Color::White => !(CASTLE_WK | CASTLE_WQ),
                Color::Black => !(CASTLE_BK | CASTLE_BQ),
            };
        }
        if !mv.is_castle {
            let white_rook = Cell::Occupied(Piece::new(Color::White, PieceKind::Rook));
            let black_rook = Cell::Occupied(Piece::new(Color::Black, PieceKind::Rook));
            if self.cell(WHITE_ROOK_KS_HOME) != white_rook {
                self.castling_rights &= !CASTLE_WK;
            }
            if self.cell(WHITE_ROOK_QS_HOME) != white_rook {
                self.castling_rights &= !CASTLE_WQ;
            }
            if self.cell(BLACK_ROOK_KS_HOME) != black_rook {
                self.castling_rights &= !CASTLE_BK;
            }
            if self.cell(BLACK_ROOK_QS_HOME) != black_rook {
                self.castling_rights &= !CASTLE_BQ;
            }
        }
        if self.castling_rights != old_rights {
            self.zobrist ^= keys.castling[old_rights as usize];
            self.zobrist ^= keys.castling[self.castling_rights as usize];
        }

        self.history.push(self.zobrist);

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Exact inverse of the paired `make_move`.
    pub fn unmake_move(&mut self, mv: &Move) {
        let piece = mv.piece;
        let mover = mv.undo.side_to_move;

        if mv.is_castle {
            let rook = Piece::new(mover, PieceKind::Rook);
            let (rook_from, rook_to) = rook_lane(mv.to);

            self.set_cell(mv.to, Cell::Empty);
            self.set_cell(rook_to, Cell::Empty);
            self.set_cell(mv.from, Cell::Occupied(piece));
            self.set_cell(rook_from, Cell::Occupied(rook));

            self.list_move(piece, mv.to, mv.from);
            self.list_move(rook, rook_to, rook_from);
        } else if mv.is_en_passant {
            let captured = mv.captured.expect("en passant always captures a pawn");
            let victim_sq = ep_victim_square(mover, mv.to);

            self.set_cell(mv.from, Cell::Occupied(piece));
            self.set_cell(mv.to, Cell::Empty);
            self.set_cell(victim_sq, Cell::Occupied(captured));

            self.list_move(piece, mv.to, mv.from);
            self.list_push(captured, victim_sq);
        } else {
            self.set_cell(mv.from, Cell::Occupied(piece));
            self.set_cell(
                mv.to,
                match mv.captured {
                    Some(captured) => Cell::Occupied(captured),
                    None => Cell::Empty,
                },
            );

            if let Some(promo) = mv.promotion {
                self.list_remove(promo, mv.to);
                self.list_push(piece, mv.from);
            } else {
                self.list_move(piece, mv.to, mv.from);
            }
            if let Some(captured) = mv.captured {
                self.list_push(captured, mv.to);
            }
        }

        self.ply -= 1;
        self.side_to_move = mv.undo.side_to_move;
        self.half_move = mv.undo.half_move;
        self.en_passant = mv.undo.en_passant;
        self.castling_rights = mv.undo.castling_rights;
        self.zobrist = mv.undo.zobrist;
        self.history.pop();

        #[cfg(debug_assertions)]
        self.assert_hash();
    }
}
