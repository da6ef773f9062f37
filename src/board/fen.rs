use crate::board::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Cell, Color, Piece, PieceKind};
use crate::square::Square;

impl Board {
    /// Reset this board to the position described by `fen`.
    ///
    /// Piece lists are rebuilt from the mailbox, the zobrist hash is
    /// recomputed from scratch, and the history collapses to a single
    /// entry for the loaded position.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(format!("expected 6 FEN fields, got {}", parts.len()));
        }

        // 1) piece placement
        for row in 2..10usize {
            for col in 1..9usize {
                self.cells[row * 10 + col] = Cell::Empty;
            }
        }
        let mut idx = 21usize;
        for c in parts[0].chars() {
            match c {
                '/' => {
                    if idx % 10 != 9 {
                        return Err(format!("rank break at index {idx} in {:?}", parts[0]));
                    }
                    idx += 2;
                }
                '1'..='8' => idx += c as usize - '0' as usize,
                _ => {
                    let piece = Piece::from_char(c)
                        .ok_or_else(|| format!("bad piece char {:?} in FEN", c))?;
                    if idx % 10 == 0 || idx % 10 == 9 || idx >= 99 {
                        return Err(format!("piece placement overflows at index {idx}"));
                    }
                    self.cells[idx] = Cell::Occupied(piece);
                    idx += 1;
                }
            }
        }
        if idx != 99 {
            return Err(format!("piece placement covers {} of 64 squares", idx));
        }

        // 2) side to move
        self.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("bad side-to-move field {:?}", other)),
        };

        // 3) castling rights
        self.castling_rights = 0;
        if parts[2] != "-" {
            for c in parts[2].chars() {
                self.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("bad castling char {:?}", other)),
                };
            }
        }

        // 4) en passant target
        self.en_passant = match parts[3] {
            "-" => None,
            sq => Some(sq.parse::<Square>()?),
        };

        // 5) half-move clock, 6) fullmove number
        self.half_move = parts[4]
            .parse()
            .map_err(|_| format!("bad half-move clock {:?}", parts[4]))?;
        let fullmove: u32 = parts[5]
            .parse()
            .map_err(|_| format!("bad fullmove number {:?}", parts[5]))?;
        self.ply = fullmove.saturating_sub(1) * 2
            + if self.side_to_move == Color::Black { 1 } else { 0 };

        self.rebuild_piece_lists();

        let wk = self.piece_lists[Piece::new(Color::White, PieceKind::King).code()].len();
        let bk = self.piece_lists[Piece::new(Color::Black, PieceKind::King).code()].len();
        if wk != 1 || bk != 1 {
            return Err(format!("expected one king per side, got {wk} white / {bk} black"));
        }

        self.refresh_zobrist();
        self.history.clear();
        self.history.push(self.zobrist);
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (1..=8u8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(piece) => {
                        if empty_run > 0 {
                            fen.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push((b'0' + empty_run) as char);
            }
            if rank > 1 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.has_castling(CASTLE_WK) {
                fen.push('K');
            }
            if self.has_castling(CASTLE_WQ) {
                fen.push('Q');
            }
            if self.has_castling(CASTLE_BK) {
                fen.push('k');
            }
            if self.has_castling(CASTLE_BQ) {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.half_move, self.ply / 2 + 1));
        fen
    }
}
