//! The inner game-tree search: alpha-beta in explicit maximizer /
//! minimizer branches, with principal-variation null windows, late
//! move reductions, futility pruning, transposition cutoffs, and a
//! capture-only quiescence extension at the leaves.

use crate::board::{Board, Color, PieceKind};
use crate::moves::movegen::generate_moves;
use crate::moves::types::Move;
use crate::search::engine::Engine;
use crate::search::eval::evaluate;
use crate::search::tt::{Bound, TtEntry};
use std::time::{Duration, Instant};

pub(crate) const INFINITY: i32 = 1_000_000;

/// Mate scores are MATE_SCORE minus the ply the mate is delivered at,
/// so nearer mates always compare better.
pub(crate) const MATE_SCORE: i32 = 99_999;

/// Futility is disabled once the static eval says the position is
/// already won by more than a rook, or the board is nearly empty.
const WIN_SCORE: i32 = 500;
const MIN_FUTILITY_PHASE_MATERIAL: i32 = 4;

/// Safety margins per remaining depth for futility pruning.
const FUTILITY_MARGINS: [i32; 3] = [0, 100, 300];

/// Quiescence delta-pruning margin, centipawns.
const DELTA_MARGIN: i32 = 100;

/// Hard cap on quiescence recursion.
const QUIESCENCE_DEPTH_CAP: u32 = 8;

/// Raised (as an `Err`) when the soft deadline passes; every in-flight
/// frame abandons its loop and the deepening driver catches it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimeUp;

pub(crate) struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    pub(crate) fn new(start: Instant, limit: Duration) -> Self {
        Deadline { start, limit }
    }

    #[inline(always)]
    fn check(&self) -> Result<(), TimeUp> {
        if self.start.elapsed() > self.limit {
            Err(TimeUp)
        } else {
            Ok(())
        }
    }
}

/// A pawn pushed deep into enemy territory (rank 6+ for white, rank 3-
/// for black) is never reduced or futility-pruned: promotion tactics
/// hide behind those moves.
#[inline]
fn is_dangerous_pawn_push(mv: &Move, color: Color) -> bool {
    mv.piece.kind == PieceKind::Pawn
        && match color {
            Color::White => mv.to.rank() >= 6,
            Color::Black => mv.to.rank() <= 3,
        }
}

impl Engine {
    /// Negamax-shaped search written as explicit white/black branches:
    /// white maximizes, black minimizes, and the window is shared.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn minimax(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        mut beta: i32,
        color: Color,
        depth: u32,
        deadline: &Deadline,
        ply: i32,
    ) -> Result<i32, TimeUp> {
        deadline.check()?;
        self.nodes += 1;

        if board.is_repetition() {
            return Ok(0);
        }

        let (mut legal, check_count) = generate_moves(board);

        if legal.is_empty() {
            if check_count > 0 {
                // checkmate; the side to move is the loser
                return Ok(match board.side_to_move {
                    Color::White => -MATE_SCORE + ply,
                    Color::Black => MATE_SCORE - ply,
                });
            }
            return Ok(0); // stalemate
        }

        if board.fifty_move_met() {
            return Ok(0);
        }

        if depth == 0 {
            return self.quiescence(board, alpha, beta, color, deadline, ply, 1);
        }

        let original_alpha = alpha;
        let original_beta = beta;

        let hash = board.zobrist;
        let mut hash_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            // only cutoffs from equal-or-deeper searches are trusted;
            // the stored move is useful for ordering regardless
            if entry.depth >= depth {
                match entry.bound {
                    Bound::Exact => return Ok(entry.score),
                    Bound::Lower => alpha = alpha.max(entry.score),
                    Bound::Upper => beta = beta.min(entry.score),
                }
                if alpha >= beta {
                    return Ok(entry.score);
                }
            }
            hash_move = entry.best_move;
        }

        // Frontier futility: with shallow depth, no check, enough
        // material left and a not-yet-won position, quiet moves that
        // cannot raise alpha (resp. lower beta) are skipped outright.
        let mut futility_enabled = false;
        let mut static_eval = 0;
        if depth <= 2 && check_count == 0 {
            static_eval = evaluate(board);
            let won_position = static_eval.abs() > WIN_SCORE;
            if board.phase_material() > MIN_FUTILITY_PHASE_MATERIAL && !won_position {
                futility_enabled = true;
            }
        }

        self.order_moves(&mut legal, depth as usize, hash_move);

        let mut best_move: Option<Move> = None;
        let mut searched = 0usize;

        let final_eval;
        let bound;

        if color == Color::White {
            let mut max_eval = -INFINITY;

            for (move_index, mv) in legal.iter().enumerate() {
                let dangerous = is_dangerous_pawn_push(mv, color);

                if futility_enabled
                    && mv.is_quiet()
                    && !dangerous
                    && static_eval + FUTILITY_MARGINS[depth as usize] <= alpha
                {
                    continue;
                }

                board.make_move(mv);
                let returned = if move_index == 0 {
                    // principal variation: full window, full depth
                    self.minimax(board, alpha, beta, Color::Black, depth - 1, deadline, ply + 1)?
                } else {
                    let mut reduction = 0;
                    if depth >= 3
                        && move_index >= 3
                        && !mv.is_capture()
                        && !mv.is_promotion()
                        && check_count == 0
                        && !dangerous
                    {
                        reduction = 1;
                    }

                    let mut score = self.minimax(
                        board,
                        alpha,
                        alpha + 1,
                        Color::Black,
                        depth - 1 - reduction,
                        deadline,
                        ply + 1,
                    )?;

                    // the null window failed high: re-search for real
                    if score > alpha && score < beta {
                        score = self.minimax(
                            board,
                            alpha,
                            beta,
                            Color::Black,
                            depth - 1,
                            deadline,
                            ply + 1,
                        )?;
                    }
                    score
                };
                board.unmake_move(mv);
                searched += 1;

                if returned > max_eval {
                    max_eval = returned;
                    best_move = Some(*mv);
                }
                alpha = alpha.max(returned);

                if alpha >= beta {
                    if !mv.is_capture() {
                        self.record_quiet_cutoff(mv, depth);
                    }
                    break;
                }
            }

            if searched == 0 {
                // futility skipped everything; stand on the static eval
                return Ok(static_eval);
            }

            final_eval = max_eval;
            bound = if final_eval >= beta {
                Bound::Lower
            } else if final_eval <= original_alpha {
                Bound::Upper
            } else {
                Bound::Exact
            };
        } else {
            let mut min_eval = INFINITY;

            for (move_index, mv) in legal.iter().enumerate() {
                let dangerous = is_dangerous_pawn_push(mv, color);

                if futility_enabled
                    && mv.is_quiet()
                    && !dangerous
                    && static_eval - FUTILITY_MARGINS[depth as usize] >= beta
                {
                    continue;
                }

                board.make_move(mv);
                let returned = if move_index == 0 {
                    self.minimax(board, alpha, beta, Color::White, depth - 1, deadline, ply + 1)?
                } else {
                    let mut reduction = 0;
                    if depth >= 3
                        && move_index >= 3
                        && !mv.is_capture()
                        && !mv.is_promotion()
                        && check_count == 0
                        && !dangerous
                    {
                        reduction = 1;
                    }

                    let mut score = self.minimax(
                        board,
                        beta - 1,
                        beta,
                        Color::White,
                        depth - 1 - reduction,
                        deadline,
                        ply + 1,
                    )?;

                    // the null window failed low: re-search for real
                    if score < beta && score > alpha {
                        score = self.minimax(
                            board,
                            alpha,
                            beta,
                            Color::White,
                            depth - 1,
                            deadline,
                            ply + 1,
                        )?;
                    }
                    score
                };
                board.unmake_move(mv);
                searched += 1;

                if returned < min_eval {
                    min_eval = returned;
                    best_move = Some(*mv);
                }
                beta = beta.min(returned);

                if beta <= alpha {
                    if !mv.is_capture() {
                        self.record_quiet_cutoff(mv, depth);
                    }
                    break;
                }
            }

            if searched == 0 {
                return Ok(static_eval);
            }

            final_eval = min_eval;
            bound = if final_eval <= alpha {
                Bound::Upper
            } else if final_eval >= original_beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
        }

        self.tt.store(TtEntry {
            hash,
            depth,
            bound,
            score: final_eval,
            best_move,
            age: self.cycle,
        });

        Ok(final_eval)
    }

    /// A quiet move that cut the search earns a killer slot at this
    /// depth and depth-squared history credit on its destination.
    fn record_quiet_cutoff(&mut self, mv: &Move, depth: u32) {
        let slots = &mut self.killers[depth as usize];
        slots[1] = slots[0];
        slots[0] = Some(*mv);

        self.history[mv.piece.code()][mv.to.index() as usize] += (depth * depth) as i32;
    }

    /// Capture/promotion-only extension past the nominal horizon, with
    /// stand-pat bounds and delta pruning. While in check the full
    /// move list is searched instead (check evasions are not quiet).
    #[allow(clippy::too_many_arguments)]
    fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        mut beta: i32,
        color: Color,
        deadline: &Deadline,
        ply: i32,
        q_depth: u32,
    ) -> Result<i32, TimeUp> {
        self.max_q_depth = self.max_q_depth.max(q_depth);
        deadline.check()?;
        self.nodes += 1;

        let (mut legal, check_count) = generate_moves(board);

        if legal.is_empty() {
            if check_count > 0 {
                return Ok(match board.side_to_move {
                    Color::White => -MATE_SCORE + ply,
                    Color::Black => MATE_SCORE - ply,
                });
            }
            return Ok(0);
        }

        if check_count == 0 {
            legal.retain(|mv| mv.is_capture() || mv.is_promotion());
            if legal.is_empty() {
                return Ok(evaluate(board));
            }
        }

        if q_depth >= QUIESCENCE_DEPTH_CAP {
            return Ok(evaluate(board));
        }

        // Stand pat: the side to move is not obliged to capture, so
        // the static eval bounds the score from its side.
        let stand_pat = evaluate(board);
        if color == Color::White {
            if stand_pat >= beta {
                return Ok(stand_pat);
            }
            alpha = alpha.max(stand_pat);
        } else {
            if stand_pat <= alpha {
                return Ok(stand_pat);
            }
            beta = beta.min(stand_pat);
        }

        self.order_moves(&mut legal, 0, None);

        if color == Color::White {
            let mut max_eval = stand_pat;
            for mv in &legal {
                if check_count == 0
                    && !mv.is_promotion()
                    && let Some(captured) = mv.captured
                {
                    // delta pruning: even winning this exchange plus a
                    // margin cannot lift the score to alpha
                    let gain =
                        (captured.kind.exchange_value() - mv.piece.kind.exchange_value()) * 10;
                    if stand_pat + DELTA_MARGIN + gain < alpha {
                        continue;
                    }
                }

                board.make_move(mv);
                let returned =
                    self.quiescence(board, alpha, beta, Color::Black, deadline, ply + 1, q_depth + 1)?;
                board.unmake_move(mv);

                max_eval = max_eval.max(returned);
                alpha = alpha.max(returned);
                if alpha >= beta {
                    return Ok(max_eval);
                }
            }
            Ok(max_eval)
        } else {
            let mut min_eval = stand_pat;
            for mv in &legal {
                if check_count == 0
                    && !mv.is_promotion()
                    && let Some(captured) = mv.captured
                {
                    let gain =
                        (captured.kind.exchange_value() - mv.piece.kind.exchange_value()) * 10;
                    if stand_pat - DELTA_MARGIN - gain > beta {
                        continue;
                    }
                }

                board.make_move(mv);
                let returned =
                    self.quiescence(board, alpha, beta, Color::White, deadline, ply + 1, q_depth + 1)?;
                board.unmake_move(mv);

                min_eval = min_eval.min(returned);
                beta = beta.min(returned);
                if beta <= alpha {
                    return Ok(min_eval);
                }
            }
            Ok(min_eval)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn search_score(fen: &str, depth: u32) -> i32 {
        let mut board = Board::from_str(fen).unwrap();
        let color = board.side_to_move;
        let mut engine = Engine::new(depth as usize);
        let deadline = Deadline::new(Instant::now(), Duration::from_secs(60));
        engine
            .minimax(&mut board, -INFINITY, INFINITY, color, depth, &deadline, 0)
            .expect("no deadline pressure")
    }

    #[test]
    fn mate_in_one_scores_mate_minus_one_ply() {
        // back-rank: Re8# next move
        let score = search_score("6k1/5ppp/8/8/8/8/8/4R2K w - - 0 1", 1);
        assert_eq!(score, MATE_SCORE - 1);
    }

    #[test]
    fn mated_side_sees_the_negated_mate_score() {
        // black to move faces the same back-rank net one tempo later
        let score = search_score("4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", 1);
        assert_eq!(score, MATE_SCORE);
    }

    #[test]
    fn stalemate_scores_zero() {
        let score = search_score("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(score, 0);
    }

    #[test]
    fn fifty_move_threshold_scores_zero() {
        let score = search_score("4k3/8/8/8/8/8/8/R3K3 w - - 100 80", 3);
        assert_eq!(score, 0);
    }

    #[test]
    fn deeper_search_still_prefers_the_immediate_mate() {
        let shallow = search_score("6k1/5ppp/8/8/8/8/8/4R2K w - - 0 1", 1);
        let deep = search_score("6k1/5ppp/8/8/8/8/8/4R2K w - - 0 1", 3);
        assert_eq!(shallow, MATE_SCORE - 1);
        assert_eq!(deep, MATE_SCORE - 1);
    }
}
