//! Move ordering. Better guesses earlier mean earlier beta cutoffs:
//! the hash move first, then captures by MVV-LVA, then killers, then
//! whatever the history table has learned about quiet moves.

use crate::moves::types::Move;
use crate::search::engine::Engine;

const HASH_MOVE_SCORE: i32 = 20_000;
const CAPTURE_BASE: i32 = 10_000;
const KILLER_SCORE: i32 = 9_000;

impl Engine {
    /// Ordering score in deci-pawn units; capture scores stay between
    /// the killer tier and the hash-move tier.
    pub(crate) fn score_move(&self, mv: &Move, depth: usize, hash_move: Option<&Move>) -> i32 {
        if hash_move == Some(mv) {
            return HASH_MOVE_SCORE;
        }

        if let Some(captured) = mv.captured {
            // most valuable victim first, least valuable attacker as
            // the tie-break
            return CAPTURE_BASE + 10 * captured.kind.exchange_value()
                - mv.piece.kind.exchange_value();
        }

        if self.killers[depth].contains(&Some(*mv)) {
            return KILLER_SCORE;
        }

        self.history[mv.piece.code()][mv.to.index() as usize]
    }

    /// Sort descending by score; the sort is stable so equal-scoring
    /// moves keep their generation order.
    pub(crate) fn order_moves(&self, moves: &mut [Move], depth: usize, hash_move: Option<Move>) {
        moves.sort_by_cached_key(|mv| -self.score_move(mv, depth, hash_move.as_ref()));
    }
}
