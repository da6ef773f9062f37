//! Node-count validation for the move generator.

use crate::board::Board;
use crate::moves::movegen::generate_moves;
use std::time::Instant;
use tracing::{debug, trace};

/// Count leaf nodes of the legal move tree to `depth`.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let (moves, _) = generate_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in &moves {
        board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.unmake_move(mv);
    }
    nodes
}

#[derive(Debug, Clone)]
pub struct DivideRow {
    pub uci: String,
    pub nodes: u64,
}

/// Per-root-move node counts, sorted by source then destination for
/// stable comparison against reference output. Also returns the total.
pub fn perft_divide(board: &mut Board, depth: u32) -> (Vec<DivideRow>, u64) {
    let start = Instant::now();
    let (mut moves, _) = generate_moves(board);
    moves.sort_by_key(|m| (m.from, m.to));

    let mut rows = Vec::with_capacity(moves.len());
    let mut total = 0u64;
    for mv in &moves {
        board.make_move(mv);
        let nodes = perft(board, depth.saturating_sub(1));
        board.unmake_move(mv);
        trace!(mv = %mv, nodes, "divide");
        total += nodes;
        rows.push(DivideRow {
            uci: mv.to_uci(),
            nodes,
        });
    }

    let elapsed = start.elapsed().as_secs_f64().max(1e-9);
    debug!(
        depth,
        total,
        nps = (total as f64 / elapsed) as u64,
        "perft divide finished"
    );
    (rows, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_rows_sum_to_the_total() {
        let mut b = Board::new();
        let (rows, total) = perft_divide(&mut b, 2);
        assert_eq!(rows.len(), 20);
        assert_eq!(rows.iter().map(|r| r.nodes).sum::<u64>(), total);
        assert_eq!(total, 400);
    }
}
