//! The engine driver: iterative deepening over the inner search, with
//! the killer/history/transposition state that persists across calls.

use crate::board::{Board, Color};
use crate::moves::movegen::generate_moves;
use crate::moves::types::Move;
use crate::search::minimax::{Deadline, INFINITY, TimeUp};
use crate::search::tt::TranspositionTable;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Iterative-deepening ceiling; also sizes the killer table.
pub const MAX_DEPTH: usize = 64;

/// Default per-move think time used by the service layer.
pub const ENGINE_THINK_TIME: Duration = Duration::from_secs(6);

/// Outcome of one `find_best_move` call. `depth` and `nodes` are
/// `None` for book moves, which bypass the search entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub mv: Move,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub is_book: bool,
}

/// Wire-facing projection of a [`SearchReport`], as exchanged with the
/// session dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct MoveInfo {
    #[serde(rename = "move")]
    pub mv: String,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub is_book: bool,
}

impl From<&SearchReport> for MoveInfo {
    fn from(report: &SearchReport) -> Self {
        MoveInfo {
            mv: report.mv.to_uci(),
            depth: report.depth,
            nodes: report.nodes,
            is_book: report.is_book,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The search finished without producing a move. In a non-terminal
    /// position this is an engine bug and callers should treat it as
    /// fatal to the request.
    NoMoveFound,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NoMoveFound => write!(f, "engine found no move to play"),
        }
    }
}

impl std::error::Error for EngineError {}

/// One engine instance: single-threaded, owning its own heuristic
/// tables. Workers that run in parallel each hold their own `Engine`.
pub struct Engine {
    pub(crate) max_depth: usize,
    pub(crate) nodes: u64,
    pub(crate) max_q_depth: u32,
    /// Two killer slots per remaining-depth level.
    pub(crate) killers: Vec<[Option<Move>; 2]>,
    /// Beta-cutoff credit per (piece code, destination cell).
    pub(crate) history: [[i32; 120]; 12],
    pub(crate) tt: TranspositionTable,
    /// Bumped once per `find_best_move`; lets the TT age out entries
    /// from earlier searches.
    pub(crate) cycle: u32,
}

impl Engine {
    pub fn new(max_depth: usize) -> Self {
        Engine {
            max_depth: max_depth.clamp(1, MAX_DEPTH),
            nodes: 0,
            max_q_depth: 0,
            killers: vec![[None; 2]; MAX_DEPTH + 1],
            history: [[0; 120]; 12],
            tt: TranspositionTable::new(),
            cycle: 0,
        }
    }

    /// Find the best move for `side` within `time_limit`.
    ///
    /// A pre-selected `book_move` short-circuits the search when it is
    /// legal in `root`; an illegal one is logged and ignored. The time
    /// limit is a soft deadline sampled at every node, so the search
    /// may overshoot by roughly one node's work.
    pub fn find_best_move(
        &mut self,
        root: &Board,
        side: Color,
        time_limit: Duration,
        book_move: Option<Move>,
    ) -> Result<SearchReport, EngineError> {
        if let Some(book) = book_move {
            let (legal, _) = generate_moves(root);
            if legal.contains(&book) {
                return Ok(SearchReport {
                    mv: book,
                    depth: None,
                    nodes: None,
                    is_book: true,
                });
            }
            warn!(mv = %book, "book move is not legal here, searching instead");
        }

        let start = Instant::now();
        self.cycle += 1;
        self.nodes = 0;

        // Fresh killers each search; history decays instead so the
        // previous search still informs quiet-move ordering.
        for slots in &mut self.killers {
            *slots = [None; 2];
        }
        for piece in &mut self.history {
            for cell in piece.iter_mut() {
                *cell /= 2;
            }
        }

        let mut best: Option<Move> = None;
        let mut completed_depth = 0u32;

        for depth in 1..=self.max_depth as u32 {
            // the search runs on a clone so a mid-depth timeout cannot
            // leave the caller's board half-mutated
            let mut search_board = root.clone();
            self.max_q_depth = 0;

            if start.elapsed() > time_limit {
                info!(depth, "time limit reached before starting depth");
                break;
            }

            let deadline = Deadline::new(start, time_limit);
            match self.search_root(&mut search_board, side, depth, &deadline, best) {
                Ok(Some(mv)) => {
                    best = Some(mv);
                    completed_depth = depth;
                    info!(
                        depth,
                        nodes = self.nodes,
                        max_q_depth = self.max_q_depth,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        best = %mv,
                        "depth completed"
                    );
                }
                Ok(None) => {
                    debug!(depth, "search was inconclusive, keeping previous depth's move");
                    break;
                }
                Err(TimeUp) => {
                    info!(depth, "time limit reached, using last completed depth");
                    break;
                }
            }
        }

        match best {
            Some(mv) => Ok(SearchReport {
                mv,
                depth: Some(completed_depth),
                nodes: Some(self.nodes),
                is_book: false,
            }),
            None => Err(EngineError::NoMoveFound),
        }
    }

    /// Full-window alpha-beta over the root moves. Returns only the
    /// best move; scores live in the transposition table. The root
    /// itself never writes a TT entry.
    fn search_root(
        &mut self,
        board: &mut Board,
        color: Color,
        depth: u32,
        deadline: &Deadline,
        previous_best: Option<Move>,
    ) -> Result<Option<Move>, TimeUp> {
        let (mut legal, _) = generate_moves(board);
        self.order_moves(&mut legal, depth as usize, None);

        // the previous iteration's best move is searched first
        if let Some(prev) = previous_best
            && let Some(pos) = legal.iter().position(|m| *m == prev)
        {
            let mv = legal.remove(pos);
            legal.insert(0, mv);
        }

        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut best = None;

        if color == Color::White {
            let mut best_eval = -INFINITY;
            for mv in &legal {
                board.make_move(mv);
                let score =
                    self.minimax(board, alpha, beta, Color::Black, depth - 1, deadline, 1)?;
                board.unmake_move(mv);

                if score > best_eval {
                    best_eval = score;
                    best = Some(*mv);
                }
                alpha = alpha.max(score);
                if alpha >= beta {
                    break;
                }
            }
        } else {
            let mut best_eval = INFINITY;
            for mv in &legal {
                board.make_move(mv);
                let score =
                    self.minimax(board, alpha, beta, Color::White, depth - 1, deadline, 1)?;
                board.unmake_move(mv);

                if score < best_eval {
                    best_eval = score;
                    best = Some(*mv);
                }
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }
        }

        Ok(best)
    }
}
