use courier::board::Board;
use courier::moves::movegen::generate_moves;
use courier::moves::perft::perft;
use courier::moves::types::find_uci_move;
use courier::search::engine::{ENGINE_THINK_TIME, Engine, MAX_DEPTH};
use courier::search::eval::evaluate;
use courier::status::position_status;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log search progress to logs/courier.log so stdout stays clean for
/// the UCI conversation. The returned guard flushes the writer when
/// main drops it.
fn init_logging() -> WorkerGuard {
    let _ = std::fs::create_dir_all("logs");
    let appender = tracing_appender::rolling::never("logs", "courier.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // RUST_LOG overrides; otherwise log the search driver's lines
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("courier::search=info,courier=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}

fn main() {
    let _log_guard = init_logging();

    let mut engine = Engine::new(MAX_DEPTH);
    let mut board = Board::new();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "uci" => {
                println!("id name Courier");
                println!("id author Courier developers");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                board = Board::new();
                engine = Engine::new(MAX_DEPTH);
            }
            "position" => {
                if let Some(new_board) = handle_position(&parts) {
                    board = new_board;
                }
            }
            "go" => handle_go(&parts, &board, &mut engine),
            "perft" => handle_perft(&parts, &mut board),
            "d" | "display" => println!("{}", board),
            "fen" => println!("{}", board.to_fen()),
            "eval" => println!("static eval: {} cp", evaluate(&board)),
            "status" => println!("{:?}", position_status(&board)),
            "quit" => break,
            _ => {}
        }
    }
}

fn handle_position(parts: &[&str]) -> Option<Board> {
    let mut board = if parts.len() > 1 && parts[1] == "fen" {
        let fen_end = parts
            .iter()
            .position(|&p| p == "moves")
            .unwrap_or(parts.len());
        let fen_string = parts[2..fen_end].join(" ");
        match Board::from_str(&fen_string) {
            Ok(b) => b,
            Err(err) => {
                eprintln!("bad FEN: {}", err);
                return None;
            }
        }
    } else {
        // "position startpos [moves ...]" and bare "position"
        Board::new()
    };

    if let Some(moves_idx) = parts.iter().position(|&p| p == "moves") {
        for move_str in &parts[moves_idx + 1..] {
            let (legal, _) = generate_moves(&board);
            match find_uci_move(move_str, &legal) {
                Some(mv) => board.make_move(&mv),
                None => {
                    eprintln!("illegal move: {}", move_str);
                    return None;
                }
            }
        }
    }

    Some(board)
}

fn handle_go(parts: &[&str], board: &Board, engine: &mut Engine) {
    let mut depth = MAX_DEPTH;
    let mut time_limit = None;

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                if i + 1 < parts.len() {
                    depth = parts[i + 1].parse().unwrap_or(MAX_DEPTH);
                }
                i += 2;
            }
            "movetime" => {
                if i + 1 < parts.len() {
                    time_limit = parts[i + 1].parse().ok().map(Duration::from_millis);
                }
                i += 2;
            }
            "infinite" => {
                time_limit = Some(Duration::from_secs(3600));
                i += 1;
            }
            _ => i += 1,
        }
    }

    // a depth-limited request gets a throwaway engine so the shared
    // transposition table keeps full-depth entries only
    let limit = time_limit.unwrap_or(ENGINE_THINK_TIME);
    let result = if depth < MAX_DEPTH {
        Engine::new(depth).find_best_move(board, board.side_to_move, limit, None)
    } else {
        engine.find_best_move(board, board.side_to_move, limit, None)
    };

    match result {
        Ok(report) => {
            if let (Some(d), Some(n)) = (report.depth, report.nodes) {
                println!("info depth {} nodes {}", d, n);
            }
            println!("bestmove {}", report.mv.to_uci());
        }
        Err(err) => {
            eprintln!("search failed: {}", err);
            println!("bestmove 0000");
        }
    }
}

fn handle_perft(parts: &[&str], board: &mut Board) {
    let depth: u32 = parts
        .get(1)
        .and_then(|d| d.parse().ok())
        .unwrap_or(1)
        .max(1);

    let (mut moves, _) = generate_moves(board);
    moves.sort_by_key(|m| (m.from, m.to));

    let bar = ProgressBar::new(moves.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:32} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    let start = Instant::now();
    let mut total = 0u64;
    let mut rows = Vec::with_capacity(moves.len());
    for mv in &moves {
        bar.set_message(mv.to_uci());
        board.make_move(mv);
        let nodes = perft(board, depth - 1);
        board.unmake_move(mv);
        total += nodes;
        rows.push((mv.to_uci(), nodes));
        bar.inc(1);
    }
    bar.finish_and_clear();

    for (uci, nodes) in rows {
        println!("{}: {}", uci, nodes);
    }
    let elapsed = start.elapsed().as_secs_f64().max(1e-9);
    println!();
    println!("total moves: {}", moves.len());
    println!("total nodes: {}", total);
    println!("elapsed: {:.4}s", elapsed);
    println!("nodes per second: {:.0}", total as f64 / elapsed);
}
