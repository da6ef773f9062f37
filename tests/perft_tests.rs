use courier::board::Board;
use courier::moves::perft::{perft, perft_divide};
use std::str::FromStr;
use std::time::Instant;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWI_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn run_perft(fen: &str, depth: u32, expected_nodes: u64) {
    let mut board = Board::from_str(fen).expect("valid FEN");

    let start = Instant::now();
    let nodes = perft(&mut board, depth);
    let secs = start.elapsed().as_secs_f64().max(1e-9);
    println!(
        "d{depth}: nodes={nodes} time={:.3}s nps={}",
        secs,
        (nodes as f64 / secs) as u64
    );

    assert_eq!(
        nodes, expected_nodes,
        "perft mismatch at depth {depth}: got {nodes}, expected {expected_nodes}"
    );
}

#[test]
fn perft_startpos_d1() {
    run_perft(START_FEN, 1, 20);
}

#[test]
fn perft_startpos_d2() {
    run_perft(START_FEN, 2, 400);
}

#[test]
fn perft_startpos_d3() {
    run_perft(START_FEN, 3, 8_902);
}

#[test]
fn perft_startpos_d4() {
    run_perft(START_FEN, 4, 197_281);
}

#[test]
fn perft_startpos_d5() {
    run_perft(START_FEN, 5, 4_865_609);
}

// deep nodes — opt-in
#[test]
#[ignore]
fn perft_startpos_d6() {
    run_perft(START_FEN, 6, 119_060_324);
}

#[test]
fn perft_kiwipete_d1() {
    run_perft(KIWI_FEN, 1, 48);
}

#[test]
fn perft_kiwipete_d2() {
    run_perft(KIWI_FEN, 2, 2_039);
}

#[test]
fn perft_kiwipete_d3() {
    run_perft(KIWI_FEN, 3, 97_862);
}

#[test]
fn perft_kiwipete_d4() {
    run_perft(KIWI_FEN, 4, 4_085_603);
}

#[test]
#[ignore]
fn perft_kiwipete_d5() {
    run_perft(KIWI_FEN, 5, 193_690_690);
}

/// En passant, promotion and castling each get a cheap sanity depth
/// so a regression points at the guilty special case.
#[test]
fn perft_special_move_positions() {
    // EP immediately available for white: e5xd6
    run_perft("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", 1, 7);
    // promotion-ready: a7a8 in four flavors plus king moves
    run_perft("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", 1, 9);
    // both castles available
    run_perft("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", 1, 26);
}

#[test]
fn divide_matches_the_plain_count() {
    let mut board = Board::from_str(KIWI_FEN).unwrap();
    let (rows, total) = perft_divide(&mut board, 2);
    assert_eq!(rows.len(), 48);
    assert_eq!(total, 2_039);
    assert_eq!(rows.iter().map(|r| r.nodes).sum::<u64>(), total);
}
