//! Search behaviour checked against a plain minimax over the same tree.

use chess_core::Move;
use chess_search::{
    generate_moves, Evaluator, MaterialEvaluator, Position, Searcher, TranspositionTable, DRAW,
    MATE, MATE_BOUND,
};

const POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
    "6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1",
];

fn leaf(position: &Position) -> i32 {
    MaterialEvaluator
        .evaluate(position)
        .clamp(-(MATE_BOUND - 1), MATE_BOUND - 1)
}

/// Unpruned negamax: visits every node and keeps the first best move.
fn minimax(position: &mut Position, depth: u8, ply: i32) -> (i32, Option<Move>) {
    if depth == 0 {
        return (leaf(position), None);
    }
    let moves = generate_moves(position);
    if moves.is_empty() {
        let score = if position.is_in_check() {
            -(MATE - ply)
        } else {
            DRAW
        };
        return (score, None);
    }

    let mut best = (i32::MIN, None);
    for &m in &moves {
        let token = position.apply_move(m);
        let score = -minimax(position, depth - 1, ply + 1).0;
        position.revert_move(token);
        if score > best.0 {
            best = (score, Some(m));
        }
    }
    best
}

fn searcher(tt: bool) -> Searcher<MaterialEvaluator> {
    Searcher::new(
        MaterialEvaluator,
        tt.then(|| TranspositionTable::with_entries(1 << 18)),
    )
}

#[test]
fn alpha_beta_matches_minimax() {
    for fen in POSITIONS {
        let mut position = Position::from_fen(fen).unwrap();
        for depth in 1..=3 {
            let (score, best_move) = minimax(&mut position, depth, 0);
            let result = searcher(false).search(&mut position, depth);
            assert_eq!(result.score, score, "{fen} depth {depth}");
            assert_eq!(result.best_move, best_move, "{fen} depth {depth}");
            assert_eq!(position.ply_depth(), 0);
        }
    }
}

#[test]
fn transposition_table_does_not_change_the_result() {
    for fen in POSITIONS {
        let mut position = Position::from_fen(fen).unwrap();
        for depth in 3..=4 {
            let without = searcher(false).search(&mut position, depth);
            let with = searcher(true).search(&mut position, depth);
            assert_eq!(with.score, without.score, "{fen} depth {depth}");
            assert_eq!(with.best_move, without.best_move, "{fen} depth {depth}");
        }
    }
}

#[test]
fn deeper_table_entries_do_not_leak_into_shallower_searches() {
    // Transpositions reach the same node at different remaining depths here.
    for fen in [POSITIONS[2], POSITIONS[6]] {
        let mut position = Position::from_fen(fen).unwrap();
        let without = searcher(false).search(&mut position, 5);
        let with = searcher(true).search(&mut position, 5);
        assert_eq!(with.score, without.score, "{fen}");
        assert_eq!(with.best_move, without.best_move, "{fen}");

        // a table warmed by a deeper search gives the same depth-5 answer
        let mut warm = searcher(true);
        let _ = warm.search(&mut position, 6);
        let reused = warm.search(&mut position, 5);
        assert_eq!(reused.score, without.score, "{fen}");
        assert_eq!(reused.best_move, without.best_move, "{fen}");
    }
}

#[test]
fn pruning_visits_fewer_nodes() {
    let mut position = Position::from_fen(POSITIONS[1]).unwrap();
    let result = searcher(false).search(&mut position, 3);
    // 1 + 48 + 2039 nodes above the leaves, 97862 leaves
    assert!(result.nodes < 1 + 48 + 2039 + 97_862);
}

#[test]
fn depth_one_picks_the_best_child() {
    let mut position = Position::startpos();
    let moves = generate_moves(&mut position);
    assert_eq!(moves.len(), 20);

    let mut best = i32::MIN;
    for &m in &moves {
        let token = position.apply_move(m);
        best = best.max(-MaterialEvaluator.evaluate(&position));
        position.revert_move(token);
    }

    let result = searcher(true).search(&mut position, 1);
    assert_eq!(result.score, best);
    assert_eq!(result.nodes, 21);
    let m = result.best_move.unwrap();
    assert!(moves.contains(m));
}

#[test]
fn checkmate_has_no_moves_and_scores_as_loss() {
    // queen on the back rank, no blocker, king walled in by its pawns
    let mut position = Position::from_fen("3k4/8/8/8/8/8/5PPP/3q2K1 w - - 0 1").unwrap();
    assert!(generate_moves(&mut position).is_empty());
    assert!(position.is_in_check());

    let result = searcher(true).search(&mut position, 2);
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, -MATE);
}

#[test]
fn stalemate_scores_as_draw() {
    let mut position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(generate_moves(&mut position).is_empty());
    assert!(!position.is_in_check());

    let result = searcher(true).search(&mut position, 2);
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, DRAW);
}

#[test]
fn prefers_the_quicker_mate() {
    // Ra8 mates at once; the search must not wander into a longer mate
    let mut position = Position::from_fen("6k1/5ppp/8/8/8/8/1R6/R5K1 w - - 0 1").unwrap();
    let result = searcher(true).search(&mut position, 4);
    assert_eq!(result.score, MATE - 1);
    assert_eq!(result.mate_in(), Some(1));
    assert_eq!(result.best_move.map(|m| m.to_uci()), Some("a1a8".to_string()));
}

#[test]
fn winning_side_does_not_allow_mate() {
    // black to move with Rxa1+ available; whatever it picks, white must not mate within two plies
    let mut position = Position::from_fen("6k1/5ppp/8/8/8/8/r7/R5K1 b - - 0 1").unwrap();
    let result = searcher(true).search(&mut position, 3);
    assert!(result.score > -MATE_BOUND);
    let m = result.best_move.unwrap();
    let token = position.apply_move(m);
    let (score, _) = minimax(&mut position, 2, 1);
    position.revert_move(token);
    assert!(score < MATE_BOUND);
}
