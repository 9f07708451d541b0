//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth;
//! the totals are compared against published values.

use super::generate_moves;
use crate::Position;

/// Counts the leaf nodes at `depth` plies below `position`.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        let token = position.apply_move(m);
        nodes += perft(position, depth - 1);
        position.revert_move(token);
    }
    nodes
}

/// Node counts per root move, sorted by move text.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_moves(position);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        let token = position.apply_move(m);
        let nodes = perft(position, depth.saturating_sub(1));
        position.revert_move(token);
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
