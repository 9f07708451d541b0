//! Negamax alpha-beta search backed by the transposition table.

use crate::eval::Evaluator;
use crate::movegen::generate_moves;
use crate::tt::{score_from_tt, score_to_tt, Bound, TranspositionTable};
use crate::{Position, SearchConfig};
use chess_core::Move;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Score of being checkmated at the root; a mate `n` plies away scores
/// `MATE - n` for the winner.
pub const MATE: i32 = 32_000;
/// Deepest ply the search will reach.
pub const MAX_PLY: usize = 128;
/// Every score at or beyond this magnitude is a forced mate.
pub const MATE_BOUND: i32 = MATE - MAX_PLY as i32;
/// Wider than any score the search returns.
pub const INFINITE: i32 = 32_001;
pub const DRAW: i32 = 0;

/// Outcome of one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` at depth 0 or when the side to move has no legal move.
    pub best_move: Option<Move>,
    /// From the side to move's point of view.
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
    pub tt_hits: u64,
}

impl SearchResult {
    /// Plies to mate if the score is a forced mate, negative when the side
    /// to move is the one being mated.
    pub fn mate_in(&self) -> Option<i32> {
        if self.score >= MATE_BOUND {
            Some(MATE - self.score)
        } else if self.score <= -MATE_BOUND {
            Some(-(MATE + self.score))
        } else {
            None
        }
    }
}

/// Depth-first negamax searcher.
///
/// Owns the evaluator and an optional transposition table that persists
/// across calls. Moves are searched in generation order and the first move
/// reaching the best score is reported.
///
/// A table entry is only reused for a node searched to the same remaining
/// depth; a cold table, a warm one and no table give the same score and move.
pub struct Searcher<E> {
    evaluator: E,
    tt: Option<TranspositionTable>,
    stop: Option<Arc<AtomicBool>>,
    nodes: u64,
    tt_hits: u64,
    stopped: bool,
}

impl<E: Evaluator> Searcher<E> {
    pub fn new(evaluator: E, tt: Option<TranspositionTable>) -> Self {
        Searcher {
            evaluator,
            tt,
            stop: None,
            nodes: 0,
            tt_hits: 0,
            stopped: false,
        }
    }

    /// A searcher with the table sized and enabled per `config`.
    pub fn from_config(evaluator: E, config: &SearchConfig) -> Self {
        let tt = config
            .use_tt
            .then(|| TranspositionTable::new(config.hash_mb));
        Self::new(evaluator, tt)
    }

    /// Unwinds the search as soon as `flag` is set.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn tt(&self) -> Option<&TranspositionTable> {
        self.tt.as_ref()
    }

    pub fn clear_tt(&mut self) {
        if let Some(tt) = &mut self.tt {
            tt.clear();
        }
    }

    /// True if the last search was interrupted by the stop flag.
    pub fn was_stopped(&self) -> bool {
        self.stopped
    }

    /// Searches `position` to a fixed depth.
    ///
    /// The position is played forward and back during the search and is
    /// unchanged on return.
    pub fn search(&mut self, position: &mut Position, depth: u8) -> SearchResult {
        self.nodes = 0;
        self.tt_hits = 0;
        self.stopped = false;

        let depth = depth.min(MAX_PLY as u8);
        let entry_ply = position.ply_depth();
        let (score, best_move) = self.negamax(position, depth, 0, -INFINITE, INFINITE);
        debug_assert_eq!(position.ply_depth(), entry_ply);

        SearchResult {
            best_move,
            score,
            depth,
            nodes: self.nodes,
            tt_hits: self.tt_hits,
        }
    }

    /// Searches depths 1 through `max_depth` and returns the deepest
    /// iteration that completed. Node and hit counts cover every iteration.
    pub fn search_iterative(&mut self, position: &mut Position, max_depth: u8) -> SearchResult {
        if max_depth == 0 {
            return self.search(position, 0);
        }

        let started = Instant::now();
        let mut completed: Option<SearchResult> = None;
        let mut nodes = 0;
        let mut tt_hits = 0;

        for depth in 1..=max_depth.min(MAX_PLY as u8) {
            let result = self.search(position, depth);
            nodes += result.nodes;
            tt_hits += result.tt_hits;
            if self.stopped {
                tracing::debug!(depth, "search stopped before the iteration completed");
                if completed.is_none() {
                    completed = Some(result);
                }
                break;
            }
            tracing::info!(
                depth,
                score = result.score,
                nodes = result.nodes,
                best = %result.best_move.map_or_else(|| "(none)".to_string(), |m| m.to_uci()),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "iteration complete"
            );
            completed = Some(result);
            if result.best_move.is_none() {
                break;
            }
        }

        let mut result = completed.unwrap_or_else(|| self.search(position, 0));
        result.nodes = nodes;
        result.tt_hits = tt_hits;
        result
    }

    /// Runs the search the way `config` asks for.
    pub fn search_with(&mut self, position: &mut Position, config: &SearchConfig) -> SearchResult {
        if config.iterative {
            self.search_iterative(position, config.depth)
        } else {
            self.search(position, config.depth)
        }
    }

    fn should_stop(&mut self) -> bool {
        if !self.stopped {
            if let Some(flag) = &self.stop {
                self.stopped = flag.load(Ordering::Relaxed);
            }
        }
        self.stopped
    }

    fn leaf(&self, position: &Position) -> i32 {
        self.evaluator
            .evaluate(position)
            .clamp(-(MATE_BOUND - 1), MATE_BOUND - 1)
    }

    fn negamax(
        &mut self,
        position: &mut Position,
        depth: u8,
        ply: usize,
        mut alpha: i32,
        beta: i32,
    ) -> (i32, Option<Move>) {
        self.nodes += 1;
        if self.should_stop() {
            return (DRAW, None);
        }

        let hash = position.hash();
        if ply > 0 {
            if let Some(entry) = self.tt.as_ref().and_then(|tt| tt.probe(hash)) {
                if entry.depth == depth {
                    let score = score_from_tt(entry.score, ply);
                    let usable = match entry.bound {
                        Bound::Exact => true,
                        Bound::Lower => score >= beta,
                        Bound::Upper => score <= alpha,
                    };
                    if usable {
                        self.tt_hits += 1;
                        let best = Some(entry.best_move).filter(|m| !m.is_null());
                        return (score, best);
                    }
                }
            }
        }

        if depth == 0 || ply >= MAX_PLY {
            return (self.leaf(position), None);
        }

        let moves = generate_moves(position);
        if moves.is_empty() {
            let score = if position.is_in_check() {
                -(MATE - ply as i32)
            } else {
                DRAW
            };
            return (score, None);
        }

        let original_alpha = alpha;
        let mut best_score = -INFINITE;
        let mut best_move = None;

        for &m in &moves {
            let token = position.apply_move(m);
            let (child, _) = self.negamax(position, depth - 1, ply + 1, -beta, -alpha);
            position.revert_move(token);
            if self.stopped {
                // interrupted before any child finished
                let score = if best_move.is_some() { best_score } else { DRAW };
                return (score, best_move);
            }

            let score = -child;
            if score > best_score {
                best_score = score;
                best_move = Some(m);
            }
            alpha = alpha.max(best_score);
            if alpha >= beta {
                break;
            }
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score <= original_alpha {
            Bound::Upper
        } else {
            Bound::Exact
        };
        if let Some(tt) = &mut self.tt {
            tt.store(
                hash,
                best_move.unwrap_or(Move::NULL),
                score_to_tt(best_score, ply),
                depth,
                bound,
            );
        }

        (best_score, best_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MaterialEvaluator;

    fn searcher(use_tt: bool) -> Searcher<MaterialEvaluator> {
        let tt = use_tt.then(|| TranspositionTable::with_entries(1 << 16));
        Searcher::new(MaterialEvaluator, tt)
    }

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    #[test]
    fn depth_zero_returns_the_evaluation() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let result = searcher(true).search(&mut pos, 0);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, MaterialEvaluator.evaluate(&pos));
        assert_eq!(result.nodes, 1);
    }

    #[test]
    fn finds_mate_in_one() {
        // Ra8 is mate: the black king is boxed in by its own pawns
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        for use_tt in [false, true] {
            let result = searcher(use_tt).search(&mut pos, 3);
            assert_eq!(result.best_move, Some(mv("a1a8")));
            assert_eq!(result.score, MATE - 1);
            assert_eq!(result.mate_in(), Some(1));
        }
    }

    #[test]
    fn mated_root_reports_no_move() {
        let mut pos = Position::from_fen("3k4/8/8/8/8/8/5PPP/3q2K1 w - - 0 1").unwrap();
        let result = searcher(true).search(&mut pos, 4);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, -MATE);
        assert_eq!(result.mate_in(), Some(0));
    }

    #[test]
    fn stalemate_scores_as_draw() {
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = searcher(true).search(&mut pos, 3);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, DRAW);
        assert_eq!(result.mate_in(), None);
    }

    #[test]
    fn takes_a_hanging_queen() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let result = searcher(true).search(&mut pos, 2);
        assert_eq!(result.best_move, Some(mv("d2d5")));
        assert!(result.score > 300);
    }

    #[test]
    fn position_is_restored_after_search() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before = pos.clone();
        let _ = searcher(true).search(&mut pos, 3);
        assert_eq!(pos, before);
        assert_eq!(pos.ply_depth(), 0);
    }

    #[test]
    fn warm_table_produces_hits() {
        let mut pos = Position::startpos();
        let mut s = searcher(true);
        let cold = s.search(&mut pos, 3);
        let warm = s.search(&mut pos, 3);
        assert_eq!(cold.score, warm.score);
        assert!(warm.tt_hits > 0);
        assert!(warm.nodes < cold.nodes);

        s.clear_tt();
        let cleared = s.search(&mut pos, 3);
        assert_eq!(cleared, cold);
    }

    #[test]
    fn raised_stop_flag_unwinds_immediately() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut s = searcher(true).with_stop_flag(Arc::clone(&flag));
        let mut pos = Position::startpos();
        let result = s.search(&mut pos, 5);
        assert!(s.was_stopped());
        assert_eq!(result.nodes, 1);
        assert_eq!(pos.ply_depth(), 0);

        flag.store(false, Ordering::Relaxed);
        let result = s.search(&mut pos, 1);
        assert!(!s.was_stopped());
        // developing a knight gains the most square bonus
        assert_eq!(result.best_move, Some(mv("b1c3")));
        assert_eq!(result.score, 50);
    }

    /// Material evaluation that raises the stop flag the first time it runs.
    struct StopAfterFirstLeaf(Arc<AtomicBool>);

    impl Evaluator for StopAfterFirstLeaf {
        fn evaluate(&self, position: &Position) -> i32 {
            self.0.store(true, Ordering::Relaxed);
            MaterialEvaluator.evaluate(position)
        }
    }

    #[test]
    fn stop_before_the_first_root_move_completes_scores_a_draw() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut s = Searcher::new(StopAfterFirstLeaf(Arc::clone(&flag)), None)
            .with_stop_flag(Arc::clone(&flag));
        let mut pos = Position::startpos();
        let result = s.search(&mut pos, 2);
        assert!(s.was_stopped());
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, DRAW);
        assert_eq!(pos.ply_depth(), 0);
    }

    #[test]
    fn iterative_matches_fixed_depth_score() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let fixed = searcher(false).search(&mut pos, 3);
        let iterative = searcher(false).search_iterative(&mut pos, 3);
        assert_eq!(iterative.depth, 3);
        assert_eq!(iterative.score, fixed.score);
        assert_eq!(iterative.best_move, fixed.best_move);
        assert!(iterative.nodes > fixed.nodes);
    }

    #[test]
    fn config_selects_search_mode() {
        let config = SearchConfig {
            depth: 2,
            iterative: false,
            use_tt: false,
            ..SearchConfig::default()
        };
        let mut s = Searcher::from_config(MaterialEvaluator, &config);
        assert!(s.tt().is_none());
        let mut pos = Position::startpos();
        let result = s.search_with(&mut pos, &config);
        assert_eq!(result.depth, 2);
        assert!(result.best_move.is_some());
    }
}
