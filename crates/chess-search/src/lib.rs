//! Move-search core of a chess engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets
//! - [`AttackTables`] - precomputed leaper attacks and magic-bitboard slider lookups
//! - [`Position`] - board state mutated in place, with an undo journal and an
//!   incrementally maintained Zobrist fingerprint
//! - Legal move generation and perft
//! - [`TranspositionTable`] - fixed-size cache of search results
//! - [`Searcher`] - negamax alpha-beta search over a pluggable [`Evaluator`]
//!
//! # Architecture
//!
//! A search owns exactly one `Position` and walks the game tree by applying a
//! move, recursing, and reverting it. Nothing is cloned per node: every
//! mutation pushes a record onto the position's journal and `revert_move`
//! pops it. The attack tables are built once and shared read-only through an
//! `Arc`.
//!
//! # Example
//!
//! ```
//! use chess_search::{MaterialEvaluator, Position, Searcher, TranspositionTable};
//!
//! let mut position = Position::startpos();
//! let mut searcher = Searcher::new(MaterialEvaluator, Some(TranspositionTable::new(1)));
//!
//! let result = searcher.search(&mut position, 3);
//! println!("best {:?} score {}", result.best_move, result.score);
//!
//! // the position is back where it started
//! assert_eq!(position.ply_depth(), 0);
//! ```

pub mod attacks;
mod bitboard;
mod config;
mod error;
pub mod eval;
pub mod movegen;
mod position;
pub mod search;
pub mod tt;
mod zobrist;

pub use attacks::{AttackTables, Magic};
pub use bitboard::{Bitboard, BitboardIter, Subsets};
pub use config::SearchConfig;
pub use error::EngineError;
pub use eval::{Evaluator, MaterialEvaluator};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{generate_moves, generate_pseudo_legal, is_legal, MoveList};
pub use position::{Position, UndoToken};
pub use search::{SearchResult, Searcher, DRAW, INFINITE, MATE, MATE_BOUND, MAX_PLY};
pub use tt::{Bound, TranspositionTable, TtEntry};
pub use zobrist::{ZobristKeys, ZOBRIST};
