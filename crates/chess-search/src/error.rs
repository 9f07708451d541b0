use chess_core::FenError;
use thiserror::Error;

/// Errors reported by the board and move parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Fen(#[from] FenError),

    /// The side that just moved is left in check.
    #[error("illegal position: the side not to move is in check")]
    OpponentInCheck,

    #[error("invalid move notation: {0}")]
    InvalidMove(String),

    #[error("illegal move in this position: {0}")]
    IllegalMove(String),
}
