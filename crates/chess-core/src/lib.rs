//! Core value types for the chess search engine.
//!
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] for the compact from/to/promotion move encoding
//! - [`CastlingRights`] and [`CastleSide`]
//! - [`Fen`] for parsing and printing positions

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::{CastleSide, CastlingRights};
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::Move;
pub use piece::Piece;
pub use square::{File, Rank, Square};
