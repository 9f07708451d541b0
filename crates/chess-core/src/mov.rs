//! Move representation.

use crate::{Piece, Square};
use std::fmt;

/// A move: source square, destination square and an optional promotion kind.
///
/// Packed into 16 bits: bits 0-5 from, bits 6-11 to, bits 12-14 promotion
/// (0 = none, otherwise `Piece::index()`). Castling is encoded as the king's
/// two-file step, en passant as the pawn's diagonal step onto the target
/// square; the board resolves both when the move is applied.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    /// Placeholder value; never generated as a legal move.
    pub const NULL: Move = Move(0);

    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move((from.index() as u16) | ((to.index() as u16) << 6))
    }

    /// Creates a promotion move.
    #[inline]
    pub const fn with_promotion(from: Square, to: Square, piece: Piece) -> Self {
        Move(Self::new(from, to).0 | ((piece.index() as u16) << 12))
    }

    #[inline]
    pub const fn from(self) -> Square {
        // SAFETY: masked to 6 bits
        unsafe { Square::from_index_unchecked((self.0 & 0x3F) as u8) }
    }

    #[inline]
    pub const fn to(self) -> Square {
        // SAFETY: masked to 6 bits
        unsafe { Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8) }
    }

    /// The kind a pawn becomes, if this is a promotion.
    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        match (self.0 >> 12) & 0x7 {
            0 => None,
            code => Piece::from_index(code as usize),
        }
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Raw 16-bit encoding.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Long algebraic (UCI) notation, e.g. "e2e4" or "e7e8q".
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(piece) => format!("{}{}{}", self.from(), self.to(), piece.letter()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// Parses long algebraic notation.
    ///
    /// Only the syntax is checked; whether the move is playable is for the
    /// board to decide.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        if from == to {
            return None;
        }
        match s[4..].chars().next() {
            None => Some(Move::new(from, to)),
            Some(c) => {
                let piece = Piece::from_letter(c).filter(|p| p.is_promotion_target())?;
                Some(Move::with_promotion(from, to, piece))
            }
        }
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NULL
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}
