//! Castling rights.

use crate::{Color, Square};
use std::fmt;

/// Which wing a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// Home square of the rook involved.
    pub const fn rook_from(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::King, Color::White) => Square::H1,
            (CastleSide::Queen, Color::White) => Square::A1,
            (CastleSide::King, Color::Black) => Square::H8,
            (CastleSide::Queen, Color::Black) => Square::A8,
        }
    }

    /// Square the rook lands on.
    pub const fn rook_to(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::King, Color::White) => Square::F1,
            (CastleSide::Queen, Color::White) => Square::D1,
            (CastleSide::King, Color::Black) => Square::F8,
            (CastleSide::Queen, Color::Black) => Square::D8,
        }
    }

    /// Square the king lands on.
    pub const fn king_to(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::King, Color::White) => Square::G1,
            (CastleSide::Queen, Color::White) => Square::C1,
            (CastleSide::King, Color::Black) => Square::G8,
            (CastleSide::Queen, Color::Black) => Square::C8,
        }
    }
}

/// Castling rights as a 4-bit set: `K`, `Q`, `k`, `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;

    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    #[inline]
    pub const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    #[inline]
    pub fn remove(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    /// Drops both rights of `color`.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove(color, CastleSide::King);
        self.remove(color, CastleSide::Queen);
    }

    /// The rights lost when a piece leaves or lands on `sq`.
    ///
    /// Touching a king's home square drops both of that side's rights; touching
    /// a rook's home square drops the matching one.
    pub const fn lost_by_touching(sq: Square) -> u8 {
        match sq.index() {
            0 => Self::WHITE_QUEENSIDE,
            4 => Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE,
            7 => Self::WHITE_KINGSIDE,
            56 => Self::BLACK_QUEENSIDE,
            60 => Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE,
            63 => Self::BLACK_KINGSIDE,
            _ => 0,
        }
    }

    /// Rights left after a move between `from` and `to`.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & !(Self::lost_by_touching(from) | Self::lost_by_touching(to)))
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses the FEN castling field ("KQkq", "Kq", "-").
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut flags = 0u8;
        for c in field.chars() {
            let bit = match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return None,
            };
            if flags & bit != 0 {
                return None;
            }
            flags |= bit;
        }
        Some(CastlingRights(flags))
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (bit, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & bit != 0 {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
