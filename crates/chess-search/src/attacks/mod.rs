//! Attack tables for every piece kind.
//!
//! [`AttackTables`] is built once and then only read. Positions capture it
//! through an `Arc`, so independent searches can share one set of tables
//! without any global state. [`AttackTables::shared`] hands out a lazily
//! built process-wide instance for callers that do not manage their own.

mod leapers;
mod magics;

use crate::Bitboard;
use chess_core::{Color, Piece, Square};
use magics::{SliderTable, XorShift, BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

pub use magics::Magic;

const MAGIC_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

static SHARED: OnceLock<Arc<AttackTables>> = OnceLock::new();

/// Precomputed attack sets for leapers and magic-indexed slider tables.
pub struct AttackTables {
    bishops: SliderTable,
    rooks: SliderTable,
}

impl AttackTables {
    /// Builds the slider tables. Takes a few milliseconds in release builds.
    pub fn new() -> Self {
        let started = Instant::now();
        let mut rng = XorShift::new(MAGIC_SEED);
        let bishops = SliderTable::build(&BISHOP_DIRECTIONS, &mut rng);
        let rooks = SliderTable::build(&ROOK_DIRECTIONS, &mut rng);
        tracing::debug!(
            bishop_entries = bishops.attacks.len(),
            rook_entries = rooks.attacks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "attack tables built"
        );
        AttackTables { bishops, rooks }
    }

    /// A process-wide instance, built on first use.
    pub fn shared() -> Arc<AttackTables> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(AttackTables::new())))
    }

    #[inline]
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        leapers::KNIGHT[sq.idx()]
    }

    #[inline]
    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        leapers::KING[sq.idx()]
    }

    /// Squares a `color` pawn on `sq` captures on.
    #[inline]
    pub fn pawn_attacks(&self, sq: Square, color: Color) -> Bitboard {
        leapers::PAWN[color.index()][sq.idx()]
    }

    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishops.lookup(sq, occupied)
    }

    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rooks.lookup(sq, occupied)
    }

    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_attacks(sq, occupied) | self.rook_attacks(sq, occupied)
    }

    /// Attack set of any piece. Pawns return their captures only.
    pub fn attacks(&self, piece: Piece, color: Color, sq: Square, occupied: Bitboard) -> Bitboard {
        match piece {
            Piece::Pawn => self.pawn_attacks(sq, color),
            Piece::Knight => self.knight_attacks(sq),
            Piece::Bishop => self.bishop_attacks(sq, occupied),
            Piece::Rook => self.rook_attacks(sq, occupied),
            Piece::Queen => self.queen_attacks(sq, occupied),
            Piece::King => self.king_attacks(sq),
        }
    }

    /// Lookup parameters of a bishop on `sq`.
    pub fn bishop_magic(&self, sq: Square) -> &Magic {
        &self.bishops.magics[sq.idx()]
    }

    /// Lookup parameters of a rook on `sq`.
    pub fn rook_magic(&self, sq: Square) -> &Magic {
        &self.rooks.magics[sq.idx()]
    }

    /// Compares every table entry against the ray walk it replaces.
    ///
    /// Enumerates all subsets of every square's relevant mask for both slider
    /// families and returns the number of lookups that disagree.
    pub fn verify_slider_tables(&self) -> usize {
        let families = [
            (&self.bishops, &BISHOP_DIRECTIONS),
            (&self.rooks, &ROOK_DIRECTIONS),
        ];
        let mut mismatches = 0;
        for (table, directions) in families {
            for sq in Square::all() {
                for occ in table.magics[sq.idx()].mask.subsets() {
                    if table.lookup(sq, occ) != magics::ray_attacks(sq, occ, directions) {
                        mismatches += 1;
                    }
                }
            }
        }
        mismatches
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        Self::new()
    }
}
