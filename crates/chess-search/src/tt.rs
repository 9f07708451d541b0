//! Transposition table.
//!
//! A fixed array of slots indexed by the low bits of the fingerprint. Each
//! slot keeps the upper 32 bits as a tag so that unrelated positions sharing
//! a slot read as a miss.

use crate::search::MATE_BOUND;
use chess_core::Move;
use std::mem;

/// What a stored score says about the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The true value.
    Exact,
    /// A cutoff happened; the true value is at least the score.
    Lower,
    /// No move raised alpha; the true value is at most the score.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    tag: u32,
    pub best_move: Move,
    pub score: i32,
    pub depth: u8,
    pub bound: Bound,
}

pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
    mask: u64,
}

impl TranspositionTable {
    /// A table using at most `megabytes` of memory.
    pub fn new(megabytes: usize) -> Self {
        let bytes = megabytes.saturating_mul(1024 * 1024);
        Self::with_entries(bytes / mem::size_of::<Option<TtEntry>>())
    }

    /// A table with `entries` slots, rounded down to a power of two (at least one).
    pub fn with_entries(entries: usize) -> Self {
        let len = round_down_pow2(entries);
        tracing::debug!(slots = len, "transposition table allocated");
        TranspositionTable {
            slots: vec![None; len],
            mask: (len - 1) as u64,
        }
    }

    /// Reallocates to fit `megabytes`, dropping every entry.
    pub fn resize(&mut self, megabytes: usize) {
        *self = Self::new(megabytes);
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    #[inline]
    fn tag(hash: u64) -> u32 {
        (hash >> 32) as u32
    }

    /// The entry stored for `hash`, if the slot holds one with a matching tag.
    pub fn probe(&self, hash: u64) -> Option<TtEntry> {
        self.slots[self.slot(hash)].filter(|entry| entry.tag == Self::tag(hash))
    }

    /// Stores a result, unless the slot holds one searched deeper.
    pub fn store(&mut self, hash: u64, best_move: Move, score: i32, depth: u8, bound: Bound) {
        let index = self.slot(hash);
        if let Some(resident) = &self.slots[index] {
            if resident.depth > depth {
                return;
            }
        }
        self.slots[index] = Some(TtEntry {
            tag: Self::tag(hash),
            best_move,
            score,
            depth,
            bound,
        });
    }

    /// Occupied slots per thousand, sampled over the first thousand slots.
    pub fn hashfull(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample].iter().filter(|s| s.is_some()).count();
        (used * 1000 / sample) as u32
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(16)
    }
}

fn round_down_pow2(n: usize) -> usize {
    if n <= 1 {
        1
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

/// Converts a mate score from "plies from the root" to "plies from this
/// node" so it stays valid when the position is reached at another depth.
#[inline]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_BOUND {
        score + ply
    } else if score <= -MATE_BOUND {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`].
#[inline]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    let ply = ply as i32;
    if score >= MATE_BOUND {
        score - ply
    } else if score <= -MATE_BOUND {
        score + ply
    } else {
        score
    }
}
