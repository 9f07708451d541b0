//! Magic bitboard construction for bishops and rooks.
//!
//! For every square the relevant blockers (the slider's rays without the
//! final edge square) are hashed into a slice of a shared attack vector:
//! `((occupied & mask) * magic) >> shift`. The multipliers are searched at
//! build time with a fixed-seed generator, so every run produces the same
//! tables.

use crate::Bitboard;
use chess_core::Square;

pub(crate) const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Lookup parameters for one square of one slider family.
#[derive(Debug, Clone, Copy, Default)]
pub struct Magic {
    /// Relevant blocker squares.
    pub mask: Bitboard,
    pub magic: u64,
    /// `64 - mask.count()`.
    pub shift: u32,
    /// Start of this square's slice in the attack vector.
    pub offset: usize,
}

impl Magic {
    #[inline]
    pub fn index(&self, occupied: Bitboard) -> usize {
        self.offset + ((occupied.0 & self.mask.0).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// The magics of one slider family together with the attack sets they index.
pub(crate) struct SliderTable {
    pub(crate) magics: [Magic; 64],
    pub(crate) attacks: Vec<Bitboard>,
}

impl SliderTable {
    /// Builds the table for a slider moving along `directions`.
    pub(crate) fn build(directions: &[(i8, i8); 4], rng: &mut XorShift) -> Self {
        let mut magics = [Magic::default(); 64];
        let mut attacks = Vec::new();

        for sq in Square::all() {
            let mask = relevant_mask(sq, directions);
            let occupancies: Vec<Bitboard> = mask.subsets().collect();
            let references: Vec<Bitboard> = occupancies
                .iter()
                .map(|&occ| ray_attacks(sq, occ, directions))
                .collect();

            let shift = 64 - mask.count();
            let magic = find_magic(mask, shift, &occupancies, rng);

            let offset = attacks.len();
            attacks.resize(offset + (1 << mask.count()), Bitboard::EMPTY);
            let entry = Magic {
                mask,
                magic,
                shift,
                offset,
            };
            for (occ, reference) in occupancies.iter().zip(&references) {
                attacks[entry.index(*occ)] = *reference;
            }
            magics[sq.idx()] = entry;
        }

        SliderTable { magics, attacks }
    }

    #[inline]
    pub(crate) fn lookup(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.attacks[self.magics[sq.idx()].index(occupied)]
    }
}

/// Squares whose occupancy can change a slider's attack set from `sq`.
///
/// Each ray stops one short of the board edge: the last square is attacked
/// whether or not something stands on it.
pub(crate) fn relevant_mask(sq: Square, directions: &[(i8, i8); 4]) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for &(df, dr) in directions {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            if next.offset(df, dr).is_none() {
                break;
            }
            mask.set(next);
            current = next;
        }
    }
    mask
}

/// Reference attack set, walking each ray until it leaves the board or hits
/// an occupied square (which is included).
pub(crate) fn ray_attacks(sq: Square, occupied: Bitboard, directions: &[(i8, i8); 4]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in directions {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            attacks.set(next);
            if occupied.contains(next) {
                break;
            }
            current = next;
        }
    }
    attacks
}

/// Searches for a multiplier that sends every occupancy to a slot of its
/// own. With `shift = 64 - mask.count()` the slots are exactly as many as
/// the subsets, so the mapping is a bijection.
fn find_magic(mask: Bitboard, shift: u32, occupancies: &[Bitboard], rng: &mut XorShift) -> u64 {
    // Slot `i` is taken in the current attempt iff `stamps[i] == attempt`.
    let mut stamps = vec![0u32; occupancies.len()];
    let mut attempt = 0u32;

    loop {
        let candidate = rng.sparse();
        // Candidates that spread the mask over too few high bits almost never work.
        if (mask.0.wrapping_mul(candidate) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        attempt += 1;
        let fits = occupancies.iter().all(|occ| {
            let slot = (occ.0.wrapping_mul(candidate) >> shift) as usize;
            if stamps[slot] == attempt {
                return false;
            }
            stamps[slot] = attempt;
            true
        });
        if fits {
            return candidate;
        }
    }
}

/// Deterministic xorshift generator used for the magic search.
pub(crate) struct XorShift(u64);

impl XorShift {
    pub(crate) const fn new(seed: u64) -> Self {
        XorShift(seed)
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// A random value with roughly one bit in eight set.
    pub(crate) fn sparse(&mut self) -> u64 {
        self.next_u64() & self.next_u64() & self.next_u64()
    }
}
