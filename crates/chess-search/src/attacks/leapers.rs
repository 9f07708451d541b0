//! Knight, king and pawn attack sets, computed at compile time.

use crate::Bitboard;

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Pawn capture steps, white then black.
const PAWN_STEPS: [[(i8, i8); 2]; 2] = [[(-1, 1), (1, 1)], [(-1, -1), (1, -1)]];

pub(crate) const KNIGHT: [Bitboard; 64] = step_table(&KNIGHT_STEPS);
pub(crate) const KING: [Bitboard; 64] = step_table(&KING_STEPS);
pub(crate) const PAWN: [[Bitboard; 64]; 2] = [step_table(&PAWN_STEPS[0]), step_table(&PAWN_STEPS[1])];

/// For every square, the union of the on-board targets reached by one of
/// `steps` (file delta, rank delta).
const fn step_table(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < steps.len() {
            let f = file + steps[i].0;
            let r = rank + steps[i].1;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq] = Bitboard(bits);
        sq += 1;
    }
    table
}
