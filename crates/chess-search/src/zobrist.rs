//! Zobrist keys for the position fingerprint.
//!
//! The fingerprint XORs one key per (color, piece, square) occupied, one key
//! per castling right held, one key for the en passant file when a target is
//! set and one key when black is to move. Keys come from a fixed-seed
//! generator evaluated at compile time.

use chess_core::{CastlingRights, Color, Piece, Square};

pub struct ZobristKeys {
    /// `[color][piece][square]`
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// One key per right, in `CastlingRights` bit order.
    castling: [u64; 4],
    en_passant: [u64; 8],
}

const fn splitmix(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (state, z ^ (z >> 31))
}

impl ZobristKeys {
    const fn generate(seed: u64) -> Self {
        let mut state = seed;
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut sq = 0;
                while sq < 64 {
                    let (next, key) = splitmix(state);
                    state = next;
                    pieces[color][piece][sq] = key;
                    sq += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        let (next, black_to_move) = splitmix(state);
        state = next;

        let mut castling = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            let (next, key) = splitmix(state);
            state = next;
            castling[i] = key;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            let (next, key) = splitmix(state);
            state = next;
            en_passant[i] = key;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece(&self, piece: Piece, color: Color, sq: Square) -> u64 {
        self.pieces[color.index()][piece.index()][sq.idx()]
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.black_to_move
    }

    /// Combined key of every right held in `rights`.
    #[inline]
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        let mut key = 0;
        for (bit, right_key) in self.castling.iter().enumerate() {
            if rights.raw() & (1 << bit) != 0 {
                key ^= right_key;
            }
        }
        key
    }

    /// Key for an en passant target on `sq`; only the file matters.
    #[inline]
    pub fn en_passant(&self, sq: Square) -> u64 {
        self.en_passant[sq.file_index() as usize]
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::generate(0x0123_4567_89AB_CDEF);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct() {
        let mut all: Vec<u64> = Vec::new();
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in Square::all() {
                    all.push(ZOBRIST.piece(piece, color, sq));
                }
            }
        }
        all.push(ZOBRIST.side());
        all.extend(ZOBRIST.castling.iter());
        all.extend(ZOBRIST.en_passant.iter());
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
        assert!(!all.contains(&0));
    }

    #[test]
    fn castling_key_folds_rights() {
        let none = ZOBRIST.castling(CastlingRights::NONE);
        assert_eq!(none, 0);
        let white_king = ZOBRIST.castling(CastlingRights::new(CastlingRights::WHITE_KINGSIDE));
        let white_queen = ZOBRIST.castling(CastlingRights::new(CastlingRights::WHITE_QUEENSIDE));
        let both = ZOBRIST.castling(CastlingRights::new(
            CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        ));
        assert_eq!(both, white_king ^ white_queen);
    }

    #[test]
    fn en_passant_key_depends_on_file_only() {
        let e3 = Square::from_algebraic("e3").unwrap();
        let e6 = Square::from_algebraic("e6").unwrap();
        let d6 = Square::from_algebraic("d6").unwrap();
        assert_eq!(ZOBRIST.en_passant(e3), ZOBRIST.en_passant(e6));
        assert_ne!(ZOBRIST.en_passant(e6), ZOBRIST.en_passant(d6));
    }
}
