//! Board state with in-place move application and an undo journal.

use crate::attacks::AttackTables;
use crate::zobrist::ZOBRIST;
use crate::{Bitboard, EngineError};
use chess_core::{CastleSide, CastlingRights, Color, Fen, Move, Piece, Square};
use std::fmt;
use std::sync::Arc;

/// Journal capacity reserved up front; deeper games still work but may
/// reallocate.
const JOURNAL_CAPACITY: usize = 256;

/// Everything needed to take back one ply.
#[derive(Debug, Clone, Copy)]
struct MoveRecord {
    mv: Move,
    /// Kind that stood on the source square; `None` for a null move.
    moved: Option<Piece>,
    captured: Option<Piece>,
    en_passant: Option<Square>,
    castling: CastlingRights,
    halfmove_clock: u32,
    hash: u64,
}

/// Proof that a move was applied, consumed by the matching revert.
///
/// Tokens must be handed back in reverse order of creation.
#[must_use = "a move that is never reverted leaves the journal one ply deeper"]
#[derive(Debug)]
pub struct UndoToken {
    ply: usize,
}

/// A chess position that is mutated in place.
///
/// [`apply_move`](Self::apply_move) pushes a record onto an internal
/// journal and [`revert_move`](Self::revert_move) pops it, so a search can
/// walk the tree with a single board and no allocation. A position must
/// have exactly one owner while a search runs on it.
#[derive(Clone)]
pub struct Position {
    pieces: [Bitboard; 6],
    colors: [Bitboard; 2],
    mailbox: [Option<(Piece, Color)>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
    journal: Vec<MoveRecord>,
    tables: Arc<AttackTables>,
}

impl Position {
    /// The standard starting position on the shared attack tables.
    pub fn startpos() -> Self {
        Self::from_fen(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Parses a FEN string using the shared attack tables.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        Self::from_fen_with(AttackTables::shared(), fen)
    }

    /// Parses a FEN string on the given attack tables.
    ///
    /// Besides the syntax checks of [`Fen::parse`], the side that is not to
    /// move must not be in check.
    pub fn from_fen_with(tables: Arc<AttackTables>, fen: &str) -> Result<Self, EngineError> {
        let parsed = Fen::parse(fen)?;
        let mut position = Position {
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
            mailbox: [None; 64],
            side_to_move: parsed.side_to_move,
            castling: parsed.castling,
            en_passant: parsed.en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
            hash: 0,
            journal: Vec::with_capacity(JOURNAL_CAPACITY),
            tables,
        };
        for sq in Square::all() {
            if let Some((piece, color)) = parsed.board[sq.idx()] {
                position.put_piece(sq, piece, color);
            }
        }
        position.hash = position.compute_hash();

        let waiting = !position.side_to_move;
        if position.is_king_attacked(waiting) {
            return Err(EngineError::OpponentInCheck);
        }
        Ok(position)
    }

    /// Replaces the position with one parsed from `fen`, keeping the attack
    /// tables. On error `self` is left untouched.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        let fresh = Self::from_fen_with(Arc::clone(&self.tables), fen)?;
        *self = fresh;
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        Fen {
            board: self.mailbox,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_string()
    }

    #[inline]
    pub fn tables(&self) -> &AttackTables {
        &self.tables
    }

    /// A handle to the attack tables this position was built on.
    pub fn shared_tables(&self) -> Arc<AttackTables> {
        Arc::clone(&self.tables)
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.mailbox[sq.idx()]
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[piece.index()] & self.colors[color.index()]
    }

    /// All pieces of one kind, both colors.
    #[inline]
    pub fn pieces(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn color_occupancy(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// The fingerprint, maintained incrementally.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Number of plies applied and not yet reverted.
    #[inline]
    pub fn ply_depth(&self) -> usize {
        self.journal.len()
    }

    /// The move that led here, if it was applied on this board.
    pub fn last_move(&self) -> Option<Move> {
        self.journal.last().map(|record| record.mv)
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(Piece::King, color).lsb()
    }

    /// True if any piece of `by` attacks `sq`.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let tables = &*self.tables;
        let occupied = self.occupied();
        let queens = self.pieces_of(Piece::Queen, by);

        (tables.pawn_attacks(sq, !by) & self.pieces_of(Piece::Pawn, by)).is_not_empty()
            || (tables.knight_attacks(sq) & self.pieces_of(Piece::Knight, by)).is_not_empty()
            || (tables.king_attacks(sq) & self.pieces_of(Piece::King, by)).is_not_empty()
            || (tables.bishop_attacks(sq, occupied) & (self.pieces_of(Piece::Bishop, by) | queens))
                .is_not_empty()
            || (tables.rook_attacks(sq, occupied) & (self.pieces_of(Piece::Rook, by) | queens))
                .is_not_empty()
    }

    /// True if `color`'s king stands on an attacked square.
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|sq| self.is_square_attacked(sq, !color))
    }

    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.is_king_attacked(self.side_to_move)
    }

    /// Plays `m` on the board.
    ///
    /// `m` must be pseudo-legal here; captures, castling, en passant and
    /// promotion are all derived from the board. The returned token must be
    /// passed to [`revert_move`](Self::revert_move).
    ///
    /// # Panics
    ///
    /// Panics if the source square of `m` is empty.
    pub fn apply_move(&mut self, m: Move) -> UndoToken {
        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();
        let (piece, _) = self.mailbox[from.idx()].expect("apply_move: empty source square");

        let mut record = MoveRecord {
            mv: m,
            moved: Some(piece),
            captured: None,
            en_passant: self.en_passant,
            castling: self.castling,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        };

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
        }

        let victim = en_passant_victim(to, us);
        if piece == Piece::Pawn
            && Some(to) == record.en_passant
            && from.file() != to.file()
            && self.mailbox[victim.idx()] == Some((Piece::Pawn, them))
        {
            self.remove_piece(victim);
            record.captured = Some(Piece::Pawn);
        } else if let Some((captured, _)) = self.mailbox[to.idx()] {
            self.remove_piece(to);
            record.captured = Some(captured);
        }

        self.remove_piece(from);
        self.put_piece(to, m.promotion().unwrap_or(piece), us);

        if let Some(side) = castle_side(piece, from, to) {
            let rook_from = side.rook_from(us);
            self.remove_piece(rook_from);
            self.put_piece(side.rook_to(us), Piece::Rook, us);
        }

        let rights = self.castling.after_move(from, to);
        if rights != self.castling {
            self.hash ^= ZOBRIST.castling(self.castling) ^ ZOBRIST.castling(rights);
            self.castling = rights;
        }

        if piece == Piece::Pawn && from.rank_index().abs_diff(to.rank_index()) == 2 {
            let target = en_passant_victim(to, us);
            self.en_passant = Some(target);
            self.hash ^= ZOBRIST.en_passant(target);
        }

        if piece == Piece::Pawn || record.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = them;
        self.hash ^= ZOBRIST.side();
        self.journal.push(record);

        debug_assert_eq!(self.hash, self.compute_hash());
        UndoToken {
            ply: self.journal.len(),
        }
    }

    /// Takes back the move that produced `token`, restoring the board
    /// exactly as it was before.
    pub fn revert_move(&mut self, token: UndoToken) {
        debug_assert_eq!(token.ply, self.journal.len(), "tokens reverted out of order");
        let Some(record) = self.journal.pop() else {
            return;
        };
        let Some(piece) = record.moved else {
            debug_assert!(false, "revert_move called for a null move");
            self.restore_null(record);
            return;
        };

        let them = self.side_to_move;
        let us = !them;
        let from = record.mv.from();
        let to = record.mv.to();

        if let Some(side) = castle_side(piece, from, to) {
            self.remove_piece(side.rook_to(us));
            self.put_piece(side.rook_from(us), Piece::Rook, us);
        }

        self.remove_piece(to);
        self.put_piece(from, piece, us);

        if let Some(captured) = record.captured {
            // an en passant target is always empty, so a capture onto it took the pushed pawn
            if piece == Piece::Pawn && Some(to) == record.en_passant && from.file() != to.file() {
                self.put_piece(en_passant_victim(to, us), Piece::Pawn, them);
            } else {
                self.put_piece(to, captured, them);
            }
        }

        if us == Color::Black {
            self.fullmove_number -= 1;
        }
        self.side_to_move = us;
        self.castling = record.castling;
        self.en_passant = record.en_passant;
        self.halfmove_clock = record.halfmove_clock;
        self.hash = record.hash;
    }

    /// Passes the turn without moving a piece. Any en passant target lapses.
    pub fn apply_null_move(&mut self) -> UndoToken {
        self.journal.push(MoveRecord {
            mv: Move::NULL,
            moved: None,
            captured: None,
            en_passant: self.en_passant,
            castling: self.castling,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
        }
        self.halfmove_clock += 1;
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = !self.side_to_move;
        self.hash ^= ZOBRIST.side();
        UndoToken {
            ply: self.journal.len(),
        }
    }

    pub fn revert_null_move(&mut self, token: UndoToken) {
        debug_assert_eq!(token.ply, self.journal.len(), "tokens reverted out of order");
        if let Some(record) = self.journal.pop() {
            debug_assert!(record.moved.is_none(), "revert_null_move called for a real move");
            self.restore_null(record);
        }
    }

    fn restore_null(&mut self, record: MoveRecord) {
        self.side_to_move = !self.side_to_move;
        if self.side_to_move == Color::Black {
            self.fullmove_number -= 1;
        }
        self.en_passant = record.en_passant;
        self.castling = record.castling;
        self.halfmove_clock = record.halfmove_clock;
        self.hash = record.hash;
    }

    /// Fingerprint computed from scratch over the whole board.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0;
        for sq in self.occupied() {
            if let Some((piece, color)) = self.mailbox[sq.idx()] {
                hash ^= ZOBRIST.piece(piece, color, sq);
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.side();
        }
        hash ^= ZOBRIST.castling(self.castling);
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant(ep);
        }
        hash
    }

    /// Checks that the bitboards and the mailbox describe the same board.
    pub fn is_consistent(&self) -> bool {
        if (self.colors[0] & self.colors[1]).is_not_empty() {
            return false;
        }
        let mut kinds = Bitboard::EMPTY;
        for piece in Piece::ALL {
            if (kinds & self.pieces[piece.index()]).is_not_empty() {
                return false;
            }
            kinds |= self.pieces[piece.index()];
        }
        if kinds != self.occupied() {
            return false;
        }
        Square::all().all(|sq| {
            let expected = Piece::ALL.iter().find_map(|&piece| {
                let color = Color::BOTH
                    .into_iter()
                    .find(|&c| self.pieces_of(piece, c).contains(sq))?;
                Some((piece, color))
            });
            self.mailbox[sq.idx()] == expected
        })
    }

    #[inline]
    fn put_piece(&mut self, sq: Square, piece: Piece, color: Color) {
        debug_assert!(self.mailbox[sq.idx()].is_none());
        self.pieces[piece.index()].set(sq);
        self.colors[color.index()].set(sq);
        self.mailbox[sq.idx()] = Some((piece, color));
        self.hash ^= ZOBRIST.piece(piece, color, sq);
    }

    #[inline]
    fn remove_piece(&mut self, sq: Square) {
        if let Some((piece, color)) = self.mailbox[sq.idx()].take() {
            self.pieces[piece.index()].clear(sq);
            self.colors[color.index()].clear(sq);
            self.hash ^= ZOBRIST.piece(piece, color, sq);
        }
    }
}

/// The square directly behind `to` from `mover`'s point of view: the pawn
/// taken en passant, or the target left by a double push.
#[inline]
pub(crate) fn en_passant_victim(to: Square, mover: Color) -> Square {
    let behind = to.index() as i8 - mover.forward();
    Square::from_index(behind as u8).unwrap_or(to)
}

/// A king stepping two files is castling.
#[inline]
fn castle_side(piece: Piece, from: Square, to: Square) -> Option<CastleSide> {
    if piece != Piece::King || from.file_index().abs_diff(to.file_index()) != 2 {
        return None;
    }
    Some(if to.file_index() > from.file_index() {
        CastleSide::King
    } else {
        CastleSide::Queen
    })
}

impl PartialEq for Position {
    /// Compares board contents, ignoring the journal and the tables.
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.colors == other.colors
            && self.mailbox == other.mailbox
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.hash == other.hash
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("hash", &format_args!("{:#018x}", self.hash))
            .field("ply_depth", &self.journal.len())
            .finish()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = Square::from_coords(file as i8, rank as i8)
                    .and_then(|sq| self.piece_at(sq))
                    .map_or('.', |(piece, color)| piece.to_fen_char(color));
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    /// Applies `m`, checks the board invariants, reverts and checks that
    /// nothing changed.
    fn round_trip(pos: &mut Position, m: Move) -> Position {
        let before = pos.clone();
        let token = pos.apply_move(m);
        assert!(pos.is_consistent());
        assert_eq!(pos.hash(), pos.compute_hash());
        let after = pos.clone();
        pos.revert_move(token);
        assert_eq!(*pos, before);
        assert_eq!(pos.to_fen(), before.to_fen());
        after
    }

    #[test]
    fn startpos_fen_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), Fen::STARTPOS);
        assert!(pos.is_consistent());
        assert_eq!(pos.hash(), pos.compute_hash());
    }

    #[test]
    fn custom_fen_roundtrip() {
        for fen in [
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            KIWIPETE,
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn point_queries() {
        let pos = Position::startpos();
        assert_eq!(pos.piece_at(Square::E1), Some((Piece::King, Color::White)));
        assert_eq!(pos.piece_at(Square::E8), Some((Piece::King, Color::Black)));
        assert_eq!(pos.piece_at(Square::E4), None);
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.pieces_of(Piece::Pawn, Color::White).count(), 8);
        assert_eq!(pos.pieces(Piece::Pawn).count(), 16);
        assert_eq!(pos.color_occupancy(Color::Black).count(), 16);
        assert_eq!(pos.king_square(Color::White), Some(Square::E1));
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling(), CastlingRights::ALL);
        assert_eq!(pos.ply_depth(), 0);
    }

    #[test]
    fn rejects_side_not_to_move_in_check() {
        // white to move while the black king sits on the rook's file
        let err = Position::from_fen("4k3/8/8/8/8/8/8/4RK2 w - - 0 1").unwrap_err();
        assert_eq!(err, EngineError::OpponentInCheck);
    }

    #[test]
    fn set_fen_leaves_position_untouched_on_error() {
        let mut pos = Position::startpos();
        let _token = pos.apply_move(mv("e2e4"));
        let snapshot = pos.clone();
        assert!(pos.set_fen("not a fen").is_err());
        assert_eq!(pos, snapshot);
        assert_eq!(pos.ply_depth(), 1);

        pos.set_fen(KIWIPETE).unwrap();
        assert_eq!(pos.to_fen(), KIWIPETE);
        assert_eq!(pos.ply_depth(), 0);
    }

    #[test]
    fn double_push_sets_en_passant_target() {
        let mut pos = Position::startpos();
        let after = round_trip(&mut pos, mv("e2e4"));
        assert_eq!(after.en_passant(), Some(sq("e3")));
        assert_eq!(after.side_to_move(), Color::Black);
        assert_eq!(after.piece_at(sq("e4")), Some((Piece::Pawn, Color::White)));
        assert_eq!(after.piece_at(sq("e2")), None);
        assert_eq!(after.last_move(), Some(mv("e2e4")));
    }

    #[test]
    fn en_passant_capture_removes_passed_pawn() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3")
                .unwrap();
        let after = round_trip(&mut pos, mv("f5e6"));
        assert_eq!(after.piece_at(sq("e6")), Some((Piece::Pawn, Color::White)));
        assert_eq!(after.piece_at(sq("e5")), None);
        assert_eq!(after.en_passant(), None);
        assert_eq!(after.halfmove_clock(), 0);
        assert_eq!(after.pieces_of(Piece::Pawn, Color::Black).count(), 7);
    }

    #[test]
    fn en_passant_target_without_a_pushed_pawn_is_rejected() {
        for fen in [
            "4k3/8/8/3P4/8/8/8/4K3 w - e6 0 1",
            "4k3/8/8/3PN3/8/8/8/4K3 w - e6 0 1",
        ] {
            assert!(matches!(
                Position::from_fen(fen),
                Err(EngineError::Fen(chess_core::FenError::InvalidEnPassantSquare(_)))
            ));
        }
    }

    #[test]
    fn stale_en_passant_target_captures_nothing() {
        let mut pos = Position::from_fen("4k3/8/8/3PN3/8/8/8/4K3 w - - 0 1").unwrap();
        pos.en_passant = Some(sq("e6"));
        pos.hash = pos.compute_hash();

        let moves = crate::generate_moves(&mut pos);
        assert!(!moves.contains(mv("d5e6")));
        assert_eq!(pos.piece_at(sq("e5")), Some((Piece::Knight, Color::White)));

        let after = round_trip(&mut pos, mv("d5e6"));
        assert_eq!(after.piece_at(sq("e5")), Some((Piece::Knight, Color::White)));
        assert_eq!(after.piece_at(sq("e6")), Some((Piece::Pawn, Color::White)));
        assert_eq!(after.halfmove_clock(), 0);
    }

    #[test]
    fn castling_moves_the_rook() {
        let mut pos = Position::from_fen(KIWIPETE).unwrap();
        let short = round_trip(&mut pos, mv("e1g1"));
        assert_eq!(short.piece_at(sq("g1")), Some((Piece::King, Color::White)));
        assert_eq!(short.piece_at(sq("f1")), Some((Piece::Rook, Color::White)));
        assert_eq!(short.piece_at(sq("h1")), None);
        assert_eq!(short.castling().to_string(), "kq");

        let long = round_trip(&mut pos, mv("e1c1"));
        assert_eq!(long.piece_at(sq("c1")), Some((Piece::King, Color::White)));
        assert_eq!(long.piece_at(sq("d1")), Some((Piece::Rook, Color::White)));
        assert_eq!(long.piece_at(sq("a1")), None);
    }

    #[test]
    fn rook_capture_on_home_square_drops_right() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let after = round_trip(&mut pos, mv("a1a8"));
        assert_eq!(after.castling().to_string(), "Kk");
        assert_eq!(after.piece_at(Square::A8), Some((Piece::Rook, Color::White)));
    }

    #[test]
    fn promotion_with_capture() {
        let mut pos = Position::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let after = round_trip(&mut pos, mv("a7b8n"));
        assert_eq!(after.piece_at(Square::B8), Some((Piece::Knight, Color::White)));
        assert_eq!(after.pieces(Piece::Pawn).count(), 0);
        assert_eq!(after.pieces(Piece::Rook).count(), 0);
    }

    #[test]
    fn clocks_advance() {
        let mut pos = Position::startpos();
        let t1 = pos.apply_move(mv("g1f3"));
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmove_number(), 1);
        let t2 = pos.apply_move(mv("g8f6"));
        assert_eq!(pos.halfmove_clock(), 2);
        assert_eq!(pos.fullmove_number(), 2);
        assert_eq!(pos.ply_depth(), 2);
        pos.revert_move(t2);
        pos.revert_move(t1);
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn transposed_move_orders_share_a_fingerprint() {
        let mut a = Position::startpos();
        let mut b = Position::startpos();
        for m in ["g1f3", "g8f6", "b1c3"] {
            let _t = a.apply_move(mv(m));
        }
        for m in ["b1c3", "g8f6", "g1f3"] {
            let _t = b.apply_move(mv(m));
        }
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a, b);
    }

    #[test]
    fn null_move_flips_side_and_clears_en_passant() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
                .unwrap();
        let before = pos.clone();
        let token = pos.apply_null_move();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.hash(), pos.compute_hash());
        pos.revert_null_move(token);
        assert_eq!(pos, before);
    }

    #[test]
    fn attack_queries() {
        let pos = Position::startpos();
        assert!(pos.is_square_attacked(sq("e3"), Color::White));
        assert!(pos.is_square_attacked(sq("f3"), Color::White));
        assert!(!pos.is_square_attacked(sq("e4"), Color::White));
        assert!(pos.is_square_attacked(sq("f6"), Color::Black));
        assert!(!pos.is_in_check());

        let checked = Position::from_fen("4k3/8/8/8/8/8/8/q3K3 w - - 0 1").unwrap();
        assert!(checked.is_in_check());
        assert!(checked.is_square_attacked(sq("d1"), Color::Black));
    }

    #[test]
    fn explicit_tables_are_shared() {
        let tables = AttackTables::shared();
        let pos = Position::from_fen_with(Arc::clone(&tables), Fen::STARTPOS).unwrap();
        assert!(Arc::ptr_eq(&pos.shared_tables(), &tables));
    }
}
