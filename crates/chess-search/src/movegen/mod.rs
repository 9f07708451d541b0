//! Move generation.
//!
//! Pseudo-legal moves are produced in a fixed order (pawns, knights,
//! bishops, rooks, queens, king, castling) and then filtered for legality by
//! playing each one on the board and checking the mover's king.

pub mod perft;

use crate::position::en_passant_victim;
use crate::{Bitboard, EngineError, Position, UndoToken};
use chess_core::{CastleSide, Move, Piece, Square};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so a fixed-size array
/// avoids heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Keeps only the moves for which `f` returns true, preserving order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            let m = self.moves[read];
            if f(m) {
                self.moves[write] = m;
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Appends every pseudo-legal move of the side to move to `moves`.
pub fn generate_pseudo_legal(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let own = position.color_occupancy(us);
    let occupied = position.occupied();
    let tables = position.tables();

    generate_pawn_moves(position, moves);

    for from in position.pieces_of(Piece::Knight, us) {
        push_targets(moves, from, tables.knight_attacks(from) & !own);
    }
    for from in position.pieces_of(Piece::Bishop, us) {
        push_targets(moves, from, tables.bishop_attacks(from, occupied) & !own);
    }
    for from in position.pieces_of(Piece::Rook, us) {
        push_targets(moves, from, tables.rook_attacks(from, occupied) & !own);
    }
    for from in position.pieces_of(Piece::Queen, us) {
        push_targets(moves, from, tables.queen_attacks(from, occupied) & !own);
    }
    for from in position.pieces_of(Piece::King, us) {
        push_targets(moves, from, tables.king_attacks(from) & !own);
    }

    generate_castling_moves(position, moves);
}

/// All legal moves of the side to move, in generation order.
///
/// The board is borrowed mutably because every candidate is played and
/// taken back; it is unchanged on return.
pub fn generate_moves(position: &mut Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, &mut moves);
    let us = position.side_to_move();
    moves.retain(|m| {
        let token = position.apply_move(m);
        let legal = !position.is_king_attacked(us);
        position.revert_move(token);
        legal
    });
    moves
}

/// True if `m` is one of the legal moves here.
pub fn is_legal(position: &mut Position, m: Move) -> bool {
    generate_moves(position).contains(m)
}

#[inline]
fn push_targets(moves: &mut MoveList, from: Square, targets: Bitboard) {
    for to in targets {
        moves.push(Move::new(from, to));
    }
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, promotes: bool) {
    if promotes {
        for piece in Piece::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, piece));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

/// Pushes, double pushes, captures and en passant, per pawn.
fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let them = position.color_occupancy(!us);
    let empty = !position.occupied();
    let tables = position.tables();
    let promotion_rank = us.promotion_rank();
    let start_rank = us.pawn_rank();

    for from in position.pieces_of(Piece::Pawn, us) {
        let Some(one) = from.offset(0, us.forward() / 8) else {
            continue;
        };
        if empty.contains(one) {
            push_pawn_move(moves, from, one, one.rank_index() == promotion_rank);
            if from.rank_index() == start_rank {
                if let Some(two) = one.offset(0, us.forward() / 8) {
                    if empty.contains(two) {
                        moves.push(Move::new(from, two));
                    }
                }
            }
        }

        let attacks = tables.pawn_attacks(from, us);
        for to in attacks & them {
            push_pawn_move(moves, from, to, to.rank_index() == promotion_rank);
        }
        if let Some(ep) = position.en_passant() {
            let victim = en_passant_victim(ep, us);
            if attacks.contains(ep) && position.pieces_of(Piece::Pawn, !us).contains(victim) {
                moves.push(Move::new(from, ep));
            }
        }
    }
}

/// Castling: right held, rook at home, the squares between king and rook
/// empty, and neither the king's square, the square it crosses nor its
/// destination attacked.
fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let rights = position.castling();
    if rights.is_empty() {
        return;
    }
    let king_from = Square::E1.relative_to(us);
    if position.piece_at(king_from) != Some((Piece::King, us)) {
        return;
    }
    let them = !us;
    if position.is_square_attacked(king_from, them) {
        return;
    }

    for side in CastleSide::BOTH {
        if !rights.has(us, side) {
            continue;
        }
        let rook_from = side.rook_from(us);
        if position.piece_at(rook_from) != Some((Piece::Rook, us)) {
            continue;
        }
        if (between(king_from, rook_from) & position.occupied()).is_not_empty() {
            continue;
        }
        let king_to = side.king_to(us);
        let crossed = side.rook_to(us);
        if position.is_square_attacked(crossed, them) || position.is_square_attacked(king_to, them)
        {
            continue;
        }
        moves.push(Move::new(king_from, king_to));
    }
}

/// Squares strictly between two squares on the same rank.
fn between(a: Square, b: Square) -> Bitboard {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let mut squares = Bitboard::EMPTY;
    for index in low.index() + 1..high.index() {
        if let Some(sq) = Square::from_index(index) {
            squares.set(sq);
        }
    }
    squares
}

impl Position {
    /// Resolves long algebraic notation against the legal moves here.
    pub fn parse_move(&mut self, uci: &str) -> Result<Move, EngineError> {
        let wanted = Move::from_uci(uci).ok_or_else(|| EngineError::InvalidMove(uci.to_string()))?;
        if is_legal(self, wanted) {
            Ok(wanted)
        } else {
            Err(EngineError::IllegalMove(uci.to_string()))
        }
    }

    /// Plays an externally supplied move after checking it is legal.
    pub fn play_uci(&mut self, uci: &str) -> Result<UndoToken, EngineError> {
        let m = self.parse_move(uci)?;
        Ok(self.apply_move(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Color;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    fn legal(fen: &str) -> MoveList {
        generate_moves(&mut Position::from_fen(fen).unwrap())
    }

    #[test]
    fn movelist_push_and_retain() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        list.push(mv("e2e3"));
        list.push(mv("e2e4"));
        list.push(mv("e3e4"));
        assert_eq!(list.len(), 3);
        assert_eq!(list[1], mv("e2e4"));

        list.retain(|m| m.from() == sq("e2"));
        assert_eq!(list.as_slice(), &[mv("e2e3"), mv("e2e4")]);
        list.clear();
        assert!(list.is_empty());
        assert!(MoveList::default().is_empty());
    }

    #[test]
    fn twenty_moves_from_start() {
        let mut pos = Position::startpos();
        let moves = generate_moves(&mut pos);
        assert_eq!(moves.len(), 20);
        assert_eq!(pos, Position::startpos());
        assert_eq!(pos.ply_depth(), 0);
    }

    #[test]
    fn generation_order_is_pawns_first_then_knights() {
        let moves = legal(chess_core::Fen::STARTPOS);
        assert!(moves.as_slice()[..16]
            .iter()
            .all(|m| m.from().rank_index() == 1));
        assert_eq!(moves[16].from(), Square::B1);
        assert_eq!(moves[19].from(), Square::G1);
    }

    #[test]
    fn castling_both_sides() {
        let moves = legal("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert!(moves.contains(mv("e1g1")));
        assert!(moves.contains(mv("e1c1")));
        let last_two: Vec<Move> = moves.as_slice()[moves.len() - 2..].to_vec();
        assert_eq!(last_two, vec![mv("e1g1"), mv("e1c1")]);
    }

    #[test]
    fn no_castling_through_attacked_square() {
        let moves = legal("r3k2r/pppp1ppp/8/4r3/8/8/PPPP2PP/R3K2R w KQkq - 0 1");
        // in check from e5: no castling at all
        assert!(!moves.contains(mv("e1g1")));
        assert!(!moves.contains(mv("e1c1")));

        let moves = legal("r3k2r/ppp2ppp/8/3r1r2/8/8/PPP3PP/R3K2R w KQkq - 0 1");
        assert!(!moves.contains(mv("e1g1")));
        assert!(!moves.contains(mv("e1c1")));
    }

    #[test]
    fn queenside_castling_allows_attacked_b_file() {
        // b1 is attacked but the king never crosses it
        let moves = legal("1r2k3/8/8/8/8/8/P1PPPPPP/R3K3 w Q - 0 1");
        assert!(moves.contains(mv("e1c1")));
    }

    #[test]
    fn castling_requires_rook_at_home() {
        let moves = legal("4k3/8/8/8/8/8/8/4K2N w K - 0 1");
        assert!(!moves.contains(mv("e1g1")));
    }

    #[test]
    fn en_passant_is_generated() {
        let moves = legal("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3");
        assert!(moves.contains(mv("f5e6")));
    }

    #[test]
    fn en_passant_exposing_king_is_rejected() {
        // capturing would open the fifth rank to the rook on h5
        let moves = legal("8/8/8/KPp4r/8/8/8/7k w - c6 0 1");
        assert!(!moves.contains(mv("b5c6")));
    }

    #[test]
    fn four_promotions_in_fixed_order() {
        let moves = legal("8/P7/8/8/8/8/8/4K2k w - - 0 1");
        let promotions: Vec<Move> = moves
            .as_slice()
            .iter()
            .copied()
            .filter(|m| m.promotion().is_some())
            .collect();
        assert_eq!(
            promotions,
            vec![mv("a7a8q"), mv("a7a8r"), mv("a7a8b"), mv("a7a8n")]
        );
    }

    #[test]
    fn checkmate_has_no_moves() {
        // back-rank mate by the queen on d1
        let mut mated = Position::from_fen("3k4/8/8/8/8/8/5PPP/3q2K1 w - - 0 1").unwrap();
        assert!(mated.is_in_check());
        assert!(generate_moves(&mut mated).is_empty());
    }

    #[test]
    fn stalemate_has_no_moves_and_no_check() {
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!pos.is_in_check());
        assert!(generate_moves(&mut pos).is_empty());
    }

    #[test]
    fn legal_moves_never_leave_king_attacked() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let legal = generate_moves(&mut pos);
        let mut pseudo = MoveList::new();
        generate_pseudo_legal(&pos, &mut pseudo);
        let us = pos.side_to_move();
        for &m in &pseudo {
            let token = pos.apply_move(m);
            let exposed = pos.is_king_attacked(us);
            pos.revert_move(token);
            assert_eq!(legal.contains(m), !exposed, "{m}");
        }
    }

    #[test]
    fn parse_move_rejects_bad_input() {
        let mut pos = Position::startpos();
        assert_eq!(pos.parse_move("e2e4"), Ok(mv("e2e4")));
        assert_eq!(
            pos.parse_move("e2e5"),
            Err(EngineError::IllegalMove("e2e5".to_string()))
        );
        assert_eq!(
            pos.parse_move("xyz"),
            Err(EngineError::InvalidMove("xyz".to_string()))
        );

        let mut promo = Position::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        assert!(matches!(promo.parse_move("a7a8"), Err(EngineError::IllegalMove(_))));
        assert_eq!(promo.parse_move("a7a8r"), Ok(mv("a7a8r")));
    }

    #[test]
    fn play_uci_applies_legal_moves_only() {
        let mut pos = Position::startpos();
        let token = pos.play_uci("e2e4").unwrap();
        assert_eq!(pos.piece_at(Square::E4), Some((Piece::Pawn, Color::White)));
        assert!(pos.play_uci("e2e4").is_err());
        assert_eq!(pos.ply_depth(), 1);
        pos.revert_move(token);
        assert_eq!(pos, Position::startpos());
    }
}
