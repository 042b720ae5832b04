//! Position state with incremental Zobrist hashing.

use std::fmt;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::castle_rights::CastleRights;
use crate::chess_move::Move;
use crate::color::Color;
use crate::error::MoveParseError;
use crate::make_move::Undo;
use crate::movegen::{self, MoveSink};
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;
use crate::zobrist;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// A chess position plus the undo stack of the moves that led to it.
///
/// Cloning is a deep copy, so each search worker owns an independent board.
#[derive(Debug, Clone)]
pub struct Board {
    mailbox: [Option<Piece>; 64],
    kinds: [Bitboard; 6],
    sides: [Bitboard; 2],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastleRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: u64,
    pub(crate) history: Vec<Undo>,
}

impl Board {
    pub(crate) fn empty() -> Board {
        Board {
            mailbox: [None; 64],
            kinds: [Bitboard::EMPTY; 6],
            sides: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            castling: CastleRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: Vec::new(),
        }
    }

    pub fn starting_position() -> Board {
        let mut board = Board::empty();
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            for color in Color::BOTH {
                let sq = Square::from_coords(file, color.back_rank());
                board.put_piece(Piece::new(color, kind), sq);
                board.put_piece(
                    Piece::new(color, PieceKind::Pawn),
                    Square::from_coords(file, color.pawn_start_rank()),
                );
            }
        }
        board.castling = CastleRights::ALL;
        board.hash = board.compute_hash();
        board
    }

    /// Place `piece` on an empty square.
    pub(crate) fn put_piece(&mut self, piece: Piece, sq: Square) {
        debug_assert!(self.mailbox[sq.index()].is_none(), "{sq} is occupied");
        let bb = sq.bitboard();
        self.mailbox[sq.index()] = Some(piece);
        self.kinds[piece.kind.index()] |= bb;
        self.sides[piece.color.index()] |= bb;
        self.hash ^= zobrist::piece(piece, sq);
    }

    pub(crate) fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.mailbox[sq.index()].take()?;
        let bb = !sq.bitboard();
        self.kinds[piece.kind.index()] &= bb;
        self.sides[piece.color.index()] &= bb;
        self.hash ^= zobrist::piece(piece, sq);
        Some(piece)
    }

    pub(crate) fn compute_hash(&self) -> u64 {
        let mut hash = zobrist::side(self.side_to_move)
            ^ zobrist::castling(self.castling)
            ^ zobrist::en_passant(self.en_passant);
        for sq in self.occupied() {
            if let Some(piece) = self.mailbox[sq.index()] {
                hash ^= zobrist::piece(piece, sq);
            }
        }
        hash
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    /// All pieces of `kind`, both colors.
    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.kinds[kind.index()]
    }

    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    #[inline]
    pub fn colored(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.kinds[kind.index()] & self.sides[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.sides[0] | self.sides[1]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    /// En passant target, set only when a pawn can actually capture there.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Number of moves made on this board that have not been undone.
    #[inline]
    pub fn game_ply(&self) -> usize {
        self.history.len()
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.colored(color, PieceKind::King)
            .lsb()
            .expect("every position has a king for each side")
    }

    /// Whether any piece of color `by` attacks `sq`.
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        let them = self.side(by);
        let occupied = self.occupied();
        let diagonal = self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen);
        let straight = self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen);

        (pawn_attacks(!by, sq) & self.pieces(PieceKind::Pawn) & them).is_nonempty()
            || (knight_attacks(sq) & self.pieces(PieceKind::Knight) & them).is_nonempty()
            || (king_attacks(sq) & self.pieces(PieceKind::King) & them).is_nonempty()
            || (bishop_attacks(sq, occupied) & diagonal & them).is_nonempty()
            || (rook_attacks(sq, occupied) & straight & them).is_nonempty()
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.is_attacked(self.king_square(us), !us)
    }

    /// True once a hundred half-moves have passed without a capture or pawn move.
    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Whether the current position already occurred since the last
    /// irreversible move, with the same side to move.
    pub fn is_repetition(&self) -> bool {
        self.history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .skip(1)
            .step_by(2)
            .any(|undo| undo.hash == self.hash)
    }

    /// Whether generation from this position would produce `mv`.
    pub fn is_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_null() {
            return false;
        }
        match self.piece_on(mv.source()) {
            Some(piece) if piece.color == self.side_to_move => {}
            _ => return false,
        }
        let mut finder = Finder { target: mv, found: false };
        movegen::generate_from(self, mv.source(), &mut finder);
        finder.found
    }

    /// Resolve a long-algebraic move string (`e2e4`, `e7e8q`) against the legal moves here.
    pub fn parse_uci_move(&self, s: &str) -> Result<Move, MoveParseError> {
        let syntax = || MoveParseError::Syntax(s.to_string());
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(syntax());
        }
        let from = Square::from_algebraic(&s[0..2]).ok_or_else(syntax)?;
        let to = Square::from_algebraic(&s[2..4]).ok_or_else(syntax)?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
                _ => return Err(syntax()),
            },
        };

        movegen::legal_moves(self)
            .into_iter()
            .find(|mv| mv.source() == from && mv.dest() == to && mv.promotion_kind() == promotion)
            .ok_or_else(|| MoveParseError::Illegal(s.to_string()))
    }
}

struct Finder {
    target: Move,
    found: bool,
}

impl MoveSink for Finder {
    fn push(&mut self, mv: Move, _piece: PieceKind, _captured: Option<PieceKind>) {
        self.found |= mv == self.target;
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::starting_position()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = self
                    .piece_on(Square::from_coords(file, rank))
                    .map_or('.', |piece| piece.fen_char());
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::chess_move::{Move, MoveFlag};
    use crate::color::Color;
    use crate::piece::Piece;
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    #[test]
    fn starting_position_layout() {
        let board = Board::starting_position();
        assert_eq!(board.occupied().count(), 32);
        assert_eq!(board.piece_on(Square::E1), Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(board.piece_on(Square::D8), Some(Piece::new(Color::Black, PieceKind::Queen)));
        assert_eq!(board.colored(Color::White, PieceKind::Pawn).count(), 8);
        assert_eq!(board.side_to_move(), Color::White);
        assert!(!board.in_check());
        assert_eq!(board.hash(), board.compute_hash());
    }

    #[test]
    fn attack_detection() {
        let board = Board::starting_position();
        assert!(board.is_attacked(Square::F3, Color::White));
        assert!(board.is_attacked(Square::E6, Color::Black));
        assert!(!board.is_attacked(Square::E4, Color::White));
        assert!(!board.is_attacked(Square::E5, Color::Black));
    }

    #[test]
    fn pseudo_legality_check() {
        let board = Board::starting_position();
        assert!(board.is_pseudo_legal(Move::new(Square::G1, Square::F3, MoveFlag::Quiet)));
        assert!(board.is_pseudo_legal(Move::new(Square::E2, Square::E4, MoveFlag::DoublePawnPush)));
        // Right squares, wrong flag.
        assert!(!board.is_pseudo_legal(Move::new(Square::E2, Square::E4, MoveFlag::Quiet)));
        // Opponent's piece.
        assert!(!board.is_pseudo_legal(Move::new(Square::G8, Square::F6, MoveFlag::Quiet)));
        assert!(!board.is_pseudo_legal(Move::NULL));
    }

    #[test]
    fn parse_uci_moves() {
        let board = Board::starting_position();
        let mv = board.parse_uci_move("e2e4").unwrap();
        assert_eq!(mv.flag(), MoveFlag::DoublePawnPush);
        assert!(board.parse_uci_move("e2e5").is_err());
        assert!(board.parse_uci_move("e2").is_err());
        assert!(board.parse_uci_move("e7e8k").is_err());

        let promo: Board = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1".parse().unwrap();
        let mv = promo.parse_uci_move("e7e8n").unwrap();
        assert_eq!(mv.promotion_kind(), Some(PieceKind::Knight));
    }

    #[test]
    fn repetition_after_knight_shuffle() {
        let mut board = Board::starting_position();
        for s in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = board.parse_uci_move(s).unwrap();
            assert!(board.make_move(mv));
            if s != "f6g8" {
                assert!(!board.is_repetition(), "no repetition expected after {s}");
            }
        }
        assert!(board.is_repetition());
    }

    #[test]
    fn pawn_move_resets_repetition_window() {
        let mut board = Board::starting_position();
        for s in ["g1f3", "g8f6", "f3g1", "f6g8", "e2e4"] {
            let mv = board.parse_uci_move(s).unwrap();
            board.make_move(mv);
        }
        assert!(!board.is_repetition());
    }
}
