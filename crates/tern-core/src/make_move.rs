//! Make/undo with an undo stack.

use crate::attacks::pawn_attacks;
use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::chess_move::{Move, MoveFlag};
use crate::color::Color;
use crate::movegen::castle_rook_squares;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;
use crate::zobrist;

/// State a move destroys, saved so [`Board::undo_move`] can restore it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Undo {
    pub(crate) captured: Option<Piece>,
    pub(crate) castling: CastleRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    /// Hash of the position before the move.
    pub(crate) hash: u64,
    /// False when the move had no piece of the side to move on its source square.
    pub(crate) applied: bool,
}

/// Square of the pawn removed by an en passant capture.
#[inline]
fn en_passant_victim(mv: Move) -> Square {
    Square::from_coords(mv.dest().file(), mv.source().rank())
}

impl Board {
    /// Play a pseudo-legal move and report whether it was legal (the mover's
    /// king is not left attacked).
    ///
    /// The move is always pushed on the undo stack, legal or not, so every
    /// call must be paired with [`Board::undo_move`].
    pub fn make_move(&mut self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = !us;
        let (from, to, flag) = (mv.source(), mv.dest(), mv.flag());

        let mut undo = Undo {
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
            applied: false,
        };

        let moved = match self.piece_on(from) {
            Some(piece) if piece.color == us => piece,
            _ => {
                self.history.push(undo);
                return false;
            }
        };
        undo.applied = true;

        self.hash ^= zobrist::en_passant(self.en_passant);
        self.en_passant = None;

        if flag == MoveFlag::EnPassant {
            undo.captured = self.remove_piece(en_passant_victim(mv));
        } else if flag.is_capture() {
            undo.captured = self.remove_piece(to);
        }

        self.remove_piece(from);
        let placed = match mv.promotion_kind() {
            Some(kind) => Piece::new(us, kind),
            None => moved,
        };
        self.put_piece(placed, to);

        if flag.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(us, flag);
            if let Some(rook) = self.remove_piece(rook_from) {
                self.put_piece(rook, rook_to);
            }
        }

        if flag == MoveFlag::DoublePawnPush {
            let target = Square::from_coords(from.file(), (from.rank() + to.rank()) / 2);
            if (pawn_attacks(us, target) & self.colored(them, PieceKind::Pawn)).is_nonempty() {
                self.en_passant = Some(target);
                self.hash ^= zobrist::en_passant(self.en_passant);
            }
        }

        self.hash ^= zobrist::castling(self.castling);
        self.castling = self.castling.after_move(from, to);
        self.hash ^= zobrist::castling(self.castling);

        self.halfmove_clock = if moved.kind == PieceKind::Pawn || undo.captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;
        self.hash ^= zobrist::side(Color::Black);
        self.history.push(undo);

        !self.is_attacked(self.king_square(us), them)
    }

    /// Take back the most recent [`Board::make_move`]. `mv` must be that move.
    pub fn undo_move(&mut self, mv: Move) {
        let undo = self
            .history
            .pop()
            .expect("undo_move called without a matching make_move");

        if undo.applied {
            let us = !self.side_to_move;
            let (from, to, flag) = (mv.source(), mv.dest(), mv.flag());

            if flag.is_castle() {
                let (rook_from, rook_to) = castle_rook_squares(us, flag);
                if let Some(rook) = self.remove_piece(rook_to) {
                    self.put_piece(rook, rook_from);
                }
            }

            let placed = self.remove_piece(to);
            let original = if mv.is_promotion() {
                Some(Piece::new(us, PieceKind::Pawn))
            } else {
                placed
            };
            if let Some(piece) = original {
                self.put_piece(piece, from);
            }

            if let Some(captured) = undo.captured {
                let sq = if flag == MoveFlag::EnPassant { en_passant_victim(mv) } else { to };
                self.put_piece(captured, sq);
            }

            if us == Color::Black {
                self.fullmove_number -= 1;
            }
            self.side_to_move = us;
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
    }
}
