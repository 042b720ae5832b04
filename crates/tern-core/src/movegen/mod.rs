//! Pseudo-legal move generation, split into noisy and quiet buckets.
//!
//! Generated moves may leave the mover's king attacked; legality is decided
//! by [`Board::make_move`].

mod king;
mod pawns;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, queen_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, MoveFlag};
use crate::piece_kind::PieceKind;
use crate::square::Square;

pub(crate) use self::king::castle_rook_squares;

/// Receives generated moves together with the moving and captured piece kinds.
pub trait MoveSink {
    fn push(&mut self, mv: Move, piece: PieceKind, captured: Option<PieceKind>);
}

impl MoveSink for Vec<Move> {
    #[inline]
    fn push(&mut self, mv: Move, _piece: PieceKind, _captured: Option<PieceKind>) {
        Vec::push(self, mv);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Noisy,
    Quiet,
}

/// Captures, en passant and promotions (quiet promotions included).
pub fn generate_noisy(board: &Board, sink: &mut impl MoveSink) {
    generate(board, Bucket::Noisy, Bitboard::FULL, sink);
}

/// Every pseudo-legal move [`generate_noisy`] does not produce.
pub fn generate_quiet(board: &Board, sink: &mut impl MoveSink) {
    generate(board, Bucket::Quiet, Bitboard::FULL, sink);
}

/// Both buckets, restricted to pieces standing on `from`.
pub(crate) fn generate_from(board: &Board, from: Square, sink: &mut impl MoveSink) {
    generate(board, Bucket::Noisy, from.bitboard(), sink);
    generate(board, Bucket::Quiet, from.bitboard(), sink);
}

/// Fully legal moves, noisy first. Allocates; meant for root handling and parsing.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    generate_noisy(board, &mut moves);
    generate_quiet(board, &mut moves);

    let mut scratch = board.clone();
    moves.retain(|&mv| {
        let legal = scratch.make_move(mv);
        scratch.undo_move(mv);
        legal
    });
    moves
}

fn generate(board: &Board, bucket: Bucket, sources: Bitboard, sink: &mut impl MoveSink) {
    let us = board.side_to_move();
    let occupied = board.occupied();
    // Kings are never captured; a position where that is possible is already illegal.
    let targets = board.side(!us) & !board.pieces(PieceKind::King);

    pawns::generate(board, bucket, sources, sink);

    for kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        for from in board.colored(us, kind) & sources {
            let attacks = match kind {
                PieceKind::Knight => knight_attacks(from),
                PieceKind::Bishop => bishop_attacks(from, occupied),
                PieceKind::Rook => rook_attacks(from, occupied),
                PieceKind::Queen => queen_attacks(from, occupied),
                _ => king_attacks(from),
            };
            match bucket {
                Bucket::Noisy => {
                    for to in attacks & targets {
                        let captured = board.piece_on(to).map(|piece| piece.kind);
                        sink.push(Move::new(from, to, MoveFlag::Capture), kind, captured);
                    }
                }
                Bucket::Quiet => {
                    for to in attacks & !occupied {
                        sink.push(Move::new(from, to, MoveFlag::Quiet), kind, None);
                    }
                }
            }
        }
    }

    if bucket == Bucket::Quiet && sources.contains(board.king_square(us)) {
        king::generate_castles(board, sink);
    }
}
