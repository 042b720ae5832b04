//! Pawn pushes, captures, en passant and promotions.

use crate::attacks::pawn_attacks;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, MoveFlag};
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::{Bucket, MoveSink};

fn push_promotions(
    from: Square,
    to: Square,
    captured: Option<PieceKind>,
    sink: &mut impl MoveSink,
) {
    for kind in PieceKind::PROMOTIONS {
        let flag = MoveFlag::promotion(kind, captured.is_some());
        sink.push(Move::new(from, to, flag), PieceKind::Pawn, captured);
    }
}

pub(super) fn generate(board: &Board, bucket: Bucket, sources: Bitboard, sink: &mut impl MoveSink) {
    let us = board.side_to_move();
    let forward = us.forward();
    let occupied = board.occupied();
    let targets = board.side(!us) & !board.pieces(PieceKind::King);

    for from in board.colored(us, PieceKind::Pawn) & sources {
        let promotes = from.rank() as i8 + forward == us.promotion_rank() as i8;

        if let Some(one) = from.offset(0, forward).filter(|sq| !occupied.contains(*sq)) {
            match (bucket, promotes) {
                (Bucket::Noisy, true) => push_promotions(from, one, None, sink),
                (Bucket::Quiet, false) => {
                    sink.push(Move::new(from, one, MoveFlag::Quiet), PieceKind::Pawn, None);
                    if from.rank() == us.pawn_start_rank() {
                        let two = one.offset(0, forward).filter(|sq| !occupied.contains(*sq));
                        if let Some(two) = two {
                            sink.push(
                                Move::new(from, two, MoveFlag::DoublePawnPush),
                                PieceKind::Pawn,
                                None,
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        if bucket == Bucket::Quiet {
            continue;
        }

        let attacks = pawn_attacks(us, from);
        for to in attacks & targets {
            let captured = board.piece_on(to).map(|piece| piece.kind);
            if promotes {
                push_promotions(from, to, captured, sink);
            } else {
                sink.push(Move::new(from, to, MoveFlag::Capture), PieceKind::Pawn, captured);
            }
        }

        if let Some(target) = board.en_passant().filter(|sq| attacks.contains(*sq)) {
            sink.push(
                Move::new(from, target, MoveFlag::EnPassant),
                PieceKind::Pawn,
                Some(PieceKind::Pawn),
            );
        }
    }
}
