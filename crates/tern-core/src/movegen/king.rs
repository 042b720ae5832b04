//! Castling generation.

use crate::board::Board;
use crate::castle_rights::CastleSide;
use crate::chess_move::{Move, MoveFlag};
use crate::color::Color;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::MoveSink;

struct CastlePath {
    side: CastleSide,
    flag: MoveFlag,
    rook_file: u8,
    king_to_file: u8,
    /// Square the king crosses, which must not be attacked.
    transit_file: u8,
    /// Files between king and rook, which must be empty.
    empty_files: &'static [u8],
}

const PATHS: [CastlePath; 2] = [
    CastlePath {
        side: CastleSide::King,
        flag: MoveFlag::KingCastle,
        rook_file: 7,
        king_to_file: 6,
        transit_file: 5,
        empty_files: &[5, 6],
    },
    CastlePath {
        side: CastleSide::Queen,
        flag: MoveFlag::QueenCastle,
        rook_file: 0,
        king_to_file: 2,
        transit_file: 3,
        empty_files: &[1, 2, 3],
    },
];

/// Rook source and destination for a castling move by `color`.
pub(crate) fn castle_rook_squares(color: Color, flag: MoveFlag) -> (Square, Square) {
    let rank = color.back_rank();
    match flag {
        MoveFlag::QueenCastle => (Square::from_coords(0, rank), Square::from_coords(3, rank)),
        _ => (Square::from_coords(7, rank), Square::from_coords(5, rank)),
    }
}

/// Castling moves. The destination square is left to `make_move`'s legality check.
pub(super) fn generate_castles(board: &Board, sink: &mut impl MoveSink) {
    let us = board.side_to_move();
    let rank = us.back_rank();
    let king_from = Square::from_coords(4, rank);
    if board.piece_on(king_from) != Some(Piece::new(us, PieceKind::King)) {
        return;
    }
    let rights = board.castling();
    if !rights.has(us, CastleSide::King) && !rights.has(us, CastleSide::Queen) {
        return;
    }
    if board.is_attacked(king_from, !us) {
        return;
    }

    let occupied = board.occupied();
    for path in &PATHS {
        if !rights.has(us, path.side) {
            continue;
        }
        let rook_home = board.piece_on(Square::from_coords(path.rook_file, rank))
            == Some(Piece::new(us, PieceKind::Rook));
        let clear = path
            .empty_files
            .iter()
            .all(|&file| !occupied.contains(Square::from_coords(file, rank)));
        if rook_home
            && clear
            && !board.is_attacked(Square::from_coords(path.transit_file, rank), !us)
        {
            let to = Square::from_coords(path.king_to_file, rank);
            sink.push(Move::new(king_from, to, path.flag), PieceKind::King, None);
        }
    }
}
