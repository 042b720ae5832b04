//! Piece-square tables, built from a few geometric terms at compile time.
//!
//! Tables are from White's point of view; Black squares are mirrored by rank.

use tern_core::{Color, Piece, PieceKind, Square};

use crate::eval::score::{S, Score};

/// Distance-from-edge weight per file or rank.
const CENTER: [i32; 8] = [0, 1, 2, 3, 3, 2, 1, 0];

const fn build(kind: PieceKind) -> [Score; 64] {
    let mut table = [S(0, 0); 64];
    let mut sq = 0;
    while sq < 64 {
        let file = sq % 8;
        let rank = sq / 8;
        let center = CENTER[file] + CENTER[rank];
        table[sq] = match kind {
            PieceKind::Pawn => {
                if rank == 0 || rank == 7 {
                    S(0, 0)
                } else {
                    let advance = rank as i32 - 1;
                    let central_file = if file == 3 || file == 4 { 8 } else { 0 };
                    S(advance * 6 + central_file * (rank >= 3) as i32, advance * 14)
                }
            }
            PieceKind::Knight => S(center * 8 - 24, center * 6 - 18),
            PieceKind::Bishop => S(center * 4 - 10, center * 3 - 9),
            PieceKind::Rook if rank == 6 => S(16, 10),
            PieceKind::Rook => S(CENTER[file] * 2, 0),
            PieceKind::Queen => S(center * 2 - 6, center * 4 - 12),
            PieceKind::King if rank == 0 => S(10 - CENTER[file] * 8, center * 8 - 24),
            PieceKind::King => S(-20 * rank as i32, center * 8 - 24),
        };
        sq += 1;
    }
    table
}

const TABLES: [[Score; 64]; 6] = [
    build(PieceKind::Pawn),
    build(PieceKind::Knight),
    build(PieceKind::Bishop),
    build(PieceKind::Rook),
    build(PieceKind::Queen),
    build(PieceKind::King),
];

#[inline]
pub fn pst_value(piece: Piece, sq: Square) -> Score {
    let sq = match piece.color {
        Color::White => sq,
        Color::Black => sq.flip_rank(),
    };
    TABLES[piece.kind.index()][sq.index()]
}

#[cfg(test)]
mod tests {
    use super::pst_value;
    use tern_core::{Color, Piece, PieceKind, Square};

    #[test]
    fn mirrored_between_colors() {
        for kind in PieceKind::ALL {
            for sq in Square::all() {
                assert_eq!(
                    pst_value(Piece::new(Color::White, kind), sq),
                    pst_value(Piece::new(Color::Black, kind), sq.flip_rank())
                );
            }
        }
    }

    #[test]
    fn knights_prefer_the_center() {
        let knight = Piece::new(Color::White, PieceKind::Knight);
        assert!(pst_value(knight, Square::E4).mg > pst_value(knight, Square::A1).mg);
    }

    #[test]
    fn advanced_pawns_are_worth_more_late() {
        let pawn = Piece::new(Color::White, PieceKind::Pawn);
        assert!(pst_value(pawn, Square::A7).eg > pst_value(pawn, Square::A2).eg);
    }
}
