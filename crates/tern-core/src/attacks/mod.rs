//! Attack sets for every piece type.
//!
//! Sliders use classical ray lookups: take the ray in one direction, find the
//! nearest blocker, and cut the ray behind it.

mod tables;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::square::Square;

use self::tables::{
    EAST, KING_ATTACKS, KNIGHT_ATTACKS, NORTH, NORTH_EAST, NORTH_WEST, PAWN_ATTACKS, RAYS, SOUTH,
    SOUTH_EAST, SOUTH_WEST, WEST,
};

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index()]
}

/// Squares a pawn of `color` standing on `sq` attacks.
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index()]
}

/// Ray toward increasing indices, stopped at the first blocker (inclusive).
#[inline]
fn positive_ray(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir][sq.index()];
    match (ray & occupied).lsb() {
        Some(blocker) => ray ^ RAYS[dir][blocker.index()],
        None => ray,
    }
}

/// Ray toward decreasing indices, stopped at the first blocker (inclusive).
#[inline]
fn negative_ray(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir][sq.index()];
    match (ray & occupied).msb() {
        Some(blocker) => ray ^ RAYS[dir][blocker.index()],
        None => ray,
    }
}

pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    positive_ray(NORTH, sq, occupied)
        | positive_ray(EAST, sq, occupied)
        | negative_ray(SOUTH, sq, occupied)
        | negative_ray(WEST, sq, occupied)
}

pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    positive_ray(NORTH_EAST, sq, occupied)
        | positive_ray(NORTH_WEST, sq, occupied)
        | negative_ray(SOUTH_EAST, sq, occupied)
        | negative_ray(SOUTH_WEST, sq, occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Bitboard;
    use crate::color::Color;
    use crate::square::Square;

    #[test]
    fn leaper_counts() {
        assert_eq!(knight_attacks(Square::E4).count(), 8);
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(king_attacks(Square::E4).count(), 8);
        assert_eq!(king_attacks(Square::H8).count(), 3);
    }

    #[test]
    fn pawn_attacks_do_not_wrap() {
        let white = pawn_attacks(Color::White, Square::A4);
        assert_eq!(white.count(), 1);
        assert!(white.contains(Square::B5));

        let black = pawn_attacks(Color::Black, Square::H5);
        assert_eq!(black.count(), 1);
        assert!(black.contains(Square::G4));
    }

    #[test]
    fn rook_on_empty_board_sees_14() {
        for sq in Square::all() {
            assert_eq!(rook_attacks(sq, Bitboard::EMPTY).count(), 14);
        }
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let occupied = Square::E6.bitboard() | Square::C4.bitboard() | Square::G2.bitboard();
        let rook = rook_attacks(Square::E4, occupied);
        assert!(rook.contains(Square::E6));
        assert!(!rook.contains(Square::E7));
        assert!(rook.contains(Square::C4));
        assert!(!rook.contains(Square::B4));
        assert!(rook.contains(Square::E1));

        let bishop = bishop_attacks(Square::E4, occupied);
        assert!(bishop.contains(Square::G2));
        assert!(!bishop.contains(Square::H1));
        assert!(bishop.contains(Square::A8));
    }

    #[test]
    fn queen_is_rook_plus_bishop() {
        let occupied = Square::D5.bitboard() | Square::F3.bitboard();
        assert_eq!(
            queen_attacks(Square::D4, occupied),
            rook_attacks(Square::D4, occupied) | bishop_attacks(Square::D4, occupied)
        );
    }
}
