//! Castling rights as a 4-bit set.

use std::fmt;

use crate::color::Color;
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

/// Bit 0 = white king side, 1 = white queen side, 2 = black king side, 3 = black queen side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastleRights(u8);

/// Rights that survive a move touching each square. Only king and rook
/// home squares clear anything.
const KEEP_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[Square::E1.index()] = 0b1100;
    mask[Square::H1.index()] = 0b1110;
    mask[Square::A1.index()] = 0b1101;
    mask[Square::E8.index()] = 0b0011;
    mask[Square::H8.index()] = 0b1011;
    mask[Square::A8.index()] = 0b0111;
    mask
};

impl CastleRights {
    pub const NONE: CastleRights = CastleRights(0);
    pub const ALL: CastleRights = CastleRights(0b1111);

    #[inline]
    const fn bit(color: Color, side: CastleSide) -> u8 {
        let shift = color.index() * 2
            + match side {
                CastleSide::King => 0,
                CastleSide::Queen => 1,
            };
        1 << shift
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::bit(color, side) != 0
    }

    #[inline]
    pub fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::bit(color, side);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::bit(color, side);
    }

    /// Rights left after a move from `from` to `to`.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> CastleRights {
        CastleRights(self.0 & KEEP_MASK[from.index()] & KEEP_MASK[to.index()])
    }

    /// Parse the FEN castling field (`-` or a subset of `KQkq`).
    pub fn from_fen(field: &str) -> Option<CastleRights> {
        if field == "-" {
            return Some(CastleRights::NONE);
        }
        let mut rights = CastleRights::NONE;
        for c in field.chars() {
            let (color, side) = match c {
                'K' => (Color::White, CastleSide::King),
                'Q' => (Color::White, CastleSide::Queen),
                'k' => (Color::Black, CastleSide::King),
                'q' => (Color::Black, CastleSide::Queen),
                _ => return None,
            };
            rights.grant(color, side);
        }
        if field.is_empty() { None } else { Some(rights) }
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("-");
        }
        for (c, color, side) in [
            ('K', Color::White, CastleSide::King),
            ('Q', Color::White, CastleSide::Queen),
            ('k', Color::Black, CastleSide::King),
            ('q', Color::Black, CastleSide::Queen),
        ] {
            if self.has(color, side) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CastleRights, CastleSide};
    use crate::color::Color;
    use crate::square::Square;

    #[test]
    fn fen_field_roundtrip() {
        for field in ["-", "KQkq", "Kq", "k"] {
            let rights = CastleRights::from_fen(field).unwrap();
            assert_eq!(rights.to_string(), field);
        }
        assert!(CastleRights::from_fen("KX").is_none());
        assert!(CastleRights::from_fen("").is_none());
    }

    #[test]
    fn king_move_clears_both_sides() {
        let rights = CastleRights::ALL.after_move(Square::E1, Square::E2);
        assert!(!rights.has(Color::White, CastleSide::King));
        assert!(!rights.has(Color::White, CastleSide::Queen));
        assert!(rights.has(Color::Black, CastleSide::King));
    }

    #[test]
    fn capturing_a_rook_clears_its_side() {
        let rights = CastleRights::ALL.after_move(Square::B7, Square::H8);
        assert!(!rights.has(Color::Black, CastleSide::King));
        assert!(rights.has(Color::Black, CastleSide::Queen));
    }
}
