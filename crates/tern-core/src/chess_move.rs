//! Compact 16-bit move encoding.

use std::fmt;

use crate::piece_kind::PieceKind;
use crate::square::Square;

const FROM_MASK: u16 = 0x003F;
const TO_SHIFT: u32 = 6;
const TO_MASK: u16 = 0x0FC0;
const FLAG_SHIFT: u32 = 12;

const CAPTURE_BIT: u8 = 0b0100;
const PROMOTION_BIT: u8 = 0b1000;

/// What kind of move this is. The capture and promotion bits are shared by
/// every variant that has that property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    Quiet = 0,
    DoublePawnPush = 1,
    KingCastle = 2,
    QueenCastle = 3,
    Capture = 4,
    EnPassant = 5,
    KnightPromotion = 8,
    BishopPromotion = 9,
    RookPromotion = 10,
    QueenPromotion = 11,
    KnightPromotionCapture = 12,
    BishopPromotionCapture = 13,
    RookPromotionCapture = 14,
    QueenPromotionCapture = 15,
}

impl MoveFlag {
    const fn from_bits(bits: u8) -> MoveFlag {
        match bits & 0xF {
            1 => MoveFlag::DoublePawnPush,
            2 => MoveFlag::KingCastle,
            3 => MoveFlag::QueenCastle,
            4 => MoveFlag::Capture,
            5 => MoveFlag::EnPassant,
            8 => MoveFlag::KnightPromotion,
            9 => MoveFlag::BishopPromotion,
            10 => MoveFlag::RookPromotion,
            11 => MoveFlag::QueenPromotion,
            12 => MoveFlag::KnightPromotionCapture,
            13 => MoveFlag::BishopPromotionCapture,
            14 => MoveFlag::RookPromotionCapture,
            15 => MoveFlag::QueenPromotionCapture,
            // 6 and 7 are unused.
            _ => MoveFlag::Quiet,
        }
    }

    /// Promotion flag for `kind`, with or without a capture.
    pub const fn promotion(kind: PieceKind, capture: bool) -> MoveFlag {
        let base = match kind {
            PieceKind::Knight => 0,
            PieceKind::Bishop => 1,
            PieceKind::Rook => 2,
            _ => 3,
        };
        let capture = if capture { CAPTURE_BIT } else { 0 };
        MoveFlag::from_bits(PROMOTION_BIT | capture | base)
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self as u8 & CAPTURE_BIT != 0
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self as u8 & PROMOTION_BIT != 0
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self, MoveFlag::KingCastle | MoveFlag::QueenCastle)
    }
}

/// `{from:6, to:6, flag:4}`. The all-zero value is [`Move::NULL`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    /// "No move". Never produced by move generation.
    pub const NULL: Move = Move(0);

    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Move {
        Move(from.index() as u16 | (to.index() as u16) << TO_SHIFT | (flag as u16) << FLAG_SHIFT)
    }

    #[inline]
    pub const fn from_raw(raw: u16) -> Move {
        Move(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn source(self) -> Square {
        Square::from_index_unchecked((self.0 & FROM_MASK) as u8)
    }

    #[inline]
    pub const fn dest(self) -> Square {
        Square::from_index_unchecked(((self.0 & TO_MASK) >> TO_SHIFT) as u8)
    }

    #[inline]
    pub const fn flag(self) -> MoveFlag {
        MoveFlag::from_bits((self.0 >> FLAG_SHIFT) as u8)
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flag().is_capture()
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.flag().is_promotion()
    }

    /// Captures, en passant and promotions.
    #[inline]
    pub const fn is_noisy(self) -> bool {
        self.is_capture() || self.is_promotion()
    }

    pub const fn promotion_kind(self) -> Option<PieceKind> {
        if !self.is_promotion() {
            return None;
        }
        Some(match (self.0 >> FLAG_SHIFT) & 0b11 {
            0 => PieceKind::Knight,
            1 => PieceKind::Bishop,
            2 => PieceKind::Rook,
            _ => PieceKind::Queen,
        })
    }

    /// Long algebraic form, e.g. `e2e4`, `e7e8q`. Null prints as `0000`.
    pub fn to_uci(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.source(), self.dest())?;
        if let Some(kind) = self.promotion_kind() {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self}, {:?})", self.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::{Move, MoveFlag};
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    #[test]
    fn fields_are_packed_independently() {
        let mv = Move::new(Square::G7, Square::H8, MoveFlag::QueenPromotionCapture);
        assert_eq!(mv.source(), Square::G7);
        assert_eq!(mv.dest(), Square::H8);
        assert_eq!(mv.flag(), MoveFlag::QueenPromotionCapture);
        assert!(mv.is_capture());
        assert!(mv.is_promotion());
        assert_eq!(mv.promotion_kind(), Some(PieceKind::Queen));
        assert_eq!(mv.to_uci(), "g7h8q");
    }

    #[test]
    fn flag_bits() {
        assert!(MoveFlag::EnPassant.is_capture());
        assert!(!MoveFlag::EnPassant.is_promotion());
        assert!(!MoveFlag::DoublePawnPush.is_capture());
        assert!(MoveFlag::KnightPromotion.is_promotion());
        assert!(!MoveFlag::KnightPromotion.is_capture());
        assert!(MoveFlag::KingCastle.is_castle());
    }

    #[test]
    fn promotion_constructor_matches_variants() {
        assert_eq!(MoveFlag::promotion(PieceKind::Rook, false), MoveFlag::RookPromotion);
        assert_eq!(
            MoveFlag::promotion(PieceKind::Bishop, true),
            MoveFlag::BishopPromotionCapture
        );
    }

    #[test]
    fn null_move() {
        assert!(Move::NULL.is_null());
        assert_eq!(Move::NULL.to_string(), "0000");
        assert!(!Move::new(Square::E2, Square::E4, MoveFlag::DoublePawnPush).is_null());
    }

    #[test]
    fn unused_flag_bits_decode_as_quiet() {
        let raw = Square::A2.index() as u16 | (Square::A3.index() as u16) << 6 | 6 << 12;
        assert_eq!(Move::from_raw(raw).flag(), MoveFlag::Quiet);
    }

    #[test]
    fn quiet_moves_are_not_noisy() {
        let mv = Move::new(Square::G1, Square::F3, MoveFlag::Quiet);
        assert!(!mv.is_noisy());
        assert_eq!(mv.promotion_kind(), None);
    }
}
