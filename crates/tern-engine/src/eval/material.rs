//! Piece values, shared by evaluation and capture ordering.

use tern_core::PieceKind;

use crate::eval::score::{S, Score};

/// Indexed by [`PieceKind::index`].
pub const PIECE_VALUES: [Score; 6] = [
    S(82, 94),
    S(337, 281),
    S(365, 297),
    S(477, 512),
    S(1025, 936),
    S(0, 0),
];

#[inline]
pub fn piece_value(kind: PieceKind) -> Score {
    PIECE_VALUES[kind.index()]
}
