//! Game phase from remaining non-pawn material.

use tern_core::{Board, PieceKind};

/// Phase of the starting position: four minors, four rooks, two queens.
pub const MAX_PHASE: i32 = 24;

/// Knight 1, bishop 1, rook 2, queen 4.
const PHASE_WEIGHTS: [(PieceKind, i32); 4] = [
    (PieceKind::Knight, 1),
    (PieceKind::Bishop, 1),
    (PieceKind::Rook, 2),
    (PieceKind::Queen, 4),
];

/// `MAX_PHASE` for a full set of pieces down to 0 for pawns and kings only.
/// Promotions cannot push it past `MAX_PHASE`.
pub fn game_phase(board: &Board) -> i32 {
    PHASE_WEIGHTS
        .iter()
        .map(|&(kind, weight)| board.pieces(kind).count() as i32 * weight)
        .sum::<i32>()
        .min(MAX_PHASE)
}

#[cfg(test)]
mod tests {
    use super::{MAX_PHASE, game_phase};
    use tern_core::Board;

    #[test]
    fn start_position_is_full_phase() {
        assert_eq!(game_phase(&Board::starting_position()), MAX_PHASE);
    }

    #[test]
    fn pawn_ending_is_zero() {
        let board: Board = "4k3/pppp4/8/8/8/8/4PPPP/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&board), 0);
    }

    #[test]
    fn rook_ending() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K2r w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&board), 4);
    }
}
