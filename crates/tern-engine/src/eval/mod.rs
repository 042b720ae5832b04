//! Static evaluation: tapered material plus piece-square tables.

pub mod material;
pub mod phase;
pub mod pst;
pub mod score;

use tern_core::{Board, Color};

use self::material::piece_value;
use self::phase::game_phase;
use self::pst::pst_value;
use self::score::Score;

/// Score of `board` in centipawns from the side to move's point of view.
pub fn evaluate(board: &Board) -> i32 {
    let mut score = Score::ZERO;
    for sq in board.occupied() {
        if let Some(piece) = board.piece_on(sq) {
            let term = piece_value(piece.kind) + pst_value(piece, sq);
            match piece.color {
                Color::White => score += term,
                Color::Black => score -= term,
            }
        }
    }

    let white_view = score.taper(game_phase(board));
    match board.side_to_move() {
        Color::White => white_view,
        Color::Black => -white_view,
    }
}

#[cfg(test)]
mod tests {
    use super::evaluate;
    use tern_core::Board;

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(evaluate(&Board::starting_position()), 0);
    }

    #[test]
    fn side_to_move_perspective() {
        let white: Board = "4k3/8/8/8/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        let black: Board = "4k3/8/8/8/8/8/8/3QK3 b - - 0 1".parse().unwrap();
        assert!(evaluate(&white) > 800);
        assert_eq!(evaluate(&white), -evaluate(&black));
    }

    #[test]
    fn mirrored_positions_score_the_same() {
        let a: Board = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3"
            .parse()
            .unwrap();
        let b: Board = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3"
            .parse()
            .unwrap();
        assert_eq!(evaluate(&a), evaluate(&b));
    }
}
