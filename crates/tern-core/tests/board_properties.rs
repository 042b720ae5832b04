//! Invariants of the board collaborator under random play.

use proptest::prelude::*;
use tern_core::{Board, Move, generate_noisy, generate_quiet, legal_moves};

/// Play up to `choices.len()` moves, picking each by index into the legal move list.
fn random_walk(choices: &[usize]) -> Vec<Board> {
    let mut board = Board::starting_position();
    let mut seen = vec![board.clone()];
    for &choice in choices {
        let moves = legal_moves(&board);
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice % moves.len()];
        assert!(board.make_move(mv));
        seen.push(board.clone());
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn make_undo_restores_position(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        for board in random_walk(&choices) {
            let fen = board.to_fen();
            let hash = board.hash();
            let mut scratch = board.clone();
            let mut moves: Vec<Move> = Vec::new();
            generate_noisy(&board, &mut moves);
            generate_quiet(&board, &mut moves);
            for mv in moves {
                scratch.make_move(mv);
                scratch.undo_move(mv);
                prop_assert_eq!(scratch.to_fen(), fen.clone());
                prop_assert_eq!(scratch.hash(), hash);
            }
        }
    }

    #[test]
    fn buckets_are_disjoint_and_pseudo_legal(
        choices in prop::collection::vec(any::<usize>(), 0..40),
    ) {
        for board in random_walk(&choices) {
            let mut noisy: Vec<Move> = Vec::new();
            let mut quiet: Vec<Move> = Vec::new();
            generate_noisy(&board, &mut noisy);
            generate_quiet(&board, &mut quiet);
            for mv in &noisy {
                prop_assert!(mv.is_noisy());
                prop_assert!(!quiet.contains(mv));
                prop_assert!(board.is_pseudo_legal(*mv));
            }
            for mv in &quiet {
                prop_assert!(!mv.is_noisy());
                prop_assert!(board.is_pseudo_legal(*mv));
            }
        }
    }

    #[test]
    fn fen_roundtrip_preserves_hash(choices in prop::collection::vec(any::<usize>(), 0..40)) {
        for board in random_walk(&choices) {
            let reparsed: Board = board.to_fen().parse().unwrap();
            prop_assert_eq!(reparsed.hash(), board.hash());
            prop_assert_eq!(reparsed.to_fen(), board.to_fen());
        }
    }
}
