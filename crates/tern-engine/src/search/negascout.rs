//! Iterative-deepening NegaScout for one worker.

use tern_core::{Board, Move, legal_moves};
use tracing::debug;

use crate::eval::evaluate;
use crate::search::info::SearchInfo;
use crate::search::ordering::{NoOrdering, StagedMoveGenerator};
use crate::search::tt::{Bound, TranspositionTable};
use crate::search::{
    CHECK_INTERVAL, DRAW, INF, MATE, MAX_PLY, SearchConfig, SearchResult, format_score,
};
use crate::time::TimeBudget;

/// Quiet moves remembered per node for the history penalty.
const MAX_TRIED_QUIETS: usize = 64;

/// One worker's search over its own copy of the position.
///
/// The board is made and unmade in place; every frame leaves it as it found it.
pub struct SearchTree<'a> {
    board: Board,
    tt: &'a TranspositionTable,
    budget: &'a TimeBudget,
    info: &'a mut SearchInfo,
    config: SearchConfig,
    worker: usize,
    start_depth: u8,
    aborted: bool,
}

impl<'a> SearchTree<'a> {
    /// A worker-0 tree starting at depth 1. `info` keeps its heuristics
    /// across searches; the rest is reset by [`SearchTree::run`].
    pub fn new(
        board: Board,
        tt: &'a TranspositionTable,
        budget: &'a TimeBudget,
        info: &'a mut SearchInfo,
        config: SearchConfig,
    ) -> SearchTree<'a> {
        SearchTree {
            board,
            tt,
            budget,
            info,
            config,
            worker: 0,
            start_depth: 1,
            aborted: false,
        }
    }

    /// Run as pool worker `index`. Helpers skip depth 1 on odd indices so
    /// they drift away from worker 0's tree.
    pub fn worker(mut self, index: usize) -> SearchTree<'a> {
        self.worker = index;
        self.start_depth = if index == 0 { 1 } else { 1 + (index % 2) as u8 };
        self
    }

    /// Search depths `1..=target_depth` until the budget runs out.
    ///
    /// Only completed iterations count. If none completes the first legal
    /// move is returned with the static score.
    pub fn run(&mut self, target_depth: u8) -> SearchResult {
        self.info.reset();
        self.aborted = false;

        let mut target = target_depth.min((MAX_PLY - 1) as u8);
        if let Some(cap) = self.budget.depth_limit() {
            target = target.min(cap);
        }

        for depth in self.start_depth..=target {
            if !self.budget.should_start_iteration() {
                break;
            }
            let score = self.negascout(-INF, INF, i32::from(depth), 0);
            if self.aborted {
                break;
            }

            let pv = self.info.pv.line(0);
            self.info.best_move = pv.first().copied().unwrap_or(Move::NULL);
            self.info.best_pv.clear();
            self.info.best_pv.extend_from_slice(pv);
            self.info.best_score = score;
            self.info.completed_depth = depth;

            if self.worker == 0 {
                let elapsed_ms = self.budget.elapsed().as_millis().max(1);
                let nps = u128::from(self.info.nodes) * 1000 / elapsed_ms;
                debug!(
                    depth,
                    score = %format_score(score),
                    nodes = self.info.nodes,
                    nps = nps as u64,
                    pv = %pv_string(pv),
                    "iteration complete"
                );
            }

            // Mate or stalemate at the root: deeper iterations change nothing.
            if self.info.best_move.is_null() {
                break;
            }
        }

        if self.info.completed_depth == 0 {
            return self.fallback();
        }

        SearchResult {
            best_move: self.info.best_move,
            score: self.info.best_score,
            pv: self.info.best_pv.clone(),
            depth: self.info.completed_depth,
            nodes: self.info.nodes,
        }
    }

    fn fallback(&mut self) -> SearchResult {
        let moves = legal_moves(&self.board);
        let (best_move, score) = match moves.first() {
            Some(&mv) => (mv, evaluate(&self.board)),
            None if self.board.in_check() => (Move::NULL, -MATE),
            None => (Move::NULL, DRAW),
        };
        self.info.best_move = best_move;
        self.info.best_score = score;
        self.info.best_pv.clear();
        if !best_move.is_null() {
            self.info.best_pv.push(best_move);
        }
        SearchResult {
            best_move,
            score,
            pv: self.info.best_pv.clone(),
            depth: 0,
            nodes: self.info.nodes,
        }
    }

    /// Count a node and poll the budget. True once the search must unwind.
    #[inline]
    fn enter_node(&mut self) -> bool {
        self.info.nodes += 1;
        if self.aborted || self.budget.is_stopped() {
            self.aborted = true;
            return true;
        }
        if self.info.nodes % CHECK_INTERVAL == 0
            && (self.budget.limit_reached() || self.budget.node_limit_reached(self.info.nodes))
        {
            self.aborted = true;
        }
        self.aborted
    }

    fn is_draw(&self) -> bool {
        self.board.is_fifty_move_draw() || self.board.is_repetition()
    }

    fn negascout(&mut self, mut alpha: i32, beta: i32, depth: i32, ply: usize) -> i32 {
        self.info.pv.clear_ply(ply);

        if depth <= 0 && self.config.quiescence {
            return self.quiescence(alpha, beta, ply);
        }
        if self.enter_node() {
            return evaluate(&self.board);
        }
        if ply >= MAX_PLY {
            return DRAW;
        }
        if ply > 0 && self.is_draw() {
            return DRAW;
        }
        if depth <= 0 {
            return evaluate(&self.board);
        }

        let hash = self.board.hash();
        let null_window = beta - alpha == 1;
        let mut hash_move = Move::NULL;
        if let Some(entry) = self.tt.probe(hash, ply) {
            hash_move = entry.best_move;
            if self.config.tt_cutoffs && null_window && entry.cuts_off(depth, alpha, beta) {
                return entry.score;
            }
        }

        let in_check = self.board.in_check();
        let original_alpha = alpha;
        let mut best_score = -INF;
        let mut best_move = Move::NULL;
        let mut legal = 0usize;
        let mut tried = [Move::NULL; MAX_TRIED_QUIETS];
        let mut tried_len = 0;

        let mut moves = StagedMoveGenerator::new(hash_move, ply);
        loop {
            let next = if self.config.heuristics {
                moves.next(&self.board, &*self.info.heuristics)
            } else {
                moves.next(&self.board, &NoOrdering)
            };
            let Some(mv) = next else {
                break;
            };

            if !self.board.make_move(mv) {
                self.board.undo_move(mv);
                continue;
            }
            legal += 1;

            let score = if legal == 1 || !self.config.null_window {
                -self.negascout(-beta, -alpha, depth - 1, ply + 1)
            } else {
                let probe = -self.negascout(-alpha - 1, -alpha, depth - 1, ply + 1);
                if probe > alpha && probe < beta {
                    -self.negascout(-beta, -alpha, depth - 1, ply + 1)
                } else {
                    probe
                }
            };
            self.board.undo_move(mv);

            if self.aborted {
                return evaluate(&self.board);
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    alpha = score;
                    self.info.pv.update(ply, mv);
                    if alpha >= beta {
                        if self.config.heuristics && !mv.is_noisy() {
                            self.reward_quiet(mv, depth, ply, &tried[..tried_len]);
                        }
                        break;
                    }
                }
            }

            if !mv.is_noisy() && tried_len < MAX_TRIED_QUIETS {
                tried[tried_len] = mv;
                tried_len += 1;
            }
        }

        if legal == 0 {
            return if in_check { -MATE + ply as i32 } else { DRAW };
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        let stored_move = if bound == Bound::Upper { hash_move } else { best_move };
        self.tt.store(hash, depth, best_score, bound, stored_move, ply);

        best_score
    }

    /// Fail-soft capture search below the horizon.
    ///
    /// A side in check may not stand pat: every evasion is searched and a
    /// position with none scores as mate.
    fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.info.pv.clear_ply(ply);
        if self.enter_node() {
            return evaluate(&self.board);
        }
        if ply > 0 && self.is_draw() {
            return DRAW;
        }

        let stand_pat = evaluate(&self.board);
        if ply >= MAX_PLY {
            return stand_pat;
        }

        let in_check = self.board.in_check();
        let mut best_score = -INF;
        if !in_check {
            if stand_pat >= beta {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
            best_score = stand_pat;
        }

        let hash_move = self.tt.hash_move(self.board.hash());
        let mut moves = if in_check {
            StagedMoveGenerator::new(hash_move, ply)
        } else {
            StagedMoveGenerator::noisy(hash_move, ply)
        };
        let mut legal = 0usize;
        while let Some(mv) = moves.next(&self.board, &NoOrdering) {
            if !self.board.make_move(mv) {
                self.board.undo_move(mv);
                continue;
            }
            legal += 1;
            let score = -self.quiescence(-beta, -alpha, ply + 1);
            self.board.undo_move(mv);

            if self.aborted {
                return stand_pat;
            }
            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                    if alpha >= beta {
                        break;
                    }
                }
            }
        }

        if in_check && legal == 0 {
            return -MATE + ply as i32;
        }
        best_score
    }

    fn reward_quiet(&mut self, mv: Move, depth: i32, ply: usize, tried: &[Move]) {
        let Some(piece) = self.board.piece_on(mv.source()) else {
            return;
        };
        let heuristics = &mut self.info.heuristics;
        heuristics.killers.store(ply, mv);
        heuristics.history.reward(piece, mv, depth);
        for &quiet in tried {
            if let Some(piece) = self.board.piece_on(quiet.source()) {
                heuristics.history.penalize(piece, quiet, depth);
            }
        }
    }
}

fn pv_string(pv: &[Move]) -> String {
    pv.iter().map(|mv| mv.to_uci()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MATE_THRESHOLD;
    use crate::time::SearchLimits;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const SCHOLARS_MATE: &str =
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

    fn search_with(
        board: Board,
        depth: u8,
        limits: &SearchLimits,
        config: SearchConfig,
    ) -> SearchResult {
        let tt = TranspositionTable::new(4);
        let budget = TimeBudget::new(limits);
        budget.start();
        let mut info = SearchInfo::new();
        SearchTree::new(board, &tt, &budget, &mut info, config).run(depth)
    }

    fn search(fen: &str, depth: u8) -> SearchResult {
        let board: Board = fen.parse().unwrap();
        search_with(board, depth, &SearchLimits::default(), SearchConfig::default())
    }

    #[test]
    fn negascout_agrees_with_plain_alpha_beta() {
        let scout = SearchConfig {
            tt_cutoffs: false,
            ..SearchConfig::default()
        };
        let alpha_beta = SearchConfig {
            null_window: false,
            ..scout
        };
        for fen in [tern_core::STARTING_FEN, KIWIPETE, POSITION_3] {
            let board: Board = fen.parse().unwrap();
            let limits = SearchLimits::default();
            let a = search_with(board.clone(), 3, &limits, scout);
            let b = search_with(board, 3, &limits, alpha_beta);
            assert_eq!(a.score, b.score, "{fen}");
        }
    }

    #[test]
    fn finds_mate_in_one() {
        let result = search(SCHOLARS_MATE, 2);
        assert_eq!(result.best_move.to_uci(), "h5f7");
        assert_eq!(result.score, MATE - 1);
    }

    #[test]
    fn mated_side_scores_minus_mate() {
        let result = search("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(result.score, -MATE);
        assert!(result.best_move.is_null());
        assert!(result.pv.is_empty());
    }

    #[test]
    fn stalemate_scores_zero() {
        let result = search("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1", 3);
        assert_eq!(result.score, DRAW);
        assert!(result.best_move.is_null());
    }

    #[test]
    fn pv_starts_with_best_move() {
        let result = search(tern_core::STARTING_FEN, 4);
        assert_eq!(result.depth, 4);
        assert_eq!(result.pv.first(), Some(&result.best_move));
        assert!(result.pv.len() >= 2);
        assert!(result.score.abs() < MATE_THRESHOLD);
    }

    #[test]
    fn pre_stopped_budget_still_returns_a_legal_move() {
        let board = Board::starting_position();
        let tt = TranspositionTable::new(1);
        let budget = TimeBudget::new(&SearchLimits::default());
        budget.start();
        budget.stop();
        let mut info = SearchInfo::new();
        let config = SearchConfig::default();
        let result = SearchTree::new(board.clone(), &tt, &budget, &mut info, config).run(10);
        assert_eq!(result.depth, 0);
        assert!(legal_moves(&board).contains(&result.best_move));
    }

    #[test]
    fn depth_cap_bounds_iterations() {
        let board = Board::starting_position();
        let limits = SearchLimits::depth(2);
        let result = search_with(board, 64, &limits, SearchConfig::default());
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn node_cap_stops_the_search() {
        let board = Board::starting_position();
        let limits = SearchLimits {
            nodes: Some(5_000),
            ..SearchLimits::default()
        };
        let result = search_with(board, 64, &limits, SearchConfig::default());
        assert!(result.depth < 64);
        assert!(result.nodes < 5_000 + CHECK_INTERVAL);
        assert!(!result.best_move.is_null());
    }

    fn assert_pv_is_playable(board: &Board, result: &SearchResult) {
        assert_eq!(result.pv.first(), Some(&result.best_move), "{result:?}");
        assert!(result.pv.len() <= usize::from(result.depth.max(1)), "{result:?}");
        let mut board = board.clone();
        for &mv in &result.pv {
            assert!(legal_moves(&board).contains(&mv), "{} in {result:?}", mv.to_uci());
            assert!(board.make_move(mv));
        }
    }

    #[test]
    fn interrupted_iteration_keeps_the_completed_line() {
        for fen in [tern_core::STARTING_FEN, KIWIPETE] {
            let board: Board = fen.parse().unwrap();
            for cap in (2_000..=40_000).step_by(3_000) {
                let limits = SearchLimits {
                    nodes: Some(cap),
                    ..SearchLimits::default()
                };
                let result = search_with(board.clone(), 64, &limits, SearchConfig::default());
                assert_pv_is_playable(&board, &result);
            }
        }
    }

    #[test]
    fn single_worker_is_deterministic() {
        let a = search(tern_core::STARTING_FEN, 4);
        let b = search(tern_core::STARTING_FEN, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn board_is_restored_after_search() {
        let board: Board = KIWIPETE.parse().unwrap();
        let tt = TranspositionTable::new(1);
        let budget = TimeBudget::new(&SearchLimits::default());
        budget.start();
        let mut info = SearchInfo::new();
        let config = SearchConfig::default();
        let mut tree = SearchTree::new(board.clone(), &tt, &budget, &mut info, config);
        tree.run(3);
        assert_eq!(tree.board.to_fen(), board.to_fen());
        assert_eq!(tree.board.hash(), board.hash());
    }

    #[test]
    fn quiescence_sees_the_recapture() {
        // Qxd6 wins a pawn at depth 1 but loses the queen to cxd6.
        let board: Board = "4k3/2p5/3p4/8/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        let config = SearchConfig {
            quiescence: true,
            ..SearchConfig::default()
        };
        let result = search_with(board, 1, &SearchLimits::default(), config);
        assert_ne!(result.best_move.to_uci(), "d1d6");
        assert!(result.score > -200);
    }

    #[test]
    fn quiescence_scores_mate_below_the_horizon() {
        let board: Board = SCHOLARS_MATE.parse().unwrap();
        let config = SearchConfig {
            quiescence: true,
            ..SearchConfig::default()
        };
        let result = search_with(board, 1, &SearchLimits::default(), config);
        assert_eq!(result.best_move.to_uci(), "h5f7");
        assert_eq!(result.score, MATE - 1);
    }

    #[test]
    fn quiescence_searches_quiet_evasions() {
        // Black is in check from the rook and has only quiet king moves.
        let board: Board = "4k3/8/8/8/8/8/8/K3R3 b - - 0 1".parse().unwrap();
        let tt = TranspositionTable::new(1);
        let budget = TimeBudget::new(&SearchLimits::default());
        budget.start();
        let mut info = SearchInfo::new();
        let config = SearchConfig {
            quiescence: true,
            ..SearchConfig::default()
        };
        let mut tree = SearchTree::new(board.clone(), &tt, &budget, &mut info, config);
        let score = tree.quiescence(-INF, INF, 0);
        assert!(score > -MATE_THRESHOLD, "{score}");
        assert!(score < 0, "{score}");
        assert_eq!(tree.board.hash(), board.hash());
    }

    #[test]
    fn heuristics_do_not_change_the_root_score() {
        let board: Board = KIWIPETE.parse().unwrap();
        let base = SearchConfig {
            tt_cutoffs: false,
            ..SearchConfig::default()
        };
        let plain = SearchConfig {
            heuristics: false,
            ..base
        };
        let limits = SearchLimits::default();
        let a = search_with(board.clone(), 3, &limits, base);
        let b = search_with(board, 3, &limits, plain);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn helper_workers_start_deeper() {
        let board = Board::starting_position();
        let tt = TranspositionTable::new(1);
        let budget = TimeBudget::new(&SearchLimits::default());
        budget.start();
        let mut info = SearchInfo::new();
        let result = SearchTree::new(board, &tt, &budget, &mut info, SearchConfig::default())
            .worker(1)
            .run(1);
        // Worker 1 begins at depth 2, so a depth-1 request completes nothing.
        assert_eq!(result.depth, 0);
        assert!(!result.best_move.is_null());
    }
}
