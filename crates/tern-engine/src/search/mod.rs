//! Iterative-deepening NegaScout over a staged move generator, run by a
//! pool of lazy-SMP workers that share one transposition table.

pub mod heuristics;
pub mod info;
pub mod negascout;
pub mod ordering;
pub mod pool;
pub mod tt;

use tern_core::Move;

/// Bound wider than any reachable score.
pub const INF: i32 = 30_000;

/// Score of being mated at the root; a mate found at ply `n` scores `MATE - n`.
pub const MATE: i32 = 29_000;

/// Scores beyond this magnitude encode a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Recursion bound and PV/killer table size.
pub const MAX_PLY: usize = 128;

pub const DRAW: i32 = 0;

/// Nodes between clock and node-cap polls.
pub const CHECK_INTERVAL: u64 = 1024;

/// Search switches. The defaults are what the engine plays with; tests turn
/// pieces off to compare against plain alpha-beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Probe later siblings with a null window and re-search on fail-high.
    pub null_window: bool,
    /// Allow cutoffs from stored entries at non-PV nodes.
    pub tt_cutoffs: bool,
    /// Resolve captures at the horizon instead of returning the static score.
    pub quiescence: bool,
    /// Killer and history ordering for quiet moves.
    pub heuristics: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            null_window: true,
            tt_cutoffs: true,
            quiescence: false,
            heuristics: true,
        }
    }
}

/// Outcome of one search: the deepest completed iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Negamax score from the side to move's point of view.
    pub score: i32,
    pub pv: Vec<Move>,
    /// Deepest completed iteration, 0 when none completed.
    pub depth: u8,
    pub nodes: u64,
}

impl SearchResult {
    /// A result for a position with nothing to search.
    pub fn empty() -> SearchResult {
        SearchResult {
            best_move: Move::NULL,
            score: DRAW,
            pv: Vec::new(),
            depth: 0,
            nodes: 0,
        }
    }
}

/// Render a score as `cp N` or `mate N` (moves, negative when getting mated).
pub fn format_score(score: i32) -> String {
    if score.abs() > MATE_THRESHOLD {
        let moves = (MATE - score.abs() + 1) / 2;
        if score > 0 {
            format!("mate {moves}")
        } else {
            format!("mate -{moves}")
        }
    } else {
        format!("cp {score}")
    }
}
