//! Per-worker search state that outlives a single search.

use tern_core::Move;

use crate::search::heuristics::Heuristics;
use crate::search::{DRAW, MAX_PLY};

/// Triangular principal-variation table. Row `ply` holds the best line
/// found from that ply onward.
pub struct PvTable {
    moves: [[Move; MAX_PLY]; MAX_PLY],
    len: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> PvTable {
        PvTable {
            moves: [[Move::NULL; MAX_PLY]; MAX_PLY],
            len: [0; MAX_PLY],
        }
    }

    /// Forget the line at `ply`. Called on entry to every node.
    #[inline]
    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// Make `mv` followed by the child's line the line at `ply`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let child = ply + 1;
        let (top, bottom) = self.moves.split_at_mut(child);
        top[ply][0] = mv;
        if child < MAX_PLY {
            let copy_len = self.len[child].min(MAX_PLY - 1);
            top[ply][1..=copy_len].copy_from_slice(&bottom[0][..copy_len]);
            self.len[ply] = 1 + copy_len;
        } else {
            self.len[ply] = 1;
        }
    }

    pub fn line(&self, ply: usize) -> &[Move] {
        &self.moves[ply][..self.len[ply]]
    }

    pub fn clear(&mut self) {
        self.len = [0; MAX_PLY];
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

/// What one worker knows about its current (or last) search.
///
/// Owned by the worker for the length of a task. The pool only reads it once
/// the worker has reported completion.
pub struct SearchInfo {
    pub nodes: u64,
    pub pv: Box<PvTable>,
    pub best_move: Move,
    pub best_score: i32,
    /// Root line of the last completed iteration. The live [`PvTable`] is
    /// overwritten by an iteration that gets aborted.
    pub best_pv: Vec<Move>,
    pub completed_depth: u8,
    pub heuristics: Box<Heuristics>,
}

impl SearchInfo {
    pub fn new() -> SearchInfo {
        SearchInfo {
            nodes: 0,
            pv: Box::default(),
            best_move: Move::NULL,
            best_score: DRAW,
            best_pv: Vec::new(),
            completed_depth: 0,
            heuristics: Box::default(),
        }
    }

    /// Clear per-search state. Killers and history carry over.
    pub fn reset(&mut self) {
        self.nodes = 0;
        self.pv.clear();
        self.best_move = Move::NULL;
        self.best_score = DRAW;
        self.best_pv.clear();
        self.completed_depth = 0;
    }

    /// Clear everything, for a new game.
    pub fn reset_all(&mut self) {
        self.reset();
        self.heuristics.clear();
    }
}

impl Default for SearchInfo {
    fn default() -> Self {
        Self::new()
    }
}
