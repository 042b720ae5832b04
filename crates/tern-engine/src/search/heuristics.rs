//! Killer moves and the history table for quiet move ordering.

use tern_core::{Move, Piece};

use crate::search::MAX_PLY;
use crate::search::ordering::{KILLER_SCORE, QuietOrdering};

/// Two quiet moves per ply that caused a beta cutoff.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> KillerTable {
        KillerTable {
            slots: [[Move::NULL; 2]; MAX_PLY],
        }
    }

    /// Make `mv` the primary killer at `ply`, demoting the previous one.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.slots.get_mut(ply) else {
            return;
        };
        if slots[0] != mv {
            slots[1] = slots[0];
            slots[0] = mv;
        }
    }

    /// 0 for the primary killer, 1 for the secondary, `None` otherwise.
    pub fn rank(&self, ply: usize, mv: Move) -> Option<usize> {
        let slots = self.slots.get(ply)?;
        if mv.is_null() {
            return None;
        }
        slots.iter().position(|&killer| killer == mv)
    }

    pub fn clear(&mut self) {
        self.slots = [[Move::NULL; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Bound on the magnitude of any history entry.
pub const HISTORY_MAX: i32 = 16_384;

/// Indexed by `[piece][to]`.
pub struct HistoryTable {
    table: [[i32; 64]; 12],
}

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable {
            table: [[0; 64]; 12],
        }
    }

    /// Reward a quiet move that caused a cutoff at `depth`.
    pub fn reward(&mut self, piece: Piece, mv: Move, depth: i32) {
        let entry = &mut self.table[piece.index()][mv.dest().index()];
        *entry = (*entry + depth * depth).min(HISTORY_MAX);
    }

    /// Penalise a quiet move searched before the cutoff move.
    pub fn penalize(&mut self, piece: Piece, mv: Move, depth: i32) {
        let entry = &mut self.table[piece.index()][mv.dest().index()];
        *entry = (*entry - depth * depth).max(-HISTORY_MAX);
    }

    pub fn score(&self, piece: Piece, mv: Move) -> i32 {
        self.table[piece.index()][mv.dest().index()]
    }

    pub fn clear(&mut self) {
        self.table = [[0; 64]; 12];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-worker quiet ordering state.
#[derive(Default)]
pub struct Heuristics {
    pub killers: KillerTable,
    pub history: HistoryTable,
}

impl Heuristics {
    pub fn clear(&mut self) {
        self.killers.clear();
        self.history.clear();
    }
}

impl QuietOrdering for Heuristics {
    /// Killers first, then history halved so it stays below the killer band.
    fn quiet_score(&self, mv: Move, piece: Piece, ply: usize) -> i32 {
        match self.killers.rank(ply, mv) {
            Some(rank) => KILLER_SCORE - rank as i32,
            None => self.history.score(piece, mv) / 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::{Color, MoveFlag, PieceKind, Square};

    fn quiet(from: Square, to: Square) -> Move {
        Move::new(from, to, MoveFlag::Quiet)
    }

    #[test]
    fn killers_shift_on_new_move() {
        let mut killers = KillerTable::new();
        let a = quiet(Square::G1, Square::F3);
        let b = quiet(Square::B1, Square::C3);
        killers.store(5, a);
        assert_eq!(killers.rank(5, a), Some(0));
        killers.store(5, b);
        assert_eq!(killers.rank(5, b), Some(0));
        assert_eq!(killers.rank(5, a), Some(1));
        // Re-storing the primary does not push out the secondary.
        killers.store(5, b);
        assert_eq!(killers.rank(5, a), Some(1));
        assert_eq!(killers.rank(4, a), None);
        assert_eq!(killers.rank(5, Move::NULL), None);
    }

    #[test]
    fn killers_ignore_out_of_range_ply() {
        let mut killers = KillerTable::new();
        killers.store(MAX_PLY, quiet(Square::A2, Square::A3));
        assert_eq!(killers.rank(MAX_PLY, quiet(Square::A2, Square::A3)), None);
    }

    #[test]
    fn history_rewards_and_penalties_are_clamped() {
        let mut history = HistoryTable::new();
        let knight = Piece::new(Color::White, PieceKind::Knight);
        let mv = quiet(Square::G1, Square::F3);
        history.reward(knight, mv, 4);
        assert_eq!(history.score(knight, mv), 16);
        history.penalize(knight, mv, 3);
        assert_eq!(history.score(knight, mv), 7);
        for _ in 0..1000 {
            history.reward(knight, mv, 20);
        }
        assert_eq!(history.score(knight, mv), HISTORY_MAX);
        // Colors do not share entries.
        assert_eq!(history.score(Piece::new(Color::Black, PieceKind::Knight), mv), 0);
    }

    #[test]
    fn quiet_scores_stay_below_killers() {
        let mut heuristics = Heuristics::default();
        let knight = Piece::new(Color::White, PieceKind::Knight);
        let hot = quiet(Square::G1, Square::F3);
        let killer = quiet(Square::B1, Square::C3);
        for _ in 0..1000 {
            heuristics.history.reward(knight, hot, 30);
        }
        heuristics.killers.store(2, killer);
        assert_eq!(heuristics.quiet_score(killer, knight, 2), KILLER_SCORE);
        assert!(heuristics.quiet_score(hot, knight, 2) < KILLER_SCORE - 1);
        heuristics.clear();
        assert_eq!(heuristics.quiet_score(hot, knight, 2), 0);
    }
}
