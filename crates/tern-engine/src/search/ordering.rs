//! Staged, lazily generated move stream for one search node.
//!
//! Moves come out in three bands: the hash move, noisy moves best-first,
//! then quiet moves best-first. Each bucket is only generated once the
//! previous band is exhausted, so a cutoff on the hash move or a capture
//! skips the remaining generation entirely.

use tern_core::{Board, Color, Move, MoveSink, Piece, PieceKind, generate_noisy, generate_quiet};

use crate::eval::material::piece_value;

/// Upper bound on legal moves in any chess position.
pub const MAX_MOVES: usize = 218;

/// Ordering score of the hash move when generation reaches it first.
pub const HASH_MOVE_SCORE: i32 = 1_000_000;
/// Base ordering score of every capture.
pub const CAPTURE_BASE: i32 = 10_000;
/// Ordering score of the primary killer; the secondary gets one less.
pub const KILLER_SCORE: i32 = 9_000;

/// Scores quiet moves. Implementations must stay below [`CAPTURE_BASE`].
pub trait QuietOrdering {
    fn quiet_score(&self, mv: Move, piece: Piece, ply: usize) -> i32;
}

/// Leaves quiet moves in generation order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOrdering;

impl QuietOrdering for NoOrdering {
    #[inline]
    fn quiet_score(&self, _mv: Move, _piece: Piece, _ply: usize) -> i32 {
        0
    }
}

/// MVV-LVA plus the promotion gain.
pub fn noisy_score(mv: Move, piece: PieceKind, captured: Option<PieceKind>) -> i32 {
    let mut score = 0;
    if let Some(victim) = captured {
        score += CAPTURE_BASE + piece_value(victim).mg - piece_value(piece).mg;
    }
    if let Some(promoted) = mv.promotion_kind() {
        score += piece_value(promoted).mg - piece_value(PieceKind::Pawn).mg;
    }
    score
}

/// A move and its ordering key. Higher keys are searched first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-capacity list with selection sort on demand.
pub struct MoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// An empty list. Lives on the stack, one per search frame.
    pub fn new() -> MoveList {
        MoveList {
            moves: [ScoredMove::default(); MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Panics when the list is full; no position has more than [`MAX_MOVES`] moves.
    #[inline]
    pub fn push(&mut self, mv: Move, score: i32) {
        assert!(self.len < MAX_MOVES, "move list overflow");
        self.moves[self.len] = ScoredMove { mv, score };
        self.len += 1;
    }

    /// Swap the best-scored move in `index..len` into `index` and return it.
    /// Equal scores keep generation order.
    pub fn select(&mut self, index: usize) -> Option<ScoredMove> {
        if index >= self.len {
            return None;
        }
        let mut best = index;
        for i in index + 1..self.len {
            if self.moves[i].score > self.moves[best].score {
                best = i;
            }
        }
        self.moves.swap(index, best);
        Some(self.moves[index])
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a [`StagedMoveGenerator`] is. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    HashMove,
    GenerateNoisy,
    Noisy,
    GenerateQuiet,
    Quiet,
    Done,
}

/// Adapts generation output into scored list entries.
struct Scorer<'a, O> {
    list: &'a mut MoveList,
    hash_move: Move,
    hash_yielded: bool,
    ordering: &'a O,
    color: Color,
    ply: usize,
    quiet: bool,
}

impl<O: QuietOrdering> MoveSink for Scorer<'_, O> {
    fn push(&mut self, mv: Move, piece: PieceKind, captured: Option<PieceKind>) {
        let score = if mv == self.hash_move {
            if self.hash_yielded {
                return;
            }
            HASH_MOVE_SCORE
        } else if self.quiet {
            self.ordering.quiet_score(mv, Piece::new(self.color, piece), self.ply)
        } else {
            noisy_score(mv, piece, captured)
        };
        self.list.push(mv, score);
    }
}

/// Yields a node's moves lazily, best-first within each stage.
///
/// The hash move comes first, before anything is generated. Noisy moves
/// follow, keyed `CAPTURE_BASE` plus MVV-LVA. Quiet moves come last, keyed
/// by the node's [`QuietOrdering`], so killers sit at `KILLER_SCORE` and
/// history below it. A cutoff in an early stage skips generating the rest.
/// Moves are pseudo-legal; the caller filters them with `make_move`.
pub struct StagedMoveGenerator {
    stage: SearchStage,
    hash_move: Move,
    hash_yielded: bool,
    noisy_only: bool,
    ply: usize,
    list: MoveList,
    cursor: usize,
}

impl StagedMoveGenerator {
    /// Full generator for a main-search node. `hash_move` may be [`Move::NULL`].
    pub fn new(hash_move: Move, ply: usize) -> StagedMoveGenerator {
        StagedMoveGenerator {
            stage: SearchStage::HashMove,
            hash_move,
            hash_yielded: false,
            noisy_only: false,
            ply,
            list: MoveList::new(),
            cursor: 0,
        }
    }

    /// Noisy moves only. The hash move, if noisy, is ranked first by score.
    pub fn noisy(hash_move: Move, ply: usize) -> StagedMoveGenerator {
        StagedMoveGenerator {
            stage: SearchStage::GenerateNoisy,
            noisy_only: true,
            ..StagedMoveGenerator::new(hash_move, ply)
        }
    }

    pub fn stage(&self) -> SearchStage {
        self.stage
    }

    fn fill(&mut self, board: &Board, ordering: &impl QuietOrdering, quiet: bool) {
        self.list.clear();
        self.cursor = 0;
        let mut scorer = Scorer {
            list: &mut self.list,
            hash_move: self.hash_move,
            hash_yielded: self.hash_yielded,
            ordering,
            color: board.side_to_move(),
            ply: self.ply,
            quiet,
        };
        if quiet {
            generate_quiet(board, &mut scorer);
        } else {
            generate_noisy(board, &mut scorer);
        }
    }

    fn take_next(&mut self) -> Option<Move> {
        let scored = self.list.select(self.cursor)?;
        self.cursor += 1;
        Some(scored.mv)
    }

    /// Next move to search, or `None` once every stage is exhausted.
    /// `board` must be the position the generator was created for.
    pub fn next(&mut self, board: &Board, ordering: &impl QuietOrdering) -> Option<Move> {
        loop {
            match self.stage {
                SearchStage::HashMove => {
                    self.stage = SearchStage::GenerateNoisy;
                    if board.is_pseudo_legal(self.hash_move) {
                        self.hash_yielded = true;
                        return Some(self.hash_move);
                    }
                }
                SearchStage::GenerateNoisy => {
                    self.fill(board, ordering, false);
                    self.stage = SearchStage::Noisy;
                }
                SearchStage::Noisy => {
                    if let Some(mv) = self.take_next() {
                        return Some(mv);
                    }
                    self.stage = if self.noisy_only {
                        SearchStage::Done
                    } else {
                        SearchStage::GenerateQuiet
                    };
                }
                SearchStage::GenerateQuiet => {
                    self.fill(board, ordering, true);
                    self.stage = SearchStage::Quiet;
                }
                SearchStage::Quiet => {
                    if let Some(mv) = self.take_next() {
                        return Some(mv);
                    }
                    self.stage = SearchStage::Done;
                }
                SearchStage::Done => return None,
            }
        }
    }
}
