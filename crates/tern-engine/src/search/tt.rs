//! Lockless transposition table.
//!
//! Each slot is two `AtomicU64` words: the packed entry `data` and
//! `key ^ data`. A reader accepts a slot only if XORing the two words gives
//! back the probed hash, so a write torn by another thread, or a different
//! position sharing the slot, reads as a miss.
//!
//! ```text
//! data:
//!   bits  0-15: best move
//!   bits 16-31: score (i16, mate scores relative to the node)
//!   bits 32-39: depth
//!   bits 40-41: bound
//!   bits 42-47: generation
//! ```

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use tern_core::Move;

use crate::search::MATE_THRESHOLD;

/// Generations live in six bits and wrap.
const GENERATION_MASK: u8 = 0x3F;

/// How a stored score relates to the node's true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// Empty slot.
    None = 0,
    /// The score is the node's value: it fell strictly inside the window.
    Exact = 1,
    /// Fail high: the true score is at least the stored one.
    Lower = 2,
    /// Fail low: the true score is at most the stored one.
    Upper = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Bound {
        match bits & 0b11 {
            1 => Bound::Exact,
            2 => Bound::Lower,
            3 => Bound::Upper,
            _ => Bound::None,
        }
    }
}

/// A verified hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    /// Best or refuting move, [`Move::NULL`] if the node failed low cold.
    pub best_move: Move,
    /// Remaining depth the entry was searched to.
    pub depth: u8,
    /// Relative to the root of the probing search.
    pub score: i32,
    pub bound: Bound,
}

impl TtEntry {
    /// Whether this entry settles a node searched to `depth` with window `(alpha, beta)`.
    pub fn cuts_off(&self, depth: i32, alpha: i32, beta: i32) -> bool {
        if i32::from(self.depth) < depth {
            return false;
        }
        match self.bound {
            Bound::Exact => true,
            Bound::Lower => self.score >= beta,
            Bound::Upper => self.score <= alpha,
            Bound::None => false,
        }
    }
}

/// Mate scores are stored as distance from the node so they stay valid
/// when the position is reached by a different path.
fn score_to_tt(score: i32, ply: usize) -> i16 {
    let ply = ply as i32;
    let adjusted = if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    };
    adjusted.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Inverse of [`score_to_tt`] at the probing node's `ply`.
fn score_from_tt(score: i16, ply: usize) -> i32 {
    let (score, ply) = (score as i32, ply as i32);
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Lay an entry out as the `data` word described in the module docs.
fn pack(best_move: Move, score: i16, depth: u8, bound: Bound, generation: u8) -> u64 {
    best_move.raw() as u64
        | ((score as u16) as u64) << 16
        | (depth as u64) << 32
        | (bound as u64) << 40
        | ((generation & GENERATION_MASK) as u64) << 42
}

/// Split a `data` word back into move, stored score, depth, bound and
/// generation.
fn unpack(data: u64) -> (Move, i16, u8, Bound, u8) {
    (
        Move::from_raw(data as u16),
        (data >> 16) as u16 as i16,
        (data >> 32) as u8,
        Bound::from_bits(data >> 40),
        ((data >> 42) as u8) & GENERATION_MASK,
    )
}

/// Zeroed slots read back as [`Bound::None`] and are never hits.
#[derive(Default)]
struct Slot {
    /// `hash ^ data`.
    check: AtomicU64,
    data: AtomicU64,
}

/// Shared by every worker through an `Arc`; all methods take `&self`.
pub struct TranspositionTable {
    slots: Box<[Slot]>,
    /// Slot count minus one; the count is a power of two.
    mask: u64,
    /// Stamped on every store. Entries from an older one are always replaceable.
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate roughly `mb` megabytes, rounded down to a power-of-two slot count.
    pub fn new(mb: usize) -> TranspositionTable {
        let bytes = mb.max(1) * 1024 * 1024;
        let wanted = bytes / std::mem::size_of::<Slot>();
        let count = if wanted.is_power_of_two() {
            wanted
        } else {
            wanted.next_power_of_two() >> 1
        };
        let slots: Box<[Slot]> = (0..count).map(|_| Slot::default()).collect();
        TranspositionTable {
            slots,
            mask: (count - 1) as u64,
            generation: AtomicU8::new(0),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn slot(&self, hash: u64) -> &Slot {
        &self.slots[(hash & self.mask) as usize]
    }

    /// Zero every slot. Must not race with a running search.
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.check.store(0, Ordering::Relaxed);
            slot.data.store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Age existing entries. Called once per search request.
    pub fn new_generation(&self) {
        let next = self.generation.load(Ordering::Relaxed).wrapping_add(1) & GENERATION_MASK;
        self.generation.store(next, Ordering::Relaxed);
    }

    /// Look up `hash`, converting mate scores to be relative to the root of
    /// a search that reached this node at `ply`. Torn writes and foreign
    /// positions in the slot are misses.
    pub fn probe(&self, hash: u64, ply: usize) -> Option<TtEntry> {
        let slot = self.slot(hash);
        let check = slot.check.load(Ordering::Relaxed);
        let data = slot.data.load(Ordering::Relaxed);
        if check ^ data != hash {
            return None;
        }
        let (best_move, score, depth, bound, _) = unpack(data);
        if bound == Bound::None {
            return None;
        }
        Some(TtEntry {
            best_move,
            depth,
            score: score_from_tt(score, ply),
            bound,
        })
    }

    /// Stored best move for `hash`, or [`Move::NULL`] on a miss.
    pub fn hash_move(&self, hash: u64) -> Move {
        self.probe(hash, 0).map_or(Move::NULL, |entry| entry.best_move)
    }

    /// Replaces the slot when it is empty, from an older generation, not
    /// deeper than `depth`, or when the new bound is exact.
    pub fn store(
        &self,
        hash: u64,
        depth: i32,
        score: i32,
        bound: Bound,
        best_move: Move,
        ply: usize,
    ) {
        let slot = self.slot(hash);
        let generation = self.generation.load(Ordering::Relaxed);
        let depth = depth.clamp(0, u8::MAX as i32) as u8;

        let old = slot.data.load(Ordering::Relaxed);
        let (_, _, old_depth, old_bound, old_generation) = unpack(old);
        let replace = old_bound == Bound::None
            || old_generation != generation
            || depth >= old_depth
            || bound == Bound::Exact;
        if !replace {
            return;
        }

        let data = pack(best_move, score_to_tt(score, ply), depth, bound, generation);
        slot.check.store(hash ^ data, Ordering::Relaxed);
        slot.data.store(data, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}
