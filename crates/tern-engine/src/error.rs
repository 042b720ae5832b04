//! Engine configuration and request errors.

use tern_core::{FenError, MoveParseError};

/// Errors reported before any search starts.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A worker pool needs at least one thread.
    #[error("thread count must be at least 1")]
    ZeroThreads,

    /// Hash size outside `1..=65536` MB.
    #[error("hash size {0} MB is outside 1..=65536")]
    InvalidHashSize(usize),

    /// Depth outside `1..MAX_PLY`.
    #[error("search depth {0} is outside 1..128")]
    InvalidDepth(u8),

    /// A node cap of zero.
    #[error("node limit must be positive")]
    InvalidNodeLimit,

    #[error("invalid FEN: {0}")]
    Fen(#[from] FenError),

    #[error(transparent)]
    IllegalMove(#[from] MoveParseError),

    /// The pool was shut down before the request.
    #[error("worker pool is shut down")]
    PoolShutDown,

    /// The OS refused to start a worker thread.
    #[error("failed to spawn search worker: {0}")]
    Spawn(#[source] std::io::Error),
}
