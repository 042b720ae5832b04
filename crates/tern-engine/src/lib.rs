//! Search core for tern: staged move ordering, NegaScout, a shared
//! transposition table and lazy-SMP workers behind an [`Engine`] facade.

pub mod engine;
pub mod error;
pub mod eval;
pub mod search;
pub mod time;

pub use engine::{Engine, EngineOptions};
pub use error::EngineError;
pub use eval::evaluate;
pub use search::pool::{SearchHandle, WorkerPool};
pub use search::tt::TranspositionTable;
pub use search::{MATE, MATE_THRESHOLD, SearchConfig, SearchResult, format_score};
pub use time::{Allocation, SearchLimits, TimeBudget};
