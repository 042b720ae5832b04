//! The engine facade: one position, one transposition table, one worker pool.

use std::sync::Arc;

use tern_core::Board;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::search::pool::{SearchHandle, WorkerPool};
use crate::search::tt::TranspositionTable;
use crate::search::{MAX_PLY, SearchConfig, SearchResult};
use crate::time::{SearchLimits, TimeBudget};

/// Largest accepted transposition table, in megabytes.
pub const MAX_HASH_MB: usize = 65_536;

/// Knobs fixed for the engine's lifetime unless changed through setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Number of search workers.
    pub threads: usize,
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 16,
        }
    }
}

fn validate_hash(mb: usize) -> Result<usize, EngineError> {
    if (1..=MAX_HASH_MB).contains(&mb) {
        Ok(mb)
    } else {
        Err(EngineError::InvalidHashSize(mb))
    }
}

fn validate_limits(limits: &SearchLimits) -> Result<(), EngineError> {
    if let Some(depth) = limits.depth
        && (depth == 0 || usize::from(depth) >= MAX_PLY)
    {
        return Err(EngineError::InvalidDepth(depth));
    }
    if limits.nodes == Some(0) {
        return Err(EngineError::InvalidNodeLimit);
    }
    Ok(())
}

pub struct Engine {
    board: Board,
    tt: Arc<TranspositionTable>,
    pool: WorkerPool,
    options: EngineOptions,
    config: SearchConfig,
    current: Option<Arc<TimeBudget>>,
}

impl Engine {
    /// Validate `options`, allocate the table and spawn the workers.
    pub fn new(options: EngineOptions) -> Result<Engine, EngineError> {
        let hash_mb = validate_hash(options.hash_mb)?;
        let pool = WorkerPool::new(options.threads)?;
        info!(threads = options.threads, hash_mb, "engine ready");
        Ok(Engine {
            board: Board::starting_position(),
            tt: Arc::new(TranspositionTable::new(hash_mb)),
            pool,
            options,
            config: SearchConfig::default(),
            current: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Back to the start position with an empty table and fresh heuristics.
    pub fn new_game(&mut self) {
        self.board = Board::starting_position();
        self.tt.clear();
        self.pool.reset();
        debug!("new game");
    }

    pub fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.board = fen.parse()?;
        Ok(())
    }

    /// Play long-algebraic moves from the current position. Nothing is
    /// played if any move is malformed or illegal.
    pub fn play_moves(&mut self, moves: &[&str]) -> Result<(), EngineError> {
        let mut board = self.board.clone();
        for text in moves {
            let mv = board.parse_uci_move(text)?;
            let legal = board.make_move(mv);
            debug_assert!(legal, "parse_uci_move returned an illegal move");
        }
        self.board = board;
        Ok(())
    }

    /// Replace the table with a fresh one of `mb` megabytes.
    pub fn set_hash(&mut self, mb: usize) -> Result<(), EngineError> {
        let mb = validate_hash(mb)?;
        self.tt = Arc::new(TranspositionTable::new(mb));
        self.options.hash_mb = mb;
        Ok(())
    }

    /// Shut the current workers down and spawn `threads` new ones.
    pub fn set_threads(&mut self, threads: usize) -> Result<(), EngineError> {
        if threads == 0 {
            return Err(EngineError::ZeroThreads);
        }
        self.pool.shutdown();
        self.pool = WorkerPool::new(threads)?;
        self.options.threads = threads;
        Ok(())
    }

    /// Start a search and return immediately.
    pub fn go_async(&mut self, limits: SearchLimits) -> Result<SearchHandle, EngineError> {
        validate_limits(&limits)?;
        let budget = Arc::new(TimeBudget::new(&limits));
        let depth = limits.depth.unwrap_or((MAX_PLY - 1) as u8);
        self.tt.new_generation();
        self.current = Some(Arc::clone(&budget));
        debug!(?limits, fen = %self.board.to_fen(), "search requested");
        self.pool
            .start_searches(budget, &self.board, depth, Arc::clone(&self.tt), self.config)
    }

    /// Search and block until the result is in.
    pub fn go(&mut self, limits: SearchLimits) -> Result<SearchResult, EngineError> {
        let result = self.go_async(limits)?.wait();
        self.current = None;
        Ok(result)
    }

    /// Stop the search started by the last [`Engine::go_async`], if any.
    pub fn stop(&self) {
        if let Some(budget) = &self.current {
            budget.stop();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("fen", &self.board.to_fen())
            .field("options", &self.options)
            .field("pool", &self.pool)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::STARTING_FEN;

    fn engine() -> Engine {
        Engine::new(EngineOptions::default()).unwrap()
    }

    #[test]
    fn rejects_bad_options() {
        let zero = EngineOptions {
            threads: 0,
            ..EngineOptions::default()
        };
        assert!(matches!(Engine::new(zero), Err(EngineError::ZeroThreads)));
        let huge = EngineOptions {
            hash_mb: MAX_HASH_MB + 1,
            ..EngineOptions::default()
        };
        assert!(matches!(Engine::new(huge), Err(EngineError::InvalidHashSize(_))));
    }

    #[test]
    fn rejects_bad_limits() {
        let mut engine = engine();
        assert!(matches!(
            engine.go(SearchLimits::depth(0)),
            Err(EngineError::InvalidDepth(0))
        ));
        let no_nodes = SearchLimits {
            nodes: Some(0),
            ..SearchLimits::default()
        };
        assert!(matches!(engine.go(no_nodes), Err(EngineError::InvalidNodeLimit)));
    }

    #[test]
    fn play_moves_is_all_or_nothing() {
        let mut engine = engine();
        engine.play_moves(&["e2e4", "e7e5"]).unwrap();
        let after = engine.board().to_fen();
        assert!(engine.play_moves(&["g1f3", "e8e6"]).is_err());
        assert_eq!(engine.board().to_fen(), after);
        assert!(matches!(
            engine.play_moves(&["zz"]),
            Err(EngineError::IllegalMove(_))
        ));
    }

    #[test]
    fn bad_fen_is_an_error() {
        let mut engine = engine();
        assert!(matches!(engine.set_position("not a fen"), Err(EngineError::Fen(_))));
    }

    #[test]
    fn new_game_restores_start_position() {
        let mut engine = engine();
        engine.play_moves(&["d2d4"]).unwrap();
        engine.new_game();
        assert_eq!(engine.board().to_fen(), STARTING_FEN);
    }

    #[test]
    fn go_returns_legal_move() {
        let mut engine = engine();
        let result = engine.go(SearchLimits::depth(3)).unwrap();
        assert_eq!(result.depth, 3);
        assert!(tern_core::legal_moves(engine.board()).contains(&result.best_move));
    }

    #[test]
    fn settings_are_applied() {
        let mut engine = engine();
        engine.set_threads(2).unwrap();
        engine.set_hash(2).unwrap();
        assert_eq!(engine.options(), EngineOptions { threads: 2, hash_mb: 2 });
        assert!(engine.set_hash(0).is_err());
        assert!(engine.set_threads(0).is_err());
        let result = engine.go(SearchLimits::depth(2)).unwrap();
        assert!(!result.best_move.is_null());
    }
}
