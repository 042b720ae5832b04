//! Lazy-SMP dispatch: long-lived worker threads fed from one shared queue.
//!
//! Every search request becomes one task per worker. All tasks share the
//! transposition table and the time budget; the only other thing a worker
//! touches is its own [`SearchInfo`].

use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tern_core::Board;
use tracing::{info, trace, warn};

use crate::error::EngineError;
use crate::search::info::SearchInfo;
use crate::search::negascout::SearchTree;
use crate::search::tt::TranspositionTable;
use crate::search::{SearchConfig, SearchResult};
use crate::time::TimeBudget;

/// Recursion to `MAX_PLY` with a move list per frame needs more than the
/// platform default on some targets.
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// One search for one worker. Consumed exactly once.
pub struct WorkItem {
    /// Private copy of the root position.
    pub board: Board,
    /// Shared with every other worker of the same search.
    pub budget: Arc<TimeBudget>,
    pub tt: Arc<TranspositionTable>,
    /// The worker's persistent state, locked for the whole task.
    pub info: Arc<Mutex<SearchInfo>>,
    /// Deepest iteration to attempt.
    pub depth: u8,
    pub config: SearchConfig,
    /// Pool index. Worker 0 is the one whose completion ends the search.
    pub worker: usize,
    /// Where the result goes, tagged with `worker`.
    pub done: Sender<(usize, SearchResult)>,
}

fn lock_info(info: &Mutex<SearchInfo>) -> MutexGuard<'_, SearchInfo> {
    info.lock().unwrap_or_else(PoisonError::into_inner)
}

fn worker_loop(queue: Receiver<WorkItem>) {
    // Ends once the pool drops its sender and the queue is drained.
    for item in queue.iter() {
        trace!(worker = item.worker, depth = item.depth, "search task started");
        let result = {
            let mut info = lock_info(&item.info);
            SearchTree::new(item.board, &item.tt, &item.budget, &mut info, item.config)
                .worker(item.worker)
                .run(item.depth)
        };
        trace!(
            worker = item.worker,
            depth = result.depth,
            nodes = result.nodes,
            "search task finished"
        );
        // The handle may have been dropped; the result is then unwanted.
        let _ = item.done.send((item.worker, result));
    }
}

/// Long-lived search threads fed from one shared queue.
///
/// Each worker owns a [`SearchInfo`] that survives between searches so
/// killers and history carry over. Every search hands all workers the same
/// position; they share the table and the budget and nothing else.
pub struct WorkerPool {
    sender: Option<Sender<WorkItem>>,
    handles: Vec<JoinHandle<()>>,
    infos: Vec<Arc<Mutex<SearchInfo>>>,
}

impl WorkerPool {
    /// Spawn `threads` workers named `tern-worker-N`.
    pub fn new(threads: usize) -> Result<WorkerPool, EngineError> {
        if threads == 0 {
            return Err(EngineError::ZeroThreads);
        }
        let (sender, receiver) = crossbeam_channel::unbounded::<WorkItem>();
        let mut pool = WorkerPool {
            sender: Some(sender),
            handles: Vec::with_capacity(threads),
            infos: (0..threads).map(|_| Arc::default()).collect(),
        };
        for index in 0..threads {
            let queue = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("tern-worker-{index}"))
                .stack_size(WORKER_STACK_SIZE)
                .spawn(move || worker_loop(queue))
                .map_err(EngineError::Spawn)?;
            pool.handles.push(handle);
        }
        info!(threads, "worker pool started");
        Ok(pool)
    }

    pub fn threads(&self) -> usize {
        self.infos.len()
    }

    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }

    /// Start the budget's clock and hand every worker a copy of `board`.
    pub fn start_searches(
        &self,
        budget: Arc<TimeBudget>,
        board: &Board,
        depth: u8,
        tt: Arc<TranspositionTable>,
        config: SearchConfig,
    ) -> Result<SearchHandle, EngineError> {
        let sender = self.sender.as_ref().ok_or(EngineError::PoolShutDown)?;
        budget.start();

        let (done, results) = crossbeam_channel::unbounded();
        for (worker, info) in self.infos.iter().enumerate() {
            let item = WorkItem {
                board: board.clone(),
                budget: Arc::clone(&budget),
                tt: Arc::clone(&tt),
                info: Arc::clone(info),
                depth,
                config,
                worker,
                done: done.clone(),
            };
            sender.send(item).map_err(|_| EngineError::PoolShutDown)?;
        }

        Ok(SearchHandle {
            results,
            expected: self.infos.len(),
            budget,
        })
    }

    /// Run `f` on worker `index`'s state. Blocks while that worker is searching.
    pub fn with_info<R>(&self, index: usize, f: impl FnOnce(&SearchInfo) -> R) -> Option<R> {
        let info = self.infos.get(index)?;
        Some(f(&lock_info(info)))
    }

    /// Clear every worker's search state and heuristics. Threads are kept.
    pub fn reset(&self) {
        for info in &self.infos {
            lock_info(info).reset_all();
        }
    }

    /// Close the queue and join every worker. Tasks already queued still run.
    pub fn shutdown(&mut self) {
        let Some(sender) = self.sender.take() else {
            return;
        };
        drop(sender);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("search worker panicked");
            }
        }
        info!("worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .field("running", &self.is_running())
            .finish()
    }
}

/// A search in flight.
///
/// Dropping the handle stops the search.
pub struct SearchHandle {
    results: Receiver<(usize, SearchResult)>,
    expected: usize,
    budget: Arc<TimeBudget>,
}

impl SearchHandle {
    /// Ask every worker to unwind. Completed iterations are kept.
    pub fn stop(&self) {
        self.budget.stop();
    }

    /// Block until every worker has reported.
    ///
    /// Worker 0 finishing stops the helpers. The result is the deepest
    /// completed iteration, ties going to the lowest worker index, with
    /// the node counts of all workers summed.
    pub fn wait(self) -> SearchResult {
        let mut reports = Vec::with_capacity(self.expected);
        for (worker, result) in self.results.iter().take(self.expected) {
            if worker == 0 {
                self.budget.stop();
            }
            reports.push((worker, result));
        }

        let nodes = reports.iter().map(|(_, result)| result.nodes).sum();
        reports.sort_by_key(|(worker, result)| (Reverse(result.depth), *worker));
        let mut best = reports
            .into_iter()
            .next()
            .map_or_else(SearchResult::empty, |(_, result)| result);
        best.nodes = nodes;
        info!(
            depth = best.depth,
            best_move = %best.best_move,
            score = best.score,
            nodes,
            "search finished"
        );
        best
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.budget.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SearchLimits;

    fn start(pool: &WorkerPool, board: &Board, depth: u8) -> SearchHandle {
        let budget = Arc::new(TimeBudget::new(&SearchLimits::default()));
        let tt = Arc::new(TranspositionTable::new(1));
        pool.start_searches(budget, board, depth, tt, SearchConfig::default())
            .unwrap()
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(EngineError::ZeroThreads)));
    }

    #[test]
    fn shutdown_joins_and_is_idempotent() {
        let mut pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.threads(), 3);
        pool.shutdown();
        assert!(!pool.is_running());
        pool.shutdown();
        assert!(pool.handles.is_empty());
    }

    #[test]
    fn searching_after_shutdown_fails() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();
        let budget = Arc::new(TimeBudget::new(&SearchLimits::default()));
        let tt = Arc::new(TranspositionTable::new(1));
        let board = Board::starting_position();
        let started = pool.start_searches(budget, &board, 2, tt, SearchConfig::default());
        assert!(matches!(started, Err(EngineError::PoolShutDown)));
    }

    #[test]
    fn every_worker_reports_once() {
        let pool = WorkerPool::new(4).unwrap();
        let board = Board::starting_position();
        let handle = start(&pool, &board, 3);
        let seen: Vec<usize> = handle.results.iter().take(4).map(|(worker, _)| worker).collect();
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
        assert!(handle.results.try_recv().is_err());
    }

    #[test]
    fn queued_tasks_run_before_shutdown_returns() {
        let mut pool = WorkerPool::new(2).unwrap();
        let board = Board::starting_position();
        let handle = start(&pool, &board, 2);
        pool.shutdown();
        let results: Vec<_> = handle.results.try_iter().collect();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn reset_clears_previous_search() {
        let pool = WorkerPool::new(2).unwrap();
        let result = start(&pool, &Board::starting_position(), 3).wait();
        assert!(!result.best_move.is_null());
        assert!(pool.with_info(0, |info| info.nodes).unwrap() > 0);

        pool.reset();
        for index in 0..2 {
            let (nodes, depth, pv_len) = pool
                .with_info(index, |info| (info.nodes, info.completed_depth, info.best_pv.len()))
                .unwrap();
            assert_eq!((nodes, depth, pv_len), (0, 0, 0));
        }
        assert!(pool.with_info(2, |_| ()).is_none());
    }
}
