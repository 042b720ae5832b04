//! Time allocation and the shared budget every search worker polls.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How long a search may run, before depth and node caps are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Allocation {
    /// Run until stopped or until a depth or node cap is reached.
    #[default]
    Infinite,
    /// Spend exactly this long.
    MoveTime(Duration),
    /// Derive soft and hard limits from the side to move's clock.
    Clock {
        remaining: Duration,
        increment: Duration,
        moves_to_go: Option<u32>,
    },
}

/// Everything that bounds one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    pub allocation: Allocation,
    /// Deepest iteration to run.
    pub depth: Option<u8>,
    /// Node cap, counted per worker.
    pub nodes: Option<u64>,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> SearchLimits {
        SearchLimits {
            depth: Some(depth),
            ..SearchLimits::default()
        }
    }

    pub fn move_time(time: Duration) -> SearchLimits {
        SearchLimits {
            allocation: Allocation::MoveTime(time),
            ..SearchLimits::default()
        }
    }

    pub fn clock(
        remaining: Duration,
        increment: Duration,
        moves_to_go: Option<u32>,
    ) -> SearchLimits {
        SearchLimits {
            allocation: Allocation::Clock {
                remaining,
                increment,
                moves_to_go,
            },
            ..SearchLimits::default()
        }
    }
}

/// Compute soft and hard limits from the remaining clock time.
///
/// | Parameter              | No increment | With increment       |
/// |------------------------|--------------|----------------------|
/// | Default moves to go    | 30           | 25                   |
/// | Soft limit             | `usable/mtg` | `usable/mtg + 3/4 inc` |
/// | Hard/soft ratio cap    | 2.5x         | 3.0x                 |
/// | Hard cap (% of usable) | 12%          | 25%                  |
///
/// `usable` is the remaining time minus 10ms of overhead. Both limits are
/// clamped to `[1ms, usable]`; under 10ms remaining both are 1ms.
pub fn compute_limits(
    remaining: Duration,
    increment: Duration,
    moves_to_go: Option<u32>,
) -> (Duration, Duration) {
    let remaining_ms = remaining.as_millis() as f64;
    if remaining_ms < 10.0 {
        let one_ms = Duration::from_millis(1);
        return (one_ms, one_ms);
    }

    let usable = (remaining_ms - 10.0).max(1.0);
    let inc_ms = increment.as_millis() as f64;
    let has_increment = inc_ms > 0.0;

    let mtg = match moves_to_go {
        Some(n) => n.max(1) as f64,
        None if has_increment => 25.0,
        None => 30.0,
    };

    let soft = usable / mtg + inc_ms * 0.75;
    let (ratio, cap) = if has_increment { (3.0, 0.25) } else { (2.5, 0.12) };
    let hard = (soft * ratio).min(usable * cap);

    let soft = soft.clamp(1.0, usable);
    let hard = hard.clamp(1.0, usable);

    (
        Duration::from_millis(soft as u64),
        Duration::from_millis(hard as u64),
    )
}

/// Shared, lock-free view of one search's limits.
///
/// Workers poll [`TimeBudget::is_stopped`] at every node and the clock-based
/// checks every few thousand nodes. Once any limit fires the stop flag is
/// latched, so later polls are a single relaxed load.
#[derive(Debug)]
pub struct TimeBudget {
    epoch: Instant,
    /// Nanoseconds from `epoch` to the last `start()`.
    origin: AtomicU64,
    started: AtomicBool,
    stopped: AtomicBool,
    soft: Option<Duration>,
    hard: Option<Duration>,
    depth: Option<u8>,
    nodes: Option<u64>,
}

impl TimeBudget {
    pub fn new(limits: &SearchLimits) -> TimeBudget {
        let (soft, hard) = match limits.allocation {
            Allocation::Infinite => (None, None),
            Allocation::MoveTime(time) => (Some(time), Some(time)),
            Allocation::Clock {
                remaining,
                increment,
                moves_to_go,
            } => {
                let (soft, hard) = compute_limits(remaining, increment, moves_to_go);
                (Some(soft), Some(hard))
            }
        };
        TimeBudget {
            epoch: Instant::now(),
            origin: AtomicU64::new(0),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            soft,
            hard,
            depth: limits.depth,
            nodes: limits.nodes,
        }
    }

    /// Record now as the origin. Calling it again restarts the clock.
    pub fn start(&self) {
        let now = self.epoch.elapsed().as_nanos() as u64;
        self.origin.store(now, Ordering::Relaxed);
        self.started.store(true, Ordering::Release);
    }

    /// Time since [`TimeBudget::start`], or zero before it.
    pub fn elapsed(&self) -> Duration {
        if !self.started.load(Ordering::Acquire) {
            return Duration::ZERO;
        }
        let origin = Duration::from_nanos(self.origin.load(Ordering::Relaxed));
        self.epoch.elapsed().saturating_sub(origin)
    }

    /// Ask every worker to unwind. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// True once stopped or the hard limit has elapsed.
    pub fn limit_reached(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        if let Some(hard) = self.hard
            && self.elapsed() >= hard
        {
            self.stop();
            return true;
        }
        false
    }

    /// Whether another iteration is worth starting.
    pub fn should_start_iteration(&self) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.soft.is_none_or(|soft| self.elapsed() < soft)
    }

    /// True (and latched) once `nodes` reaches the node cap.
    pub fn node_limit_reached(&self, nodes: u64) -> bool {
        match self.nodes {
            Some(cap) if nodes >= cap => {
                self.stop();
                true
            }
            _ => false,
        }
    }

    pub fn depth_limit(&self) -> Option<u8> {
        self.depth
    }

    pub fn soft_limit(&self) -> Option<Duration> {
        self.soft
    }

    pub fn hard_limit(&self) -> Option<Duration> {
        self.hard
    }
}
