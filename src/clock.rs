//! The tick source used for LRU ordering.
//!
//! The cache never interprets `last_used` beyond comparing it: any
//! monotonic, arbitrary-unit counter satisfies the invariant. Production
//! code samples [`SystemClock`]; tests use [`ManualClock`] to make eviction
//! order deterministic without sleeping real time away.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic counter sampled for `Entry::last_used`. Implementations must
/// be cheap to call under the cache lock.
pub trait TickSource: Send + Sync {
    fn now_tick(&self) -> u64;
}

/// Ticks derived from wall-clock elapsed time, quantized to a jiffy so that
/// reads within the same jiffy compare equal (matching the source's `lbolt`
/// semantics, where the scheduler tick — not the cache — advances time).
pub struct SystemClock {
    start: Instant,
    jiffy_nanos: u64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::with_jiffy(std::time::Duration::from_millis(10))
    }

    pub fn with_jiffy(jiffy: std::time::Duration) -> Self {
        Self {
            start: Instant::now(),
            jiffy_nanos: jiffy.as_nanos().max(1) as u64,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for SystemClock {
    fn now_tick(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64 / self.jiffy_nanos
    }
}

/// A tick source tests advance by hand, so that two reads issued
/// milliseconds apart in wall-clock time can still be forced into the same
/// or different ticks on demand.
#[derive(Default)]
pub struct ManualClock {
    tick: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            tick: AtomicU64::new(0),
        }
    }

    /// Advance the clock by one tick and return the new value.
    pub fn advance(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl TickSource for ManualClock {
    fn now_tick(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }
}
