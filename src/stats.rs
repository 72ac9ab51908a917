//! The three monotonic counters (§4.6).
//!
//! Exposure beyond "three counters" is a concern of the enclosing system;
//! [`CacheStatsSnapshot`] is the minimal ambient convenience this crate
//! provides so an embedder isn't forced to wire its own metrics registry
//! just to read them back, the same role `eclipsefs-lib`'s
//! `IntelligentCache::get_stats()` plays for its own counters.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct Stats {
    delegations: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Stats {
    pub(crate) fn bump_delegations(&self) {
        self.delegations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bump_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bump_misses(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            delegations: self.delegations.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of the cache's three counters. Never requires the
/// cache lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub delegations: u64,
    pub hits: u64,
    pub misses: u64,
}
