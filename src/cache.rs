//! The cache container: two orderings over one entry set behind a single
//! lock, plus `init`/`fini`/`purge` (§4.1).

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::clock::TickSource;
use crate::config::CacheConfig;
use crate::device::Device;
use crate::entry::Entry;
use crate::stats::{CacheStatsSnapshot, Stats};

/// `by_offset` owns every entry; `by_last_used` is a pure index of
/// `(last_used, offset)` pairs into it. The design note in §9 explicitly
/// allows this instead of two intrusive trees sharing nodes — the offset
/// tiebreaker still gives total order among same-tick entries.
pub(crate) struct Inner {
    pub(crate) by_offset: BTreeMap<u64, Entry>,
    pub(crate) by_last_used: BTreeSet<(u64, u64)>,
}

impl Inner {
    fn new() -> Self {
        Self {
            by_offset: BTreeMap::new(),
            by_last_used: BTreeSet::new(),
        }
    }

    /// Total bytes currently cached.
    pub(crate) fn cached_bytes(&self, block_size: usize) -> usize {
        self.by_offset.len() * block_size
    }

    /// Evict `offset`'s entry (I1, I5): removed from both orderings, buffer
    /// dropped with it. Mirrors `vdev_cache_evict`'s two asserts.
    pub(crate) fn evict(&mut self, offset: u64) {
        let entry = self
            .by_offset
            .remove(&offset)
            .expect("evict: offset must be present in by_offset");
        debug_assert!(entry.fill.is_none(), "evicting an entry with a fill in flight");
        debug_assert!(!entry.data.is_empty(), "evicting an entry with no buffer");
        let removed = self.by_last_used.remove(&(entry.last_used, entry.offset));
        debug_assert!(removed, "by_last_used out of sync with by_offset");
        debug!("evicted entry at offset {}", offset);
    }

    /// The hit procedure (§4.2.1): bump the LRU position if the tick has
    /// advanced, count the hit, and copy the requested window out.
    pub(crate) fn hit(&mut self, offset: u64, phase: usize, buffer: &mut [u8], now: u64) {
        let entry = self.by_offset.get_mut(&offset).expect("hit on missing entry");
        if entry.last_used != now {
            let old_key = (entry.last_used, entry.offset);
            entry.last_used = now;
            self.by_last_used.remove(&old_key);
            self.by_last_used.insert((now, offset));
        }
        entry.hits += 1;
        let end = phase + buffer.len();
        buffer.copy_from_slice(&entry.data[phase..end]);
    }

    /// The allocate procedure (§4.2.2). Returns `false` if no entry could be
    /// made room for (cache disabled, or the LRU victim is itself filling);
    /// the caller treats that as `OutOfMemory`.
    pub(crate) fn allocate(&mut self, offset: u64, block_size: usize, size_limit: usize, now: u64) -> bool {
        if size_limit == 0 {
            return false;
        }
        // Strictly ">" (matching the source's literal check) lets the cache
        // overshoot by one block between the allocation that crosses the
        // limit and the next one that notices; ">=" evicts on the crossing
        // allocation itself instead, matching the documented worked example
        // (see DESIGN.md's Open Question decisions).
        if self.cached_bytes(block_size) >= size_limit {
            let &(_, victim_offset) = self
                .by_last_used
                .iter()
                .next()
                .expect("cached_bytes > 0 implies by_last_used is non-empty");
            if self.by_offset[&victim_offset].is_filling() {
                debug!("allocate: LRU victim at {} is still filling, can't evict", victim_offset);
                return false;
            }
            self.evict(victim_offset);
        }
        let entry = Entry::new(offset, now, block_size);
        self.by_last_used.insert((now, offset));
        self.by_offset.insert(offset, entry);
        true
    }
}

/// A per-device read-ahead block cache. One instance per device; caches
/// never share state across devices (§1 non-goal).
pub struct Cache<D: Device> {
    pub(crate) device: Arc<D>,
    pub(crate) config: CacheConfig,
    pub(crate) clock: Arc<dyn TickSource>,
    pub(crate) inner: Mutex<Inner>,
    pub(crate) stats: Stats,
    pub(crate) next_fill_id: AtomicU64,
}

impl<D: Device> Cache<D> {
    /// `init(device)`: empty orderings, no I/O.
    pub fn new(device: D, config: CacheConfig, clock: Arc<dyn TickSource>) -> Arc<Self> {
        Arc::new(Self {
            device: Arc::new(device),
            config,
            clock,
            inner: Mutex::new(Inner::new()),
            stats: Stats::default(),
            next_fill_id: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of entries currently cached (filling or not).
    pub fn entry_count(&self) -> usize {
        self.inner.lock().unwrap().by_offset.len()
    }

    /// Whether an entry exists for the aligned block starting at `offset`.
    pub fn contains_entry(&self, offset: u64) -> bool {
        self.inner.lock().unwrap().by_offset.contains_key(&offset)
    }

    /// `purge(device)`: evict every entry, in arbitrary order. Precondition:
    /// no outstanding fills — callers are expected to have quiesced the
    /// device first (§4.1); we only assert it rather than wait for it,
    /// matching the source's `vdev_cache_purge`.
    pub fn purge(&self) {
        let mut inner = self.inner.lock().unwrap();
        let offsets: Vec<u64> = inner.by_offset.keys().copied().collect();
        for offset in offsets {
            debug_assert!(
                !inner.by_offset[&offset].is_filling(),
                "purge called with a fill in flight"
            );
            inner.evict(offset);
        }
    }

    /// `fini(device)`: run `purge`, then the orderings and lock are dropped
    /// along with `self` — there is nothing left to tear down explicitly in
    /// Rust beyond the purge itself.
    pub fn fini(&self) {
        self.purge();
    }

    pub(crate) fn next_fill_id(&self) -> u64 {
        self.next_fill_id.fetch_add(1, Ordering::Relaxed)
    }
}
