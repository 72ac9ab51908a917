//! Policy gate → lookup → {hit, delegate, miss-allocate+submit-fill} (§4.2).

use std::sync::mpsc;
use std::sync::Arc;

use log::trace;

use crate::device::Device;
use crate::entry::FillState;
use crate::error::CacheError;
use crate::request::{ReadOutcome, ReadRequest, RequestFlags};
use crate::Cache;

impl<D: Device> Cache<D> {
    /// `cache_read`. Declines (`Err`) mean "proceed through the device
    /// directly"; they are not failures of the overall I/O (§7).
    pub fn read(self: &Arc<Self>, mut request: ReadRequest) -> Result<ReadOutcome, CacheError> {
        if request.flags.contains(RequestFlags::DONT_CACHE) {
            return Err(CacheError::InvalidArgument);
        }
        if request.size() > self.config.max_request {
            return Err(CacheError::TooLarge);
        }

        let cache_offset = self.config.align_down(request.offset);
        let cache_phase = self.config.phase(request.offset) as usize;
        let block_size = self.config.block_size();

        if request.size() > 0 {
            let last_byte = request.offset + request.size() as u64 - 1;
            if self.config.align_down(last_byte) != cache_offset {
                return Err(CacheError::Straddle);
            }
        }
        debug_assert!(cache_phase + request.size() <= block_size);

        let mut inner = self.inner.lock().unwrap();

        if inner.by_offset.contains_key(&cache_offset) {
            if inner.by_offset[&cache_offset].missed_update {
                trace!("read {}: stale entry, declining", request.offset);
                return Err(CacheError::Stale);
            }
            if inner.by_offset[&cache_offset].is_filling() {
                let (tx, rx) = mpsc::channel();
                let fill = inner.by_offset.get_mut(&cache_offset).unwrap().fill.as_mut().unwrap();
                fill.delegates.push((request, tx));
                drop(inner);
                self.stats.bump_delegations();
                trace!("read {}: delegated to in-flight fill", cache_offset);
                return Ok(ReadOutcome::Delegated(rx));
            }

            let now = self.clock.now_tick();
            inner.hit(cache_offset, cache_phase, &mut request.buffer, now);
            drop(inner);
            self.stats.bump_hits();
            trace!("read {}: hit", cache_offset);
            return Ok(ReadOutcome::Hit(request));
        }

        let now = self.clock.now_tick();
        if !inner.allocate(cache_offset, block_size, self.config.size_limit, now) {
            drop(inner);
            trace!("read {}: allocate failed, OutOfMemory", cache_offset);
            return Err(CacheError::OutOfMemory);
        }

        let fill_id = self.next_fill_id();
        let (tx, rx) = mpsc::channel();
        let entry = inner.by_offset.get_mut(&cache_offset).unwrap();
        entry.fill = Some(FillState {
            id: fill_id,
            delegates: vec![(request, tx)],
        });
        drop(inner);

        self.stats.bump_misses();
        self.spawn_fill(cache_offset, fill_id);
        trace!("read {}: miss, fill {} submitted", cache_offset, fill_id);
        Ok(ReadOutcome::MissSubmitted(rx))
    }
}
