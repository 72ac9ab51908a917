//! Fill completion (§4.4): transfer the fill result to every delegate,
//! evict on error or invalidation, then resume delegates outside the lock.

use std::io;
use std::sync::Arc;
use std::thread;

use log::{trace, warn};

use crate::device::Device;
use crate::Cache;

impl<D: Device> Cache<D> {
    /// Submit the child read for a just-allocated entry. Runs on its own
    /// thread so the calling thread never blocks on device I/O — the Rust
    /// analogue of handing a non-blocking `zio` to `zio_nowait`.
    pub(crate) fn spawn_fill(self: &Arc<Self>, offset: u64, fill_id: u64) {
        let cache = Arc::clone(self);
        let block_size = self.config.block_size();
        thread::spawn(move || {
            let result = cache.device.read_at(offset, block_size);
            cache.fill_complete(offset, fill_id, result);
        });
    }

    /// Runs in the child read's completion context (here: the fill thread).
    fn fill_complete(&self, offset: u64, fill_id: u64, result: io::Result<Vec<u8>>) {
        let error_kind_msg = match &result {
            Ok(_) => None,
            Err(e) => Some((e.kind(), e.to_string())),
        };

        let delegates = {
            let mut inner = self.inner.lock().unwrap();
            let entry = inner
                .by_offset
                .get_mut(&offset)
                .expect("fill_complete: entry missing for offset with an outstanding fill");
            let fill = entry.fill.as_ref().expect("fill_complete: entry has no fill in flight");
            debug_assert_eq!(fill.id, fill_id, "fill_complete invoked for a stale fill handle");
            debug_assert_eq!(entry.offset, offset);

            if let Ok(data) = &result {
                debug_assert_eq!(data.len(), entry.data.len(), "device returned a short read");
                entry.data.copy_from_slice(data);
            }

            // Drain the delegate list now (clearing `entry.fill`), then run
            // the hit procedure against each — even the ones about to lose
            // their entry to eviction below see a consistent in-cache copy,
            // matching `vdev_cache_fill`'s unconditional hit loop.
            let fill = entry.fill.take().unwrap();
            let mut delegates = fill.delegates;

            // LRU repositioning only needs doing once per tick; repeating it
            // per delegate would just be a no-op after the first.
            let now = self.clock.now_tick();
            let entry = inner.by_offset.get_mut(&offset).unwrap();
            if entry.last_used != now {
                let old_key = (entry.last_used, entry.offset);
                entry.last_used = now;
                inner.by_last_used.remove(&old_key);
                inner.by_last_used.insert((now, offset));
            }

            for (request, _tx) in delegates.iter_mut() {
                let phase = self.config.phase(request.offset) as usize;
                let end = phase + request.buffer.len();
                let entry = inner.by_offset.get_mut(&offset).unwrap();
                entry.hits += 1;
                request.buffer.copy_from_slice(&entry.data[phase..end]);
            }

            let should_evict = result.is_err() || {
                let entry = inner.by_offset.get(&offset).unwrap();
                entry.missed_update
            };
            if should_evict {
                inner.evict(offset);
            }

            delegates
        };

        if let Some((_, msg)) = &error_kind_msg {
            warn!("fill at offset {} failed: {}", offset, msg);
        } else {
            trace!("fill at offset {} completed, resuming {} delegate(s)", offset, delegates.len());
        }

        for (mut request, tx) in delegates {
            if let Some((kind, msg)) = &error_kind_msg {
                request.error = Some(io::Error::new(*kind, msg.clone()));
            }
            // The receiving end may already be gone if the delegate gave up
            // waiting; that's the caller's choice to make, not ours.
            let _ = tx.send(request);
        }
    }
}
