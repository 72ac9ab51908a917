//! A per-device read-ahead block cache.
//!
//! Sits between an upper I/O layer and a block device: it inflates each
//! cache miss to a fixed-size aligned block, caches the result, and
//! satisfies later reads that fall within an already-cached region from
//! memory. Concurrent reads for a region with a fill already in flight are
//! delegated to that fill instead of issuing their own device I/O — at most
//! one outstanding fill per cache block.
//!
//! Grounded on ZFS's `vdev_cache.c` (see `SPEC_FULL.md` §10.6): the same
//! five operations (allocate, fill, read, write, evict) under the same
//! single-lock discipline, translated to owned Rust types and a
//! `std::thread`-per-fill model instead of a kernel I/O pipeline.

mod cache;
mod clock;
mod config;
mod device;
mod entry;
mod error;
mod fill;
mod read;
mod request;
mod stats;
mod write;

pub use cache::Cache;
pub use clock::{ManualClock, SystemClock, TickSource};
pub use config::CacheConfig;
pub use device::Device;
pub use error::CacheError;
pub use request::{ReadOutcome, ReadRequest, RequestFlags, WriteRequest};
pub use stats::CacheStatsSnapshot;
