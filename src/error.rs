//! Decline codes returned by the read path.

use thiserror::Error;

/// Result of [`crate::Cache::read`] when the cache declines to serve or
/// accept a request. None of these represent a failure of the overall I/O —
/// they are signals to the caller to proceed straight to the device.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The request carries a flag this cache never honors (e.g. don't-cache).
    #[error("request is not eligible for caching")]
    InvalidArgument,
    /// The request is larger than `max_request`.
    #[error("request size exceeds max_request")]
    TooLarge,
    /// The request spans two adjacent aligned blocks.
    #[error("request straddles a block boundary")]
    Straddle,
    /// A write raced an in-flight fill for this entry; the caller must retry
    /// without the cache.
    #[error("entry was invalidated by a concurrent write, retry uncached")]
    Stale,
    /// No entry could be allocated: either caching is disabled
    /// (`size_limit == 0`) or the LRU victim is itself mid-fill.
    #[error("cache allocation failed")]
    OutOfMemory,
}
