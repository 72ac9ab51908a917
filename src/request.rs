//! The upper-layer I/O request shape the cache consumes and hands back.
//!
//! The real `IoRequest` object (submission/completion plumbing, parent/child
//! relationships) belongs to the embedding system and is out of scope here
//! (§1). What the cache needs from it is narrow enough to model directly:
//! an offset, a caller-owned buffer to fill, a couple of flags, and a way to
//! hand the (possibly still-empty) request back once it's ready. A
//! `std::sync::mpsc` channel plays the role of `resume()` / `zio_execute()`
//! for the delegated and miss-submitted cases.

use std::io;
use std::sync::mpsc::Receiver;

bitflags::bitflags! {
    /// Mirrors the subset of `zio_flag_t` the cache inspects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RequestFlags: u8 {
        /// Caller has opted this read out of caching entirely.
        const DONT_CACHE = 0b0000_0001;
    }
}

/// One upper-layer read request.
#[derive(Debug)]
pub struct ReadRequest {
    pub offset: u64,
    /// Caller-owned buffer; its length is the requested read size. Filled
    /// in place on a hit, or once the delegated/miss-submitted fill lands.
    pub buffer: Vec<u8>,
    pub flags: RequestFlags,
    /// Set by the cache if the underlying device read failed; `None` means
    /// `buffer` holds valid data.
    pub error: Option<io::Error>,
}

impl ReadRequest {
    pub fn new(offset: u64, size: usize) -> Self {
        Self {
            offset,
            buffer: vec![0u8; size],
            flags: RequestFlags::empty(),
            error: None,
        }
    }

    pub fn with_flags(offset: u64, size: usize, flags: RequestFlags) -> Self {
        Self {
            offset,
            buffer: vec![0u8; size],
            flags,
            error: None,
        }
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }
}

/// One upper-layer write, already completed against the device; the cache
/// only mirrors it into any overlapping entries.
#[derive(Debug)]
pub struct WriteRequest {
    pub offset: u64,
    pub buffer: Vec<u8>,
}

impl WriteRequest {
    pub fn new(offset: u64, buffer: Vec<u8>) -> Self {
        Self { offset, buffer }
    }
}

/// Outcome of [`crate::Cache::read`] on the `Ok` path. The caller never gets
/// the data back inline except on [`ReadOutcome::Hit`] — the other two
/// variants hand back a channel the caller blocks on (`recv()`), standing in
/// for the upper layer's own resumption mechanism.
pub enum ReadOutcome {
    /// Served synchronously from a cached, non-filling entry.
    Hit(ReadRequest),
    /// Attached to an in-flight fill submitted by another thread.
    Delegated(Receiver<ReadRequest>),
    /// No entry existed; a fill was just submitted and this request was
    /// registered as its first delegate.
    MissSubmitted(Receiver<ReadRequest>),
}
