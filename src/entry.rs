//! A single cached, block-aligned region.

use std::sync::mpsc::Sender;

use crate::request::ReadRequest;

/// The child fill's delegate list lives here rather than as a permanent
/// `Entry` attribute: it only exists, and only grows, while a fill is
/// outstanding, and is drained exactly once at completion (§9 design note).
/// Keeping it as the payload of `Entry::fill`'s `Some` case means an entry
/// with no in-flight fill carries no dangling delegate storage at all.
pub(crate) struct FillState {
    /// Identifies this fill so completion can assert it's acting on the
    /// fill it thinks it is, matching the source's `ve_fill_io == zio`
    /// check.
    pub(crate) id: u64,
    pub(crate) delegates: Vec<(ReadRequest, Sender<ReadRequest>)>,
}

/// One cached region of exactly `block_size` bytes.
pub(crate) struct Entry {
    pub(crate) offset: u64,
    pub(crate) data: Vec<u8>,
    pub(crate) last_used: u64,
    pub(crate) hits: u64,
    pub(crate) fill: Option<FillState>,
    /// Set when a write overlapped this entry while its fill was
    /// outstanding; the entry is evicted the moment the fill completes
    /// instead of being retained with stale data.
    pub(crate) missed_update: bool,
}

impl Entry {
    pub(crate) fn new(offset: u64, last_used: u64, block_size: usize) -> Self {
        Self {
            offset,
            data: vec![0u8; block_size],
            last_used,
            hits: 0,
            fill: None,
            missed_update: false,
        }
    }

    pub(crate) fn is_filling(&self) -> bool {
        self.fill.is_some()
    }
}
