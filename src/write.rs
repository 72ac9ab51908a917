//! Write path (§4.5): mirror a completed device write into any overlapping
//! entries, or flag them `missed_update` if their fill is still outstanding.
//! The cache never originates I/O here — this only runs after the write has
//! already landed on the device.

use log::trace;

use crate::device::Device;
use crate::request::WriteRequest;
use crate::Cache;

impl<D: Device> Cache<D> {
    pub fn write(&self, request: WriteRequest) {
        let block_size = self.config.block_size() as u64;
        let io_start = request.offset;
        let io_end = io_start + request.buffer.len() as u64;
        let min_offset = self.config.align_down(io_start);
        // ceil((io_end) / block_size) * block_size
        let max_offset = (io_end + block_size - 1) & !(block_size - 1);

        let mut inner = self.inner.lock().unwrap();
        let overlapping: Vec<u64> = inner
            .by_offset
            .range(min_offset..max_offset)
            .map(|(&offset, _)| offset)
            .collect();

        for offset in overlapping {
            let entry = inner.by_offset.get_mut(&offset).unwrap();
            let start = offset.max(io_start);
            let end = (offset + block_size).min(io_end);
            if entry.is_filling() {
                entry.missed_update = true;
                trace!("write: entry at {} marked missed_update", offset);
            } else {
                let src_start = (start - io_start) as usize;
                let src_end = (end - io_start) as usize;
                let dst_start = (start - offset) as usize;
                let dst_end = (end - offset) as usize;
                entry.data[dst_start..dst_end].copy_from_slice(&request.buffer[src_start..src_end]);
            }
        }
    }
}
