//! Placement: best-fit search, whole-chunk allocation, and splitting.

use tessera_core::{ChunkHeader, HeapError, HeapPtr, HEADER_SIZE};

use crate::heap::Heap;

impl Heap {
    /// Allocate at least `requested` bytes.
    ///
    /// Returns `None` if `requested` is zero or no free chunk is large
    /// enough. Use [`try_allocate`](Self::try_allocate) to see why.
    pub fn allocate(&mut self, requested: usize) -> Option<HeapPtr> {
        match self.try_allocate(requested) {
            Ok(ptr) => Some(ptr),
            Err(e) => {
                if e.is_fatal() {
                    log::error!("allocate({requested}) hit a corrupted heap: {e}");
                } else {
                    log::trace!("allocate({requested}) -> null: {e}");
                }
                None
            }
        }
    }

    /// Allocate at least `requested` bytes, reporting failures.
    ///
    /// The request is rounded up to the configured alignment and a header
    /// is added. The smallest free chunk that fits is chosen (lowest offset
    /// on ties). If handing out that whole chunk would waste no more than
    /// `min_chunk_size` bytes it is allocated whole; otherwise it is split
    /// and the tail becomes a new free chunk that takes over the index entry.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `requested` is zero.
    /// - `OutOfMemory` if no free chunk fits. The arena never grows.
    /// - `CorruptedState` if a header met during the search is invalid.
    pub fn try_allocate(&mut self, requested: usize) -> Result<HeapPtr, HeapError> {
        if requested == 0 {
            return Err(HeapError::InvalidArgument { requested });
        }
        let needed = self
            .config
            .round_request(requested as u64)
            .and_then(|rounded| rounded.checked_add(HEADER_SIZE as u32));
        let Some(needed) = needed else {
            return Err(self.out_of_memory(requested));
        };
        let Some(chunk) = self.free.find_best_fit(&self.arena, needed)? else {
            return Err(self.out_of_memory(requested));
        };

        let offset = chunk.offset();
        if chunk.size() <= needed.saturating_add(self.config.min_chunk_size) {
            self.arena
                .write_header(offset, ChunkHeader::allocated(chunk.size()));
            self.free.remove(offset);
            log::trace!(
                "allocate({requested}) -> +{offset:05}, whole chunk of {} bytes",
                chunk.size()
            );
        } else {
            let rest = offset + needed;
            self.arena.write_header(offset, ChunkHeader::allocated(needed));
            self.arena
                .write_header(rest, ChunkHeader::free(chunk.size() - needed));
            self.free.replace(offset, rest);
            log::trace!(
                "allocate({requested}) -> +{offset:05}, split {} into {needed} + {}",
                chunk.size(),
                chunk.size() - needed
            );
        }
        Ok(self.arena.ptr_at(chunk.payload_offset()))
    }

    /// `OutOfMemory` for `requested`, or the corruption met while sizing
    /// the largest free chunk.
    fn out_of_memory(&self, requested: usize) -> HeapError {
        match self.free.largest(&self.arena) {
            Ok(largest_free) => HeapError::OutOfMemory {
                requested,
                largest_free,
            },
            Err(corrupt) => corrupt,
        }
    }
}
