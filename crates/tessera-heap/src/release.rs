//! Release and coalescing.

use tessera_core::{ChunkHeader, HeapError, HeapPtr, ReleaseFault};

use crate::heap::{Heap, Neighbours};

impl Heap {
    /// Return an allocation to the heap.
    ///
    /// Same contract as [`try_release`](Self::try_release).
    pub fn release(&mut self, ptr: Option<HeapPtr>) -> Result<(), HeapError> {
        self.try_release(ptr)
    }

    /// Return an allocation to the heap, merging it with free neighbours.
    ///
    /// Releasing `None` is a no-op. Otherwise `ptr` must be the payload
    /// address of a currently allocated chunk. After the call no two
    /// address-adjacent chunks are both free: the released chunk is merged
    /// into a free predecessor, absorbs a free successor, or both.
    ///
    /// # Errors
    ///
    /// `InvalidRelease` if `ptr` is outside the heap, not a payload start,
    /// or already free. This error is fatal: the heap is left unchanged,
    /// but the caller has lost track of its allocations and should not
    /// keep going. `CorruptedState` if the tiling walk meets a bad header.
    pub fn try_release(&mut self, ptr: Option<HeapPtr>) -> Result<(), HeapError> {
        let Some(ptr) = ptr else {
            return Ok(());
        };
        let fault = |reason| HeapError::InvalidRelease {
            addr: ptr.addr(),
            reason,
        };
        let offset = self
            .arena
            .offset_of(Some(ptr))
            .ok_or(fault(ReleaseFault::NotInHeap))?;
        let Neighbours { prev, this, next } = self
            .locate(offset)?
            .ok_or(fault(ReleaseFault::NotAChunk))?;
        if this.is_free() {
            return Err(fault(ReleaseFault::AlreadyFree));
        }

        let prev = prev.filter(|c| c.is_free());
        let next = next.filter(|c| c.is_free());
        match (prev, next) {
            (Some(p), Some(n)) => {
                let size = p.size() + this.size() + n.size();
                self.arena.write_header(p.offset(), ChunkHeader::free(size));
                self.free.remove(n.offset());
                log::debug!(
                    "release +{:05}: merged with both neighbours into +{:05} ({size} bytes)",
                    this.offset(),
                    p.offset()
                );
            }
            (Some(p), None) => {
                let size = p.size() + this.size();
                self.arena.write_header(p.offset(), ChunkHeader::free(size));
                log::debug!(
                    "release +{:05}: merged into predecessor +{:05} ({size} bytes)",
                    this.offset(),
                    p.offset()
                );
            }
            (None, Some(n)) => {
                let size = this.size() + n.size();
                self.arena
                    .write_header(this.offset(), ChunkHeader::free(size));
                self.free.replace(n.offset(), this.offset());
                log::debug!(
                    "release +{:05}: absorbed successor +{:05} ({size} bytes)",
                    this.offset(),
                    n.offset()
                );
            }
            (None, None) => {
                self.arena
                    .write_header(this.offset(), ChunkHeader::free(this.size()));
                self.free.insert(this.offset());
                log::trace!("release +{:05}: {} bytes", this.offset(), this.size());
            }
        }
        Ok(())
    }
}
