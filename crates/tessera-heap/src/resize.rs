//! Payload access and resizing of live allocations.

use tessera_core::{HeapError, HeapPtr};

use crate::heap::Heap;

impl Heap {
    /// Payload bytes of the live allocation at `ptr`.
    ///
    /// The slice covers the chunk's whole payload, which may be longer
    /// than the size originally requested (rounding, whole-chunk placement).
    pub fn payload(&self, ptr: HeapPtr) -> Result<&[u8], HeapError> {
        let chunk = self.live_chunk(ptr)?;
        Ok(self.arena.payload(&chunk))
    }

    /// Mutable payload bytes of the live allocation at `ptr`.
    pub fn payload_mut(&mut self, ptr: HeapPtr) -> Result<&mut [u8], HeapError> {
        let chunk = self.live_chunk(ptr)?;
        Ok(self.arena.payload_mut(&chunk))
    }

    /// Resize an allocation, keeping its contents.
    ///
    /// Built from the primitive operations:
    ///
    /// - `ptr == None` behaves like [`try_allocate`](Self::try_allocate)
    ///   (and `new_size == 0` then returns `Ok(None)`);
    /// - `new_size == 0` releases `ptr` and returns `Ok(None)`;
    /// - if the current payload already holds `new_size` bytes, `ptr` is
    ///   returned unchanged;
    /// - otherwise a new chunk is allocated, the old payload is copied into
    ///   it, and the old chunk is released.
    ///
    /// A `ptr` that is not a live allocation is `UnknownPointer` whatever
    /// `new_size` is. On `OutOfMemory` the original allocation is untouched.
    pub fn resize(
        &mut self,
        ptr: Option<HeapPtr>,
        new_size: usize,
    ) -> Result<Option<HeapPtr>, HeapError> {
        let Some(old) = ptr else {
            if new_size == 0 {
                return Ok(None);
            }
            return self.try_allocate(new_size).map(Some);
        };
        let chunk = self.live_chunk(old)?;
        if new_size == 0 {
            self.try_release(Some(old))?;
            return Ok(None);
        }
        if chunk.payload_len() as usize >= new_size {
            return Ok(Some(old));
        }

        let new = self.try_allocate(new_size)?;
        let dst = self.live_chunk(new)?;
        self.arena
            .copy_within(chunk.payload_offset(), dst.payload_offset(), chunk.payload_len());
        self.try_release(Some(old))?;
        log::trace!(
            "resize +{:05} -> +{:05} ({} -> {new_size} bytes)",
            chunk.offset(),
            dst.offset(),
            chunk.payload_len()
        );
        Ok(Some(new))
    }
}
