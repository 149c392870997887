//! The fixed-size byte region all chunks live in.

use std::num::NonZeroUsize;
use std::ptr::NonNull;

use tessera_core::{ChunkHeader, Corruption, HeapConfig, HeapError, HeapPtr, HEADER_SIZE};

use crate::chunk::{ChunkIter, ChunkView};

/// Headers always start on a multiple of this many bytes.
const HEADER_ALIGN: u32 = 4;

/// A contiguous, zero-initialised byte buffer tiled by chunks.
///
/// The buffer is reserved once by [`Arena::init`] and never grows, moves,
/// or shrinks, so addresses derived from it stay stable for the arena's
/// lifetime. All chunk metadata is read and written through
/// [`ChunkHeader`]'s codec; nothing reinterprets the bytes in place.
pub struct Arena {
    bytes: Box<[u8]>,
}

impl Arena {
    /// Reserve an arena for `requested` bytes and install one free chunk
    /// spanning all of it.
    ///
    /// The size is clamped up to `config.min_heap_size` and rounded up to
    /// `config.alignment`. Returns `OutOfMemory` if the buffer cannot be
    /// reserved.
    pub fn init(requested: usize, config: &HeapConfig) -> Result<Self, HeapError> {
        let size = config.arena_size_for(requested)?;
        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(size as usize)
            .map_err(|_| HeapError::OutOfMemory {
                requested,
                largest_free: 0,
            })?;
        buf.resize(size as usize, 0);

        let mut arena = Self {
            bytes: buf.into_boxed_slice(),
        };
        arena.write_header(0, ChunkHeader::free(size));
        log::debug!(
            "arena reserved: {size} bytes at {:#x} (requested {requested})",
            arena.base_addr()
        );
        Ok(arena)
    }

    /// Release the buffer. Consuming `self` rules out double teardown.
    pub fn teardown(self) {
        log::debug!(
            "arena released: {} bytes at {:#x}",
            self.size(),
            self.base_addr()
        );
    }

    /// Total arena size in bytes.
    pub fn size(&self) -> u32 {
        self.bytes.len() as u32
    }

    fn base(&self) -> NonZeroUsize {
        NonNull::from(&self.bytes[..]).cast::<u8>().addr()
    }

    /// Address of the first arena byte.
    pub fn base_addr(&self) -> usize {
        self.base().get()
    }

    /// Address one past the last arena byte.
    pub fn end_addr(&self) -> usize {
        self.base_addr() + self.bytes.len()
    }

    /// The pointer a caller sees for byte `offset` of the arena.
    pub fn ptr_at(&self, offset: u32) -> HeapPtr {
        HeapPtr::new(self.base().saturating_add(offset as usize))
    }

    /// Byte offset of `ptr` from the arena base.
    ///
    /// `None` if `ptr` is null or outside `[base, base + size)`.
    pub fn offset_of(&self, ptr: Option<HeapPtr>) -> Option<u32> {
        let addr = ptr?.addr();
        if addr < self.base_addr() || addr >= self.end_addr() {
            return None;
        }
        Some((addr - self.base_addr()) as u32)
    }

    /// Decode the chunk header at `offset`.
    ///
    /// Only call this at offsets known to be chunk boundaries. The header is
    /// checked for a valid status word, a size of at least one header on a
    /// 4-byte multiple, and an end that does not pass the arena's end.
    pub fn chunk_at(&self, offset: u32) -> Result<ChunkView, HeapError> {
        let corrupt = |kind| HeapError::CorruptedState { offset, kind };
        let start = offset as usize;
        let raw = self
            .bytes
            .get(start..start + HEADER_SIZE)
            .ok_or(corrupt(Corruption::Overrun {
                end: start as u64 + HEADER_SIZE as u64,
            }))?;
        let mut buf = [0u8; HEADER_SIZE];
        buf.copy_from_slice(raw);

        let header = ChunkHeader::decode(buf).map_err(corrupt)?;
        if (header.size as usize) < HEADER_SIZE || header.size % HEADER_ALIGN != 0 {
            return Err(corrupt(Corruption::BadSize { size: header.size }));
        }
        let end = u64::from(offset) + u64::from(header.size);
        if end > self.bytes.len() as u64 {
            return Err(corrupt(Corruption::Overrun { end }));
        }
        Ok(ChunkView { offset, header })
    }

    /// Encode `header` at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the header would not fit inside the arena.
    pub fn write_header(&mut self, offset: u32, header: ChunkHeader) {
        let start = offset as usize;
        self.bytes[start..start + HEADER_SIZE].copy_from_slice(&header.encode());
    }

    /// Walk all chunks from the base to the end.
    pub fn chunks(&self) -> ChunkIter<'_> {
        ChunkIter::new(self)
    }

    /// Payload bytes of `chunk`.
    pub fn payload(&self, chunk: &ChunkView) -> &[u8] {
        &self.bytes[chunk.payload_offset() as usize..chunk.end() as usize]
    }

    /// Mutable payload bytes of `chunk`.
    pub fn payload_mut(&mut self, chunk: &ChunkView) -> &mut [u8] {
        &mut self.bytes[chunk.payload_offset() as usize..chunk.end() as usize]
    }

    /// Copy `len` bytes from offset `src` to offset `dst`. Ranges may overlap.
    pub fn copy_within(&mut self, src: u32, dst: u32, len: u32) {
        let src = src as usize;
        self.bytes.copy_within(src..src + len as usize, dst as usize);
    }

    /// The whole buffer, headers included.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The whole buffer, headers included, mutably.
    ///
    /// Writing headers through this bypasses every invariant the engine
    /// maintains; it exists for diagnostics and fault injection.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}
