//! The heap instance: arena, free-chunk index, and configuration.

use std::fmt;

use tessera_arena::{Arena, ChunkIter, ChunkView, FreeIndex};
use tessera_core::{HeapConfig, HeapError, HeapPtr};

/// A best-fit heap over one fixed-size arena.
///
/// Owns all chunk memory. Callers only ever hold [`HeapPtr`] addresses,
/// which every operation re-resolves against the current chunk tiling.
/// Single-threaded: all mutation goes through `&mut self`.
pub struct Heap {
    pub(crate) arena: Arena,
    pub(crate) free: FreeIndex,
    pub(crate) config: HeapConfig,
}

/// A located chunk with its address-order neighbours.
pub(crate) struct Neighbours {
    pub(crate) prev: Option<ChunkView>,
    pub(crate) this: ChunkView,
    pub(crate) next: Option<ChunkView>,
}

impl Heap {
    /// Create a heap of at least `size` bytes with the default config.
    pub fn new(size: usize) -> Result<Self, HeapError> {
        Self::with_config(size, HeapConfig::default())
    }

    /// Create a heap of at least `size` bytes.
    ///
    /// The arena size is `size` clamped up to `config.min_heap_size` and
    /// rounded to `config.alignment`. Fails with `InvalidConfig` if the
    /// config does not validate, or `OutOfMemory` if the arena or the
    /// free-chunk index cannot be reserved.
    pub fn with_config(size: usize, config: HeapConfig) -> Result<Self, HeapError> {
        config.validate()?;
        let arena = Arena::init(size, &config)?;
        let mut free = FreeIndex::with_capacity(config.free_index_capacity(arena.size()))?;
        free.insert(0);
        Ok(Self {
            arena,
            free,
            config,
        })
    }

    /// Release the arena and the free-chunk index.
    pub fn teardown(self) {
        self.arena.teardown();
    }

    /// Total arena size in bytes.
    pub fn size(&self) -> u32 {
        self.arena.size()
    }

    /// The configuration this heap was built with.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Read-only access to the arena.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the arena.
    ///
    /// Writes through this bypass the engine entirely; it exists so hosts
    /// and tests can inject faults and observe how corruption is reported.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Read-only access to the free-chunk index.
    pub fn free_index(&self) -> &FreeIndex {
        &self.free
    }

    /// Byte offset of `ptr` from the arena base, or `None` if `ptr` is null
    /// or does not point into the arena.
    pub fn offset_of(&self, ptr: Option<HeapPtr>) -> Option<u32> {
        self.arena.offset_of(ptr)
    }

    /// Walk the chunk tiling from the arena base.
    pub fn chunks(&self) -> ChunkIter<'_> {
        self.arena.chunks()
    }

    /// Find the chunk whose payload starts at `payload_offset`, together
    /// with its address-order neighbours.
    ///
    /// Walks the tiling; `Ok(None)` if no chunk's payload starts there.
    pub(crate) fn locate(&self, payload_offset: u32) -> Result<Option<Neighbours>, HeapError> {
        let mut chunks = self.arena.chunks();
        let mut prev = None;
        while let Some(chunk) = chunks.next() {
            let chunk = chunk?;
            if chunk.payload_offset() == payload_offset {
                let next = chunks.next().transpose()?;
                return Ok(Some(Neighbours {
                    prev,
                    this: chunk,
                    next,
                }));
            }
            if chunk.offset() >= payload_offset {
                break;
            }
            prev = Some(chunk);
        }
        Ok(None)
    }

    /// Resolve `ptr` to a live (allocated) chunk.
    pub(crate) fn live_chunk(&self, ptr: HeapPtr) -> Result<ChunkView, HeapError> {
        let unknown = HeapError::UnknownPointer { addr: ptr.addr() };
        let offset = self.arena.offset_of(Some(ptr)).ok_or(unknown.clone())?;
        match self.locate(offset)? {
            Some(found) if !found.this.is_free() => Ok(found.this),
            _ => Err(unknown),
        }
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("base", &format_args!("{:#x}", self.arena.base_addr()))
            .field("size", &self.arena.size())
            .field("free_chunks", &self.free.len())
            .field("config", &self.config)
            .finish()
    }
}
