//! Index of the chunks that are currently free.
//!
//! [`FreeIndex`] holds the arena offsets of every free chunk and nothing
//! else. It does not cache sizes: placement search reads each candidate's
//! header from the arena, so there is a single source of truth for a
//! chunk's size and merges never have to patch the index.

use indexmap::IndexSet;
use tessera_core::{Corruption, HeapError};

use crate::arena::Arena;
use crate::chunk::ChunkView;

/// Set of free-chunk offsets.
///
/// Membership order is insertion order and carries no meaning; best-fit
/// search breaks ties on offset explicitly, so results are deterministic
/// regardless of how the set was built.
pub struct FreeIndex {
    offsets: IndexSet<u32>,
    capacity: usize,
}

impl FreeIndex {
    /// Create an index with room for `capacity` entries reserved up front.
    ///
    /// The reservation is a hint: the index grows past it if needed.
    /// Heaps pass `HeapConfig::free_index_capacity`, which bounds the free
    /// chunks an arena can hold, so in practice it never reallocates.
    pub fn with_capacity(capacity: usize) -> Result<Self, HeapError> {
        let mut offsets = IndexSet::new();
        offsets
            .try_reserve_exact(capacity)
            .map_err(|_| HeapError::OutOfMemory {
                requested: capacity * std::mem::size_of::<u32>(),
                largest_free: 0,
            })?;
        Ok(Self { offsets, capacity })
    }

    /// Add a free chunk. Returns `false` if it was already indexed.
    pub fn insert(&mut self, offset: u32) -> bool {
        self.offsets.insert(offset)
    }

    /// Remove a chunk. Returns whether it was present.
    pub fn remove(&mut self, offset: u32) -> bool {
        self.offsets.swap_remove(&offset)
    }

    /// Swap the entry for `old` with `new`, e.g. after a split moves the
    /// free remainder or a merge moves the free chunk's start.
    pub fn replace(&mut self, old: u32, new: u32) -> bool {
        let found = self.remove(old);
        self.insert(new);
        found
    }

    /// Whether `offset` is indexed.
    pub fn contains(&self, offset: u32) -> bool {
        self.offsets.contains(&offset)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether no chunk is indexed.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Entries reserved at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Indexed offsets in ascending address order.
    pub fn sorted(&self) -> Vec<u32> {
        let mut out: Vec<u32> = self.offsets.iter().copied().collect();
        out.sort_unstable();
        out
    }

    /// Smallest free chunk whose size is at least `min_size`.
    ///
    /// Ties go to the lowest offset. Every indexed offset must decode to a
    /// free chunk; anything else is reported as corruption.
    pub fn find_best_fit(
        &self,
        arena: &Arena,
        min_size: u32,
    ) -> Result<Option<ChunkView>, HeapError> {
        let mut best: Option<ChunkView> = None;
        for &offset in &self.offsets {
            let chunk = arena.chunk_at(offset)?;
            if !chunk.is_free() {
                return Err(HeapError::CorruptedState {
                    offset,
                    kind: Corruption::IndexMismatch,
                });
            }
            if chunk.size() < min_size {
                continue;
            }
            let better = match &best {
                None => true,
                Some(b) => (chunk.size(), chunk.offset()) < (b.size(), b.offset()),
            };
            if better {
                best = Some(chunk);
            }
        }
        Ok(best)
    }

    /// Size of the largest indexed chunk, or 0 if none.
    pub fn largest(&self, arena: &Arena) -> Result<u32, HeapError> {
        let mut largest = 0;
        for &offset in &self.offsets {
            largest = largest.max(arena.chunk_at(offset)?.size());
        }
        Ok(largest)
    }
}
