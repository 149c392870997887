//! Heap statistics and full invariant verification.

use tessera_core::{Corruption, HeapError};

use crate::heap::Heap;

/// Point-in-time occupancy figures gathered by one tiling walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Total arena size in bytes.
    pub arena_size: u32,
    /// Number of chunks of either status.
    pub chunks: usize,
    /// Number of free chunks.
    pub free_chunks: usize,
    /// Number of allocated chunks.
    pub allocated_chunks: usize,
    /// Bytes in free chunks, headers included.
    pub free_bytes: u64,
    /// Bytes in allocated chunks, headers included.
    pub allocated_bytes: u64,
    /// Size of the largest free chunk, or 0.
    pub largest_free: u32,
    /// Entries in the free-chunk index.
    pub indexed: usize,
}

impl HeapStats {
    /// Fraction of free bytes that lie outside the largest free chunk.
    ///
    /// 0.0 when all free space is contiguous (or there is none), growing
    /// towards 1.0 as free space is scattered over many small chunks.
    pub fn fragmentation(&self) -> f64 {
        if self.free_bytes == 0 {
            return 0.0;
        }
        1.0 - f64::from(self.largest_free) / self.free_bytes as f64
    }
}

impl Heap {
    /// Walk the arena and summarise it.
    pub fn stats(&self) -> Result<HeapStats, HeapError> {
        let mut stats = HeapStats {
            arena_size: self.arena.size(),
            indexed: self.free.len(),
            ..HeapStats::default()
        };
        for chunk in self.arena.chunks() {
            let chunk = chunk?;
            stats.chunks += 1;
            if chunk.is_free() {
                stats.free_chunks += 1;
                stats.free_bytes += u64::from(chunk.size());
                stats.largest_free = stats.largest_free.max(chunk.size());
            } else {
                stats.allocated_chunks += 1;
                stats.allocated_bytes += u64::from(chunk.size());
            }
        }
        Ok(stats)
    }

    /// Check every structural invariant of the heap.
    ///
    /// - the chunk walk decodes cleanly and ends exactly at the arena end;
    /// - no two address-adjacent chunks are both free;
    /// - the free-chunk index holds exactly the free chunks.
    pub fn verify(&self) -> Result<(), HeapError> {
        let mut prev_free = false;
        let mut covered: u64 = 0;
        let mut free_seen = 0;
        for chunk in self.arena.chunks() {
            let chunk = chunk?;
            if u64::from(chunk.offset()) != covered {
                return Err(HeapError::CorruptedState {
                    offset: chunk.offset(),
                    kind: Corruption::Overrun { end: covered },
                });
            }
            covered += u64::from(chunk.size());

            let indexed = self.free.contains(chunk.offset());
            if chunk.is_free() != indexed {
                return Err(HeapError::CorruptedState {
                    offset: chunk.offset(),
                    kind: Corruption::IndexMismatch,
                });
            }
            if chunk.is_free() {
                if prev_free {
                    return Err(HeapError::CorruptedState {
                        offset: chunk.offset(),
                        kind: Corruption::AdjacentFree {
                            next: chunk.offset(),
                        },
                    });
                }
                free_seen += 1;
            }
            prev_free = chunk.is_free();
        }
        if covered != u64::from(self.arena.size()) {
            return Err(HeapError::CorruptedState {
                offset: covered as u32,
                kind: Corruption::Overrun { end: covered },
            });
        }
        if free_seen != self.free.len() {
            return Err(HeapError::CorruptedState {
                offset: 0,
                kind: Corruption::IndexMismatch,
            });
        }
        Ok(())
    }
}
