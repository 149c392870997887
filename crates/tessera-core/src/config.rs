//! Heap configuration parameters.

use crate::error::HeapError;
use crate::header::HEADER_SIZE;

/// Configuration for a heap instance.
///
/// Controls arena sizing, the split threshold, and request alignment.
/// Validated at heap construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Smallest arena that will be reserved, in bytes.
    ///
    /// Default: 4096. Smaller requests are clamped up to this.
    pub min_heap_size: u32,

    /// Smallest payload worth splitting off as a separate free chunk.
    ///
    /// Default: 32. When a placement would leave at most this many spare
    /// bytes, the whole chunk is handed out instead. Chunks released later
    /// can still be smaller than this, so it does not bound how many free
    /// chunks coexist.
    pub min_chunk_size: u32,

    /// Granularity that request sizes and the arena size are rounded to.
    ///
    /// Default: 4. Must be a power of two and at least 4 so that every
    /// header starts on a 4-byte boundary.
    pub alignment: u32,
}

impl HeapConfig {
    /// Default minimum arena size in bytes.
    pub const DEFAULT_MIN_HEAP_SIZE: u32 = 4096;

    /// Default split threshold in bytes.
    pub const DEFAULT_MIN_CHUNK_SIZE: u32 = 32;

    /// Default size alignment in bytes.
    pub const DEFAULT_ALIGNMENT: u32 = 4;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), HeapError> {
        if !self.alignment.is_power_of_two() || self.alignment < 4 {
            return Err(HeapError::InvalidConfig {
                reason: format!(
                    "alignment must be a power of two >= 4, got {}",
                    self.alignment
                ),
            });
        }
        if self.min_chunk_size == 0 || self.min_chunk_size % self.alignment != 0 {
            return Err(HeapError::InvalidConfig {
                reason: format!(
                    "min_chunk_size must be a non-zero multiple of {}, got {}",
                    self.alignment, self.min_chunk_size
                ),
            });
        }
        let floor = HEADER_SIZE as u32 + self.min_chunk_size;
        if self.min_heap_size < floor {
            return Err(HeapError::InvalidConfig {
                reason: format!(
                    "min_heap_size must be at least {floor}, got {}",
                    self.min_heap_size
                ),
            });
        }
        Ok(())
    }

    /// Round `n` up to the configured alignment. `None` on overflow.
    pub fn round_request(&self, n: u64) -> Option<u32> {
        let mask = u64::from(self.alignment) - 1;
        let rounded = n.checked_add(mask)? & !mask;
        u32::try_from(rounded).ok()
    }

    /// Arena size reserved for a requested size: clamped up to
    /// [`min_heap_size`](Self::min_heap_size) and rounded to the alignment.
    pub fn arena_size_for(&self, requested: usize) -> Result<u32, HeapError> {
        let clamped = (requested as u64).max(u64::from(self.min_heap_size));
        self.round_request(clamped).ok_or(HeapError::OutOfMemory {
            requested,
            largest_free: 0,
        })
    }

    /// Upper bound on simultaneously free chunks in an arena of `arena_size`.
    ///
    /// The smallest chunk is one header plus one aligned unit, and no two
    /// free chunks are adjacent, so every free chunk but the last is
    /// followed by an allocated one of at least that size.
    pub fn free_index_capacity(&self, arena_size: u32) -> usize {
        let smallest = HEADER_SIZE as u32 + self.alignment;
        (arena_size / (2 * smallest)) as usize + 1
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            min_heap_size: Self::DEFAULT_MIN_HEAP_SIZE,
            min_chunk_size: Self::DEFAULT_MIN_CHUNK_SIZE,
            alignment: Self::DEFAULT_ALIGNMENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        HeapConfig::default().validate().unwrap();
    }

    #[test]
    fn small_requests_clamp_to_min_heap() {
        let config = HeapConfig::default();
        assert_eq!(config.arena_size_for(0).unwrap(), 4096);
        assert_eq!(config.arena_size_for(100).unwrap(), 4096);
    }

    #[test]
    fn arena_size_rounds_to_alignment() {
        let config = HeapConfig::default();
        assert_eq!(config.arena_size_for(5001).unwrap(), 5004);
        assert_eq!(config.arena_size_for(5004).unwrap(), 5004);
    }

    #[test]
    fn arena_size_overflow_is_out_of_memory() {
        let config = HeapConfig::default();
        let err = config.arena_size_for(u32::MAX as usize).unwrap_err();
        assert!(matches!(err, HeapError::OutOfMemory { .. }));
    }

    #[test]
    fn round_request_matches_mod_four_rule() {
        let config = HeapConfig::default();
        for n in 1u64..64 {
            let expected = n + (4 - n % 4) % 4;
            assert_eq!(config.round_request(n), Some(expected as u32));
        }
    }

    #[test]
    fn rejects_non_power_of_two_alignment() {
        let config = HeapConfig {
            alignment: 12,
            ..HeapConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HeapError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_unaligned_min_chunk() {
        let config = HeapConfig {
            min_chunk_size: 30,
            ..HeapConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_tiny_min_heap() {
        let config = HeapConfig {
            min_heap_size: 16,
            ..HeapConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn free_index_capacity_covers_alternating_smallest_chunks() {
        // F(12) A(12) F(12) ... over 4096 bytes: 171 free chunks.
        assert_eq!(HeapConfig::default().free_index_capacity(4096), 171);
        assert_eq!(HeapConfig::default().free_index_capacity(24), 2);
    }
}
