//! Offset-based views over chunk headers and the tiling walk.

use tessera_core::{ChunkHeader, ChunkStatus, HeapError, HEADER_SIZE};

use crate::arena::Arena;

/// A decoded chunk header together with the offset it was read from.
///
/// Views are plain values: they stay valid only until the next split or
/// merge. Re-derive them from the arena instead of holding on to them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkView {
    pub(crate) offset: u32,
    pub(crate) header: ChunkHeader,
}

impl ChunkView {
    /// Byte offset of the header from the arena base.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Total chunk size in bytes, header included.
    pub fn size(&self) -> u32 {
        self.header.size
    }

    /// Allocation state.
    pub fn status(&self) -> ChunkStatus {
        self.header.status
    }

    /// Whether the chunk is free.
    pub fn is_free(&self) -> bool {
        self.header.status.is_free()
    }

    /// Offset one past the last byte of this chunk; the next chunk's offset.
    pub fn end(&self) -> u32 {
        self.offset + self.header.size
    }

    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> u32 {
        self.offset + HEADER_SIZE as u32
    }

    /// Payload length in bytes.
    pub fn payload_len(&self) -> u32 {
        self.header.payload_len()
    }

    /// The decoded header.
    pub fn header(&self) -> ChunkHeader {
        self.header
    }
}

/// Walks the arena from its base, advancing by each chunk's declared size.
///
/// Yields `Err(CorruptedState)` once and then stops if a header cannot be
/// trusted. Finite: every accepted chunk is at least one header long.
pub struct ChunkIter<'a> {
    arena: &'a Arena,
    cursor: u32,
    done: bool,
}

impl<'a> ChunkIter<'a> {
    pub(crate) fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            cursor: 0,
            done: false,
        }
    }
}

impl Iterator for ChunkIter<'_> {
    type Item = Result<ChunkView, HeapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor >= self.arena.size() {
            return None;
        }
        match self.arena.chunk_at(self.cursor) {
            Ok(chunk) => {
                self.cursor = chunk.end();
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for ChunkIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Corruption, HeapConfig};

    fn arena() -> Arena {
        Arena::init(4096, &HeapConfig::default()).unwrap()
    }

    #[test]
    fn fresh_arena_is_one_free_chunk() {
        let arena = arena();
        let chunks: Vec<_> = arena.chunks().collect::<Result<_, _>>().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].offset(), 0);
        assert_eq!(chunks[0].size(), 4096);
        assert!(chunks[0].is_free());
    }

    #[test]
    fn walk_follows_declared_sizes() {
        let mut arena = arena();
        arena.write_header(0, ChunkHeader::allocated(112));
        arena.write_header(112, ChunkHeader::free(64));
        arena.write_header(176, ChunkHeader::allocated(4096 - 176));

        let offsets: Vec<u32> = arena.chunks().map(|c| c.unwrap().offset()).collect();
        assert_eq!(offsets, vec![0, 112, 176]);
    }

    #[test]
    fn walk_is_restartable() {
        let arena = arena();
        assert_eq!(arena.chunks().count(), arena.chunks().count());
    }

    #[test]
    fn walk_stops_after_bad_status() {
        let mut arena = arena();
        arena.write_header(0, ChunkHeader::allocated(64));
        arena.bytes_mut()[64..68].copy_from_slice(&0x1234_5678u32.to_le_bytes());

        let items: Vec<_> = arena.chunks().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(
            items[1],
            Err(HeapError::CorruptedState {
                offset: 64,
                kind: Corruption::BadStatus { raw: 0x1234_5678 },
            })
        );
    }

    #[test]
    fn zero_size_header_does_not_loop() {
        let mut arena = arena();
        arena.write_header(0, ChunkHeader::free(0));
        let items: Vec<_> = arena.chunks().collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0],
            Err(HeapError::CorruptedState {
                kind: Corruption::BadSize { size: 0 },
                ..
            })
        ));
    }

    #[test]
    fn oversized_header_is_overrun() {
        let mut arena = arena();
        arena.write_header(0, ChunkHeader::free(8192));
        assert!(matches!(
            arena.chunks().next(),
            Some(Err(HeapError::CorruptedState {
                kind: Corruption::Overrun { end: 8192 },
                ..
            }))
        ));
    }
}
