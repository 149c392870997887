//! Chunk-tiled byte arena for the Tessera heap.
//!
//! Owns the single fixed-size buffer every allocation lives in, and the
//! auxiliary index of free chunks used for placement search.
//!
//! # Layout
//!
//! ```text
//! Arena (Box<[u8]>, fixed size, multiple of 4, >= 4096 bytes)
//! ├── Chunk @ +00000  [hdr | payload .........]
//! ├── Chunk @ +00112  [hdr | payload ...]
//! ├── Chunk @ +00176  [hdr | payload ......................]
//! └── ...             (no gaps, no overlaps, ends exactly at arena end)
//!
//! FreeIndex (IndexSet<u32>) ── offsets of every Free chunk, nothing else
//! ```
//!
//! The tiling invariant (each chunk's offset plus its size is the next
//! chunk's offset, and the last chunk ends at the arena's end) is what
//! [`ChunkIter`] relies on. Any header that would break the walk is
//! reported as [`HeapError::CorruptedState`](tessera_core::HeapError).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod chunk;
pub mod free_index;

pub use arena::Arena;
pub use chunk::{ChunkIter, ChunkView};
pub use free_index::FreeIndex;
