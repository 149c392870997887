//! Core types for the Tessera heap.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! on-buffer chunk header format, the [`HeapPtr`] address type handed to
//! callers, heap configuration, and the error taxonomy shared by the
//! arena and the allocator engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod header;
pub mod ptr;

pub use config::HeapConfig;
pub use error::{Corruption, HeapError, ReleaseFault};
pub use header::{ChunkHeader, ChunkStatus, HEADER_SIZE};
pub use ptr::HeapPtr;
