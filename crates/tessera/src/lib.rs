//! Tessera: a user-space best-fit heap over a single pre-reserved arena.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Tessera sub-crates, plus a process-wide heap in [`global`] for hosts
//! that want one shared allocator instead of an owned [`Heap`](prelude::Heap).
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let mut heap = Heap::new(4096).unwrap();
//! let a = heap.allocate(100).unwrap();
//! let b = heap.allocate(100).unwrap();
//! heap.release(Some(a)).unwrap();
//! assert_eq!(
//!     heap.describe().unwrap(),
//!     "+00000 (F,  112) +00112 (A,  112) +00224 (F, 3872) \n"
//! );
//! heap.release(Some(b)).unwrap();
//! assert_eq!(heap.describe().unwrap(), "+00000 (F, 4096) \n");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | Errors, config, chunk headers, `HeapPtr` |
//! | [`arena`] | `tessera-arena` | Arena buffer, chunk walk, free-chunk index |
//! | [`heap`] | `tessera-heap` | The best-fit engine |
//! | [`global`] | this crate | Process-wide heap with abort-on-fatal semantics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod global;

/// Core types (`tessera-core`).
///
/// Error enums, [`types::HeapConfig`], the on-arena [`types::ChunkHeader`]
/// layout, and the [`types::HeapPtr`] handle.
pub use tessera_core as types;

/// Arena storage (`tessera-arena`).
///
/// Most users never touch this directly; [`heap::Heap`] owns the arena.
pub use tessera_arena as arena;

/// The allocator engine (`tessera-heap`).
pub use tessera_heap as heap;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use tessera_core::{ChunkStatus, HeapConfig, HeapError, HeapPtr, HEADER_SIZE};
    pub use tessera_heap::{Heap, HeapStats};
}
