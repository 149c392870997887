//! Best-fit allocator engine for the Tessera heap.
//!
//! [`Heap`] combines an [`Arena`](tessera_arena::Arena) with a
//! [`FreeIndex`](tessera_arena::FreeIndex) and implements the allocator
//! proper:
//!
//! - **allocate**: best-fit search over free chunks, then either hand out
//!   the whole chunk or split off the tail as a new free chunk;
//! - **release**: resolve the pointer against the chunk tiling, then merge
//!   with free neighbours so no two adjacent chunks are ever both free;
//! - **describe**: the `+OOOOO (S,SSSSS)` heap dump;
//! - **stats / verify**: introspection and full invariant checking.
//!
//! Each `Heap` is an independent instance. The process-wide singleton
//! used by host programs lives in the `tessera` facade crate.
//!
//! ```
//! use tessera_heap::Heap;
//!
//! let mut heap = Heap::new(4096).unwrap();
//! let p = heap.allocate(100).unwrap();
//! assert_eq!(heap.offset_of(Some(p)), Some(8));
//! heap.release(Some(p)).unwrap();
//! assert_eq!(heap.describe().unwrap(), "+00000 (F, 4096) \n");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod alloc;
pub mod describe;
pub mod heap;
mod release;
mod resize;
pub mod stats;

pub use describe::RECORDS_PER_LINE;
pub use heap::Heap;
pub use stats::HeapStats;
