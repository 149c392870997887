//! Error types for the Tessera heap.
//!
//! One enum, [`HeapError`], covers every failure the arena and engine can
//! report. Variants split into two classes: recoverable failures the caller
//! is expected to handle (out of memory, bad arguments, bad config), and
//! fatal ones ([`HeapError::is_fatal`]) after which the heap can no longer
//! be trusted. The library only reports fatal errors; deciding to abort is
//! left to the host (see `tessera::global`).

use std::error::Error;
use std::fmt;

/// Why a release request was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseFault {
    /// The pointer lies outside the arena.
    NotInHeap,
    /// The pointer is inside the arena but is not the payload start of any chunk.
    NotAChunk,
    /// The chunk is already free (double release).
    AlreadyFree,
}

impl fmt::Display for ReleaseFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInHeap => write!(f, "pointer is outside the heap"),
            Self::NotAChunk => write!(f, "pointer is not the start of a chunk payload"),
            Self::AlreadyFree => write!(f, "chunk is already free"),
        }
    }
}

/// What was wrong with the arena when corruption was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corruption {
    /// A header carries a status word that is neither free nor allocated.
    BadStatus {
        /// The raw status word found in the header.
        raw: u32,
    },
    /// A header declares a size smaller than a header, or not aligned.
    BadSize {
        /// The declared chunk size.
        size: u32,
    },
    /// A chunk extends past the end of the arena.
    Overrun {
        /// Offset one past the chunk's last byte.
        end: u64,
    },
    /// Two address-adjacent chunks are both free.
    AdjacentFree {
        /// Offset of the second free chunk.
        next: u32,
    },
    /// The free-chunk index disagrees with the chunk headers.
    IndexMismatch,
}

impl fmt::Display for Corruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadStatus { raw } => write!(f, "chunk status {raw:08x}"),
            Self::BadSize { size } => write!(f, "chunk size {size} is invalid"),
            Self::Overrun { end } => write!(f, "chunk ends at {end}, past the arena"),
            Self::AdjacentFree { next } => {
                write!(f, "free chunk is followed by free chunk at +{next:05}")
            }
            Self::IndexMismatch => write!(f, "free-chunk index disagrees with headers"),
        }
    }
}

/// Errors that can occur during heap operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// No free chunk can satisfy the request, or the arena could not be
    /// reserved at initialisation.
    OutOfMemory {
        /// Number of bytes requested (before rounding).
        requested: usize,
        /// Size of the largest free chunk at the time, in bytes.
        largest_free: u32,
    },
    /// A zero-byte allocation was requested.
    InvalidArgument {
        /// The requested size.
        requested: usize,
    },
    /// Release of a pointer that does not name a live allocation.
    InvalidRelease {
        /// The offending address.
        addr: usize,
        /// Why it was rejected.
        reason: ReleaseFault,
    },
    /// Payload access through a pointer that does not name a live allocation.
    UnknownPointer {
        /// The offending address.
        addr: usize,
    },
    /// The arena's chunk tiling or free-chunk index is inconsistent.
    CorruptedState {
        /// Byte offset of the chunk where the problem was found.
        offset: u32,
        /// What was wrong.
        kind: Corruption,
    },
    /// A [`HeapConfig`](crate::HeapConfig) failed validation.
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },
    /// The process-wide heap was used before `init_heap` or after `free_heap`.
    NotInitialized,
}

impl HeapError {
    /// Whether the heap can no longer be used safely after this error.
    ///
    /// Invalid releases and corruption are fatal: continuing would build on
    /// a chunk tiling that is already, or is about to be, wrong.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidRelease { .. } | Self::CorruptedState { .. })
    }
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                largest_free,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, largest free chunk {largest_free} bytes"
                )
            }
            Self::InvalidArgument { requested } => {
                write!(f, "invalid allocation size {requested}")
            }
            Self::InvalidRelease { addr, reason } => {
                write!(f, "attempt to free unallocated chunk at {addr:#x}: {reason}")
            }
            Self::UnknownPointer { addr } => {
                write!(f, "{addr:#x} is not a live allocation")
            }
            Self::CorruptedState { offset, kind } => {
                write!(f, "corrupted heap at +{offset:05}: {kind}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid heap config: {reason}"),
            Self::NotInitialized => write!(f, "heap is not initialized"),
        }
    }
}

impl Error for HeapError {}
