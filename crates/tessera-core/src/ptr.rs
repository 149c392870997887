//! The address type handed to heap callers.

use std::fmt;
use std::num::NonZeroUsize;

use crate::header::HEADER_SIZE;

/// Address of the first payload byte of an allocation.
///
/// A `HeapPtr` is a plain numeric address inside the arena's buffer. It is
/// never dereferenced; the heap resolves it back to a byte offset and checks
/// it against the chunk tiling before touching any memory. Null is
/// expressed as `Option<HeapPtr>::None`, which costs no extra space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapPtr(NonZeroUsize);

impl HeapPtr {
    /// Wrap a non-null address.
    pub fn new(addr: NonZeroUsize) -> Self {
        Self(addr)
    }

    /// Wrap a raw address. Returns `None` for the null address.
    pub fn from_addr(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    /// The raw address.
    pub fn addr(self) -> usize {
        self.0.get()
    }

    /// Address of the chunk header this pointer would belong to.
    ///
    /// Returns `None` if the subtraction would underflow.
    pub fn header_addr(self) -> Option<usize> {
        self.addr().checked_sub(HEADER_SIZE)
    }

    /// Pointer `bytes` past this one. `None` on overflow.
    pub fn offset_by(self, bytes: usize) -> Option<Self> {
        self.addr().checked_add(bytes).and_then(Self::from_addr)
    }
}

impl fmt::Display for HeapPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr())
    }
}

impl From<HeapPtr> for usize {
    fn from(ptr: HeapPtr) -> Self {
        ptr.addr()
    }
}
