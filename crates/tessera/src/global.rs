//! Process-wide heap.
//!
//! One [`Heap`] shared by the whole process behind a mutex, for hosts that
//! want a single allocator with C-style entry points. Unlike the engine,
//! this layer treats fatal errors as fatal: an invalid release or a
//! corrupted arena prints a diagnostic to stderr and exits the process.
//!
//! Sizes are `i64` so hosts can pass signed lengths straight through.
//! Negative sizes are clamped to zero by [`init_heap`] and ignored by
//! [`allocate`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use tessera_core::{HeapError, HeapPtr};
use tessera_heap::Heap;

static HEAP: Mutex<Option<Heap>> = Mutex::new(None);

/// Lock the global slot.
///
/// A panic while the lock was held leaves the heap as the panicking call
/// left it; every heap operation is all-or-nothing, so keep using it.
fn slot() -> MutexGuard<'static, Option<Heap>> {
    HEAP.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Print `err` and terminate the process.
fn fatal(err: &HeapError) -> ! {
    log::error!("fatal heap error: {err}");
    eprintln!("tessera: {err}");
    std::process::exit(1)
}

/// Create the process-wide heap with at least `size` bytes.
///
/// Any heap already installed is torn down first; pointers into it become
/// unknown to the new heap.
pub fn init_heap(size: i64) -> Result<(), HeapError> {
    let requested = usize::try_from(size.max(0)).unwrap_or(usize::MAX);
    let heap = Heap::new(requested)?;
    let mut slot = slot();
    if let Some(old) = slot.take() {
        log::warn!("init_heap: replacing existing {} byte heap", old.size());
        old.teardown();
    }
    log::debug!("init_heap: {} bytes", heap.size());
    *slot = Some(heap);
    Ok(())
}

/// Tear down the process-wide heap. A no-op if none is installed.
pub fn free_heap() {
    if let Some(heap) = slot().take() {
        heap.teardown();
    }
}

/// Whether a process-wide heap is installed.
pub fn is_initialized() -> bool {
    slot().is_some()
}

/// Run `f` against the process-wide heap.
pub fn with_heap<R>(f: impl FnOnce(&mut Heap) -> R) -> Result<R, HeapError> {
    let mut slot = slot();
    let heap = slot.as_mut().ok_or(HeapError::NotInitialized)?;
    Ok(f(heap))
}

/// Allocate `size` bytes from the process-wide heap.
///
/// `None` for a zero or negative size, when no chunk fits, or when no heap
/// is installed.
pub fn allocate(size: i64) -> Option<HeapPtr> {
    let Ok(size) = usize::try_from(size) else {
        log::trace!("allocate: ignoring negative size {size}");
        return None;
    };
    match try_allocate(size) {
        Ok(ptr) => Some(ptr),
        Err(err @ HeapError::OutOfMemory { .. }) => {
            log::warn!("allocate: {err}");
            None
        }
        Err(err) => {
            log::debug!("allocate: {err}");
            None
        }
    }
}

/// Allocate `size` bytes, reporting why on failure.
pub fn try_allocate(size: usize) -> Result<HeapPtr, HeapError> {
    with_heap(|heap| heap.try_allocate(size))?
}

/// Release `ptr`, returning any error to the caller.
pub fn try_release(ptr: Option<HeapPtr>) -> Result<(), HeapError> {
    if ptr.is_none() {
        return Ok(());
    }
    with_heap(|heap| heap.try_release(ptr))?
}

/// Release `ptr`. `None` is a no-op.
///
/// Exits the process if `ptr` is not a live allocation of the installed
/// heap or the arena turns out to be corrupted.
pub fn release(ptr: Option<HeapPtr>) {
    match try_release(ptr) {
        Ok(()) => {}
        Err(err) if err.is_fatal() => fatal(&err),
        Err(err) => log::warn!("release: {err}"),
    }
}

/// Byte offset of `ptr` from the base of the process-wide heap.
///
/// `None` if `ptr` is null, outside the heap, or no heap is installed.
pub fn heap_offset(ptr: Option<HeapPtr>) -> Option<u32> {
    slot().as_ref()?.offset_of(ptr)
}

/// The heap dump as a string.
pub fn dump_heap_to_string() -> Result<String, HeapError> {
    with_heap(|heap| heap.describe())?
}

/// Print the heap dump to stdout.
///
/// On corruption, prints the records walked so far and exits the process.
pub fn dump_heap() {
    let mut out = String::new();
    let result = with_heap(|heap| heap.describe_to(&mut out)).and_then(|r| r);
    print!("{out}");
    match result {
        Ok(()) => {}
        Err(err) if err.is_fatal() => {
            println!();
            fatal(&err)
        }
        Err(err) => log::warn!("dump_heap: {err}"),
    }
}
