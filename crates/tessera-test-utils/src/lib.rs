//! Test utilities and shadow models for Tessera development.
//!
//! - [`LiveSet`]: tracks live allocations, fills each payload with a
//!   distinct byte pattern, and checks the pattern survives later heap
//!   activity.
//! - [`assert_heap_invariants`]: panics with a dump if any structural
//!   invariant of a [`Heap`] is broken.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessera_core::{HeapPtr, HEADER_SIZE};
use tessera_heap::Heap;

/// One allocation recorded by [`LiveSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveBlock {
    pub ptr: HeapPtr,
    /// Bytes the caller asked for.
    pub requested: usize,
    pub fill: u8,
}

/// Shadow model of the blocks a test believes are live.
#[derive(Debug, Default)]
pub struct LiveSet {
    blocks: Vec<LiveBlock>,
    next_fill: u8,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[LiveBlock] {
        &self.blocks
    }

    /// Allocate `requested` bytes and stamp the payload.
    ///
    /// Returns `None` (and records nothing) if the heap refuses.
    pub fn allocate(&mut self, heap: &mut Heap, requested: usize) -> Option<HeapPtr> {
        let ptr = heap.allocate(requested)?;
        self.next_fill = self.next_fill.wrapping_add(1).max(1);
        let fill = self.next_fill;
        let payload = heap.payload_mut(ptr).expect("fresh allocation is live");
        assert!(
            payload.len() >= requested,
            "payload {} shorter than request {requested}",
            payload.len()
        );
        payload[..requested].fill(fill);
        self.blocks.push(LiveBlock {
            ptr,
            requested,
            fill,
        });
        Some(ptr)
    }

    /// Release the block at position `index` (modulo the live count).
    ///
    /// Returns the released block, or `None` if nothing is live.
    pub fn release_nth(&mut self, heap: &mut Heap, index: usize) -> Option<LiveBlock> {
        if self.blocks.is_empty() {
            return None;
        }
        let block = self.blocks.swap_remove(index % self.blocks.len());
        heap.release(Some(block.ptr))
            .unwrap_or_else(|e| panic!("releasing live block {}: {e}", block.ptr));
        Some(block)
    }

    /// Release every live block, oldest first.
    pub fn release_all(&mut self, heap: &mut Heap) {
        for block in self.blocks.drain(..) {
            heap.release(Some(block.ptr))
                .unwrap_or_else(|e| panic!("releasing live block {}: {e}", block.ptr));
        }
    }

    /// Check that live payloads are disjoint and still hold their fill.
    pub fn check(&self, heap: &Heap) {
        let mut spans: Vec<(usize, usize)> = self
            .blocks
            .iter()
            .map(|b| {
                let start = b.ptr.addr() - HEADER_SIZE;
                (start, b.ptr.addr() + b.requested)
            })
            .collect();
        spans.sort_unstable();
        for pair in spans.windows(2) {
            assert!(
                pair[0].1 <= pair[1].0,
                "live chunks overlap: {:#x}..{:#x} and {:#x}..{:#x}",
                pair[0].0,
                pair[0].1,
                pair[1].0,
                pair[1].1
            );
        }
        for block in &self.blocks {
            let payload = heap
                .payload(block.ptr)
                .unwrap_or_else(|e| panic!("live block {} not resolvable: {e}", block.ptr));
            assert!(
                payload[..block.requested].iter().all(|&b| b == block.fill),
                "payload of {} clobbered",
                block.ptr
            );
        }
    }
}

/// Assert every structural invariant of `heap`.
///
/// Checks the full `verify` pass and that free plus allocated bytes add up
/// to the arena size. Panics with the heap dump on failure.
pub fn assert_heap_invariants(heap: &Heap) {
    let dump = || heap.describe().unwrap_or_else(|e| format!("<dump failed: {e}>"));
    if let Err(e) = heap.verify() {
        panic!("heap invariant broken: {e}\n{}", dump());
    }
    let stats = heap.stats().expect("verified heap has stats");
    assert_eq!(
        stats.free_bytes + stats.allocated_bytes,
        u64::from(heap.size()),
        "chunk sizes do not tile the arena\n{}",
        dump()
    );
    assert_eq!(stats.free_chunks, stats.indexed, "free index out of step");
}
