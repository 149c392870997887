//! Workload generators for benchmarking the Tessera heap.
//!
//! - [`churn_workload`]: seeded random mix of allocations and releases
//! - [`sawtooth_workload`]: fill the heap, then release every other block
//! - [`replay`]: drive a [`Heap`] through a workload and count outcomes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::HeapPtr;
use tessera_heap::Heap;

/// One step of a workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadOp {
    /// Allocate this many bytes.
    Alloc(usize),
    /// Release the live block at this index, modulo the live count.
    Release(usize),
}

/// Tallies from [`replay`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub allocated: usize,
    pub refused: usize,
    pub released: usize,
    /// Blocks still live at the end.
    pub live: usize,
}

/// Generate `len` operations: roughly 60% allocations of `1..=max_request`
/// bytes, the rest releases of a random live block.
///
/// Deterministic for a given seed.
pub fn churn_workload(seed: u64, len: usize, max_request: usize) -> Vec<WorkloadOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if rng.random_bool(0.6) {
                WorkloadOp::Alloc(rng.random_range(1..=max_request.max(1)))
            } else {
                WorkloadOp::Release(rng.random_range(0..usize::MAX))
            }
        })
        .collect()
}

/// `count` allocations of `size` bytes followed by `count / 2` releases
/// at even live-list positions, leaving free holes between live blocks.
pub fn sawtooth_workload(count: usize, size: usize) -> Vec<WorkloadOp> {
    let mut ops: Vec<WorkloadOp> = (0..count).map(|_| WorkloadOp::Alloc(size)).collect();
    ops.extend((0..count / 2).map(|i| WorkloadOp::Release(i * 2)));
    ops
}

/// Run `ops` against `heap`, releasing by index into the blocks it has
/// allocated so far.
///
/// Panics if a release fails: every released pointer came from `heap`.
pub fn replay(heap: &mut Heap, ops: &[WorkloadOp]) -> ReplayOutcome {
    let mut live: Vec<HeapPtr> = Vec::new();
    let mut outcome = ReplayOutcome::default();
    for op in ops {
        match *op {
            WorkloadOp::Alloc(n) => match heap.allocate(n) {
                Some(ptr) => {
                    live.push(ptr);
                    outcome.allocated += 1;
                }
                None => outcome.refused += 1,
            },
            WorkloadOp::Release(i) => {
                if live.is_empty() {
                    continue;
                }
                let ptr = live.swap_remove(i % live.len());
                if let Err(e) = heap.release(Some(ptr)) {
                    panic!("replay released a pointer it allocated and got: {e}");
                }
                outcome.released += 1;
            }
        }
    }
    outcome.live = live.len();
    outcome
}

#[cfg(test)]
mod tests {
    use tessera_test_utils::assert_heap_invariants;

    use super::*;

    #[test]
    fn churn_workload_deterministic() {
        assert_eq!(churn_workload(42, 200, 256), churn_workload(42, 200, 256));
        assert_ne!(churn_workload(1, 200, 256), churn_workload(2, 200, 256));
    }

    #[test]
    fn churn_workload_respects_bounds() {
        for op in churn_workload(7, 500, 64) {
            if let WorkloadOp::Alloc(n) = op {
                assert!((1..=64).contains(&n), "request {n} out of range");
            }
        }
    }

    #[test]
    fn replay_counts_add_up() {
        let ops = churn_workload(42, 1000, 200);
        let mut heap = Heap::new(1 << 16).unwrap();
        let outcome = replay(&mut heap, &ops);
        assert_eq!(outcome.allocated, outcome.released + outcome.live);
        assert_heap_invariants(&heap);
    }

    #[test]
    fn sawtooth_leaves_holes() {
        let mut heap = Heap::new(4096).unwrap();
        let outcome = replay(&mut heap, &sawtooth_workload(10, 100));
        assert_eq!(outcome.allocated, 10);
        assert_eq!(outcome.released, 5);
        let stats = heap.stats().unwrap();
        assert_eq!(stats.allocated_chunks, 5);
        assert!(stats.free_chunks > 1, "expected fragmented free space");
        assert_heap_invariants(&heap);
    }
}
