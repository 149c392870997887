//! Integration test: the canonical allocate/release walkthroughs.
//!
//! Each scenario drives a fresh 4096-byte heap through a fixed sequence
//! and pins the exact dump after every step.

use tessera_core::{HeapConfig, HeapError, HeapPtr, ReleaseFault, HEADER_SIZE};
use tessera_heap::Heap;
use tessera_test_utils::assert_heap_invariants;

fn fresh() -> Heap {
    Heap::new(4096).unwrap()
}

fn dump(heap: &Heap) -> String {
    heap.describe().unwrap()
}

// ── Initialisation ──────────────────────────────────────────────

#[test]
fn init_yields_one_free_chunk() {
    let heap = fresh();
    assert_eq!(heap.size(), 4096);
    assert_eq!(dump(&heap), "+00000 (F, 4096) \n");
    assert_heap_invariants(&heap);
}

#[test]
fn init_clamps_small_requests_to_minimum() {
    for size in [0, 1, 100, 4095] {
        assert_eq!(Heap::new(size).unwrap().size(), 4096, "size {size}");
    }
}

#[test]
fn init_rounds_to_alignment() {
    assert_eq!(Heap::new(5000).unwrap().size(), 5000);
    assert_eq!(Heap::new(5001).unwrap().size(), 5004);
    assert_eq!(dump(&Heap::new(5001).unwrap()), "+00000 (F, 5004) \n");
}

#[test]
fn init_rejects_bad_config() {
    let config = HeapConfig {
        alignment: 3,
        ..HeapConfig::default()
    };
    assert!(matches!(
        Heap::with_config(4096, config),
        Err(HeapError::InvalidConfig { .. })
    ));
}

// ── Allocation ──────────────────────────────────────────────────

#[test]
fn first_allocation_sits_after_one_header() {
    let mut heap = fresh();
    let p = heap.allocate(100).unwrap();
    assert_eq!(heap.offset_of(Some(p)), Some(HEADER_SIZE as u32));
    assert_eq!(dump(&heap), "+00000 (A,  112) +00112 (F, 3984) \n");
    assert_heap_invariants(&heap);
}

#[test]
fn oversized_request_fails_without_side_effects() {
    let mut heap = fresh();
    assert!(heap.allocate(5000).is_none());
    assert_eq!(
        heap.try_allocate(5000),
        Err(HeapError::OutOfMemory {
            requested: 5000,
            largest_free: 4096,
        })
    );
    assert_eq!(dump(&heap), "+00000 (F, 4096) \n");
}

#[test]
fn zero_request_is_refused() {
    let mut heap = fresh();
    assert!(heap.allocate(0).is_none());
    assert_eq!(dump(&heap), "+00000 (F, 4096) \n");
}

#[test]
fn dump_wraps_every_five_records() {
    let mut heap = fresh();
    for _ in 0..5 {
        heap.allocate(100).unwrap();
    }
    assert_eq!(
        dump(&heap),
        "+00000 (A,  112) +00112 (A,  112) +00224 (A,  112) +00336 (A,  112) +00448 (A,  112)\n\
         +00560 (F, 3536) \n"
    );
}

// ── Release and coalescing ──────────────────────────────────────

fn abc(heap: &mut Heap) -> [HeapPtr; 3] {
    let a = heap.allocate(100).unwrap();
    let b = heap.allocate(100).unwrap();
    let c = heap.allocate(100).unwrap();
    assert_eq!(
        dump(heap),
        "+00000 (A,  112) +00112 (A,  112) +00224 (A,  112) +00336 (F, 3760) \n"
    );
    [a, b, c]
}

#[test]
fn release_middle_then_left_then_right() {
    let mut heap = fresh();
    let [a, b, c] = abc(&mut heap);

    heap.release(Some(b)).unwrap();
    assert_eq!(
        dump(&heap),
        "+00000 (A,  112) +00112 (F,  112) +00224 (A,  112) +00336 (F, 3760) \n"
    );
    assert_heap_invariants(&heap);

    heap.release(Some(a)).unwrap();
    assert_eq!(
        dump(&heap),
        "+00000 (F,  224) +00224 (A,  112) +00336 (F, 3760) \n"
    );
    assert_heap_invariants(&heap);

    heap.release(Some(c)).unwrap();
    assert_eq!(dump(&heap), "+00000 (F, 4096) \n");
    assert_heap_invariants(&heap);
}

#[test]
fn release_in_allocation_order() {
    let mut heap = fresh();
    let [a, b, c] = abc(&mut heap);
    heap.release(Some(a)).unwrap();
    heap.release(Some(b)).unwrap();
    assert_eq!(
        dump(&heap),
        "+00000 (F,  224) +00224 (A,  112) +00336 (F, 3760) \n"
    );
    heap.release(Some(c)).unwrap();
    assert_eq!(dump(&heap), "+00000 (F, 4096) \n");
}

#[test]
fn release_in_reverse_order() {
    let mut heap = fresh();
    let [a, b, c] = abc(&mut heap);
    heap.release(Some(c)).unwrap();
    assert_eq!(
        dump(&heap),
        "+00000 (A,  112) +00112 (A,  112) +00224 (F, 3872) \n"
    );
    heap.release(Some(b)).unwrap();
    heap.release(Some(a)).unwrap();
    assert_eq!(dump(&heap), "+00000 (F, 4096) \n");
}

#[test]
fn freed_hole_is_reused_by_best_fit() {
    let mut heap = fresh();
    let [_, b, _] = abc(&mut heap);
    heap.release(Some(b)).unwrap();
    let again = heap.allocate(100).unwrap();
    assert_eq!(again, b);
    assert_eq!(
        dump(&heap),
        "+00000 (A,  112) +00112 (A,  112) +00224 (A,  112) +00336 (F, 3760) \n"
    );
}

#[test]
fn release_null_changes_nothing() {
    let mut heap = fresh();
    heap.allocate(100).unwrap();
    let before = dump(&heap);
    heap.release(None).unwrap();
    assert_eq!(dump(&heap), before);
}

#[test]
fn smallest_chunks_released_alternately() {
    let mut heap = fresh();
    let mut ptrs = Vec::new();
    while let Some(p) = heap.allocate(1) {
        ptrs.push(p);
    }
    assert!(ptrs.len() > 300, "only {} one-byte chunks fit", ptrs.len());

    for p in ptrs.iter().step_by(2) {
        heap.release(Some(*p)).unwrap();
    }
    let stats = heap.stats().unwrap();
    assert_eq!(stats.free_chunks, ptrs.len().div_ceil(2));
    assert!(stats.free_chunks <= heap.config().free_index_capacity(heap.size()));
    assert_heap_invariants(&heap);

    for p in ptrs.iter().skip(1).step_by(2) {
        heap.release(Some(*p)).unwrap();
    }
    assert_eq!(dump(&heap), "+00000 (F, 4096) \n");
}

// ── Invalid release ─────────────────────────────────────────────

#[test]
fn double_release_is_fatal_and_leaves_heap_alone() {
    let mut heap = fresh();
    let [a, _, _] = abc(&mut heap);
    heap.release(Some(a)).unwrap();
    let before = dump(&heap);

    let err = heap.release(Some(a)).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(
        err,
        HeapError::InvalidRelease {
            addr: a.addr(),
            reason: ReleaseFault::AlreadyFree,
        }
    );
    assert_eq!(dump(&heap), before);
}

#[test]
fn release_of_pointer_outside_heap_is_fatal() {
    let mut heap = fresh();
    let past_end = HeapPtr::from_addr(heap.arena().end_addr() + 64).unwrap();
    let err = heap.release(Some(past_end)).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        HeapError::InvalidRelease {
            reason: ReleaseFault::NotInHeap,
            ..
        }
    ));
}

#[test]
fn release_of_misaligned_interior_pointer_is_fatal() {
    let mut heap = fresh();
    let p = heap.allocate(100).unwrap();
    let inside = p.offset_by(4).unwrap();
    assert!(matches!(
        heap.release(Some(inside)),
        Err(HeapError::InvalidRelease {
            reason: ReleaseFault::NotAChunk,
            ..
        })
    ));
    heap.release(Some(p)).unwrap();
}

// ── Resize ──────────────────────────────────────────────────────

#[test]
fn resize_moves_and_keeps_contents() {
    let mut heap = fresh();
    let a = heap.allocate(16).unwrap();
    heap.payload_mut(a).unwrap()[..16].copy_from_slice(b"tessera-payload!");
    let _fence = heap.allocate(16).unwrap();

    let grown = heap.resize(Some(a), 200).unwrap().unwrap();
    assert_ne!(grown, a);
    assert_eq!(&heap.payload(grown).unwrap()[..16], b"tessera-payload!");
    assert!(heap.payload(a).is_err());
    assert_heap_invariants(&heap);
}
