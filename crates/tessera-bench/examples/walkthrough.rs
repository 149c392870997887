//! Walk through the canonical allocate/release sequence on the global heap.
//!
//! Run with `RUST_LOG=tessera_heap=trace` to see every split and merge.

use tessera::global;

fn main() {
    env_logger::init();

    println!("=== Tessera walkthrough ===\n");

    global::init_heap(4096).unwrap();
    println!("fresh heap:");
    global::dump_heap();

    let a = global::allocate(100);
    let b = global::allocate(100);
    let c = global::allocate(100);
    println!("\nafter three 100-byte allocations:");
    global::dump_heap();
    println!(
        "a at +{}, b at +{}, c at +{}",
        global::heap_offset(a).unwrap_or(0),
        global::heap_offset(b).unwrap_or(0),
        global::heap_offset(c).unwrap_or(0),
    );

    global::release(b);
    println!("\nrelease b (no free neighbours):");
    global::dump_heap();

    global::release(a);
    println!("\nrelease a (absorbs b):");
    global::dump_heap();

    global::release(c);
    println!("\nrelease c (merges both sides):");
    global::dump_heap();

    match global::allocate(5000) {
        Some(_) => println!("\nunexpected: 5000 bytes fit in a 4096 byte heap"),
        None => println!("\n5000 bytes: refused, as expected"),
    }

    let stats = global::with_heap(|heap| heap.stats()).unwrap().unwrap();
    log::info!("final stats: {stats:?}");

    global::free_heap();
}
