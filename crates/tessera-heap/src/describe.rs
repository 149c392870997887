//! Human-readable heap dump.
//!
//! One record per chunk, in address order:
//!
//! ```text
//! +00000 (A,  112) +00112 (F, 3984)
//! ```
//!
//! `+OOOOO` is the zero-padded byte offset from the arena base, the tag is
//! `F` (free) or `A` (allocated), and the size is right-justified to five
//! columns. Records are separated by a space and wrapped every
//! [`RECORDS_PER_LINE`] records.

use std::fmt::Write;

use tessera_core::HeapError;

use crate::heap::Heap;

/// Records printed on each dump line.
pub const RECORDS_PER_LINE: usize = 5;

impl Heap {
    /// Append the heap dump to `out`.
    ///
    /// The sink is a `String` so that formatting itself cannot fail; the
    /// only error is a corrupted chunk.
    ///
    /// On `CorruptedState` the records for every chunk before the bad one
    /// have already been appended, so the caller can show how far the walk
    /// got before reporting the error.
    pub fn describe_to(&self, out: &mut String) -> Result<(), HeapError> {
        let mut on_row = 0;
        for chunk in self.arena.chunks() {
            let chunk = chunk?;
            on_row += 1;
            let sep = if on_row % RECORDS_PER_LINE == 0 {
                '\n'
            } else {
                ' '
            };
            // Writing into a String cannot fail.
            let _ = write!(
                out,
                "+{:05} ({},{:5}){sep}",
                chunk.offset(),
                chunk.status().tag(),
                chunk.size()
            );
        }
        if on_row % RECORDS_PER_LINE > 0 {
            out.push('\n');
        }
        Ok(())
    }

    /// The heap dump as a string.
    pub fn describe(&self) -> Result<String, HeapError> {
        let mut out = String::new();
        self.describe_to(&mut out)?;
        Ok(out)
    }
}
