/// The probing engine: three strategies answering the same two questions
/// — `locate` (membership) and `locate_insert_spot` (where to place a new
/// key) — against a probe sequence that starts at `start` and walks
/// forward modulo the table's capacity.
///
/// `scalar` is the byte-at-a-time reference implementation every other
/// strategy must agree with (see the property tests in `set.rs`).
/// `simd16`/`simd32` scan 16 or 32 metadata bytes per comparison using
/// SSE2/AVX2, falling back to `scalar` wherever the target or the running
/// CPU can't provide the wider width, and — per the tombstone-discipline
/// open question this crate inherited from the C++ original — for the
/// insert path specifically, which the original's own unfinished
/// `findInsertSpotSSE` never did more than delegate to the scalar walk.
pub(crate) mod scalar;
pub(crate) mod simd16;
pub(crate) mod simd32;

/// Outcome of `locate_insert_spot`: either the key is already present at
/// this slot (the caller does nothing), or this slot is vacant (Empty or
/// Tombstone) and the caller may write the key here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertSpot {
    Occupied(usize),
    Vacant(usize),
}
