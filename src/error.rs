/// Errors surfaced across the table's public contract.
///
/// `insert`, `contains`, and `remove` on a well-formed table never fail —
/// the only failure mode in the whole crate is running out of memory
/// while allocating or growing the backing buffers.
use thiserror::Error;

/// Failure surfaced from table construction or rehash.
#[derive(Debug, Error)]
pub enum Error {
    /// A bulk allocation for the data or metadata buffer failed.
    ///
    /// On rehash, the table is left exactly as it was before the call —
    /// the old buffers are still live and usable. A table that fails
    /// during initial construction must not be used.
    #[error("failed to allocate {requested} bytes for a table of capacity {capacity}")]
    AllocationFailure { capacity: usize, requested: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
