//! An open-addressing hash set with linear probing and Swiss-table/F14-style
//! metadata-byte separation: each slot's liveness and comparison tag live in
//! a dedicated metadata byte array, separate from the keys themselves, so a
//! lookup's hot path can scan many slots' metadata per SIMD comparison
//! before ever touching a key.
//!
//! Three probing strategies exist at [`Policy::Scalar`], [`Policy::Simd16`],
//! and [`Policy::Simd32`], chosen automatically at construction by CPU
//! feature detection via [`Policy::best_available`] and guaranteed to agree
//! on every observable result — see the `probe` module for how.
//!
//! ```
//! use probeset::HashSet;
//!
//! let mut set = HashSet::new().unwrap();
//! set.insert(42u32).unwrap();
//! assert!(set.contains(&42));
//! assert!(!set.contains(&7));
//! ```

mod error;
mod hash;
mod policy;
mod probe;
mod set;
mod table;

pub use error::{Error, Result};
pub use hash::{DefaultHashBuilder, DefaultHashable, KnuthHasher};
pub use policy::Policy;
pub use set::{HashSet, Iter};
