/// Hashing and the 64-bit-to-(tag, index) split the probing engine keys off of.
///
/// The C++ original this crate's behavior is drawn from expresses "the
/// default hash is only defined for a few integer types" with a
/// `static_assert(false, ...)` inside an unspecialized template. Rust has
/// no direct equivalent, so the same constraint is pushed to the type
/// system instead: [`DefaultHashBuilder`] is only ever reachable for key
/// types that implement the sealed [`DefaultHashable`] marker, and that
/// marker is implemented for exactly the built-in integer types. Any
/// other key type is a compile error at the `HashSet::new()` call site,
/// which is this crate's reading of "a construction-time error where the
/// target language supports it" from the error-handling design.
use std::hash::{BuildHasher, Hash, Hasher};

const KNUTH_MULTIPLIER: u64 = 2654435761;

/// 7-bit tag carried in the metadata byte, masked from the low bits of a hash.
pub(crate) const TAG_MASK: u64 = 0x7F;

/// Split a 64-bit hash into its home-slot high part and its 7-bit tag.
///
/// Discarding the low 8 bits before masking for the tag (rather than
/// reusing the same low 7 bits the home index would otherwise share)
/// decorrelates the tag from the home slot, so colliding keys rarely
/// share a tag and SIMD false-positive rates stay near 1/128 per byte.
#[inline]
pub(crate) fn split(hash: u64) -> (u64, u8) {
    let high = hash >> 8;
    let tag = (hash & TAG_MASK) as u8;
    (high, tag)
}

/// A [`Hasher`] implementing the Knuth multiplicative hash `17 + k * 2654435761`
/// for integer keys, reinterpreted as 64-bit.
///
/// Only the integer `write_*` methods are implemented. `write` (the
/// generic byte-slice entry point `Hash` impls for composite types route
/// through) is unreachable by construction: [`DefaultHashBuilder`] is
/// never handed a key outside the sealed [`DefaultHashable`] set, and
/// every type in that set hashes itself through one of the integer
/// methods below.
#[derive(Default)]
pub struct KnuthHasher {
    state: u64,
}

impl Hasher for KnuthHasher {
    #[inline]
    fn finish(&self) -> u64 {
        17u64.wrapping_add(self.state.wrapping_mul(KNUTH_MULTIPLIER))
    }

    fn write(&mut self, _bytes: &[u8]) {
        unreachable!(
            "KnuthHasher only supports integer keys; DefaultHashable is sealed to those"
        );
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.state = i as u64;
    }
    #[inline]
    fn write_u16(&mut self, i: u16) {
        self.state = i as u64;
    }
    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.state = i as u64;
    }
    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.state = i;
    }
    #[inline]
    fn write_u128(&mut self, i: u128) {
        self.state = i as u64;
    }
    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.state = i as u64;
    }
    #[inline]
    fn write_i8(&mut self, i: i8) {
        self.state = i as u64;
    }
    #[inline]
    fn write_i16(&mut self, i: i16) {
        self.state = i as u64;
    }
    #[inline]
    fn write_i32(&mut self, i: i32) {
        self.state = i as u64;
    }
    #[inline]
    fn write_i64(&mut self, i: i64) {
        self.state = i as u64;
    }
    #[inline]
    fn write_i128(&mut self, i: i128) {
        self.state = i as u64;
    }
    #[inline]
    fn write_isize(&mut self, i: isize) {
        self.state = i as u64;
    }
}

/// `BuildHasher` for [`KnuthHasher`] — the default hasher for `HashSet::new()`.
#[derive(Default, Clone, Copy)]
pub struct DefaultHashBuilder;

impl BuildHasher for DefaultHashBuilder {
    type Hasher = KnuthHasher;

    #[inline]
    fn build_hasher(&self) -> KnuthHasher {
        KnuthHasher::default()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Sealed marker for key types `DefaultHashBuilder` has a faithful hash for.
///
/// Implemented for the built-in integer types only. A type outside this
/// set can still be used as a key, but only via [`crate::HashSet::with_hasher`]
/// with a caller-supplied `BuildHasher` — `ahash::RandomState` is a
/// reasonable off-the-shelf choice.
pub trait DefaultHashable: sealed::Sealed + Hash + Eq {}

macro_rules! impl_default_hashable {
    ($($t:ty),+ $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl DefaultHashable for $t {}
        )+
    };
}

impl_default_hashable!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Hash `key` with builder `s` and split the result into (home-high, tag).
#[inline]
pub(crate) fn hash_and_split<T: Hash + ?Sized, S: BuildHasher>(s: &S, key: &T) -> (u64, u8) {
    let mut hasher = s.build_hasher();
    key.hash(&mut hasher);
    split(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knuth_hash_matches_formula() {
        let mut h = KnuthHasher::default();
        h.write_u32(7);
        assert_eq!(h.finish(), 17u64.wrapping_add(7u64.wrapping_mul(KNUTH_MULTIPLIER)));
    }

    #[test]
    fn split_discards_low_byte_for_tag_and_shifts_for_high() {
        let hash: u64 = 0xABCD_EF01_2345_6789;
        let (high, tag) = split(hash);
        assert_eq!(high, hash >> 8);
        assert_eq!(tag, (hash & 0x7F) as u8);
        assert!(tag & 0x80 == 0);
    }

    #[test]
    fn default_hash_builder_is_deterministic() {
        let s = DefaultHashBuilder;
        let (h1, t1) = hash_and_split(&s, &42u64);
        let (h2, t2) = hash_and_split(&s, &42u64);
        assert_eq!((h1, t1), (h2, t2));
    }
}
