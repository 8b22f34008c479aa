/// The hash set engine: construction, `insert`/`contains`/`remove`, and
/// the load-factor/rehash lifecycle that keeps the table under 80% full.
///
/// Mirrors the split `toloco-warp_cache`'s `ShmCache` draws between a raw
/// storage layout it never touches directly (`shm::layout`), dedicated
/// probing primitives (`shm::hashtable`), and one coordinating handle
/// tying hashing, probing, and lifecycle together (`shm::mod::ShmCache`
/// itself) — without the mmap region, the cross-process rwlock, or the
/// eviction policy, none of which a single-threaded in-memory set needs.
use std::cell::Cell;
use std::hash::{BuildHasher, Hash};

use crate::error::Result;
use crate::hash::{hash_and_split, DefaultHashBuilder, DefaultHashable};
use crate::policy::Policy;
use crate::probe::{self, InsertSpot};
use crate::table::{RawTable, EMPTY, MIN_EXPONENT, TOMBSTONE, VALID};

/// Load factor above which `insert` triggers a rehash.
const MAX_LOAD_FACTOR: f64 = 0.8;

/// An open-addressing hash set with linear probing and metadata-byte
/// separation, in the style of Swiss tables / F14.
///
/// `T` is the key type; `S` is the `BuildHasher` used to hash it. The
/// default `S = DefaultHashBuilder` only type-checks for the built-in
/// integer types (see [`crate::hash::DefaultHashable`]) — any other key
/// type must go through [`HashSet::with_hasher`] with a caller-supplied
/// `BuildHasher`, such as `ahash::RandomState`.
///
/// Not `Send`/`Sync`: every operation assumes exclusive single-threaded
/// access, and nothing here synchronizes concurrent mutation.
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: RawTable<T>,
    hasher: S,
    policy: Policy,
    count: usize,
    // `Cell`, not a plain `u64`, because `contains` only borrows `&self`
    // but must still be able to bump these on every query — the same
    // reason the C++ original declares `QueryCount`/`ElementsTested` as
    // `mutable` fields touched from its `const` `indexOf` methods.
    #[cfg(feature = "stats")]
    query_count: Cell<u64>,
    #[cfg(feature = "stats")]
    elements_tested: Cell<u64>,
}

impl<T: DefaultHashable> HashSet<T, DefaultHashBuilder> {
    /// Construct with the widest strategy this CPU supports and the
    /// default Knuth-style integer hash.
    pub fn new() -> Result<Self> {
        Self::with_policy_and_hasher(Policy::best_available(), DefaultHashBuilder)
    }

    /// Construct with an explicit strategy (downgraded automatically if
    /// the running CPU can't provide the requested width) and the
    /// default integer hash.
    pub fn with_policy(policy: Policy) -> Result<Self> {
        Self::with_policy_and_hasher(policy, DefaultHashBuilder)
    }
}

impl<T, S: BuildHasher> HashSet<T, S> {
    /// Construct with the widest available strategy and a caller-supplied
    /// hasher — the route for key types outside [`DefaultHashable`].
    ///
    /// ```
    /// use probeset::HashSet;
    ///
    /// let mut set: HashSet<String, ahash::RandomState> =
    ///     HashSet::with_hasher(ahash::RandomState::new()).unwrap();
    /// set.insert("hello".to_string()).unwrap();
    /// assert!(set.contains(&"hello".to_string()));
    /// ```
    pub fn with_hasher(hasher: S) -> Result<Self> {
        Self::with_policy_and_hasher(Policy::best_available(), hasher)
    }

    /// Construct with both an explicit strategy and a caller-supplied hasher.
    pub fn with_policy_and_hasher(policy: Policy, hasher: S) -> Result<Self> {
        let table = RawTable::new(MIN_EXPONENT)?;
        Ok(Self {
            table,
            hasher,
            policy: policy.resolve(),
            count: 0,
            #[cfg(feature = "stats")]
            query_count: Cell::new(0),
            #[cfg(feature = "stats")]
            elements_tested: Cell::new(0),
        })
    }

    /// Number of live keys.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current slot count. Never decreases.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.table.capacity() as f64
    }

    /// The strategy actually in effect — may differ from what was
    /// requested at construction if the CPU couldn't provide that width.
    #[inline]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Number of `locate`/`locate_insert_spot` calls made so far.
    /// Only present with the `stats` feature enabled.
    #[cfg(feature = "stats")]
    #[inline]
    pub fn query_count(&self) -> u64 {
        self.query_count.get()
    }

    /// Approximate number of slots examined across all queries so far.
    /// Only present with the `stats` feature enabled.
    #[cfg(feature = "stats")]
    #[inline]
    pub fn elements_tested(&self) -> u64 {
        self.elements_tested.get()
    }

    /// Unordered iterator over the set's live keys. No ordering guarantee.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            table: &self.table,
            next: 0,
        }
    }

    fn dispatch_locate(&self, high: u64, tag: u8, key: &T) -> Option<usize>
    where
        T: Eq,
    {
        match self.policy {
            Policy::Scalar => probe::scalar::locate(&self.table, high, tag, key),
            Policy::Simd16 => probe::simd16::locate(&self.table, high, tag, key),
            Policy::Simd32 => probe::simd32::locate(&self.table, high, tag, key),
        }
    }

    fn dispatch_insert_spot(&self, high: u64, tag: u8, key: &T) -> InsertSpot
    where
        T: Eq,
    {
        match self.policy {
            Policy::Scalar => probe::scalar::locate_insert_spot(&self.table, high, tag, key),
            Policy::Simd16 => probe::simd16::locate_insert_spot(&self.table, high, tag, key),
            Policy::Simd32 => probe::simd32::locate_insert_spot(&self.table, high, tag, key),
        }
    }

    /// Record one query against the `stats` counters: one query, plus an
    /// approximate count of slots examined for `high`'s probe sequence.
    /// Takes `&self` so `contains` can call it without a `&mut` borrow.
    #[cfg(feature = "stats")]
    fn record_query(&self, high: u64) {
        self.query_count.set(self.query_count.get() + 1);
        self.elements_tested
            .set(self.elements_tested.get() + self.count_probe_length(high));
    }

    #[cfg(feature = "stats")]
    fn count_probe_length(&self, high: u64) -> u64 {
        let mask = self.table.mask();
        let mut i = high & mask;
        let mut n = 0u64;
        for _ in 0..self.table.capacity() {
            n += 1;
            if self.table.metadata(i as usize) == EMPTY {
                break;
            }
            i = (i + 1) & mask;
        }
        n
    }

    /// Insert `key`. A no-op if it is already present. Returns `true` if
    /// the key was newly inserted, `false` if it was already present.
    ///
    /// May trigger a rehash if the load factor would exceed 0.8; on
    /// allocation failure during that rehash, the table is left exactly
    /// as it was before this call (still over 0.8 load — the next insert
    /// will simply retry the rehash).
    pub fn insert(&mut self, key: T) -> Result<bool>
    where
        T: Eq + Hash,
    {
        let (high, tag) = hash_and_split(&self.hasher, &key);

        #[cfg(feature = "stats")]
        self.record_query(high);

        match self.dispatch_insert_spot(high, tag, &key) {
            InsertSpot::Occupied(_) => Ok(false),
            InsertSpot::Vacant(i) => {
                unsafe { self.table.write_key(i, key) };
                self.table.set_metadata(i, VALID | tag);
                self.count += 1;

                if self.load_factor() > MAX_LOAD_FACTOR {
                    self.rehash()?;
                }
                Ok(true)
            }
        }
    }

    /// True iff `key` has been inserted and not subsequently removed.
    pub fn contains(&self, key: &T) -> bool
    where
        T: Eq + Hash,
    {
        let (high, tag) = hash_and_split(&self.hasher, key);

        #[cfg(feature = "stats")]
        self.record_query(high);

        self.dispatch_locate(high, tag, key).is_some()
    }

    /// Remove `key`. A no-op if it isn't present. Returns `true` if a key
    /// was removed. The set never shrinks.
    pub fn remove(&mut self, key: &T) -> bool
    where
        T: Eq + Hash,
    {
        let (high, tag) = hash_and_split(&self.hasher, key);

        #[cfg(feature = "stats")]
        self.record_query(high);

        match self.dispatch_locate(high, tag, key) {
            Some(i) => {
                unsafe { self.table.drop_key(i) };
                self.table.set_metadata(i, TOMBSTONE);
                self.count -= 1;
                true
            }
            None => false,
        }
    }

    /// Double the capacity and reinsert every live key, dropping all
    /// tombstones. Transactional: if the new allocation fails, the old
    /// table is untouched and the error propagates.
    fn rehash(&mut self) -> Result<()>
    where
        T: Eq + Hash,
    {
        let new_exponent = self.table.exponent() + 1;
        let mut new_table = RawTable::new(new_exponent)?;
        let new_mask = new_table.mask();

        let live: Vec<usize> = self.table.valid_indices().collect();
        for i in live {
            let key = unsafe { self.table.read_key(i) };
            // `read_key` moves the value out without clearing the slot;
            // mark it Empty immediately so the old table's `Drop` doesn't
            // also try to drop this now-moved-from slot when it's replaced
            // below.
            self.table.set_metadata(i, EMPTY);
            let (high, tag) = hash_and_split(&self.hasher, &key);
            let start = high & new_mask;

            // Every key here is known-distinct and the new table is
            // known to have room (load factor halved by doubling
            // capacity at the same live count), so the insert can go
            // straight to the scalar walk and skip the duplicate check
            // it would otherwise do — the micro-optimization this
            // crate's design notes call out explicitly for rehash.
            match probe::scalar::locate_insert_spot(&new_table, start, tag, &key) {
                InsertSpot::Vacant(idx) => {
                    unsafe { new_table.write_key(idx, key) };
                    new_table.set_metadata(idx, VALID | tag);
                }
                InsertSpot::Occupied(_) => {
                    unreachable!("a key moved from a valid table cannot collide with itself")
                }
            }
        }

        #[cfg(feature = "stats")]
        log::trace!(
            "rehash: capacity {} -> {}, {} live keys",
            self.table.capacity(),
            new_table.capacity(),
            self.count
        );

        self.table = new_table;
        Ok(())
    }
}

/// Unordered iterator over a [`HashSet`]'s live keys.
pub struct Iter<'a, T> {
    table: &'a RawTable<T>,
    next: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        while self.next < self.table.capacity() {
            let i = self.next;
            self.next += 1;
            if self.table.metadata(i) & VALID != 0 {
                return Some(unsafe { self.table.key(i) });
            }
        }
        None
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
