/// Byte-at-a-time probing. The reference strategy every other strategy
/// must agree with on every observable result.
use super::InsertSpot;
use crate::table::{RawTable, EMPTY, TAG_MASK, TOMBSTONE, VALID};

/// Find the slot holding `key`, or `None` if it isn't present.
///
/// Walks from `start`, stopping at the first Empty byte encountered —
/// tombstones do not terminate the scan, since a key that collided with
/// a since-removed slot must still be reachable past it.
pub(crate) fn locate<T: Eq>(table: &RawTable<T>, start: u64, tag: u8, key: &T) -> Option<usize> {
    let mask = table.mask();
    let mut i = start & mask;
    for _ in 0..table.capacity() {
        let m = table.metadata(i as usize);
        if m == EMPTY {
            return None;
        }
        if m & VALID != 0 && (m & TAG_MASK) == tag && unsafe { table.key(i as usize) } == key {
            return Some(i as usize);
        }
        i = (i + 1) & mask;
    }
    // Every slot visited without hitting Empty: table saturated with
    // tombstones. Invariant 5 (load <= 0.8) makes this unreachable in
    // practice, but the scan must still terminate safely rather than loop.
    None
}

/// Find where `key` belongs: the slot it already occupies, or the
/// earliest vacant slot (Tombstone preferred over Empty) on its probe path.
///
/// This realizes the tombstone-discipline resolution from the open
/// questions: the scan always runs to an Empty terminator, remembering
/// the first Tombstone seen, so a later duplicate of `key` past a
/// tombstone is never missed in favor of reusing that tombstone early.
pub(crate) fn locate_insert_spot<T: Eq>(
    table: &RawTable<T>,
    start: u64,
    tag: u8,
    key: &T,
) -> InsertSpot {
    let mask = table.mask();
    let start_idx = start & mask;
    let mut i = start_idx;
    let mut first_tombstone: Option<u64> = None;

    for _ in 0..table.capacity() {
        let m = table.metadata(i as usize);
        if m == EMPTY {
            return InsertSpot::Vacant(first_tombstone.unwrap_or(i) as usize);
        }
        if m == TOMBSTONE {
            if first_tombstone.is_none() {
                first_tombstone = Some(i);
            }
        } else if (m & VALID != 0) && (m & TAG_MASK) == tag && unsafe { table.key(i as usize) } == key {
            return InsertSpot::Occupied(i as usize);
        }
        i = (i + 1) & mask;
    }

    InsertSpot::Vacant(first_tombstone.unwrap_or(start_idx) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(exponent: u32) -> RawTable<u32> {
        RawTable::new(exponent).unwrap()
    }

    #[test]
    fn locate_on_empty_table_is_none() {
        let t = fresh(crate::table::MIN_EXPONENT);
        assert_eq!(locate(&t, 0, 5, &42u32), None);
    }

    #[test]
    fn insert_spot_on_empty_table_is_home_slot() {
        let t = fresh(crate::table::MIN_EXPONENT);
        match locate_insert_spot(&t, 3, 5, &42u32) {
            InsertSpot::Vacant(i) => assert_eq!(i, 3),
            InsertSpot::Occupied(_) => panic!("empty table cannot be occupied"),
        }
    }

    #[test]
    fn insert_spot_prefers_earliest_tombstone_over_later_empty() {
        let mut t = fresh(crate::table::MIN_EXPONENT);
        // Slot 0: tombstone. Slot 1: empty. Both reachable from start=0.
        t.set_metadata(0, TOMBSTONE);
        match locate_insert_spot(&t, 0, 9, &7u32) {
            InsertSpot::Vacant(i) => assert_eq!(i, 0),
            InsertSpot::Occupied(_) => panic!("not occupied"),
        }
    }

    #[test]
    fn locate_insert_spot_finds_duplicate_past_a_tombstone() {
        let mut t = fresh(crate::table::MIN_EXPONENT);
        // slot 0: tombstone (a removed collider). slot 1: 99, reachable
        // from the same home since nothing Empty separates them.
        t.set_metadata(0, TOMBSTONE);
        unsafe {
            t.write_key(1, 99u32);
            t.set_metadata(1, VALID | 9);
        }
        // Naively stopping at the first non-Full slot (slot 0) would
        // reuse the tombstone and silently create a duplicate of 99.
        match locate_insert_spot(&t, 0, 9, &99u32) {
            InsertSpot::Occupied(i) => assert_eq!(i, 1),
            InsertSpot::Vacant(_) => panic!("99 is already present"),
        }
    }
}
