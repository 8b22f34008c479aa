/// Raw storage layout: two parallel buffers (keys, metadata bytes) sharing
/// one capacity, bulk-allocated and bulk-freed together.
///
/// This is deliberately the only place in the crate that touches a raw
/// allocator. Everything above this module (the probing engine, the
/// lifecycle operations in `set.rs`) works through the safe accessors
/// here instead of reaching for `std::alloc` itself — the same split
/// `toloco-warp_cache` draws between its `shm::layout` raw structs and
/// the higher-level `ShmCache` handle that only ever goes through them.
use std::alloc::{self, Layout};
use std::mem;
use std::ptr::{self, NonNull};

use crate::error::{Error, Result};

/// Metadata byte for an Empty slot — terminates a probe.
pub(crate) const EMPTY: u8 = 0x00;
/// Metadata byte for a Tombstone slot — keeps the probe path alive.
pub(crate) const TOMBSTONE: u8 = 0x40;
/// Bit set on a Full slot's metadata byte; the low 7 bits carry the tag.
pub(crate) const VALID: u8 = 0x80;
/// Mask isolating the 7-bit tag from a Full metadata byte.
pub(crate) const TAG_MASK: u8 = 0x7F;

/// Smallest capacity a table is ever constructed with, chosen so a
/// single 32-wide SIMD block covers the whole table at minimum size.
pub(crate) const MIN_CAPACITY: usize = 32;
/// Starting exponent matching `MIN_CAPACITY` (`1 << 5 == 32`).
pub(crate) const MIN_EXPONENT: u32 = 5;

/// Alignment requested for the metadata buffer — covers both the
/// 16-wide and 32-wide SIMD strategies so either can load straight
/// from a block-aligned base address.
const METADATA_ALIGN: usize = 32;

/// The two parallel buffers backing a table generation, plus the
/// bookkeeping needed to address and free them.
///
/// `metadata[i]` is always one of `EMPTY`, `TOMBSTONE`, or `VALID | tag`;
/// `data[i]` is initialized iff `metadata[i] & VALID != 0`. Maintaining
/// that pairing is the caller's responsibility — `RawTable` only
/// provides the primitives to read and write each buffer in lockstep.
pub(crate) struct RawTable<T> {
    data: NonNull<T>,
    metadata: NonNull<u8>,
    capacity: usize,
    exponent: u32,
}

impl<T> RawTable<T> {
    /// Allocate a fresh table of `1 << exponent` slots, metadata zeroed
    /// (every slot starts Empty).
    pub(crate) fn new(exponent: u32) -> Result<Self> {
        let capacity = 1usize << exponent;
        debug_assert!(capacity >= MIN_CAPACITY);
        let (data, metadata) = Self::alloc(capacity)?;
        Ok(Self {
            data,
            metadata,
            capacity,
            exponent,
        })
    }

    fn alloc(capacity: usize) -> Result<(NonNull<T>, NonNull<u8>)> {
        let data = if mem::size_of::<T>() == 0 {
            NonNull::dangling()
        } else {
            let layout = Layout::array::<T>(capacity).expect("capacity overflow");
            let ptr = unsafe { alloc::alloc(layout) } as *mut T;
            match NonNull::new(ptr) {
                Some(p) => p,
                None => {
                    return Err(Error::AllocationFailure {
                        capacity,
                        requested: layout.size(),
                    })
                }
            }
        };

        let metadata_layout =
            Layout::from_size_align(capacity, METADATA_ALIGN).expect("capacity/align overflow");
        let metadata = unsafe { alloc::alloc_zeroed(metadata_layout) };
        let metadata = match NonNull::new(metadata) {
            Some(p) => p,
            None => {
                if mem::size_of::<T>() != 0 {
                    let data_layout = Layout::array::<T>(capacity).expect("capacity overflow");
                    unsafe { alloc::dealloc(data.as_ptr() as *mut u8, data_layout) };
                }
                return Err(Error::AllocationFailure {
                    capacity,
                    requested: metadata_layout.size(),
                });
            }
        };

        Ok((data, metadata))
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn exponent(&self) -> u32 {
        self.exponent
    }

    #[inline]
    pub(crate) fn mask(&self) -> u64 {
        (self.capacity - 1) as u64
    }

    #[inline]
    pub(crate) fn metadata_ptr(&self) -> *const u8 {
        self.metadata.as_ptr()
    }

    #[inline]
    pub(crate) fn metadata(&self, i: usize) -> u8 {
        debug_assert!(i < self.capacity);
        unsafe { *self.metadata.as_ptr().add(i) }
    }

    #[inline]
    pub(crate) fn set_metadata(&mut self, i: usize, byte: u8) {
        debug_assert!(i < self.capacity);
        unsafe { *self.metadata.as_ptr().add(i) = byte };
    }

    /// # Safety
    /// `i` must be a slot with `VALID` set.
    #[inline]
    pub(crate) unsafe fn key(&self, i: usize) -> &T {
        debug_assert!(i < self.capacity);
        &*self.data.as_ptr().add(i)
    }

    /// # Safety
    /// `i` must currently be non-`VALID` (Empty or Tombstone).
    #[inline]
    pub(crate) unsafe fn write_key(&mut self, i: usize, key: T) {
        debug_assert!(i < self.capacity);
        ptr::write(self.data.as_ptr().add(i), key);
    }

    /// Move the key out of slot `i` without dropping it in place.
    ///
    /// # Safety
    /// `i` must be `VALID`; the caller must not read or drop the slot
    /// again until it is re-written.
    #[inline]
    pub(crate) unsafe fn read_key(&mut self, i: usize) -> T {
        debug_assert!(i < self.capacity);
        ptr::read(self.data.as_ptr().add(i))
    }

    /// # Safety
    /// `i` must be `VALID`.
    #[inline]
    pub(crate) unsafe fn drop_key(&mut self, i: usize) {
        debug_assert!(i < self.capacity);
        ptr::drop_in_place(self.data.as_ptr().add(i));
    }

    /// Indices of every currently-`VALID` slot, in storage order (no
    /// ordering guarantee beyond "some order over the live slots").
    pub(crate) fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(move |&i| self.metadata(i) & VALID != 0)
    }
}

impl<T> Drop for RawTable<T> {
    fn drop(&mut self) {
        for i in 0..self.capacity {
            if self.metadata(i) & VALID != 0 {
                unsafe { self.drop_key(i) };
            }
        }
        if mem::size_of::<T>() != 0 {
            let data_layout = Layout::array::<T>(self.capacity).expect("capacity overflow");
            unsafe { alloc::dealloc(self.data.as_ptr() as *mut u8, data_layout) };
        }
        let metadata_layout =
            Layout::from_size_align(self.capacity, METADATA_ALIGN).expect("capacity/align overflow");
        unsafe { alloc::dealloc(self.metadata.as_ptr(), metadata_layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_is_all_empty() {
        let t: RawTable<u32> = RawTable::new(MIN_EXPONENT).unwrap();
        assert_eq!(t.capacity(), MIN_CAPACITY);
        for i in 0..t.capacity() {
            assert_eq!(t.metadata(i), EMPTY);
        }
    }

    #[test]
    fn write_and_read_key_roundtrip() {
        let mut t: RawTable<u32> = RawTable::new(MIN_EXPONENT).unwrap();
        unsafe {
            t.write_key(3, 42);
            t.set_metadata(3, VALID | 7);
            assert_eq!(*t.key(3), 42);
        }
        assert_eq!(t.valid_indices().collect::<Vec<_>>(), vec![3]);
    }
}
