//! Fixed-size slot array addressed by doubled sequence numbers.

use crate::config::RingConfig;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

/// Power-of-two slot array shared by both ring variants.
///
/// A slot is addressed by `(seq >> 1) & mask`: cursors advance by 2 per
/// logical position, with the low bit reserved for the in-flight phase.
/// All access is unsynchronized cell access; exclusivity comes entirely
/// from the sequence protocol around it, so every accessor is `unsafe`
/// with the reservation window as its contract.
pub(crate) struct SlotRing<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: u64,
}

// Safety: SlotRing hands out values only under exclusive reservation
// windows established by the cursor protocol; the cells themselves carry
// no synchronization.
unsafe impl<T: Send> Send for SlotRing<T> {}
unsafe impl<T: Send> Sync for SlotRing<T> {}

impl<T> SlotRing<T> {
    pub(crate) fn new(config: &RingConfig) -> Self {
        let capacity = config.capacity() as usize;
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || UnsafeCell::new(MaybeUninit::uninit()));
        Self {
            slots: slots.into_boxed_slice(),
            mask: config.mask(),
        }
    }

    /// Maps a sequence value to its slot index.
    #[inline]
    pub(crate) fn index(&self, seq: u64) -> usize {
        ((seq >> 1) & self.mask) as usize
    }

    /// Writes `value` into the slot for `seq`, without dropping previous
    /// contents.
    ///
    /// # Safety
    ///
    /// The caller must hold the reservation window for `seq` (its cursor
    /// sits at the odd intermediate), and the slot's previous value, if it
    /// was ever initialized, must already have been moved out or be `Copy`.
    #[inline]
    pub(crate) unsafe fn write(&self, seq: u64, value: T) {
        (*self.slots[self.index(seq)].get()).write(value);
    }

    /// Moves the value out of the slot for `seq`.
    ///
    /// # Safety
    ///
    /// The caller must hold the drain window for `seq`, and the slot must
    /// have been initialized by a published `write`.
    #[inline]
    pub(crate) unsafe fn take(&self, seq: u64) -> T {
        (*self.slots[self.index(seq)].get()).assume_init_read()
    }

    /// Drops every committed value in `[start, end)`, stepping by 2.
    ///
    /// # Safety
    ///
    /// Requires exclusive access (`&mut self`) and that every slot in the
    /// range holds a committed, not-yet-consumed value.
    pub(crate) unsafe fn drop_range(&mut self, start: u64, end: u64) {
        let mut seq = start;
        while seq < end {
            let idx = self.index(seq);
            std::ptr::drop_in_place((*self.slots[idx].get()).as_mut_ptr());
            seq = seq.wrapping_add(2);
        }
    }
}

impl<T: Copy> SlotRing<T> {
    /// Copies the value out of the slot for `seq`, leaving it in place for
    /// other readers.
    ///
    /// # Safety
    ///
    /// The slot must be published (an even writer cursor past `seq` was
    /// observed with acquire ordering) and not yet reusable (the caller's
    /// cursor is registered in the barrier gating the writer).
    #[inline]
    pub(crate) unsafe fn read(&self, seq: u64) -> T {
        (*self.slots[self.index(seq)].get()).assume_init_read()
    }
}
