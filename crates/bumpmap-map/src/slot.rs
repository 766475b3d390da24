//! Untyped slot storage for the open-addressing table.
//!
//! A table is one arena region cut into fixed-size slots. Each slot is a
//! one-byte tag followed by the key and the value at offsets computed with
//! [`Layout::extend`], so both are naturally aligned. The region is plain
//! bytes: nothing walks it looking for owned data, and moving a slot is a
//! byte copy.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use bumpmap_arena::{Arena, ArenaError};

const EMPTY: u8 = 0;
const USED: u8 = 1;

/// Byte layout of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SlotLayout {
    /// Distance between consecutive slots.
    pub(crate) stride: usize,
    pub(crate) key_offset: usize,
    pub(crate) value_offset: usize,
    pub(crate) align: usize,
}

impl SlotLayout {
    /// Layout of a `(tag, K, V)` slot.
    pub(crate) fn of<K, V>() -> Result<Self, ArenaError> {
        let too_large = |_| ArenaError::InvalidConfig {
            reason: format!(
                "slot of a {} key and a {} value overflows the address space",
                std::any::type_name::<K>(),
                std::any::type_name::<V>()
            ),
        };
        let tag = Layout::new::<u8>();
        let (with_key, key_offset) = tag.extend(Layout::new::<K>()).map_err(too_large)?;
        let (slot, value_offset) = with_key.extend(Layout::new::<V>()).map_err(too_large)?;
        let slot = slot.pad_to_align();
        Ok(Self {
            stride: slot.size(),
            key_offset,
            value_offset,
            align: slot.align(),
        })
    }
}

/// A power-of-two array of slots living in arena memory.
///
/// The table does not own its region; the map that holds it borrows the
/// arena for at least as long as the table exists.
pub(crate) struct SlotTable<K, V> {
    base: NonNull<u8>,
    capacity: usize,
    layout: SlotLayout,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> SlotTable<K, V> {
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn layout(&self) -> SlotLayout {
        self.layout
    }
}

impl<K: Copy, V: Copy> SlotTable<K, V> {
    /// Allocate `capacity` empty slots from `arena`.
    pub(crate) fn allocate(
        arena: &Arena,
        capacity: usize,
        layout: SlotLayout,
    ) -> Result<Self, ArenaError> {
        debug_assert!(capacity.is_power_of_two());
        let bytes = layout
            .stride
            .checked_mul(capacity)
            .ok_or_else(|| ArenaError::InvalidConfig {
                reason: format!(
                    "{capacity} slots of {} bytes overflow the address space",
                    layout.stride
                ),
            })?;
        let region = Layout::from_size_align(bytes, layout.align).map_err(|_| {
            ArenaError::RegionTooLarge {
                requested: bytes,
                buffer_size: arena.config().buffer_size,
            }
        })?;
        let base = arena.allocate_zeroed(region)?;
        Ok(Self {
            base,
            capacity,
            layout,
            _marker: PhantomData,
        })
    }

    fn slot(&self, index: usize) -> *mut u8 {
        assert!(index < self.capacity, "slot {index} out of bounds");
        // SAFETY: `index < capacity`, so the offset lies inside the region.
        unsafe { self.base.as_ptr().add(index * self.layout.stride) }
    }

    pub(crate) fn is_used(&self, index: usize) -> bool {
        // SAFETY: the tag byte is always initialised (zeroed at allocation).
        unsafe { *self.slot(index) == USED }
    }

    /// Key stored in a used slot.
    pub(crate) fn key(&self, index: usize) -> K {
        debug_assert!(self.is_used(index));
        // SAFETY: used slots hold a key written by `write` at an offset
        // aligned for `K`.
        unsafe { ptr::read(self.slot(index).add(self.layout.key_offset).cast::<K>()) }
    }

    /// Value stored in a used slot.
    pub(crate) fn value(&self, index: usize) -> V {
        debug_assert!(self.is_used(index));
        // SAFETY: as in `key`.
        unsafe { ptr::read(self.slot(index).add(self.layout.value_offset).cast::<V>()) }
    }

    /// Fill a slot and mark it used.
    pub(crate) fn write(&mut self, index: usize, key: K, value: V) {
        let slot = self.slot(index);
        // SAFETY: offsets are in bounds and aligned for their types; `K` and
        // `V` are `Copy`, so overwriting never skips a destructor.
        unsafe {
            ptr::write(slot.add(self.layout.key_offset).cast::<K>(), key);
            ptr::write(slot.add(self.layout.value_offset).cast::<V>(), value);
            *slot = USED;
        }
    }

    /// Replace the value of a used slot.
    pub(crate) fn set_value(&mut self, index: usize, value: V) {
        debug_assert!(self.is_used(index));
        // SAFETY: as in `write`.
        unsafe { ptr::write(self.slot(index).add(self.layout.value_offset).cast::<V>(), value) }
    }

    /// Copy slot `from` over slot `to`, tag included.
    pub(crate) fn move_slot(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let (src, dst) = (self.slot(from), self.slot(to));
        // SAFETY: distinct slots never overlap; both are `stride` bytes.
        unsafe { ptr::copy_nonoverlapping(src, dst, self.layout.stride) }
    }

    /// Zero a slot, leaving it empty.
    pub(crate) fn clear_slot(&mut self, index: usize) {
        // SAFETY: the slot is `stride` bytes inside the region.
        unsafe { self.slot(index).write_bytes(EMPTY, self.layout.stride) }
    }

    /// Zero every slot.
    pub(crate) fn clear_all(&mut self) {
        // SAFETY: the region spans exactly `stride * capacity` bytes.
        unsafe {
            self.base
                .as_ptr()
                .write_bytes(EMPTY, self.layout.stride * self.capacity)
        }
    }
}
