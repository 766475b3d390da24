//! Typed allocation on top of an [`Arena`].
//!
//! [`TypedAllocator`] allocates single values and growable slices of one
//! concrete type. Everything it returns borrows the arena, so the borrow
//! checker rules out use after [`Arena::reset`] or [`Arena::release`]. The
//! `native_*` methods are the escape hatch: they use the global allocator
//! for values that must not live in the arena.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::arena::Arena;
use crate::clone::ArenaClone;
use crate::error::ArenaError;

/// Allocates values of type `T` from a borrowed [`Arena`].
///
/// `T` must be `Copy`: arena memory is reclaimed in bulk and destructors
/// never run.
///
/// # Examples
///
/// ```
/// use bumpmap_arena::{Arena, TypedAllocator};
///
/// let arena = Arena::new(4096, 1);
/// let alloc = TypedAllocator::<u32>::new(&arena);
///
/// let one = alloc.alloc_value(1).unwrap();
/// *one += 1;
/// assert_eq!(*one, 2);
///
/// let slice = alloc.make_slice(0, 2).unwrap();
/// let slice = alloc.append_slice(slice, &[1, 2, 3]).unwrap();
/// assert_eq!(&*slice, &[1, 2, 3]);
/// assert!(slice.capacity() >= 4);
/// ```
pub struct TypedAllocator<'a, T> {
    arena: &'a Arena,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> Clone for TypedAllocator<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for TypedAllocator<'a, T> {}

impl<'a, T: Copy> TypedAllocator<'a, T> {
    /// Create an allocator drawing from `arena`.
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            _marker: PhantomData,
        }
    }

    /// The arena backing this allocator.
    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Reserve uninitialised room for `count` values.
    fn alloc_array(&self, count: usize) -> Result<NonNull<T>, ArenaError> {
        if mem::size_of::<T>() == 0 || count == 0 {
            return Ok(NonNull::dangling());
        }
        let layout = Layout::array::<T>(count).map_err(|_| ArenaError::RegionTooLarge {
            requested: count.saturating_mul(mem::size_of::<T>()),
            buffer_size: self.arena.config().buffer_size,
        })?;
        Ok(self.arena.allocate_layout(layout)?.cast())
    }

    /// Allocate a default-initialised `T` in the arena.
    pub fn alloc(&self) -> Result<&'a mut T, ArenaError>
    where
        T: Default,
    {
        self.alloc_value(T::default())
    }

    /// Move `value` into the arena.
    pub fn alloc_value(&self, value: T) -> Result<&'a mut T, ArenaError> {
        let ptr = self.alloc_array(1)?;
        // SAFETY: `ptr` is aligned, sized for one `T` and handed out only
        // here, so the unique borrow for `'a` cannot alias.
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Allocate a slice of `len` default values with room for `capacity`.
    ///
    /// `capacity` is raised to `len` if smaller.
    pub fn make_slice(&self, len: usize, capacity: usize) -> Result<ArenaVec<'a, T>, ArenaError>
    where
        T: Default,
    {
        let capacity = capacity.max(len);
        let ptr = self.alloc_array(capacity)?;
        for i in 0..len {
            // SAFETY: `i < len <= capacity`.
            unsafe { ptr.as_ptr().add(i).write(T::default()) };
        }
        Ok(ArenaVec {
            ptr,
            len,
            capacity,
            _marker: PhantomData,
        })
    }

    /// Append `items` to `dst`, moving it to a larger arena region when full.
    ///
    /// Capacity at least doubles on every move. The old region is not
    /// reclaimed until the arena is reset.
    pub fn append_slice(
        &self,
        mut dst: ArenaVec<'a, T>,
        items: &[T],
    ) -> Result<ArenaVec<'a, T>, ArenaError> {
        let needed = dst.len.checked_add(items.len()).ok_or(ArenaError::RegionTooLarge {
            requested: usize::MAX,
            buffer_size: self.arena.config().buffer_size,
        })?;
        if needed > dst.capacity {
            let capacity = dst.capacity.saturating_mul(2).max(needed);
            let ptr = self.alloc_array(capacity)?;
            // SAFETY: both regions hold at least `dst.len` values and the new
            // one was just allocated, so they cannot overlap.
            unsafe { ptr::copy_nonoverlapping(dst.ptr.as_ptr(), ptr.as_ptr(), dst.len) };
            dst.ptr = ptr;
            dst.capacity = capacity;
        }
        // SAFETY: `dst.len + items.len() <= dst.capacity`; `items` is
        // caller memory and cannot overlap arena memory owned by `dst`.
        unsafe {
            ptr::copy_nonoverlapping(items.as_ptr(), dst.ptr.as_ptr().add(dst.len), items.len());
        }
        dst.len = needed;
        Ok(dst)
    }

    /// Deep-copy `value` into the arena, producing a `T`.
    ///
    /// `value` may borrow memory that dies before the arena does; only the
    /// returned copy is tied to the arena.
    pub fn clone_value<U>(&self, value: &U) -> Result<T, ArenaError>
    where
        U: ArenaClone<'a, Cloned = T> + ?Sized,
    {
        value.clone_in(self.arena)
    }

    /// Allocate a default `T` on the global heap, bypassing the arena.
    pub fn native_alloc(&self) -> Box<T>
    where
        T: Default,
    {
        Box::default()
    }

    /// Move `value` to the global heap, bypassing the arena.
    pub fn native_alloc_value(&self, value: T) -> Box<T> {
        Box::new(value)
    }

    /// Heap-allocated counterpart of [`make_slice`](Self::make_slice).
    pub fn native_make_slice(&self, len: usize, capacity: usize) -> Vec<T>
    where
        T: Default,
    {
        let mut vec = Vec::with_capacity(capacity.max(len));
        vec.resize(len, T::default());
        vec
    }

    /// Heap-allocated counterpart of [`append_slice`](Self::append_slice).
    pub fn native_append_slice(&self, mut dst: Vec<T>, items: &[T]) -> Vec<T> {
        dst.extend_from_slice(items);
        dst
    }
}

/// A length-tracked slice living in arena memory.
///
/// Grown with [`TypedAllocator::append_slice`]. Dereferences to `[T]`.
pub struct ArenaVec<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T> ArenaVec<'a, T> {
    /// Number of initialised elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the slice holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements that fit before the next move.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrow the initialised elements.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` elements are initialised and the region
        // outlives `'a`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Mutably borrow the initialised elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` makes the borrow unique.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> Deref for ArenaVec<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for ArenaVec<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArenaVec<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clone::{ArenaStr, NativeHandle};

    #[test]
    fn alloc_default_and_value() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<u64>::new(&arena);
        let zero = alloc.alloc().unwrap();
        let seven = alloc.alloc_value(7).unwrap();
        assert_eq!(*zero, 0);
        assert_eq!(*seven, 7);
        *zero = 3;
        assert_eq!(*seven, 7, "allocations do not alias");
    }

    #[test]
    fn make_slice_fills_len() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<i32>::new(&arena);
        let slice = alloc.make_slice(3, 8).unwrap();
        assert_eq!(&*slice, &[0, 0, 0]);
        assert_eq!(slice.capacity(), 8);
    }

    #[test]
    fn append_within_capacity_stays_in_place() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<u16>::new(&arena);
        let slice = alloc.make_slice(0, 4).unwrap();
        let before = slice.as_ptr();
        let slice = alloc.append_slice(slice, &[1, 2, 3, 4]).unwrap();
        assert_eq!(slice.as_ptr(), before);
        assert_eq!(&*slice, &[1, 2, 3, 4]);
    }

    #[test]
    fn append_past_capacity_doubles() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<u16>::new(&arena);
        let slice = alloc.make_slice(0, 4).unwrap();
        let slice = alloc.append_slice(slice, &[1, 2, 3, 4]).unwrap();
        let slice = alloc.append_slice(slice, &[5]).unwrap();
        assert_eq!(slice.capacity(), 8);
        assert_eq!(&*slice, &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn append_to_empty_slice() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<u8>::new(&arena);
        let slice = alloc.make_slice(0, 0).unwrap();
        let slice = alloc.append_slice(slice, b"abc").unwrap();
        assert_eq!(&*slice, b"abc");
    }

    #[test]
    fn slice_mutation_through_deref() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<u32>::new(&arena);
        let mut slice = alloc.make_slice(2, 2).unwrap();
        slice[1] = 9;
        assert_eq!(&*slice, &[0, 9]);
    }

    #[test]
    fn zero_sized_values_skip_the_arena() {
        let arena = Arena::new(64, 1);
        let alloc = TypedAllocator::<()>::new(&arena);
        alloc.alloc_value(()).unwrap();
        alloc.clone_value(&()).unwrap();
        let slice = alloc.make_slice(1000, 1000).unwrap();
        assert_eq!(slice.len(), 1000);
        assert_eq!(arena.stats().allocated_bytes, 0);
    }

    #[test]
    fn clone_value_copies_strings() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<ArenaStr<'_>>::new(&arena);
        let source = String::from("dedup-key");
        let copy = alloc.clone_value(&ArenaStr::new(&source)).unwrap();
        assert_eq!(copy, "dedup-key");
        assert_ne!(copy.as_ptr(), source.as_ptr());
    }

    #[test]
    fn clone_value_reports_policy_violation() {
        let arena = Arena::new(1024, 1);
        let alloc = TypedAllocator::<NativeHandle>::new(&arena);
        assert!(matches!(
            alloc.clone_value(&NativeHandle(1)),
            Err(ArenaError::ClonePolicyViolation { .. })
        ));
    }

    #[test]
    fn native_escape_hatch_uses_heap() {
        let arena = Arena::new(64, 1);
        let alloc = TypedAllocator::<NativeHandle>::new(&arena);
        let boxed = alloc.native_alloc_value(NativeHandle(3));
        assert_eq!(*boxed, NativeHandle(3));
        let vec = alloc.native_make_slice(2, 4);
        let vec = alloc.native_append_slice(vec, &[NativeHandle(9)]);
        assert_eq!(vec, vec![NativeHandle(0), NativeHandle(0), NativeHandle(9)]);
        assert_eq!(*alloc.native_alloc(), NativeHandle(0));
        assert_eq!(arena.stats().allocated_bytes, 0);
    }

    #[test]
    fn exhausted_arena_surfaces_error() {
        let arena = Arena::new(16, 1);
        let alloc = TypedAllocator::<u64>::new(&arena);
        alloc.alloc_value(1).unwrap();
        alloc.alloc_value(2).unwrap();
        assert!(matches!(
            alloc.alloc_value(3),
            Err(ArenaError::OutOfBuffers { .. })
        ));
    }
}
