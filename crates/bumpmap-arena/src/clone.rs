//! Cloning values into arena-owned memory.
//!
//! [`ArenaClone`] is the capability a key or value type needs before a
//! container will store it. The clone must be a fixed-size, relocatable
//! byte pattern (`Copy`): the container moves slots around with raw byte
//! copies and never runs destructors. Data reached through a pointer, like
//! the bytes behind an [`ArenaStr`], is copied into the arena so the stored
//! value no longer depends on the caller's memory.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::arena::Arena;
use crate::error::ArenaError;

/// Types that can be deep-copied into memory owned by an [`Arena`].
///
/// `'a` is the borrow of the arena the copy lives in. The copy's type,
/// [`Cloned`](Self::Cloned), is tied to `'a`, so a value borrowing
/// short-lived caller memory can be cloned into a container that outlives
/// it, and the copy can never outlive the arena.
pub trait ArenaClone<'a> {
    /// The arena-owned copy. A fixed-size, relocatable byte pattern.
    type Cloned: Copy + 'a;

    /// Copy `self` into `arena` and return the arena-owned copy.
    fn clone_in(&self, arena: &'a Arena) -> Result<Self::Cloned, ArenaError>;
}

macro_rules! impl_arena_clone_by_copy {
    ($($t:ty),* $(,)?) => {
        $(
            impl<'a> ArenaClone<'a> for $t {
                type Cloned = $t;

                #[inline]
                fn clone_in(&self, _arena: &'a Arena) -> Result<$t, ArenaError> {
                    Ok(*self)
                }
            }
        )*
    };
}

impl_arena_clone_by_copy!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
);

impl<'a, T: ArenaClone<'a>> ArenaClone<'a> for Option<T> {
    type Cloned = Option<T::Cloned>;

    fn clone_in(&self, arena: &'a Arena) -> Result<Self::Cloned, ArenaError> {
        self.as_ref().map(|value| value.clone_in(arena)).transpose()
    }
}

impl<'a, T: ArenaClone<'a>, const N: usize> ArenaClone<'a> for [T; N] {
    type Cloned = [T::Cloned; N];

    fn clone_in(&self, arena: &'a Arena) -> Result<Self::Cloned, ArenaError> {
        let cloned: [Result<T::Cloned, ArenaError>; N] =
            std::array::from_fn(|i| self[i].clone_in(arena));
        if let Some(Err(err)) = cloned.iter().find(|item| item.is_err()) {
            return Err(err.clone());
        }
        Ok(cloned.map(|item| match item {
            Ok(value) => value,
            Err(_) => unreachable!("errors were returned above"),
        }))
    }
}

macro_rules! impl_arena_clone_tuple {
    ($($name:ident),+) => {
        impl<'a, $($name: ArenaClone<'a>),+> ArenaClone<'a> for ($($name,)+) {
            type Cloned = ($($name::Cloned,)+);

            #[allow(non_snake_case)]
            fn clone_in(&self, arena: &'a Arena) -> Result<Self::Cloned, ArenaError> {
                let ($($name,)+) = self;
                Ok(($($name.clone_in(arena)?,)+))
            }
        }
    };
}

impl_arena_clone_tuple!(A);
impl_arena_clone_tuple!(A, B);
impl_arena_clone_tuple!(A, B, C);
impl_arena_clone_tuple!(A, B, C, D);

/// Trial-clone `T::default()` to check that `T` may live in the arena.
///
/// Containers call this once at construction so an unsupported type fails
/// immediately instead of on the first insert. Cloning a default value does
/// not consume arena memory for any type in this crate.
pub fn check_clone_policy<'a, T>(arena: &'a Arena) -> Result<(), ArenaError>
where
    T: ArenaClone<'a> + Default,
{
    T::default().clone_in(arena).map(drop).inspect_err(|err| {
        tracing::warn!(
            ty = std::any::type_name::<T>(),
            error = %err,
            "type rejected by arena clone policy"
        );
    })
}

/// A string slice that is copied into the arena when stored.
///
/// `ArenaStr::new` only borrows; [`ArenaClone::clone_in`] (called by every
/// container write) or [`Arena::alloc_str`] copies the bytes into the arena.
/// Equality, ordering and hashing follow the string contents, so containers
/// keyed by `ArenaStr` can be queried with a plain `&str`.
#[derive(Clone, Copy, Default, Eq, PartialOrd, Ord)]
pub struct ArenaStr<'a>(&'a str);

impl<'a> ArenaStr<'a> {
    /// Borrow `s` without copying it.
    pub fn new(s: &'a str) -> Self {
        Self(s)
    }

    /// Copy `s` into `arena`.
    pub fn copy_from(arena: &'a Arena, s: &str) -> Result<Self, ArenaError> {
        if s.is_empty() {
            return Ok(Self(""));
        }
        let layout = Layout::for_value(s.as_bytes());
        let ptr = arena.allocate_layout(layout)?;
        // SAFETY: the region is fresh, `s.len()` bytes long and does not
        // overlap `s`. The copied bytes are valid UTF-8 because `s` was, and
        // the region lives as long as the `'a` borrow of the arena.
        let copied = unsafe {
            std::ptr::copy_nonoverlapping(s.as_ptr(), ptr.as_ptr(), s.len());
            std::str::from_utf8_unchecked(std::slice::from_raw_parts(ptr.as_ptr(), s.len()))
        };
        Ok(Self(copied))
    }

    /// The underlying string slice.
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl<'a> ArenaClone<'a> for ArenaStr<'_> {
    type Cloned = ArenaStr<'a>;

    fn clone_in(&self, arena: &'a Arena) -> Result<ArenaStr<'a>, ArenaError> {
        ArenaStr::copy_from(arena, self.0)
    }
}

impl Deref for ArenaStr<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.0
    }
}

impl Borrow<str> for ArenaStr<'_> {
    fn borrow(&self) -> &str {
        self.0
    }
}

impl<'a> From<&'a str> for ArenaStr<'a> {
    fn from(s: &'a str) -> Self {
        Self(s)
    }
}

impl<'b> PartialEq<ArenaStr<'b>> for ArenaStr<'_> {
    fn eq(&self, other: &ArenaStr<'b>) -> bool {
        self.0 == other.0
    }
}

impl Hash for ArenaStr<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq<str> for ArenaStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ArenaStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Debug for ArenaStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for ArenaStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Token for a resource owned outside the arena: a file descriptor, a pooled
/// connection, a GPU buffer.
///
/// Duplicating the token by byte copy would alias the resource, so it
/// refuses to be cloned into arena memory. A container keyed or valued by
/// `NativeHandle` fails at construction with
/// [`ArenaError::ClonePolicyViolation`]; keep such values in native
/// collections (see [`TypedAllocator::native_alloc_value`](crate::TypedAllocator::native_alloc_value)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub u64);

impl<'a> ArenaClone<'a> for NativeHandle {
    type Cloned = NativeHandle;

    fn clone_in(&self, _arena: &'a Arena) -> Result<NativeHandle, ArenaError> {
        Err(ArenaError::ClonePolicyViolation {
            type_name: std::any::type_name::<Self>(),
        })
    }
}
