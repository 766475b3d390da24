//! Hash set over [`Map`] with a unit value.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;
use bumpmap_arena::{Arena, ArenaClone, ArenaError};

use crate::map::{self, Map};
use crate::options::MapOptions;

/// A hash set whose members live in an [`Arena`].
///
/// A thin wrapper around `Map<K, ()>`; the unit value takes no slot space.
///
/// # Examples
///
/// ```
/// use bumpmap_arena::{Arena, ArenaStr};
/// use bumpmap_map::{MapOptions, Set};
///
/// let arena = Arena::default();
/// let mut seen = Set::<ArenaStr<'_>>::new(&arena, MapOptions::default())?;
/// for word in "the cat saw the dog".split(' ') {
///     seen.add(ArenaStr::new(word))?;
/// }
/// assert_eq!(seen.len(), 4);
/// assert!(seen.contains("dog"));
/// # Ok::<(), bumpmap_arena::ArenaError>(())
/// ```
pub struct Set<'a, K, S = RandomState> {
    map: Map<'a, K, (), S>,
}

impl<'a, K> Set<'a, K, RandomState>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq + Default,
{
    /// Create a set with a randomly seeded hasher.
    ///
    /// # Errors
    ///
    /// Same as [`Map::new`].
    pub fn new(arena: &'a Arena, options: MapOptions) -> Result<Self, ArenaError> {
        Map::new(arena, options).map(|map| Self { map })
    }
}

impl<'a, K, S> Set<'a, K, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq + Default,
    S: BuildHasher,
{
    /// Create a set that hashes members with `hash_builder`.
    ///
    /// # Errors
    ///
    /// Same as [`Map::new`].
    pub fn with_hasher(
        arena: &'a Arena,
        options: MapOptions,
        hash_builder: S,
    ) -> Result<Self, ArenaError> {
        Map::with_hasher(arena, options, hash_builder).map(|map| Self { map })
    }
}

impl<'a, K, S> Set<'a, K, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq,
    S: BuildHasher,
{
    /// Add `key`, cloning it into the arena if it is new.
    ///
    /// Returns `true` when `key` was not already a member.
    ///
    /// # Errors
    ///
    /// Same as [`Map::set`].
    pub fn add<Q>(&mut self, key: Q) -> Result<bool, ArenaError>
    where
        Q: ArenaClone<'a, Cloned = K> + Hash,
        K: PartialEq<Q>,
    {
        self.map.set(key, ()).map(|old| old.is_none())
    }

    /// Whether `key` is a member.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Remove `key`. Returns `true` if it was a member.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.delete(key).is_some()
    }

    /// Visit every member in storage order until `visitor` returns `false`.
    pub fn scan<F>(&self, mut visitor: F)
    where
        F: FnMut(K) -> bool,
    {
        self.map.scan(|key, ()| visitor(key));
    }

    /// Iterator over copies of every member.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.map.iter(),
        }
    }

    /// Remove every member, keeping capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<'a, K, S> Set<'a, K, S> {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of slots in the current table.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Drop the set, ending its borrow of the arena.
    pub fn release(self) {
        self.map.release();
    }
}

impl<'a, K, S> fmt::Debug for Set<'a, K, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq + fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'m, 'a, K, S> IntoIterator for &'m Set<'a, K, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq,
    S: BuildHasher,
{
    type Item = K;
    type IntoIter = Iter<'m, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Set::iter`].
pub struct Iter<'m, K> {
    inner: map::Iter<'m, K, ()>,
}

impl<K: Copy> Iterator for Iter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, ())| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Copy> ExactSizeIterator for Iter<'_, K> {}
