//! Open-addressing hash map stored in arena memory.
//!
//! Linear probing over a power-of-two [`SlotTable`]. Deletion shifts later
//! cluster members back into the hole instead of leaving tombstones, so
//! probe sequences stay as short as the load factor allows no matter how
//! many deletes a map has seen.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;
use bumpmap_arena::{check_clone_policy, Arena, ArenaClone, ArenaError, TypedAllocator};

use crate::options::MapOptions;
use crate::slot::{SlotLayout, SlotTable};

/// A hash map whose slots, keys and values live in an [`Arena`].
///
/// Keys and values are deep-copied into the arena on every write through
/// [`ArenaClone`], so the map never refers to caller memory. Lookups return
/// copies. Memory is never returned to the arena per entry: a grown map
/// leaves its old table behind until the arena is reset. A table larger
/// than one arena buffer takes a buffer of its own, so growth is bounded by
/// the arena's buffer count.
///
/// # Examples
///
/// ```
/// use bumpmap_arena::Arena;
/// use bumpmap_map::{Map, MapOptions};
///
/// let arena = Arena::new(64 * 1024, 4);
/// let mut scores = Map::<u32, f64>::new(&arena, MapOptions::default())?;
/// scores.set(7u32, 0.5f64)?;
/// assert_eq!(scores.set(7u32, 0.75f64)?, Some(0.5));
/// assert_eq!(scores.get(&7), Some(0.75));
/// assert_eq!(scores.delete(&7), Some(0.75));
/// assert!(scores.is_empty());
/// # Ok::<(), bumpmap_arena::ArenaError>(())
/// ```
pub struct Map<'a, K, V, S = RandomState> {
    arena: &'a Arena,
    table: SlotTable<K, V>,
    len: usize,
    load_factor: f64,
    hash_builder: S,
}

impl<'a, K, V> Map<'a, K, V, RandomState>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq + Default,
    V: ArenaClone<'a, Cloned = V> + Copy + Default,
{
    /// Create a map with a randomly seeded hasher.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `options` fail validation.
    /// - `ClonePolicyViolation` if `K` or `V` cannot be cloned into the arena.
    /// - Any allocation error from reserving the first table.
    pub fn new(arena: &'a Arena, options: MapOptions) -> Result<Self, ArenaError> {
        Self::with_hasher(arena, options, RandomState::new())
    }
}

impl<'a, K, V, S> Map<'a, K, V, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq + Default,
    V: ArenaClone<'a, Cloned = V> + Copy + Default,
    S: BuildHasher,
{
    /// Create a map that hashes keys with `hash_builder`.
    ///
    /// # Errors
    ///
    /// Same as [`Map::new`].
    pub fn with_hasher(
        arena: &'a Arena,
        options: MapOptions,
        hash_builder: S,
    ) -> Result<Self, ArenaError> {
        options.validate()?;
        check_clone_policy::<K>(arena)?;
        check_clone_policy::<V>(arena)?;
        let layout = SlotLayout::of::<K, V>()?;
        let table = SlotTable::allocate(arena, options.table_capacity(), layout)?;
        Ok(Self {
            arena,
            table,
            len: 0,
            load_factor: options.load_factor,
            hash_builder,
        })
    }
}

impl<'a, K, V, S> Map<'a, K, V, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq,
    V: ArenaClone<'a, Cloned = V> + Copy,
    S: BuildHasher,
{
    fn mask(&self) -> usize {
        self.table.capacity() - 1
    }

    fn index<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        self.hash_builder.hash_one(key) as usize & self.mask()
    }

    /// Slot holding the key that `matches` accepts, probing from `start`.
    fn probe(&self, start: usize, matches: impl Fn(&K) -> bool) -> Option<usize> {
        let mut i = start;
        loop {
            if !self.table.is_used(i) {
                return None;
            }
            if matches(&self.table.key(i)) {
                return Some(i);
            }
            i = (i + 1) & self.mask();
            if i == start {
                return None;
            }
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(self.index(key), |k| key == k.borrow())
    }

    /// First empty slot on the probe path of a key hashing to `start`.
    fn vacant_slot(table: &SlotTable<K, V>, start: usize) -> Option<usize> {
        let mask = table.capacity() - 1;
        let mut i = start;
        loop {
            if !table.is_used(i) {
                return Some(i);
            }
            i = (i + 1) & mask;
            if i == start {
                return None;
            }
        }
    }

    fn exceeds_load(&self, len: usize, capacity: usize) -> bool {
        len as f64 > capacity as f64 * self.load_factor
    }

    /// Make room for one more entry without breaking the load factor.
    fn reserve_one(&mut self) -> Result<(), ArenaError> {
        let needed = self.len + 1;
        let mut capacity = self.table.capacity();
        while self.exceeds_load(needed, capacity) {
            capacity = capacity
                .checked_mul(2)
                .ok_or_else(|| ArenaError::InvalidConfig {
                    reason: format!("map cannot grow past {capacity} slots"),
                })?;
        }
        if capacity != self.table.capacity() {
            self.resize(capacity)?;
        }
        Ok(())
    }

    /// Rehash every entry into a fresh table of `capacity` slots.
    ///
    /// Entries are already arena-owned, so they move without re-cloning.
    fn resize(&mut self, capacity: usize) -> Result<(), ArenaError> {
        let mut table = SlotTable::allocate(self.arena, capacity, self.table.layout())?;
        let mask = capacity - 1;
        for i in 0..self.table.capacity() {
            if !self.table.is_used(i) {
                continue;
            }
            let key = self.table.key(i);
            let start = self.hash_builder.hash_one(&key) as usize & mask;
            match Self::vacant_slot(&table, start) {
                Some(slot) => table.write(slot, key, self.table.value(i)),
                None => unreachable!("a larger table has room for every entry"),
            }
        }
        tracing::debug!(
            old_capacity = self.table.capacity(),
            new_capacity = capacity,
            len = self.len,
            "map grew"
        );
        self.table = table;
        Ok(())
    }

    /// Insert or update `key`.
    ///
    /// Returns the previous value when `key` was already present, `None`
    /// when a new entry was created. The key (for new entries) and the value
    /// are cloned into the arena, so `key` and `value` may borrow memory
    /// that dies long before the map. On error no entry is added or changed.
    ///
    /// # Errors
    ///
    /// Allocation errors from growing the table or cloning, and
    /// `ClonePolicyViolation` if a clone refuses.
    pub fn set<Q, W>(&mut self, key: Q, value: W) -> Result<Option<V>, ArenaError>
    where
        Q: ArenaClone<'a, Cloned = K> + Hash,
        K: PartialEq<Q>,
        W: ArenaClone<'a, Cloned = V>,
    {
        let values = TypedAllocator::<V>::new(self.arena);
        if let Some(i) = self.probe(self.index(&key), |k| *k == key) {
            let value = values.clone_value(&value)?;
            let old = self.table.value(i);
            self.table.set_value(i, value);
            return Ok(Some(old));
        }

        self.reserve_one()?;
        let key = TypedAllocator::<K>::new(self.arena).clone_value(&key)?;
        let value = values.clone_value(&value)?;
        let slot = match Self::vacant_slot(&self.table, self.index(&key)) {
            Some(slot) => slot,
            None => {
                let doubled = self.table.capacity() * 2;
                self.resize(doubled)?;
                match Self::vacant_slot(&self.table, self.index(&key)) {
                    Some(slot) => slot,
                    None => unreachable!("a freshly doubled table has empty slots"),
                }
            }
        };
        self.table.write(slot, key, value);
        self.len += 1;
        Ok(None)
    }

    /// Copy of the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).map(|i| self.table.value(i))
    }

    /// Whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Remove `key` and return its value.
    ///
    /// Entries after the hole in the same cluster move back into it when
    /// their home slot does not lie between the hole and their current
    /// position, so every remaining key stays reachable from its home slot.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut hole = self.find(key)?;
        let old = self.table.value(hole);
        self.len -= 1;

        let mask = self.mask();
        let mut scan = (hole + 1) & mask;
        while scan != hole && self.table.is_used(scan) {
            let ideal = self.index(&self.table.key(scan));
            let stays = if hole <= scan {
                hole < ideal && ideal <= scan
            } else {
                hole < ideal || ideal <= scan
            };
            if !stays {
                self.table.move_slot(scan, hole);
                hole = scan;
            }
            scan = (scan + 1) & mask;
        }
        self.table.clear_slot(hole);
        Some(old)
    }

    /// Visit every entry in storage order until `visitor` returns `false`.
    ///
    /// The map cannot be modified during the pass.
    pub fn scan<F>(&self, mut visitor: F)
    where
        F: FnMut(K, V) -> bool,
    {
        for (key, value) in self.iter() {
            if !visitor(key, value) {
                break;
            }
        }
    }

    /// Iterator over copies of every entry, in storage order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            table: &self.table,
            next: 0,
            remaining: self.len,
        }
    }

    /// Remove every entry. Capacity is kept and the table is reused.
    pub fn clear(&mut self) {
        self.table.clear_all();
        self.len = 0;
    }
}

impl<'a, K, V, S> Map<'a, K, V, S> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Configured maximum ratio of entries to slots.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// The hash builder keys are hashed with.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// The arena backing this map.
    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Drop the map, ending its borrow of the arena.
    ///
    /// Arena memory is not reclaimed here; call [`Arena::reset`] or
    /// [`Arena::release`] once every container sharing the arena is gone.
    pub fn release(self) {
        tracing::trace!(len = self.len, capacity = self.table.capacity(), "map released");
    }
}

impl<'a, K, V, S> fmt::Debug for Map<'a, K, V, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq + fmt::Debug,
    V: ArenaClone<'a, Cloned = V> + Copy + fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'m, 'a, K, V, S> IntoIterator for &'m Map<'a, K, V, S>
where
    K: ArenaClone<'a, Cloned = K> + Copy + Hash + Eq,
    V: ArenaClone<'a, Cloned = V> + Copy,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = Iter<'m, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Map::iter`].
pub struct Iter<'m, K, V> {
    table: &'m SlotTable<K, V>,
    next: usize,
    remaining: usize,
}

impl<K: Copy, V: Copy> Iterator for Iter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        while self.remaining > 0 && self.next < self.table.capacity() {
            let i = self.next;
            self.next += 1;
            if self.table.is_used(i) {
                self.remaining -= 1;
                return Some((self.table.key(i), self.table.value(i)));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Copy, V: Copy> ExactSizeIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpmap_arena::{ArenaStr, NativeHandle};
    use bumpmap_test_utils::{ConstantState, IdentityState};

    fn arena() -> Arena {
        Arena::new(64 * 1024, 8)
    }

    fn identity_map(arena: &Arena, capacity: usize) -> Map<'_, u64, u64, IdentityState> {
        let options = MapOptions::new().with_capacity(capacity);
        Map::with_hasher(arena, options, IdentityState).unwrap()
    }

    #[test]
    fn set_then_get() {
        let arena = arena();
        let mut map = Map::<u64, i32>::new(&arena, MapOptions::default()).unwrap();
        assert_eq!(map.set(10u64, -1i32).unwrap(), None);
        assert_eq!(map.set(20u64, -2i32).unwrap(), None);
        assert_eq!(map.get(&10), Some(-1));
        assert_eq!(map.get(&20), Some(-2));
        assert_eq!(map.get(&30), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn update_keeps_len() {
        let arena = arena();
        let mut map = Map::<u64, u64>::new(&arena, MapOptions::default()).unwrap();
        map.set(1u64, 100u64).unwrap();
        assert_eq!(map.set(1u64, 200u64).unwrap(), Some(100));
        assert_eq!(map.get(&1), Some(200));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn capacity_four_scenario() {
        let arena = arena();
        let options = MapOptions::new().with_capacity(4).with_load_factor(0.85);
        let mut map: Map<'_, u64, u64, _> =
            Map::with_hasher(&arena, options, IdentityState).unwrap();
        let (a, b, c, d) = (1u64, 5, 9, 13);
        for key in [a, b, c] {
            map.set(key, key * 10).unwrap();
        }
        assert_eq!(map.len(), 3);

        assert_eq!(map.delete(&b), Some(50));
        assert_eq!(map.get(&b), None);
        assert_eq!(map.get(&a), Some(10));
        assert_eq!(map.get(&c), Some(90));

        assert_eq!(map.set(d, 130u64).unwrap(), None);
        assert_eq!(map.get(&d), Some(130));
        assert_eq!(map.get(&b), None);
        assert_eq!(map.len(), 3);
        assert_eq!(map.capacity(), 4);
    }

    #[test]
    fn delete_shifts_wrapped_cluster() {
        let arena = arena();
        let mut map = identity_map(&arena, 8);
        // Home slot 6 for all three; the cluster wraps to slot 0.
        for key in [6u64, 14, 22] {
            map.set(key, key).unwrap();
        }
        assert_eq!(map.delete(&6), Some(6));
        assert_eq!(map.get(&14), Some(14));
        assert_eq!(map.get(&22), Some(22));
        assert_eq!(map.delete(&14), Some(14));
        assert_eq!(map.get(&22), Some(22));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn delete_leaves_entries_at_home_in_place() {
        let arena = arena();
        let mut map = identity_map(&arena, 8);
        // 1 and 9 share home 1; 2 sits past them with home 2.
        for key in [1u64, 9, 2] {
            map.set(key, key).unwrap();
        }
        assert_eq!(map.delete(&1), Some(1));
        for key in [9u64, 2] {
            assert_eq!(map.get(&key), Some(key));
        }
    }

    #[test]
    fn delete_missing_is_none() {
        let arena = arena();
        let mut map = identity_map(&arena, 8);
        map.set(3u64, 3u64).unwrap();
        assert_eq!(map.delete(&11), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn full_collision_cluster_survives_churn() {
        let arena = arena();
        let options = MapOptions::new().with_capacity(16).with_load_factor(1.0);
        let mut map: Map<'_, u64, u64, _> =
            Map::with_hasher(&arena, options, ConstantState(0)).unwrap();
        for key in 0u64..16 {
            map.set(key, key).unwrap();
        }
        assert_eq!(map.capacity(), 16);
        for key in (0u64..16).step_by(3) {
            assert_eq!(map.delete(&key), Some(key));
        }
        for key in 0u64..16 {
            let expected = (key % 3 != 0).then_some(key);
            assert_eq!(map.get(&key), expected, "key {key}");
        }
    }

    #[test]
    fn grows_past_load_factor() {
        let arena = arena();
        let mut map = identity_map(&arena, 4);
        for key in 0u64..100 {
            map.set(key, key * 2).unwrap();
        }
        assert_eq!(map.len(), 100);
        assert!(map.capacity() >= 128);
        assert!(map.len() as f64 <= map.capacity() as f64 * map.load_factor());
        for key in 0u64..100 {
            assert_eq!(map.get(&key), Some(key * 2));
        }
    }

    #[test]
    fn update_at_threshold_does_not_grow() {
        let arena = arena();
        let options = MapOptions::new().with_capacity(4).with_load_factor(0.75);
        let mut map: Map<'_, u64, u64, _> =
            Map::with_hasher(&arena, options, IdentityState).unwrap();
        for key in 0u64..3 {
            map.set(key, 0u64).unwrap();
        }
        map.set(2u64, 1u64).unwrap();
        assert_eq!(map.capacity(), 4);
        map.set(3u64, 0u64).unwrap();
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn clear_keeps_capacity() {
        let arena = arena();
        let mut map = identity_map(&arena, 8);
        for key in 0u64..20 {
            map.set(key, key).unwrap();
        }
        let capacity = map.capacity();
        map.clear();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert!((0u64..20).all(|key| map.get(&key).is_none()));
        map.set(4u64, 40u64).unwrap();
        assert_eq!(map.get(&4), Some(40));
    }

    #[test]
    fn scan_stops_early() {
        let arena = arena();
        let mut map = identity_map(&arena, 16);
        for key in 0u64..10 {
            map.set(key, key).unwrap();
        }
        let mut seen = Vec::new();
        map.scan(|key, _| {
            seen.push(key);
            seen.len() < 4
        });
        assert_eq!(seen, vec![0, 1, 2, 3]);

        let mut total = 0;
        map.scan(|_, value| {
            total += value;
            true
        });
        assert_eq!(total, 45);
    }

    #[test]
    fn iter_is_exact() {
        let arena = arena();
        let mut map = identity_map(&arena, 16);
        for key in [3u64, 9, 12] {
            map.set(key, key + 1).unwrap();
        }
        let iter = map.iter();
        assert_eq!(iter.len(), 3);
        let pairs: Vec<_> = (&map).into_iter().collect();
        assert_eq!(pairs, vec![(3, 4), (9, 10), (12, 13)]);
    }

    #[test]
    fn string_keys_are_isolated_from_caller() {
        let arena = arena();
        let mut map =
            Map::<ArenaStr<'_>, ArenaStr<'_>>::new(&arena, MapOptions::default()).unwrap();
        let mut key = String::from("node");
        let mut value = String::from("alpha");
        map.set(ArenaStr::new(&key), ArenaStr::new(&value)).unwrap();
        key.make_ascii_uppercase();
        value.push_str("-changed");
        assert_eq!(map.get("node").map(|v| v.as_str()), Some("alpha"));
        assert!(!map.contains_key("NODE"));
        assert!(map.contains_key("node"));
    }

    #[test]
    fn native_handle_is_rejected_at_construction() {
        let arena = arena();
        let keyed = Map::<NativeHandle, u32>::new(&arena, MapOptions::default());
        assert!(matches!(keyed, Err(ArenaError::ClonePolicyViolation { .. })));
        let valued = Map::<u32, NativeHandle>::new(&arena, MapOptions::default());
        assert!(matches!(valued, Err(ArenaError::ClonePolicyViolation { .. })));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let arena = arena();
        let zero = Map::<u32, u32>::new(&arena, MapOptions::new().with_capacity(0));
        assert!(matches!(zero, Err(ArenaError::InvalidConfig { .. })));
        let lf = Map::<u32, u32>::new(&arena, MapOptions::new().with_load_factor(1.5));
        assert!(matches!(lf, Err(ArenaError::InvalidConfig { .. })));
    }

    #[test]
    fn exhausted_arena_leaves_map_unchanged() {
        let arena = Arena::new(1024, 1);
        let mut map = identity_map(&arena, 4);
        let mut inserted = 0u64;
        let err = loop {
            match map.set(inserted, inserted) {
                Ok(_) => inserted += 1,
                Err(err) => break err,
            }
        };
        assert!(matches!(err, ArenaError::OutOfBuffers { buffer_count: 1, .. }));
        assert_eq!(map.len() as u64, inserted);
        for key in 0..inserted {
            assert_eq!(map.get(&key), Some(key));
        }
    }

    #[test]
    fn maps_share_one_arena() {
        let arena = arena();
        let mut left = Map::<u32, u32>::new(&arena, MapOptions::default()).unwrap();
        let mut right = Map::<u32, u32>::new(&arena, MapOptions::default()).unwrap();
        left.set(1u32, 1u32).unwrap();
        right.set(1u32, 2u32).unwrap();
        assert_eq!(left.get(&1), Some(1));
        assert_eq!(right.get(&1), Some(2));
        left.release();
        right.release();
    }

    #[test]
    fn table_outgrows_one_buffer() {
        let arena = Arena::new(1024, 8);
        let mut map = identity_map(&arena, 4);
        for key in 0u64..200 {
            map.set(key, key + 1).unwrap();
        }
        assert!(map.capacity() * 24 > arena.config().buffer_size);
        assert!(arena.stats().buffer_count <= 8);
        for key in 0u64..200 {
            assert_eq!(map.get(&key), Some(key + 1));
        }
    }

    #[test]
    fn full_table_rehashes_every_entry() {
        let arena = arena();
        let options = MapOptions::new().with_capacity(16).with_load_factor(1.0);
        let mut map: Map<'_, u64, u64, _> =
            Map::with_hasher(&arena, options, ConstantState(5)).unwrap();
        for key in 0u64..17 {
            map.set(key, key * 10).unwrap();
        }
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.len(), 17);
        for key in 0u64..17 {
            assert_eq!(map.get(&key), Some(key * 10), "key {key}");
        }
    }

    fn sizes<K, V, S>(map: &Map<'_, K, V, S>) -> (usize, usize, bool) {
        (map.len(), map.capacity(), map.is_empty())
    }

    #[test]
    fn size_queries_need_no_key_bounds() {
        let arena = arena();
        let mut map = identity_map(&arena, 8);
        assert_eq!(sizes(&map), (0, 8, true));
        map.set(3u64, 4u64).unwrap();
        assert_eq!(sizes(&map), (1, 8, false));
        map.release();
    }

    #[test]
    fn accessors_expose_hasher_and_arena() {
        let arena = arena();
        let options = MapOptions::new().with_capacity(4);
        let map: Map<'_, u64, u64, _> =
            Map::with_hasher(&arena, options, ConstantState(7)).unwrap();
        assert_eq!(map.hasher().0, 7);
        assert!(std::ptr::eq(map.arena(), &arena));
        assert_eq!(map.load_factor(), MapOptions::DEFAULT_LOAD_FACTOR);
    }

    #[test]
    fn debug_lists_entries() {
        let arena = arena();
        let mut map = identity_map(&arena, 4);
        map.set(2u64, 20u64).unwrap();
        assert_eq!(format!("{map:?}"), "{2: 20}");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use bumpmap_test_utils::{ConstantState, Model, Op};
        use proptest::prelude::*;

        fn op() -> impl Strategy<Value = Op<u16, u32>> {
            prop_oneof![
                6 => (0u16..64, any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
                4 => (0u16..64).prop_map(Op::Delete),
                1 => Just(Op::Clear),
            ]
        }

        fn check<S: BuildHasher>(
            mut map: Map<'_, u16, u32, S>,
            ops: Vec<Op<u16, u32>>,
        ) -> Result<(), TestCaseError> {
            let mut model = Model::new();
            for op in &ops {
                let expected = model.apply(op);
                match *op {
                    Op::Set(k, v) => prop_assert_eq!(map.set(k, v).unwrap(), expected),
                    Op::Delete(k) => prop_assert_eq!(map.delete(&k), expected),
                    Op::Clear => map.clear(),
                }
                prop_assert_eq!(map.len(), model.len());
                prop_assert!(map.len() as f64 <= map.capacity() as f64 * map.load_factor());
            }
            for k in 0u16..64 {
                prop_assert_eq!(map.get(&k), model.get(&k).copied());
            }
            prop_assert_eq!(map.iter().count(), model.len());
            Ok(())
        }

        proptest! {
            #[test]
            fn matches_model(
                ops in prop::collection::vec(op(), 0..300),
                capacity in 1usize..32,
            ) {
                let arena = Arena::new(1 << 20, 4);
                let map = Map::new(&arena, MapOptions::new().with_capacity(capacity)).unwrap();
                check(map, ops)?;
            }

            #[test]
            fn matches_model_under_total_collision(ops in prop::collection::vec(op(), 0..150)) {
                let arena = Arena::new(1 << 20, 4);
                let options = MapOptions::new().with_capacity(8).with_load_factor(1.0);
                let map = Map::with_hasher(&arena, options, ConstantState(3)).unwrap();
                check(map, ops)?;
            }
        }
    }
}
