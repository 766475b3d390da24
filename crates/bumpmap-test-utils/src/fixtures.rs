//! Seeded key generators and a reference model for container tests.
//!
//! - [`shuffled_keys`]: `0..n` in a seeded random order.
//! - [`random_keys`]: `n` seeded draws from a bounded key space, with
//!   repeats.
//! - [`word_keys`]: short lowercase words for string-keyed tests.
//! - [`Model`]: an `IndexMap` that answers each [`Op`] the way a correct
//!   container must.

use std::hash::Hash;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `0..n` shuffled with a generator seeded by `seed`.
pub fn shuffled_keys(seed: u64, n: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut keys: Vec<u64> = (0..n).collect();
    keys.shuffle(&mut rng);
    keys
}

/// `n` keys drawn uniformly from `0..space`.
///
/// Repeats are expected when `n` approaches `space`; that is what update
/// and dedup tests want.
pub fn random_keys(seed: u64, n: usize, space: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(0..space.max(1))).collect()
}

/// `n` lowercase words of 1 to 8 letters from a 6-letter alphabet.
///
/// The small alphabet makes repeats and shared prefixes common.
pub fn word_keys(seed: u64, n: usize) -> Vec<String> {
    const ALPHABET: &[u8] = b"abcdef";
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let len = rng.random_range(1..=8);
            (0..len)
                .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
                .collect()
        })
        .collect()
}

/// One container operation, for model-based tests.
#[derive(Clone, Debug, PartialEq)]
pub enum Op<K, V> {
    Set(K, V),
    Delete(K),
    Clear,
}

/// Reference map answering [`Op`]s.
#[derive(Clone, Debug, Default)]
pub struct Model<K, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq + Clone, V: Clone> Model<K, V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Apply `op` and return what a correct container returns for it: the
    /// previous value for `Set` and `Delete`, `None` for `Clear`.
    pub fn apply(&mut self, op: &Op<K, V>) -> Option<V> {
        match op {
            Op::Set(k, v) => self.entries.insert(k.clone(), v.clone()),
            Op::Delete(k) => self.entries.swap_remove(k),
            Op::Clear => {
                self.entries.clear();
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order, with deletes swap-removed.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}
