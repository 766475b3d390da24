//! Test utilities for bumpmap development.
//!
//! Provides deterministic hash builders that pin keys to chosen slots
//! ([`IdentityState`], [`ConstantState`]) so tests can build exact probe
//! clusters, plus seeded key generators and a reference model in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::hash::{BuildHasher, Hasher};

pub mod fixtures;

pub use fixtures::{random_keys, shuffled_keys, word_keys, Model, Op};

/// Hash builder under which an integer key hashes to itself.
///
/// With a power-of-two table of capacity `c`, key `k` lands in slot
/// `k % c`, so keys `k`, `k + c`, `k + 2c` form one cluster.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityState;

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> IdentityHasher {
        IdentityHasher::default()
    }
}

/// Hasher produced by [`IdentityState`].
///
/// Each written word is folded in as `state * 31 + word`, so a single
/// integer write yields the integer itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHasher {
    state: u64,
}

impl IdentityHasher {
    fn fold(&mut self, word: u64) {
        self.state = self.state.wrapping_mul(31).wrapping_add(word);
    }
}

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.fold(u64::from(b));
        }
    }

    fn write_u8(&mut self, n: u8) {
        self.fold(u64::from(n));
    }

    fn write_u16(&mut self, n: u16) {
        self.fold(u64::from(n));
    }

    fn write_u32(&mut self, n: u32) {
        self.fold(u64::from(n));
    }

    fn write_u64(&mut self, n: u64) {
        self.fold(n);
    }

    fn write_usize(&mut self, n: usize) {
        self.fold(n as u64);
    }
}

/// Hash builder that sends every key to the same hash.
///
/// Every insert joins one cluster starting at `self.0 % capacity`, which
/// exercises wrap-around probing and backward shifts across the whole
/// table.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantState(pub u64);

impl BuildHasher for ConstantState {
    type Hasher = ConstantHasher;

    fn build_hasher(&self) -> ConstantHasher {
        ConstantHasher(self.0)
    }
}

/// Hasher produced by [`ConstantState`]. Ignores its input.
#[derive(Clone, Copy, Debug)]
pub struct ConstantHasher(u64);

impl Hasher for ConstantHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, _bytes: &[u8]) {}
}
