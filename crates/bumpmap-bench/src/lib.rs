//! Workload profiles and utilities for benchmarking bumpmap.
//!
//! Provides deterministic key workloads for the criterion benches and the
//! `dedup` example:
//!
//! - [`reference_workload`]: 10K distinct keys plus a half-hit probe set
//! - [`stress_workload`]: 1M distinct keys, same shape
//! - [`dedup_batch`]: a batch with heavy repeats
//! - [`arena_config_for`]: an arena sized to hold a map of `n` entries

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use bumpmap::arena::{Arena, ArenaConfig, ArenaError};
use bumpmap::map::{MapOptions, Set};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Keys to insert and keys to look up.
#[derive(Clone, Debug)]
pub struct Workload {
    /// Distinct keys in insertion order.
    pub keys: Vec<u64>,
    /// Lookup keys; about half are present in `keys`.
    pub probes: Vec<u64>,
}

/// 10K distinct keys, 10K probes.
pub fn reference_workload(seed: u64) -> Workload {
    workload(seed, 10_000)
}

/// 1M distinct keys, 1M probes.
pub fn stress_workload(seed: u64) -> Workload {
    workload(seed, 1_000_000)
}

fn workload(seed: u64, n: usize) -> Workload {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    // Spread keys over a sparse space so hashes see more than small ints.
    let mut keys: Vec<u64> = (0..n as u64 * 2)
        .map(|k| k.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .collect();
    keys.shuffle(&mut rng);
    let probes = keys.iter().copied().step_by(2).take(n).collect();
    keys.truncate(n);
    Workload { keys, probes }
}

/// `n` keys drawn from `0..distinct`, so most keys repeat.
pub fn dedup_batch(seed: u64, n: usize, distinct: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(0..distinct.max(1))).collect()
}

/// Arena configuration large enough for a `u64 -> u64` map of `entries`
/// entries, counting every table left behind by growth.
pub fn arena_config_for(entries: usize) -> ArenaConfig {
    // Largest table at load factor 0.85, 24-byte slots, and the smaller
    // tables before it sum to less than one more.
    let slots = ((entries as f64 / MapOptions::DEFAULT_LOAD_FACTOR) as usize + 1)
        .next_power_of_two()
        .max(MapOptions::DEFAULT_CAPACITY);
    let table_bytes = slots * 24;
    ArenaConfig::new(table_bytes.max(ArenaConfig::DEFAULT_BUFFER_SIZE), 4)
}

/// Count distinct keys in `batch` with an arena-backed [`Set`].
pub fn dedup_with_set(arena: &Arena, batch: &[u64]) -> Result<usize, ArenaError> {
    let mut set = Set::<u64>::new(arena, MapOptions::default())?;
    for &key in batch {
        set.add(key)?;
    }
    let distinct = set.len();
    tracing::debug!(batch = batch.len(), distinct, capacity = set.capacity(), "dedup done");
    set.release();
    Ok(distinct)
}
