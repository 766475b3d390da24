//! Batch deduplication with one arena reused across batches.
//!
//! Demonstrates: size an arena → dedup a batch with a `Set` → record the
//! unique keys in a `Map` → reset the arena → repeat. Run with
//! `RUST_LOG=debug` to see map growth and arena buffer events.

use bumpmap::arena::Arena;
use bumpmap::map::{Map, MapOptions, Set};
use bumpmap_bench::{arena_config_for, dedup_batch};

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== bumpmap batch dedup example ===\n");

    let batch_size = 200_000;
    let distinct = 20_000;
    let mut arena = Arena::with_config(arena_config_for(distinct as usize * 2)).unwrap();

    for round in 0..5u64 {
        let batch = dedup_batch(round, batch_size, distinct);
        let (unique, first_seen) = {
            let mut seen = Set::<u64>::new(&arena, MapOptions::default()).unwrap();
            let mut first_seen = Map::<u64, u32>::new(&arena, MapOptions::default()).unwrap();
            for (pos, &key) in batch.iter().enumerate() {
                if seen.add(key).unwrap() {
                    first_seen.set(key, pos as u32).unwrap();
                }
            }
            let mut earliest = u32::MAX;
            first_seen.scan(|_, pos| {
                earliest = earliest.min(pos);
                true
            });
            assert_eq!(seen.len(), first_seen.len());
            (seen.len(), earliest)
        };

        let stats = arena.stats();
        println!(
            "round {round}: {unique:>6} unique of {batch_size} \
             (first new key at {first_seen}), arena used {} KiB in {} buffer(s)",
            stats.allocated_bytes / 1024,
            stats.buffer_count,
        );
        arena.reset();
    }

    arena.release();
    println!("\nreleased: {}", arena.is_released());
}
