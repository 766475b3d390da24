//! Criterion micro-benchmarks for arena-backed map insert, lookup and delete,
//! with `std::collections::HashMap` as the baseline.

use std::collections::HashMap;
use std::hint::black_box;
use std::time::{Duration, Instant};

use bumpmap::arena::Arena;
use bumpmap::map::{Map, MapOptions};
use bumpmap_bench::{arena_config_for, reference_workload, stress_workload, Workload};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn arena_for(workload: &Workload) -> Arena {
    Arena::with_config(arena_config_for(workload.keys.len())).unwrap()
}

/// Benchmark: insert 10K distinct keys into a fresh map, growth included.
fn bench_insert_10k(c: &mut Criterion) {
    let workload = reference_workload(42);
    let mut group = c.benchmark_group("insert_10k");

    let mut arena = arena_for(&workload);
    group.bench_function("bumpmap", |b| {
        b.iter(|| {
            {
                let mut map = Map::<u64, u64>::new(&arena, MapOptions::default()).unwrap();
                for &key in &workload.keys {
                    map.set(key, key).unwrap();
                }
                black_box(map.len());
            }
            arena.reset();
        });
    });

    group.bench_function("std_hashmap", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for &key in &workload.keys {
                map.insert(key, key);
            }
            black_box(map.len());
        });
    });
    group.finish();
}

/// Benchmark: insert 1M distinct keys, growing through every table size.
fn bench_insert_1m(c: &mut Criterion) {
    let workload = stress_workload(42);
    let mut group = c.benchmark_group("insert_1m");
    group.sample_size(10);

    let mut arena = arena_for(&workload);
    group.bench_function("bumpmap", |b| {
        b.iter(|| {
            {
                let mut map = Map::<u64, u64>::new(&arena, MapOptions::default()).unwrap();
                for &key in &workload.keys {
                    map.set(key, key).unwrap();
                }
                black_box(map.len());
            }
            arena.reset();
        });
    });

    group.bench_function("std_hashmap", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for &key in &workload.keys {
                map.insert(key, key);
            }
            black_box(map.len());
        });
    });
    group.finish();
}

/// Benchmark: 10K lookups against a 10K-entry map, about half hitting.
fn bench_get_10k(c: &mut Criterion) {
    let workload = reference_workload(42);
    let mut group = c.benchmark_group("get_10k");

    let arena = arena_for(&workload);
    let mut map = Map::<u64, u64>::new(&arena, MapOptions::default()).unwrap();
    for &key in &workload.keys {
        map.set(key, key).unwrap();
    }
    group.bench_function("bumpmap", |b| {
        b.iter(|| {
            let hits = workload.probes.iter().filter(|&k| map.get(k).is_some()).count();
            black_box(hits);
        });
    });

    let std_map: HashMap<u64, u64> = workload.keys.iter().map(|&k| (k, k)).collect();
    group.bench_function("std_hashmap", |b| {
        b.iter(|| {
            let hits = workload.probes.iter().filter(|&k| std_map.contains_key(k)).count();
            black_box(hits);
        });
    });
    group.finish();
}

/// Benchmark: delete every key from a filled map (backward shift).
fn bench_delete_10k(c: &mut Criterion) {
    let workload = reference_workload(7);
    let mut group = c.benchmark_group("delete_10k");

    let arena = arena_for(&workload);
    let mut map = Map::<u64, u64>::new(&arena, MapOptions::default()).unwrap();
    group.bench_function("bumpmap", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                for &key in &workload.keys {
                    map.set(key, key).unwrap();
                }
                let start = Instant::now();
                for key in &workload.keys {
                    black_box(map.delete(key));
                }
                total += start.elapsed();
            }
            total
        });
    });

    group.bench_function("std_hashmap", |b| {
        b.iter_batched_ref(
            || workload.keys.iter().map(|&k| (k, k)).collect::<HashMap<u64, u64>>(),
            |std_map| {
                for key in &workload.keys {
                    black_box(std_map.remove(key));
                }
            },
            BatchSize::PerIteration,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_10k,
    bench_insert_1m,
    bench_get_10k,
    bench_delete_10k
);
criterion_main!(benches);
