// Lookup performance benchmarks for tr13

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use tr13::{load_trie, load_trie_buffer, write_trie, BuildOptions, TrieBuilder, VIntValues};

fn trie_file(size: usize) -> (Vec<u8>, Vec<String>) {
    let keys: Vec<String> = (0..size).map(|i| format!("key{:08}", i * 3)).collect();
    let mut builder = TrieBuilder::<VIntValues>::new(BuildOptions::default()).unwrap();
    for (i, key) in keys.iter().enumerate() {
        builder.add(key.as_bytes(), i as u64).unwrap();
    }
    let mut file = Vec::new();
    write_trie(&builder.finish().unwrap(), &mut file, true).unwrap();
    (file, keys)
}

fn benchmark_random_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_hits");

    for size in [1_000, 10_000, 100_000].iter() {
        let (file, keys) = trie_file(*size);
        let array = load_trie::<VIntValues>(&file).unwrap();
        let shared = load_trie_buffer::<VIntValues>(bytes::Bytes::from(file)).unwrap();

        group.throughput(Throughput::Elements(1_000));
        group.bench_with_input(BenchmarkId::new("array", size), &keys, |b, keys| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| {
                for _ in 0..1_000 {
                    let key = &keys[rng.random_range(0..keys.len())];
                    black_box(array.find_value(key.as_bytes()).unwrap());
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("bytes", size), &keys, |b, keys| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| {
                for _ in 0..1_000 {
                    let key = &keys[rng.random_range(0..keys.len())];
                    black_box(shared.find_value(key.as_bytes()).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn benchmark_misses(c: &mut Criterion) {
    let (file, _) = trie_file(100_000);
    let trie = load_trie::<VIntValues>(&file).unwrap();

    c.bench_function("random_misses", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| {
            for _ in 0..1_000 {
                // Only multiples of 3 are stored
                let key = format!("key{:08}", rng.random_range(0..100_000) * 3 + 1);
                black_box(trie.find_value(key.as_bytes()).unwrap());
            }
        });
    });
}

#[cfg(feature = "mmap")]
fn benchmark_mapped(c: &mut Criterion) {
    let (file, keys) = trie_file(100_000);
    let temp_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), &file).unwrap();
    let trie = tr13::open_mapped_trie::<VIntValues, _>(temp_file.path()).unwrap();

    c.bench_function("mapped_hits", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        b.iter(|| {
            for _ in 0..1_000 {
                let key = &keys[rng.random_range(0..keys.len())];
                black_box(trie.find_value(key.as_bytes()).unwrap());
            }
        });
    });
}

#[cfg(not(feature = "mmap"))]
fn benchmark_mapped(_c: &mut Criterion) {}

criterion_group!(benches, benchmark_random_hits, benchmark_misses, benchmark_mapped);
criterion_main!(benches);
