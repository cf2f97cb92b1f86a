//! Criterion benchmarks for flat index retrieval.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use jobmatch::constants::DEFAULT_EMBEDDING_DIM;
use jobmatch::index::FlatIpIndex;

fn pseudo_random_vector(seed: u64, dim: usize) -> Vec<f32> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..dim)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 2000) as f32 / 1000.0 - 1.0
        })
        .collect()
}

fn build_index(rows: usize) -> FlatIpIndex {
    let mut index = FlatIpIndex::new(DEFAULT_EMBEDDING_DIM).expect("non-zero dimension");
    for row in 0..rows {
        index
            .add(&pseudo_random_vector(row as u64, DEFAULT_EMBEDDING_DIM))
            .expect("matching dimension");
    }
    index
}

fn search_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_ip_search");
    let query = pseudo_random_vector(u64::MAX, DEFAULT_EMBEDDING_DIM);

    for rows in [100usize, 1_000, 10_000] {
        let index = build_index(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("top_30", rows), &index, |b, index| {
            b.iter(|| index.search(black_box(&query), black_box(30)))
        });
    }

    group.finish();
}

fn build_benchmarks(c: &mut Criterion) {
    c.bench_function("flat_ip_build_1000", |b| {
        b.iter(|| build_index(black_box(1_000)))
    });
}

criterion_group!(benches, search_benchmarks, build_benchmarks);
criterion_main!(benches);
