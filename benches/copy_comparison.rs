// Node copying versus path copying
//
// Builds the same workloads with:
// - PlainTree: unbalanced, node copying
// - BalancedTree: red-black, node copying
// - PathCopySet: unbalanced, full path copying

use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use palimpsest::BalancedTree;
use palimpsest::PlainTree;
use palimpsest::SearchTree;
use palimpsest::Timeline;
use palimpsest::Version;
use path_copy::PathCopySet;

// =============================================================================
// Workloads
// =============================================================================

/// Random keys, mostly inserts.
fn mixed_ops(count: usize, seed: u64) -> Vec<(bool, u32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    return (0..count)
        .map(|_| (rng.gen_bool(0.7), rng.gen_range(0..count as u32)))
        .collect();
}

fn run_plain(ops: &[(bool, u32)]) -> PlainTree<u32, Timeline> {
    let mut tree: PlainTree<u32, Timeline> = PlainTree::new();
    for &(insert, key) in ops {
        match insert {
            true => tree.insert(key).unwrap(),
            false => tree.delete(&key).unwrap(),
        };
    }
    return tree;
}

fn run_balanced(ops: &[(bool, u32)]) -> BalancedTree<u32, Timeline> {
    let mut tree: BalancedTree<u32, Timeline> = BalancedTree::new();
    for &(insert, key) in ops {
        match insert {
            true => tree.insert(key).unwrap(),
            false => tree.delete(&key).unwrap(),
        };
    }
    return tree;
}

fn run_path_copy(ops: &[(bool, u32)]) -> PathCopySet<u32> {
    let mut set = PathCopySet::new();
    for &(insert, key) in ops {
        match insert {
            true => set.insert(key),
            false => set.delete(&key),
        };
    }
    return set;
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_random_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_updates");
    for size in [1_000, 10_000] {
        let ops = mixed_ops(size, 42);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("PlainTree", size), &ops, |b, ops| {
            b.iter(|| black_box(run_plain(ops)));
        });
        group.bench_with_input(BenchmarkId::new("BalancedTree", size), &ops, |b, ops| {
            b.iter(|| black_box(run_balanced(ops)));
        });
        group.bench_with_input(BenchmarkId::new("PathCopySet", size), &ops, |b, ops| {
            b.iter(|| black_box(run_path_copy(ops)));
        });
    }
    group.finish();
}

fn bench_sorted_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_inserts");
    for size in [500, 2_000] {
        let ops: Vec<(bool, u32)> = (0..size as u32).map(|key| (true, key)).collect();
        group.throughput(Throughput::Elements(size as u64));

        // Path copying pays for the whole spine on every insert.
        group.bench_with_input(BenchmarkId::new("PlainTree", size), &ops, |b, ops| {
            b.iter(|| black_box(run_plain(ops)));
        });
        group.bench_with_input(BenchmarkId::new("BalancedTree", size), &ops, |b, ops| {
            b.iter(|| black_box(run_balanced(ops)));
        });
        group.bench_with_input(BenchmarkId::new("PathCopySet", size), &ops, |b, ops| {
            b.iter(|| black_box(run_path_copy(ops)));
        });
    }
    group.finish();
}

fn bench_historical_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("historical_reads");
    let size = 10_000;
    let ops = mixed_ops(size, 7);
    let tree = run_balanced(&ops);
    let set = run_path_copy(&ops);
    let mut rng = StdRng::seed_from_u64(3);
    let lookups: Vec<(u32, u32)> = (0..1_000)
        .map(|_| (rng.gen_range(0..=size as u32), rng.gen_range(0..size as u32)))
        .collect();

    group.bench_function("BalancedTree", |b| {
        b.iter(|| {
            for &(version, key) in &lookups {
                black_box(tree.contains(&key, Version(version)).unwrap());
            }
        });
    });
    group.bench_function("PathCopySet", |b| {
        b.iter(|| {
            for &(version, key) in &lookups {
                black_box(set.contains(&key, version as usize));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_random_updates, bench_sorted_inserts, bench_historical_reads);
criterion_main!(benches);
