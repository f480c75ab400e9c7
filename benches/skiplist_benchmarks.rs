use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use skipkv::SkipList;

fn filled(n: i32) -> SkipList<i32, i32> {
    let mut list = SkipList::with_seed(18, 7);
    for i in 0..n {
        list.insert(i, i);
    }
    list
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist_insert");

    for size in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("sequential", size), &size, |b, &size| {
            b.iter(|| black_box(filled(size)))
        });

        group.bench_with_input(BenchmarkId::new("random", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut rng = SmallRng::seed_from_u64(42);
                    (0..size).map(|_| rng.gen::<i32>()).collect::<Vec<_>>()
                },
                |keys| {
                    let mut list = SkipList::with_seed(18, 7);
                    for k in keys {
                        list.insert(k, k);
                    }
                    black_box(list)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let list = filled(10_000);

    c.bench_function("skiplist_search_hit", |b| {
        b.iter(|| black_box(list.search(black_box(&5_000))))
    });

    c.bench_function("skiplist_search_miss", |b| {
        b.iter(|| black_box(list.search(black_box(&-1))))
    });
}

fn bench_remove(c: &mut Criterion) {
    c.bench_function("skiplist_remove_reinsert", |b| {
        let mut list = filled(10_000);
        b.iter(|| {
            black_box(list.remove(&5_000));
            list.insert(5_000, 5_000);
        })
    });
}

fn bench_range(c: &mut Criterion) {
    let list = filled(10_000);

    c.bench_function("skiplist_range_100", |b| {
        b.iter(|| black_box(list.range(&4_000, &4_100).count()))
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_search,
    bench_remove,
    bench_range
);

criterion_main!(benches);
