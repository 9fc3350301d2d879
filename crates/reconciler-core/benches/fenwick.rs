use criterion::{Criterion, black_box, criterion_group, criterion_main};
use reconciler_core::fenwick::FenwickTree;

fn bench_point_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("fenwick_point_add");
    group.sample_size(50);

    group.bench_function("1000_positions", |b| {
        b.iter(|| {
            let mut tree = FenwickTree::with_capacity(1000);
            for i in 1..=1000 {
                tree.add(black_box(i), black_box(1));
            }
            black_box(tree.prefix_sum(1000));
        });
    });

    group.finish();
}

fn bench_suffix_shift(c: &mut Criterion) {
    let mut group = c.benchmark_group("fenwick_suffix_shift");
    group.sample_size(50);

    group.bench_function("range_add_10000", |b| {
        let mut tree = FenwickTree::with_capacity(10_000);
        b.iter(|| {
            tree.add_range(black_box(1), black_box(10_000), black_box(1));
        });
    });

    group.finish();
}

fn bench_prefix_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("fenwick_prefix_sum");
    group.sample_size(50);

    let mut tree = FenwickTree::with_capacity(10_000);
    for i in (1..=10_000).step_by(7) {
        tree.add(i, 3);
    }

    group.bench_function("10000_positions", |b| {
        b.iter(|| {
            let mut total = 0i64;
            for i in 1..=10_000 {
                total += tree.prefix_sum(black_box(i));
            }
            black_box(total);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_point_add, bench_suffix_shift, bench_prefix_sum);
criterion_main!(benches);
