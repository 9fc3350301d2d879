use criterion::{Criterion, black_box, criterion_group, criterion_main};
use reconciler_core::range_index::RangeIndex;
use reconciler_core::testutil::many_paragraphs_tree;
use reconciler_core::model::EditorState;

fn bench_recompute_subtree(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_index_recompute_subtree");
    group.sample_size(20);

    for &n in &[100usize, 1_000] {
        let state = many_paragraphs_tree(n);
        group.bench_function(format!("{n}_paragraphs"), |b| {
            b.iter(|| {
                let mut index = RangeIndex::new(true);
                index.set_root(state.root_key());
                let len = index
                    .recompute_subtree(state.root_key(), 0, &state)
                    .unwrap();
                black_box(len);
            });
        });
    }

    group.finish();
}

fn bench_lazy_suffix_shift(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_index_suffix_shift");
    group.sample_size(20);

    let state = many_paragraphs_tree(1_000);
    let mut lazy = RangeIndex::new(true);
    lazy.set_root(state.root_key());
    lazy.recompute_subtree(state.root_key(), 0, &state).unwrap();
    let dfs = lazy.dfs_order(&state);
    let middle = dfs[dfs.len() / 2];

    group.bench_function("lazy_fenwick", |b| {
        b.iter(|| {
            lazy.shift_suffix(black_box(middle), black_box(3));
        });
    });

    let mut eager = RangeIndex::new(false);
    eager.set_root(state.root_key());
    eager.recompute_subtree(state.root_key(), 0, &state).unwrap();

    group.bench_function("eager", |b| {
        b.iter(|| {
            eager.shift_after_document_position(black_box(middle), black_box(3), &state);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_recompute_subtree, bench_lazy_suffix_shift);
criterion_main!(benches);
