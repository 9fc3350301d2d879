use criterion::{Criterion, black_box, criterion_group, criterion_main};
use reconciler_core::classify;
use reconciler_core::context::{PathContext, ReconcileOptions};
use reconciler_core::frontend::NullFrontend;
use reconciler_core::model::{DirtyReason, EditorState, NodeKey};
use reconciler_core::range_index::RangeIndex;
use reconciler_core::reconcile::ReconcilerCapabilities;
use reconciler_core::testutil::one_paragraph_tree;

/// Dispatching a single-character text edit is the hottest path in an
/// interactive editor: every keystroke runs the classifier ladder before
/// anything else happens.
fn bench_dispatch_text_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_dispatch");
    group.sample_size(50);

    let capabilities = ReconcilerCapabilities::default();
    let options = ReconcileOptions {
        reconcile_selection: false,
        marked_text_op: None,
        deletion_clamp_range: None,
    };

    group.bench_function("text_only", |b| {
        b.iter(|| {
            let prev = one_paragraph_tree("hello world", "\n");
            let mut next = one_paragraph_tree("hello world!", "\n");
            next.mark_dirty(NodeKey(2), DirtyReason::TextChanged);

            let mut range_index = RangeIndex::new(true);
            range_index.set_root(prev.root_key());
            range_index.recompute_subtree(prev.root_key(), 0, &prev).unwrap();

            let mut instructions = Vec::new();
            let mut ctx = PathContext {
                prev: &prev,
                next: &next,
                range_index: &mut range_index,
                instructions: &mut instructions,
                options: &options,
                capabilities: &capabilities,
            };
            let mut frontend = NullFrontend::default();
            let dispatch = classify::dispatch(&mut ctx, &mut frontend).unwrap();
            black_box(dispatch.path_label);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch_text_edit);
criterion_main!(benches);
