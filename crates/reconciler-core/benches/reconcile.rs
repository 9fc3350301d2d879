use criterion::{Criterion, black_box, criterion_group, criterion_main};
use reconciler_core::buffer::RopeBuffer;
use reconciler_core::context::ReconcileOptions;
use reconciler_core::frontend::NullFrontend;
use reconciler_core::model::{DirtyReason, EditorState, NodeKey};
use reconciler_core::reconcile::{Reconciler, ReconcilerCapabilities};
use reconciler_core::testutil::{many_paragraphs_tree, one_paragraph_tree};

fn bench_fresh_hydration(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_fresh_hydration");
    group.sample_size(20);

    for &n in &[100usize, 1_000] {
        let state = many_paragraphs_tree(n);
        group.bench_function(format!("{n}_paragraphs"), |b| {
            b.iter(|| {
                let mut reconciler = Reconciler::new(ReconcilerCapabilities::default());
                let mut buffer = RopeBuffer::new();
                let mut frontend = NullFrontend::default();
                let stats = reconciler
                    .reconcile(&mut buffer, &mut frontend, &state, &state, ReconcileOptions::default())
                    .unwrap();
                black_box(stats);
            });
        });
    }

    group.finish();
}

fn bench_steady_state_text_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_steady_state");
    group.sample_size(30);

    let prev_doc = one_paragraph_tree("hello world", "\n");
    let mut reconciler = Reconciler::new(ReconcilerCapabilities::default());
    let mut buffer = RopeBuffer::new();
    let mut frontend = NullFrontend::default();
    reconciler
        .reconcile(&mut buffer, &mut frontend, &prev_doc, &prev_doc, ReconcileOptions::default())
        .unwrap();

    group.bench_function("single_keystroke", |b| {
        b.iter(|| {
            let mut next_doc = one_paragraph_tree("hello world!", "\n");
            next_doc.mark_dirty(NodeKey(2), DirtyReason::TextChanged);
            let stats = reconciler
                .reconcile(
                    &mut buffer,
                    &mut frontend,
                    &prev_doc,
                    &next_doc,
                    ReconcileOptions {
                        reconcile_selection: true,
                        ..ReconcileOptions::default()
                    },
                )
                .unwrap();
            black_box(stats);

            // undo so the next iteration starts from the same baseline
            let mut reverted_doc = one_paragraph_tree("hello world", "\n");
            reverted_doc.mark_dirty(NodeKey(2), DirtyReason::TextChanged);
            let mut revert = NullFrontend::default();
            reconciler
                .reconcile(&mut buffer, &mut revert, &next_doc, &reverted_doc, ReconcileOptions::default())
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fresh_hydration, bench_steady_state_text_edit);
criterion_main!(benches);
