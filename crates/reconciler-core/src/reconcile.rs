//! The top-level `reconcile()` entry point (spec §5, §6.4). Owns the
//! `RangeIndex` and decorator cache across calls, enforces the
//! single-writer critical section, and wires classification, the
//! Applicator, decorator reconciliation and selection projection into
//! one pipeline.

use std::time::Instant;

use crate::applicator;
use crate::buffer::Buffer;
use crate::classify;
use crate::context::PathContext;
pub use crate::context::ReconcileOptions;
use crate::decorator::{self, DecoratorPositionCache};
use crate::error::ReconcileError;
use crate::frontend::Frontend;
use crate::instruction::Stats;
use crate::model::{Direction, EditorState, Point};
use crate::range_index::RangeIndex;
use crate::selection;

/// Tunables fixed for a reconciler's lifetime rather than varying per
/// call (spec §9 "toggle is a capability flag on the reconciler, not a
/// compile-time choice").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcilerCapabilities {
    /// `true` selects the Fenwick-backed lazy suffix shift; `false` falls
    /// back to the eager O(N) implementation. Small documents don't
    /// benefit from lazy mode (spec §9).
    pub lazy_fenwick: bool,
    /// Contiguous-insert count at or above which the multi-insert path
    /// logs a bulk-run note (spec §4.3 "Multi-block insert").
    pub bulk_insert_threshold: usize,
}

impl Default for ReconcilerCapabilities {
    fn default() -> Self {
        Self {
            lazy_fenwick: true,
            bulk_insert_threshold: 32,
        }
    }
}

/// Owns the `RangeIndex` and decorator position cache across calls. The
/// only thing that mutates either is a call to `reconcile` on this
/// struct — everything else reads (spec §5).
pub struct Reconciler {
    capabilities: ReconcilerCapabilities,
    range_index: RangeIndex,
    decorators: DecoratorPositionCache,
    in_reconcile: bool,
    last_stats: Option<Stats>,
}

impl Reconciler {
    pub fn new(capabilities: ReconcilerCapabilities) -> Self {
        Self {
            range_index: RangeIndex::new(capabilities.lazy_fenwick),
            capabilities,
            decorators: DecoratorPositionCache::new(),
            in_reconcile: false,
            last_stats: None,
        }
    }

    pub fn capabilities(&self) -> ReconcilerCapabilities {
        self.capabilities
    }

    pub fn range_index(&self) -> &RangeIndex {
        &self.range_index
    }

    pub fn decorators(&self) -> &DecoratorPositionCache {
        &self.decorators
    }

    /// The full pipeline (spec §2): classify, plan, apply, reconcile
    /// decorators, project selection. Rejects re-entrant calls — the core
    /// has no suspension points and no internal mutex (spec §5).
    pub fn reconcile(
        &mut self,
        buffer: &mut dyn Buffer,
        frontend: &mut dyn Frontend,
        prev: &dyn EditorState,
        next: &dyn EditorState,
        options: ReconcileOptions,
    ) -> Result<Stats, ReconcileError> {
        if self.in_reconcile {
            return Err(ReconcileError::BufferEditReentry);
        }
        self.in_reconcile = true;
        let result = self.reconcile_inner(buffer, frontend, prev, next, &options);
        self.in_reconcile = false;
        if let Ok(stats) = &result {
            self.last_stats = Some(stats.clone());
        }
        result
    }

    fn reconcile_inner(
        &mut self,
        buffer: &mut dyn Buffer,
        frontend: &mut dyn Frontend,
        prev: &dyn EditorState,
        next: &dyn EditorState,
        options: &ReconcileOptions,
    ) -> Result<Stats, ReconcileError> {
        let start = Instant::now();
        self.range_index.set_lazy_mode(self.capabilities.lazy_fenwick);

        let mut instructions = Vec::new();
        let dispatch = {
            let mut ctx = PathContext {
                prev,
                next,
                range_index: &mut self.range_index,
                instructions: &mut instructions,
                options,
                capabilities: &self.capabilities,
            };
            classify::dispatch(&mut ctx, frontend)?
        };

        let root = next.root_key();
        let decorator_ops = decorator::reconcile(
            root,
            prev,
            next,
            &self.range_index,
            next.dirty_set(),
            buffer,
            &mut self.decorators,
        );
        instructions.extend(decorator_ops);

        let dirty_nodes = next.dirty_set().len();
        let mut stats = applicator::apply(buffer, frontend, instructions, dispatch.path_label, dirty_nodes);
        stats.duration_micros = start.elapsed().as_micros();

        self.range_index.prune_detached(next);

        if options.reconcile_selection && !dispatch.suppress_selection {
            selection::project(&self.range_index, prev, next, frontend);
        }

        Ok(stats)
    }

    /// Maps a buffer-space location to a tree-space `Point` (spec §6.4).
    /// `state` must be the `next` snapshot from the most recent
    /// `reconcile` call — the index is only ever valid against it.
    pub fn map_location_to_point(
        &self,
        location: usize,
        direction: Direction,
        state: &dyn EditorState,
    ) -> Result<Point, ReconcileError> {
        self.range_index.resolve(location, direction, state)
    }

    /// Inverse of `map_location_to_point` (spec §6.4).
    pub fn map_point_to_location(&self, point: Point) -> Option<usize> {
        self.range_index.location_of(point)
    }

    /// The stats of the most recently completed `reconcile` call (spec
    /// §6.4 `export_metrics`), or `Stats::default()` if none has run yet.
    pub fn export_metrics(&self) -> Stats {
        self.last_stats.clone().unwrap_or_default()
    }
}
