//! The state every classifier/path function shares during one reconcile.

use std::ops::Range;

use crate::instruction::Instruction;
use crate::model::{EditorState, MarkedTextOperation};
use crate::range_index::RangeIndex;
use crate::reconcile::ReconcilerCapabilities;

/// Per-call knobs the caller supplies alongside `prev`/`next`.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Whether the selection should be projected onto the new buffer
    /// state afterward. Composition suppresses this regardless of the
    /// flag's value while `marked_text_op.create_marked` is set.
    pub reconcile_selection: bool,
    pub marked_text_op: Option<MarkedTextOperation>,
    /// Caller-supplied bound on how far a deletion is allowed to reach,
    /// intersected with the computed delete range before it is applied.
    pub deletion_clamp_range: Option<Range<usize>>,
}

/// Borrowed state threaded through the classifier and every path
/// function. Built once per `reconcile` call and dropped at its end.
pub struct PathContext<'a> {
    pub prev: &'a dyn EditorState,
    pub next: &'a dyn EditorState,
    pub range_index: &'a mut RangeIndex,
    pub instructions: &'a mut Vec<Instruction>,
    pub options: &'a ReconcileOptions,
    pub capabilities: &'a ReconcilerCapabilities,
}

impl<'a> PathContext<'a> {
    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}
