//! IME marked-text handling. Invoked directly by the classifier ahead of
//! the ordinary dispatch ladder whenever the caller supplies a
//! `MarkedTextOperation`, since composition owns the buffer and the
//! selection for the duration of one marked-text edit regardless of what
//! else changed in the tree.

use crate::buffer::AttributedString;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::frontend::Frontend;
use crate::instruction::Instruction;
use crate::model::{Direction, NodeKey};

/// The node whose text the marked replacement landed in. Exposed so
/// `reconcile` can skip selection projection for this call regardless of
/// `ReconcileOptions::reconcile_selection` — composition owns the
/// selection until the marked text commits.
pub struct CompositionOutcome {
    pub node: NodeKey,
    pub suppress_selection: bool,
}

pub fn apply(ctx: &mut PathContext, frontend: &mut dyn Frontend) -> Result<CompositionOutcome, ReconcileError> {
    let op = ctx
        .options
        .marked_text_op
        .clone()
        .expect("composition::apply called without a marked_text_op");

    let point = ctx
        .range_index
        .resolve(op.replacement_range.start, Direction::Forward, ctx.next)?;
    let node_key = point.key;

    let node = ctx.next.node(node_key).ok_or(ReconcileError::UnknownKey)?;
    let attrs = node.style_attributes().clone();
    let marked = AttributedString::new(op.marked_string.clone(), attrs);

    if !op.replacement_range.is_empty() {
        ctx.emit(Instruction::Delete {
            range: op.replacement_range.clone(),
            origin: Some(node_key),
        });
    }
    if !marked.is_empty() {
        ctx.emit(Instruction::Insert {
            at: op.replacement_range.start,
            text: marked,
            origin: Some(node_key),
        });
    }

    let delta = op.marked_string.len() as i64 - (op.replacement_range.end - op.replacement_range.start) as i64;
    if let Some(mut item) = ctx.range_index.get(node_key).copied() {
        item.text_length = (item.text_length as i64 + delta).max(0) as usize;
        ctx.range_index.insert_item(node_key, item);
    }
    if let Some(parent) = node.parent() {
        ctx.range_index.propagate_children_delta(parent, delta, ctx.next);
    }
    ctx.range_index.shift_suffix(node_key, delta);

    frontend.set_marked_text(
        &AttributedString::new(op.marked_string.clone(), node.style_attributes().clone()),
        op.marked_internal_selection.clone(),
    );

    Ok(CompositionOutcome {
        node: node_key,
        suppress_selection: op.create_marked,
    })
}
