//! Shared anchor/instruction-building logic for the single- and
//! multi-block insert paths.

use crate::buffer::AttributedString;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;
use crate::model::NodeKey;

use super::{collect_attribute_instructions, subtree_plain_text};

/// Sum of prior siblings' entire lengths plus the parent's preamble —
/// the absolute location immediately before the `insert_index`-th child.
pub fn insertion_anchor(
    ctx: &PathContext,
    parent: NodeKey,
    prev_children: &[NodeKey],
    insert_index: usize,
) -> Result<usize, ReconcileError> {
    let parent_base = ctx
        .range_index
        .absolute_location(parent)
        .ok_or(ReconcileError::UnknownKey)?;
    let parent_item = ctx.range_index.get(parent).ok_or(ReconcileError::UnknownKey)?;
    let mut anchor = parent_base + parent_item.preamble_length;
    for &sibling in &prev_children[..insert_index] {
        let item = ctx.range_index.get(sibling).ok_or(ReconcileError::UnknownKey)?;
        anchor += item.entire_length();
    }
    Ok(anchor)
}

/// Emits one combined plain-text `Insert` for `new_children` at `anchor`,
/// then per-node attribute instructions, then writes fresh RangeIndex
/// entries for each new subtree and propagates the length delta to
/// `parent`'s ancestor chain. Returns the total inserted length.
///
/// `shift_anchor` is the node everything after the insertion point must
/// shift past (the preceding sibling, or `parent` itself when inserting
/// as the first child). The shift runs, and the Fenwick tree is
/// materialized, *before* the new children get their own node indices —
/// a freshly allocated index always sorts after `shift_anchor`'s, so if
/// the shift ran afterward with pending (unmaterialized) Fenwick deltas,
/// the new subtree would be swept up in its own insertion delta.
pub fn plan_and_apply_insert(
    ctx: &mut PathContext,
    parent: NodeKey,
    anchor: usize,
    new_children: &[NodeKey],
    shift_anchor: NodeKey,
) -> Result<i64, ReconcileError> {
    let mut combined = String::new();
    for &child in new_children {
        combined.push_str(&subtree_plain_text(ctx.next, child));
    }
    let delta = combined.len() as i64;

    ctx.range_index.shift_suffix(shift_anchor, delta);
    ctx.range_index.materialize_fenwick();

    if !combined.is_empty() {
        ctx.emit(Instruction::Insert {
            at: anchor,
            text: AttributedString::plain(combined),
            origin: Some(parent),
        });
    }

    let mut cursor = anchor;
    for &child in new_children {
        let len = ctx.range_index.recompute_subtree(child, cursor, ctx.next)?;
        collect_attribute_instructions(ctx.next, child, cursor, ctx.instructions);
        cursor += len;
    }

    ctx.range_index.propagate_children_delta(parent, delta, ctx.next);
    Ok(delta)
}
