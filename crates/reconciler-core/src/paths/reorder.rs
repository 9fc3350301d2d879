//! Same child key-set, different order: rebuild the children region in
//! one replace and recompute locations in the new order.
//!
//! The buffer bytes for a reordered child physically move regardless of
//! how cleverly the index bookkeeping is done, so this path always does a
//! full delete+insert replace of the children region rather than a
//! minimal-moves LIS plan — not worth the added complexity at this
//! path's call frequency.

use crate::buffer::AttributedString;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;

use super::diffutil::same_key_set_reordered;
use super::{collect_attribute_instructions, subtree_plain_text};

pub fn try_apply(ctx: &mut PathContext) -> Result<bool, ReconcileError> {
    if ctx.next.dirty_set().len() != 1 {
        return Ok(false);
    }
    let parent = *ctx.next.dirty_set().keys().next().unwrap();
    let (Some(prev_parent), Some(next_parent)) = (ctx.prev.node(parent), ctx.next.node(parent)) else {
        return Ok(false);
    };
    if !same_key_set_reordered(prev_parent.children(), next_parent.children()) {
        return Ok(false);
    }

    // recompute_subtree/renumber below write and read absolute locations
    // directly; any pending Fenwick delta from an earlier lazy-mode edit
    // must be folded in first or the freshly renumbered children would
    // double-count it.
    ctx.range_index.materialize_fenwick();

    let next_children = next_parent.children().to_vec();
    let children_range = ctx
        .range_index
        .children_range(parent)
        .ok_or(ReconcileError::UnknownKey)?;

    let mut combined = String::new();
    for &child in &next_children {
        combined.push_str(&subtree_plain_text(ctx.next, child));
    }

    if !children_range.is_empty() {
        ctx.emit(Instruction::Delete {
            range: children_range.clone(),
            origin: Some(parent),
        });
    }
    if !combined.is_empty() {
        ctx.emit(Instruction::Insert {
            at: children_range.start,
            text: AttributedString::plain(combined),
            origin: Some(parent),
        });
    }

    let mut cursor = children_range.start;
    for &child in &next_children {
        let len = ctx.range_index.recompute_subtree(child, cursor, ctx.next)?;
        collect_attribute_instructions(ctx.next, child, cursor, ctx.instructions);
        cursor += len;
    }
    ctx.range_index.renumber(&next_children);

    Ok(true)
}
