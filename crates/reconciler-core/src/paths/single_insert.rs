//! One new child under one dirty element, no reorder, no descendant text
//! delta anywhere in that subtree.

use crate::buffer::AttributedString;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;
use crate::model::{EditorState, NodeKey};

use super::diffutil::contiguous_new_children;
use super::insert_common::{insertion_anchor, plan_and_apply_insert};

pub fn try_apply(ctx: &mut PathContext) -> Result<bool, ReconcileError> {
    if ctx.next.dirty_set().len() != 1 {
        return Ok(false);
    }
    let parent = *ctx.next.dirty_set().keys().next().unwrap();
    let (Some(prev_parent), Some(next_parent)) = (ctx.prev.node(parent), ctx.next.node(parent)) else {
        return Ok(false);
    };

    let Some((insert_index, count)) =
        contiguous_new_children(prev_parent.children(), next_parent.children())
    else {
        return Ok(false);
    };
    if count != 1 {
        return Ok(false);
    }
    if has_text_delta(ctx.prev, ctx.next, prev_parent.children()) {
        return Ok(false);
    }

    let prev_children = prev_parent.children().to_vec();
    let new_child = next_parent.children()[insert_index];
    let mut anchor = insertion_anchor(ctx, parent, &prev_children, insert_index)?;

    let shift_anchor = if insert_index > 0 {
        prev_children[insert_index - 1]
    } else {
        parent
    };

    // the previous sibling's postamble may change across a split (e.g. it
    // gains a trailing separator it previously lacked as the last child).
    if insert_index > 0 {
        anchor = fixup_previous_sibling_postamble(ctx, shift_anchor, anchor)?;
    }

    plan_and_apply_insert(ctx, parent, anchor, &[new_child], shift_anchor)?;

    Ok(true)
}

fn has_text_delta(prev: &dyn EditorState, next: &dyn EditorState, prev_children: &[NodeKey]) -> bool {
    prev_children.iter().any(|&key| {
        matches!((prev.node(key), next.node(key)), (Some(p), Some(n)) if p.text() != n.text())
    })
}

/// Deletes the sibling's stale postamble and inserts its new one in place,
/// returning the (possibly shifted) insertion anchor.
pub(super) fn fixup_previous_sibling_postamble(
    ctx: &mut PathContext,
    sibling: NodeKey,
    anchor: usize,
) -> Result<usize, ReconcileError> {
    let (Some(old_node), Some(new_node)) = (ctx.prev.node(sibling), ctx.next.node(sibling)) else {
        return Ok(anchor);
    };
    if old_node.postamble() == new_node.postamble() {
        return Ok(anchor);
    }
    let item = *ctx.range_index.get(sibling).ok_or(ReconcileError::UnknownKey)?;
    let base = ctx
        .range_index
        .absolute_location(sibling)
        .ok_or(ReconcileError::UnknownKey)?;
    let post_range = item.postamble_range(base);
    let old_len = old_node.postamble().len();
    let new_postamble = new_node.postamble().to_string();
    let new_attrs = new_node.style_attributes().clone();

    if !post_range.is_empty() {
        ctx.emit(Instruction::Delete {
            range: post_range.clone(),
            origin: Some(sibling),
        });
    }
    if !new_postamble.is_empty() {
        ctx.emit(Instruction::Insert {
            at: post_range.start,
            text: AttributedString::new(new_postamble.clone(), new_attrs),
            origin: Some(sibling),
        });
    }

    let post_delta = new_postamble.len() as i64 - old_len as i64;

    // nodes after `sibling` in document order (later siblings still to be
    // inserted at, and their descendants) must pick up post_delta before
    // the new child's own range is recomputed against the buffer, the
    // same way delete_blocks shifts its boundary neighbors.
    ctx.range_index.shift_after_document_position(sibling, post_delta, ctx.next);

    let mut updated = *ctx.range_index.get(sibling).ok_or(ReconcileError::UnknownKey)?;
    updated.postamble_length = new_postamble.len();
    ctx.range_index.insert_item(sibling, updated);
    if let Some(parent) = new_node.parent() {
        ctx.range_index.propagate_children_delta(parent, post_delta, ctx.next);
    }

    Ok((anchor as i64 + post_delta) as usize)
}
