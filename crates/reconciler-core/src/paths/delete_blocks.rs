//! Contiguous direct-child removal, with selection-clamp support and
//! boundary preamble/postamble fixups on the surviving neighbors.

use crate::buffer::AttributedString;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;
use crate::model::{EditorState, NodeKey};
use crate::range_index::RangeIndex;

use super::diffutil::contiguous_removed_children;

pub fn try_apply(ctx: &mut PathContext) -> Result<bool, ReconcileError> {
    if ctx.next.dirty_set().len() != 1 {
        return Ok(false);
    }
    let parent = *ctx.next.dirty_set().keys().next().unwrap();
    let (Some(prev_parent), Some(next_parent)) = (ctx.prev.node(parent), ctx.next.node(parent)) else {
        return Ok(false);
    };

    let Some((remove_index, count)) =
        contiguous_removed_children(prev_parent.children(), next_parent.children())
    else {
        return Ok(false);
    };
    for &key in next_parent.children() {
        if let (Some(p), Some(n)) = (ctx.prev.node(key), ctx.next.node(key)) {
            if p.text() != n.text() {
                return Ok(false);
            }
        }
    }

    let prev_children = prev_parent.children().to_vec();
    let removed: Vec<NodeKey> = prev_children[remove_index..remove_index + count].to_vec();
    let first = removed[0];
    let last = *removed.last().unwrap();

    let first_base = ctx
        .range_index
        .absolute_location(first)
        .ok_or(ReconcileError::UnknownKey)?;
    let last_base = ctx
        .range_index
        .absolute_location(last)
        .ok_or(ReconcileError::UnknownKey)?;
    let last_item = *ctx.range_index.get(last).ok_or(ReconcileError::UnknownKey)?;
    let mut delete_range = first_base..last_base + last_item.entire_length();

    if let Some(clamp) = ctx.options.deletion_clamp_range.clone() {
        let mut start = delete_range.start.max(clamp.start).min(delete_range.end);
        let end = delete_range.end.min(clamp.end).max(delete_range.start);
        if clamp.start < delete_range.start {
            start = clamp.start;
        }
        delete_range = start..end.max(start);
    }

    let delta = -((delete_range.end - delete_range.start) as i64);
    if !delete_range.is_empty() {
        ctx.emit(Instruction::Delete {
            range: delete_range,
            origin: Some(parent),
        });
    }

    ctx.range_index.shift_after_document_position(last, delta, ctx.prev);

    for &key in &removed {
        purge_subtree(ctx.range_index, ctx.prev, key);
    }

    ctx.range_index.propagate_children_delta(parent, delta, ctx.next);

    if remove_index > 0 {
        fixup_boundary_postamble(ctx, prev_children[remove_index - 1])?;
    }
    if remove_index + count < prev_children.len() {
        fixup_boundary_preamble(ctx, prev_children[remove_index + count])?;
    }

    Ok(true)
}

fn purge_subtree(index: &mut RangeIndex, prev: &dyn EditorState, key: NodeKey) {
    if let Some(node) = prev.node(key) {
        for &child in node.children() {
            purge_subtree(index, prev, child);
        }
    }
    index.remove_item(key);
}

/// Surviving left neighbor of a removed block may pick up a new trailing
/// separator it previously lacked as a non-last child.
fn fixup_boundary_postamble(ctx: &mut PathContext, neighbor: NodeKey) -> Result<(), ReconcileError> {
    let (Some(old_node), Some(new_node)) = (ctx.prev.node(neighbor), ctx.next.node(neighbor)) else {
        return Ok(());
    };
    if old_node.postamble() == new_node.postamble() {
        return Ok(());
    }
    let item = *ctx.range_index.get(neighbor).ok_or(ReconcileError::UnknownKey)?;
    let base = ctx
        .range_index
        .absolute_location(neighbor)
        .ok_or(ReconcileError::UnknownKey)?;
    let post_range = item.postamble_range(base);
    let new_postamble = new_node.postamble().to_string();
    let delta = new_postamble.len() as i64 - old_node.postamble().len() as i64;

    if !post_range.is_empty() {
        ctx.emit(Instruction::Delete {
            range: post_range.clone(),
            origin: Some(neighbor),
        });
    }
    if !new_postamble.is_empty() {
        ctx.emit(Instruction::Insert {
            at: post_range.start,
            text: AttributedString::new(new_postamble.clone(), new_node.style_attributes().clone()),
            origin: Some(neighbor),
        });
    }

    ctx.range_index.shift_after_document_position(neighbor, delta, ctx.next);
    let mut updated = *ctx.range_index.get(neighbor).ok_or(ReconcileError::UnknownKey)?;
    updated.postamble_length = new_postamble.len();
    ctx.range_index.insert_item(neighbor, updated);
    if let Some(parent) = new_node.parent() {
        ctx.range_index.propagate_children_delta(parent, delta, ctx.next);
    }

    Ok(())
}

/// Surviving right neighbor of a removed block may pick up a new leading
/// marker it previously lacked as a non-first child.
fn fixup_boundary_preamble(ctx: &mut PathContext, neighbor: NodeKey) -> Result<(), ReconcileError> {
    let (Some(old_node), Some(new_node)) = (ctx.prev.node(neighbor), ctx.next.node(neighbor)) else {
        return Ok(());
    };
    if old_node.preamble() == new_node.preamble() {
        return Ok(());
    }
    let item = *ctx.range_index.get(neighbor).ok_or(ReconcileError::UnknownKey)?;
    let base = ctx
        .range_index
        .absolute_location(neighbor)
        .ok_or(ReconcileError::UnknownKey)?;
    let pre_range = item.preamble_range(base);
    let new_preamble = new_node.preamble().to_string();
    let delta = new_preamble.len() as i64 - old_node.preamble().len() as i64;

    if !pre_range.is_empty() {
        ctx.emit(Instruction::Delete {
            range: pre_range.clone(),
            origin: Some(neighbor),
        });
    }
    if !new_preamble.is_empty() {
        ctx.emit(Instruction::Insert {
            at: pre_range.start,
            text: AttributedString::new(new_preamble.clone(), new_node.style_attributes().clone()),
            origin: Some(neighbor),
        });
    }

    ctx.range_index.shift_after_document_position(neighbor, delta, ctx.next);
    let mut updated = *ctx.range_index.get(neighbor).ok_or(ReconcileError::UnknownKey)?;
    updated.preamble_length = new_preamble.len();
    ctx.range_index.insert_item(neighbor, updated);
    if let Some(parent) = new_node.parent() {
        ctx.range_index.propagate_children_delta(parent, delta, ctx.next);
    }

    Ok(())
}
