//! "Press Enter inside a paragraph": one sibling gains a child while the
//! immediately preceding sibling's text truncates at the split point.

use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;
use crate::model::{EditorState, NodeKey};

use super::diffutil::contiguous_new_children;
use super::insert_common::{insertion_anchor, plan_and_apply_insert};

pub fn try_apply(ctx: &mut PathContext) -> Result<bool, ReconcileError> {
    let dirty = ctx.next.dirty_set();
    if dirty.is_empty() || dirty.len() > 2 {
        return Ok(false);
    }

    let mut split_parent = None;
    for &key in dirty.keys() {
        if let (Some(p), Some(n)) = (ctx.prev.node(key), ctx.next.node(key)) {
            if let Some((insert_index, 1)) = contiguous_new_children(p.children(), n.children()) {
                if insert_index > 0 {
                    split_parent = Some((key, insert_index));
                    break;
                }
            }
        }
    }
    let Some((parent, insert_index)) = split_parent else {
        return Ok(false);
    };

    let prev_parent = ctx.prev.node(parent).unwrap();
    let next_parent = ctx.next.node(parent).unwrap();
    let prev_children = prev_parent.children().to_vec();
    let sibling = prev_children[insert_index - 1];
    let new_child = next_parent.children()[insert_index];

    let Some(truncated_key) = find_truncated_descendant(ctx.prev, ctx.next, sibling) else {
        return Ok(false);
    };
    for &key in dirty.keys() {
        if key != parent && key != truncated_key {
            return Ok(false);
        }
    }

    let item = *ctx
        .range_index
        .get(truncated_key)
        .ok_or(ReconcileError::UnknownKey)?;
    let base = ctx
        .range_index
        .absolute_location(truncated_key)
        .ok_or(ReconcileError::UnknownKey)?;
    let text_start = base + item.preamble_length + item.children_length;
    let prev_text_len = ctx.prev.node(truncated_key).unwrap().text().len();
    let next_text_len = ctx.next.node(truncated_key).unwrap().text().len();
    let text_delta = next_text_len as i64 - prev_text_len as i64;

    ctx.emit(Instruction::Delete {
        range: text_start + next_text_len..text_start + prev_text_len,
        origin: Some(truncated_key),
    });

    let mut updated = item;
    updated.text_length = next_text_len;
    ctx.range_index.insert_item(truncated_key, updated);
    if let Some(ancestor) = ctx.next.node(truncated_key).and_then(|n| n.parent()) {
        ctx.range_index.propagate_children_delta(ancestor, text_delta, ctx.next);
    }
    ctx.range_index.shift_suffix(sibling, text_delta);
    ctx.range_index.materialize_fenwick();

    let anchor = insertion_anchor(ctx, parent, &prev_children, insert_index)?;
    plan_and_apply_insert(ctx, parent, anchor, &[new_child], sibling)?;

    Ok(true)
}

fn find_truncated_descendant(
    prev: &dyn EditorState,
    next: &dyn EditorState,
    root: NodeKey,
) -> Option<NodeKey> {
    let mut stack = vec![root];
    let mut found = None;
    while let Some(key) = stack.pop() {
        let (Some(p), Some(n)) = (prev.node(key), next.node(key)) else {
            continue;
        };
        if p.text() != n.text() {
            let is_truncation = n.text().len() < p.text().len() && p.text().starts_with(n.text());
            if !is_truncation || found.is_some() {
                return None;
            }
            found = Some(key);
        }
        stack.extend(p.children().iter().copied());
    }
    found
}
