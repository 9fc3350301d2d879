//! Contiguous K≥2 new children under one dirty element: same shape as
//! `single_insert`, folded into one combined `Insert` for locality.

use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::model::EditorState;

use super::diffutil::contiguous_new_children;
use super::insert_common::plan_and_apply_insert;

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
    if count < 2 {
        return Ok(false);
    }
    for &key in prev_parent.children() {
        if let (Some(p), Some(n)) = (ctx.prev.node(key), ctx.next.node(key)) {
            if p.text() != n.text() {
                return Ok(false);
            }
        }
    }

    let prev_children = prev_parent.children().to_vec();
    let new_children = next_parent.children()[insert_index..insert_index + count].to_vec();
    let anchor = super::insert_common::insertion_anchor(ctx, parent, &prev_children, insert_index)?;
    let shift_anchor = if insert_index > 0 {
        prev_children[insert_index - 1]
    } else {
        parent
    };
    let bulk_threshold = ctx.capabilities.bulk_insert_threshold;
    plan_and_apply_insert(ctx, parent, anchor, &new_children, shift_anchor)?;

    if count >= bulk_threshold {
        log::debug!("multi_insert: bulk run for {count} new children under {parent}");
    }

    Ok(true)
}
