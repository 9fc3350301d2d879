//! Every dirty node keeps its text, preamble, postamble and child keys
//! exactly as they were; only style attributes differ. No length change
//! anywhere, so no shift is ever needed — just repaint the parts whose
//! attribute map changed.

use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;
use crate::model::NodeKey;

pub fn try_apply(ctx: &mut PathContext) -> Result<bool, ReconcileError> {
    let dirty: Vec<NodeKey> = ctx.next.dirty_set().keys().copied().collect();
    if dirty.is_empty() {
        return Ok(false);
    }

    for &key in &dirty {
        let (Some(prev), Some(next)) = (ctx.prev.node(key), ctx.next.node(key)) else {
            return Ok(false);
        };
        if prev.children() != next.children()
            || prev.preamble() != next.preamble()
            || prev.text() != next.text()
            || prev.postamble() != next.postamble()
        {
            return Ok(false);
        }
    }

    let mut emitted = 0;
    for &key in &dirty {
        let prev = ctx.prev.node(key).unwrap();
        let next = ctx.next.node(key).unwrap();
        if prev.style_attributes() == next.style_attributes() {
            continue;
        }
        emitted += repaint(ctx, key)?;
    }

    Ok(emitted > 0)
}

fn repaint(ctx: &mut PathContext, key: NodeKey) -> Result<usize, ReconcileError> {
    let next = ctx.next.node(key).ok_or(ReconcileError::UnknownKey)?;
    let attrs = next.style_attributes().clone();
    let mut count = 0;

    if let Some(range) = ctx.range_index.preamble_range(key) {
        if !range.is_empty() {
            ctx.emit(Instruction::SetAttributes {
                range,
                attrs: attrs.clone(),
                origin: Some(key),
            });
            count += 1;
        }
    }
    if let Some(range) = ctx.range_index.text_range(key) {
        if !range.is_empty() {
            ctx.emit(Instruction::SetAttributes {
                range,
                attrs: attrs.clone(),
                origin: Some(key),
            });
            count += 1;
        }
    }
    if let Some(range) = ctx.range_index.postamble_range(key) {
        if !range.is_empty() {
            ctx.emit(Instruction::SetAttributes {
                range,
                attrs,
                origin: Some(key),
            });
            count += 1;
        }
    }

    Ok(count)
}
