//! Empty buffer, first reconcile for this index: build the whole tree
//! from scratch rather than diffing against a nonexistent previous state.

use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;

use super::{collect_attribute_instructions, collect_block_attribute_instructions, subtree_plain_text};

pub fn try_apply(ctx: &mut PathContext) -> Result<bool, ReconcileError> {
    if !ctx.range_index.is_empty() {
        return Ok(false);
    }

    let root = ctx.next.root_key();
    ctx.range_index.set_root(root);

    let text = subtree_plain_text(ctx.next, root);
    if !text.is_empty() {
        ctx.emit(Instruction::Insert {
            at: 0,
            text: crate::buffer::AttributedString::plain(text),
            origin: Some(root),
        });
    }

    ctx.range_index.recompute_subtree(root, 0, ctx.next)?;
    collect_attribute_instructions(ctx.next, root, 0, ctx.instructions);
    collect_block_attribute_instructions(ctx.next, root, ctx.instructions);

    Ok(true)
}
