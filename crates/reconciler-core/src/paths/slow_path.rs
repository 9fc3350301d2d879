//! Full-rebuild fallback: always correct, O(document size). Reached when
//! the caller signals `DirtyType::FullRebuild` or no fast path's
//! preconditions matched.

use crate::buffer::AttributedString;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;

use super::{collect_attribute_instructions, collect_block_attribute_instructions, subtree_plain_text};

pub fn apply(ctx: &mut PathContext) -> Result<(), ReconcileError> {
    let old_len = ctx
        .range_index
        .root()
        .and_then(|root| ctx.range_index.entire_range(root))
        .map(|range| range.end)
        .unwrap_or(0);

    if old_len > 0 {
        ctx.emit(Instruction::Delete {
            range: 0..old_len,
            origin: None,
        });
    }

    let root = ctx.next.root_key();
    let text = subtree_plain_text(ctx.next, root);
    if !text.is_empty() {
        ctx.emit(Instruction::Insert {
            at: 0,
            text: AttributedString::plain(text),
            origin: Some(root),
        });
    }

    ctx.range_index.clear();
    ctx.range_index.set_root(root);
    ctx.range_index.recompute_subtree(root, 0, ctx.next)?;
    collect_attribute_instructions(ctx.next, root, 0, ctx.instructions);
    collect_block_attribute_instructions(ctx.next, root, ctx.instructions);

    Ok(())
}
