//! Fast paths and shared helpers. Each `try_apply` returns `Ok(false)` on
//! a precondition mismatch rather than an error — only the classifier
//! decides what that means.

pub mod attribute_only;
pub mod delete_blocks;
mod diffutil;
pub mod fresh_hydration;
mod insert_common;
pub mod multi_insert;
pub mod paragraph_split;
pub mod reorder;
pub mod selection_only;
pub mod single_insert;
pub mod slow_path;
pub mod text_only;

use crate::instruction::Instruction;
use crate::model::{EditorState, NodeKey};

/// Concatenation of a subtree's preamble/children/text/postamble, plain
/// (no attributes) — attributes are painted separately via
/// `collect_attribute_instructions` since a single `Insert` only carries
/// one uniform attribute map.
pub fn subtree_plain_text(state: &dyn EditorState, key: NodeKey) -> String {
    let mut out = String::new();
    append_subtree_text(state, key, &mut out);
    out
}

fn append_subtree_text(state: &dyn EditorState, key: NodeKey, out: &mut String) {
    let Some(node) = state.node(key) else { return };
    out.push_str(node.preamble());
    for &child in node.children() {
        append_subtree_text(state, child, out);
    }
    out.push_str(node.text());
    out.push_str(node.postamble());
}

/// Recursively emits one `SetAttributes` per non-empty preamble/text/
/// postamble part of `key`'s subtree, assuming the subtree's plain text
/// was already inserted starting at `base`. Returns the subtree's entire
/// length.
pub fn collect_attribute_instructions(
    state: &dyn EditorState,
    key: NodeKey,
    base: usize,
    out: &mut Vec<Instruction>,
) -> usize {
    let Some(node) = state.node(key) else { return 0 };
    let mut cursor = base;
    let attrs = node.style_attributes().clone();

    let pre_len = node.preamble().len();
    if pre_len > 0 {
        out.push(Instruction::SetAttributes {
            range: cursor..cursor + pre_len,
            attrs: attrs.clone(),
            origin: Some(key),
        });
    }
    cursor += pre_len;

    for &child in node.children() {
        cursor += collect_attribute_instructions(state, child, cursor, out);
    }

    let text_len = node.text().len();
    if text_len > 0 {
        out.push(Instruction::SetAttributes {
            range: cursor..cursor + text_len,
            attrs: attrs.clone(),
            origin: Some(key),
        });
    }
    cursor += text_len;

    let post_len = node.postamble().len();
    if post_len > 0 {
        out.push(Instruction::SetAttributes {
            range: cursor..cursor + post_len,
            attrs,
            origin: Some(key),
        });
    }
    cursor += post_len;

    cursor - base
}

/// Recursively emits one `ApplyBlockAttrs` per node in `key`'s subtree
/// that carries a block-attribute bundle (spec §4.3 "one block-attributes
/// pass over the whole tree" for fresh hydration and the slow path).
pub fn collect_block_attribute_instructions(state: &dyn EditorState, key: NodeKey, out: &mut Vec<Instruction>) {
    let Some(node) = state.node(key) else { return };
    if let Some(attrs) = node.block_attributes() {
        out.push(Instruction::ApplyBlockAttrs {
            key,
            attrs: attrs.clone(),
        });
    }
    for &child in node.children() {
        collect_block_attribute_instructions(state, child, out);
    }
}
