//! Pure text edit inside a single leaf node: minimal LCP/LCS replace.

use crate::buffer::AttributedString;
use crate::context::PathContext;
use crate::error::ReconcileError;
use crate::instruction::Instruction;

pub fn try_apply(ctx: &mut PathContext) -> Result<bool, ReconcileError> {
    if ctx.next.dirty_set().len() != 1 {
        return Ok(false);
    }
    let key = *ctx.next.dirty_set().keys().next().unwrap();
    let (Some(prev_node), Some(next_node)) = (ctx.prev.node(key), ctx.next.node(key)) else {
        return Ok(false);
    };
    if prev_node.parent() != next_node.parent() {
        return Ok(false);
    }
    if !prev_node.children().is_empty() || !next_node.children().is_empty() {
        return Ok(false);
    }
    if prev_node.preamble() != next_node.preamble() || prev_node.postamble() != next_node.postamble() {
        return Ok(false);
    }

    let prev_text = prev_node.text();
    let next_text = next_node.text();
    if prev_text == next_text {
        return Ok(false);
    }

    let item = *ctx.range_index.get(key).ok_or(ReconcileError::UnknownKey)?;
    let base = ctx
        .range_index
        .absolute_location(key)
        .ok_or(ReconcileError::UnknownKey)?;
    let text_start = base + item.preamble_length + item.children_length;

    let lcp = common_prefix_len(prev_text, next_text);
    let lcs = common_suffix_len(&prev_text[lcp..], &next_text[lcp..]);
    let delete_start = text_start + lcp;
    let delete_end = text_start + prev_text.len() - lcs;
    let insert_text = &next_text[lcp..next_text.len() - lcs];

    if delete_end > delete_start {
        ctx.emit(Instruction::Delete {
            range: delete_start..delete_end,
            origin: Some(key),
        });
    }
    if !insert_text.is_empty() {
        ctx.emit(Instruction::Insert {
            at: delete_start,
            text: AttributedString::new(insert_text, next_node.style_attributes().clone()),
            origin: Some(key),
        });
        ctx.emit(Instruction::SetAttributes {
            range: delete_start..delete_start + insert_text.len(),
            attrs: next_node.style_attributes().clone(),
            origin: Some(key),
        });
    }

    let delta = next_text.len() as i64 - prev_text.len() as i64;
    let mut updated = item;
    updated.text_length = next_text.len();
    ctx.range_index.insert_item(key, updated);

    if let Some(parent) = next_node.parent() {
        ctx.range_index.propagate_children_delta(parent, delta, ctx.next);
    }
    ctx.range_index.shift_suffix(key, delta);

    Ok(true)
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count();
    while len > 0 && (!a.is_char_boundary(len) || !b.is_char_boundary(len)) {
        len -= 1;
    }
    len
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    let mut len = a
        .bytes()
        .rev()
        .zip(b.bytes().rev())
        .take_while(|(x, y)| x == y)
        .count();
    while len > 0 && (!a.is_char_boundary(a.len() - len) || !b.is_char_boundary(b.len() - len)) {
        len -= 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcp_lcs_split_out_the_minimal_changed_span() {
        assert_eq!(common_prefix_len("hello", "hellox"), 5);
        assert_eq!(common_suffix_len("", "x"), 0);
        assert_eq!(common_prefix_len("abcd", "abxd"), 2);
        assert_eq!(common_suffix_len("cd", "xd"), 1);
    }

    #[test]
    fn boundary_safe_on_multibyte_text() {
        // "café" vs "cafés": shared prefix must not split the é codepoint.
        let a = "café";
        let b = "cafés";
        let lcp = common_prefix_len(a, b);
        assert!(a.is_char_boundary(lcp));
        assert!(b.is_char_boundary(lcp));
    }
}
