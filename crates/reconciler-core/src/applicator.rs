//! The Applicator (spec §4.4): batches the instruction stream into one
//! editing session, applies text-changing operations in descending
//! target-location order (delete → insert → set-attributes at ties, by
//! original emission index beyond that), then a single `fix_attributes`
//! pass, then routes decorator/block-attribute instructions to the
//! Frontend under its no-animation scope.

use std::ops::Range;
use std::time::Instant;

use crate::buffer::Buffer;
use crate::frontend::Frontend;
use crate::instruction::{Instruction, Stats};

pub fn apply(
    buffer: &mut dyn Buffer,
    frontend: &mut dyn Frontend,
    instructions: Vec<Instruction>,
    path_label: &'static str,
    dirty_nodes: usize,
) -> Stats {
    let start = Instant::now();
    let total = instructions.len();

    let (deferred, mut text_ops): (Vec<Instruction>, Vec<Instruction>) =
        instructions.into_iter().partition(|i| i.is_deferred_to_frontend());

    // Stable sort with an explicit emission-index tiebreak: descending
    // location keeps every not-yet-applied instruction's coordinates
    // valid, since nothing earlier in the buffer has moved yet.
    let mut indexed: Vec<(usize, Instruction)> = text_ops.drain(..).enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        let (loc_a, prio_a) = a.sort_key();
        let (loc_b, prio_b) = b.sort_key();
        loc_b.cmp(&loc_a).then(prio_a.cmp(&prio_b)).then(ia.cmp(ib))
    });

    buffer.begin_editing();

    let mut touched: Option<Range<usize>> = None;
    let mut ranges_added = 0usize;
    let mut ranges_deleted = 0usize;
    for (_, instr) in indexed {
        let current_length = buffer.length();
        match instr {
            Instruction::Insert { at, text, .. } => {
                let at = at.min(current_length);
                extend_touched(&mut touched, at..at + text.len());
                buffer.insert(&text, at);
                ranges_added += 1;
            }
            Instruction::Delete { range, .. } => {
                let range = clamp(range, current_length);
                extend_touched(&mut touched, range.clone());
                buffer.delete_characters(range);
                ranges_deleted += 1;
            }
            Instruction::Replace { range, with, .. } => {
                let range = clamp(range, current_length);
                extend_touched(&mut touched, range.start..range.start + with.len());
                buffer.replace_characters(range, &with);
                ranges_deleted += 1;
                ranges_added += 1;
            }
            Instruction::SetAttributes { range, attrs, .. } => {
                let range = clamp(range, current_length);
                extend_touched(&mut touched, range.clone());
                buffer.set_attributes(&attrs, range);
            }
            Instruction::DecoratorCreate { .. }
            | Instruction::DecoratorRemove { .. }
            | Instruction::DecoratorRedecorate { .. }
            | Instruction::ApplyBlockAttrs { .. } => {
                unreachable!("deferred instructions were partitioned out above")
            }
        }
    }

    if let Some(range) = touched {
        let range = clamp(range, buffer.length());
        buffer.fix_attributes(range);
    }

    buffer.end_editing();

    for instr in deferred {
        match instr {
            Instruction::DecoratorCreate { key } => frontend.create_decorator_view(key),
            Instruction::DecoratorRemove { key } => frontend.remove_decorator_view(key),
            Instruction::DecoratorRedecorate { key } => frontend.redecorate(key),
            Instruction::ApplyBlockAttrs { key, attrs } => frontend.apply_block_attributes(key, &attrs),
            _ => unreachable!("only deferred instructions reach this loop"),
        }
    }

    log::debug!("applicator: path={path_label} instructions={total} dirty_nodes={dirty_nodes}");

    Stats {
        path_label,
        dirty_nodes,
        ranges_added,
        ranges_deleted,
        instructions_emitted: total,
        duration_micros: start.elapsed().as_micros(),
    }
}

fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let start = range.start.min(len);
    let end = range.end.min(len).max(start);
    start..end
}

fn extend_touched(touched: &mut Option<Range<usize>>, range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    *touched = Some(match touched.take() {
        Some(existing) => existing.start.min(range.start)..existing.end.max(range.end),
        None => range,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{AttributedString, RopeBuffer};
    use crate::frontend::NullFrontend;
    use crate::model::{AttributeMap, AttributeValue};

    #[test]
    fn applies_insert_then_delete_at_descending_locations() {
        let mut buffer = RopeBuffer::new();
        let mut frontend = NullFrontend::default();
        buffer.begin_editing();
        buffer.insert(&AttributedString::plain("hello world"), 0);
        buffer.end_editing();

        let instructions = vec![
            Instruction::Delete { range: 0..6, origin: None },
            Instruction::Insert {
                at: 11,
                text: AttributedString::plain("!"),
                origin: None,
            },
        ];
        apply(&mut buffer, &mut frontend, instructions, "test", 1);
        assert_eq!(buffer.text(), "world!");
    }

    #[test]
    fn routes_decorator_instructions_to_frontend_after_text_ops() {
        let mut buffer = RopeBuffer::new();
        let mut frontend = NullFrontend::default();
        let key = crate::model::NodeKey(7);
        let mut attrs = AttributeMap::new();
        attrs.insert("bold".into(), AttributeValue::Bool(true));

        let instructions = vec![
            Instruction::Insert {
                at: 0,
                text: AttributedString::plain("x"),
                origin: None,
            },
            Instruction::DecoratorCreate { key },
            Instruction::ApplyBlockAttrs { key, attrs: attrs.clone() },
        ];
        let stats = apply(&mut buffer, &mut frontend, instructions, "test", 0);
        assert_eq!(buffer.text(), "x");
        assert_eq!(frontend.created, vec![key]);
        assert_eq!(frontend.block_attrs, vec![(key, attrs)]);
        assert_eq!(stats.instructions_emitted, 3);
    }
}
