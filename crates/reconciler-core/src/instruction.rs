//! The instruction stream the Applicator emits and commits, and the
//! metrics a completed reconcile reports back to the caller.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::buffer::AttributedString;
use crate::model::{AttributeMap, NodeKey};

/// One buffer-level edit, in the order the classifier/paths produced it
/// (not yet applied in buffer-safe order — see `Applicator`). Carries
/// `derive(Serialize, Deserialize)` the way the teacher derives these on
/// its own patch/command enum, so a consumer crate can ship this stream
/// across an IPC boundary rather than only ever applying it in-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Insert {
        at: usize,
        text: AttributedString,
        origin: Option<NodeKey>,
    },
    Delete {
        range: Range<usize>,
        origin: Option<NodeKey>,
    },
    Replace {
        range: Range<usize>,
        with: AttributedString,
        origin: Option<NodeKey>,
    },
    SetAttributes {
        range: Range<usize>,
        attrs: AttributeMap,
        origin: Option<NodeKey>,
    },
    /// A decorator needs its host view created or torn down. Applied after
    /// all text instructions, under the applicator's no-animation scope.
    DecoratorCreate {
        key: NodeKey,
    },
    DecoratorRemove {
        key: NodeKey,
    },
    DecoratorRedecorate {
        key: NodeKey,
    },
    /// Paragraph-level (non-character) attributes to push onto a node's
    /// host view, applied after text instructions alongside decorator
    /// ops (spec §4.3 "one block-attributes pass over the whole tree").
    ApplyBlockAttrs {
        key: NodeKey,
        attrs: AttributeMap,
    },
}

impl Instruction {
    /// The location used to order instructions for application
    /// (descending, so earlier edits never invalidate later ones'
    /// ranges). Decorator instructions sort after every text instruction
    /// regardless of location.
    pub fn sort_key(&self) -> (usize, u8) {
        match self {
            Instruction::Delete { range, .. } => (range.start, 0),
            Instruction::Replace { range, .. } => (range.start, 0),
            Instruction::Insert { at, .. } => (*at, 1),
            Instruction::SetAttributes { range, .. } => (range.start, 2),
            Instruction::DecoratorCreate { .. }
            | Instruction::DecoratorRemove { .. }
            | Instruction::DecoratorRedecorate { .. }
            | Instruction::ApplyBlockAttrs { .. } => (usize::MAX, 3),
        }
    }

    pub fn is_decorator(&self) -> bool {
        matches!(
            self,
            Instruction::DecoratorCreate { .. }
                | Instruction::DecoratorRemove { .. }
                | Instruction::DecoratorRedecorate { .. }
        )
    }

    /// True for any instruction the Applicator defers until after the
    /// text-edit batch and routes to the Frontend rather than the Buffer.
    pub fn is_deferred_to_frontend(&self) -> bool {
        self.is_decorator() || matches!(self, Instruction::ApplyBlockAttrs { .. })
    }
}

/// Counters collected unconditionally during a reconcile and returned to
/// the caller via `export_metrics` (spec §6.4). Cheap enough (wall-clock
/// via `Instant`, plain counters) that there is no separate "metrics
/// enabled" flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub path_label: &'static str,
    pub dirty_nodes: usize,
    /// Count of applied `Insert` instructions, plus one per `Replace`
    /// (which adds a range as well as deleting one).
    pub ranges_added: usize,
    /// Count of applied `Delete` instructions, plus one per `Replace`.
    pub ranges_deleted: usize,
    pub instructions_emitted: usize,
    pub duration_micros: u128,
}
