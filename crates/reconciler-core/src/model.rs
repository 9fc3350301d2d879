//! The node model and editor state the reconciler reads but never owns
//! (spec §3.1, §6.2). The core treats nodes as opaque providers of four
//! string parts plus an attribute dictionary — see "Ambient node model as
//! capability, not base class" (spec §9).

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Opaque stable identifier for a node, compared by equality. Concrete
/// node-model crates mint these however they like (content hash, arena
/// index, CRDT id); the core never interprets the bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub u64);

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tagged variant over the four kinds of node the core distinguishes.
/// Element/decorator distinction affects only what is enumerated as
/// children and whether a marker character stands in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
    Decorator,
    LineBreak,
}

/// A single style or block attribute value. Kept intentionally small —
/// the core never interprets values, only carries them through to the
/// buffer's `set_attributes`/`fix_attributes` calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Bool(bool),
}

/// Style or block attribute bundle, ordered for deterministic diffing and
/// deterministic `set_attributes` calls.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Which contiguous region of a node's entire range a point falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Preamble,
    Text,
    Postamble,
    /// A boundary between two children, or before the first / after the
    /// last child, inside the `children` region.
    ChildrenBoundary,
}

/// A tree-level position: `(node_key, part, offset)` — the tree-space
/// counterpart of a buffer-space integer location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub key: NodeKey,
    pub part: Part,
    pub offset: usize,
}

/// Direction used to break ties when a location falls exactly on a
/// boundary between two parts or two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A selection endpoint expressed in tree coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPoint {
    pub key: NodeKey,
    pub part: Part,
    pub offset: usize,
}

/// The editor's current selection, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Collapsed(SelectionPoint),
    Range {
        anchor: SelectionPoint,
        focus: SelectionPoint,
    },
}

/// External signal from the upstream update system about how much of the
/// tree needs re-examination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyType {
    None,
    Partial,
    FullRebuild,
}

/// Why a particular key is in the dirty set. Informational only — the
/// classifier's preconditions key off dirty-set *membership* and the
/// structural shape of prev/next, not off this reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirtyReason {
    TextChanged,
    ChildrenChanged,
    AttributesChanged,
    Other(String),
}

/// Map of dirty node keys to the reason they were marked dirty.
pub type DirtySet = std::collections::HashMap<NodeKey, DirtyReason>;

/// A node as exposed by the external node model. The core never mutates
/// nodes; it only reads prev- and next-state snapshots through this
/// trait.
pub trait Node {
    fn kind(&self) -> NodeKind;
    fn parent(&self) -> Option<NodeKey>;
    fn children(&self) -> &[NodeKey];
    fn preamble(&self) -> &str;
    fn text(&self) -> &str;
    fn postamble(&self) -> &str;
    fn style_attributes(&self) -> &AttributeMap;
    fn block_attributes(&self) -> Option<&AttributeMap>;
    fn is_decorator(&self) -> bool {
        self.kind() == NodeKind::Decorator
    }
    fn is_inline(&self) -> bool {
        matches!(self.kind(), NodeKind::Text | NodeKind::LineBreak)
    }
}

/// An immutable editor snapshot (spec §3.1, §6.2). The reconciler is given
/// a `prev` and a `next` snapshot and produces buffer mutations that bring
/// the buffer from representing `prev` to representing `next`.
pub trait EditorState {
    fn root_key(&self) -> NodeKey;
    fn node(&self, key: NodeKey) -> Option<&dyn Node>;
    fn dirty_type(&self) -> DirtyType;
    fn dirty_set(&self) -> &DirtySet;
    fn selection(&self) -> Option<Selection>;

    /// Whether `key` is still reachable from root in this state — used by
    /// decorator reconciliation and pruning. Default walks from root;
    /// node models with an index may override for O(1).
    fn is_attached(&self, key: NodeKey) -> bool {
        let mut stack = vec![self.root_key()];
        while let Some(k) = stack.pop() {
            if k == key {
                return true;
            }
            if let Some(node) = self.node(k) {
                stack.extend(node.children().iter().copied());
            }
        }
        false
    }
}

/// Input describing an in-flight IME composition edit (spec §3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkedTextOperation {
    pub create_marked: bool,
    pub replacement_range: Range<usize>,
    pub marked_string: String,
    pub marked_internal_selection: Range<usize>,
}
