//! Decorator view lifecycle reconciliation (spec §4.5). A decorator
//! node's visual representation is a custom embedded view; the buffer
//! holds only a single-character attachment marker for it. This module
//! tracks which decorators currently have a live view, which need one
//! created, and which need redecoration, and emits the Instructions the
//! Applicator later routes to the Frontend.

use std::collections::{HashMap, HashSet};

use crate::buffer::Buffer;
use crate::instruction::Instruction;
use crate::model::{AttributeValue, DirtySet, EditorState, NodeKey};
use crate::range_index::RangeIndex;

/// The attribute name a decorator's attachment-marker character carries
/// in the buffer, used only as the fallback lookup when a decorator has
/// no RangeIndex entry yet (spec §4.5 "fall back to scanning the buffer
/// for the attachment marker character").
const ATTACHMENT_MARKER_ATTR: &str = "reconciler.decorator_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorViewState {
    NeedsCreation,
    HasView,
    NeedsRedecoration,
}

/// Per-decorator view state and last-known buffer position, carried
/// across reconciles on the `Reconciler` (spec §4.5).
#[derive(Debug, Clone, Default)]
pub struct DecoratorPositionCache {
    state: HashMap<NodeKey, DecoratorViewState>,
    position: HashMap<NodeKey, usize>,
}

impl DecoratorPositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_state(&self, key: NodeKey) -> Option<DecoratorViewState> {
        self.state.get(&key).copied()
    }

    pub fn position(&self, key: NodeKey) -> Option<usize> {
        self.position.get(&key).copied()
    }
}

/// Computes decorator add/remove/redecorate instructions for the subtree
/// rooted at `ancestor`, comparing decorator descendants attached in
/// `prev` against those attached in `next`.
pub fn reconcile(
    ancestor: NodeKey,
    prev: &dyn EditorState,
    next: &dyn EditorState,
    range_index: &RangeIndex,
    dirty_set: &DirtySet,
    buffer: &dyn Buffer,
    cache: &mut DecoratorPositionCache,
) -> Vec<Instruction> {
    let mut out = Vec::new();
    let prev_decorators = collect_decorators(prev, ancestor);
    let next_decorators = collect_decorators(next, ancestor);
    let ancestor_is_root = next.root_key() == ancestor;

    for &key in &prev_decorators {
        if next_decorators.contains(&key) {
            continue;
        }
        // Open question (spec §9): a decorator re-parented elsewhere in
        // next-state, removed only from this particular ancestor's
        // subtree, keeps its view alive as long as the ancestor isn't
        // root. At the root ancestor, "not attached anywhere in next" is
        // the only question that matters, and it's already false here
        // (key isn't in next_decorators, which was collected from root
        // when ancestor_is_root).
        let reparented_elsewhere = !ancestor_is_root && next.is_attached(key);
        if reparented_elsewhere {
            continue;
        }
        cache.state.remove(&key);
        cache.position.remove(&key);
        out.push(Instruction::DecoratorRemove { key });
    }

    for &key in &next_decorators {
        let location = range_index
            .absolute_location(key)
            .or_else(|| locate_attachment_marker(buffer, key));

        if !prev_decorators.contains(&key) {
            cache.state.insert(key, DecoratorViewState::NeedsCreation);
            if let Some(loc) = location {
                cache.position.insert(key, loc);
            }
            out.push(Instruction::DecoratorCreate { key });
            continue;
        }

        if let Some(loc) = location {
            cache.position.insert(key, loc);
        }

        if dirty_set.contains_key(&key) {
            cache.state.insert(key, DecoratorViewState::NeedsRedecoration);
            out.push(Instruction::DecoratorRedecorate { key });
        } else {
            cache
                .state
                .entry(key)
                .or_insert(DecoratorViewState::HasView);
        }
    }

    out
}

fn collect_decorators(state: &dyn EditorState, root: NodeKey) -> HashSet<NodeKey> {
    let mut out = HashSet::new();
    let mut stack = vec![root];
    while let Some(key) = stack.pop() {
        let Some(node) = state.node(key) else { continue };
        if node.is_decorator() {
            out.insert(key);
        }
        stack.extend(node.children().iter().copied());
    }
    out
}

fn locate_attachment_marker(buffer: &dyn Buffer, key: NodeKey) -> Option<usize> {
    let marker = key.0.to_string();
    let mut found = None;
    buffer.enumerate_attribute(ATTACHMENT_MARKER_ATTR, 0..buffer.length(), &mut |start, value| {
        if found.is_some() {
            return;
        }
        if let Some(AttributeValue::String(v)) = value {
            if *v == marker {
                found = Some(start);
            }
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RopeBuffer;
    use crate::model::{AttributeMap, DirtyType, Node, NodeKind};
    use std::collections::HashMap as StdHashMap;

    struct FakeNode {
        kind: NodeKind,
        parent: Option<NodeKey>,
        children: Vec<NodeKey>,
    }

    impl Node for FakeNode {
        fn kind(&self) -> NodeKind {
            self.kind
        }
        fn parent(&self) -> Option<NodeKey> {
            self.parent
        }
        fn children(&self) -> &[NodeKey] {
            &self.children
        }
        fn preamble(&self) -> &str {
            ""
        }
        fn text(&self) -> &str {
            ""
        }
        fn postamble(&self) -> &str {
            ""
        }
        fn style_attributes(&self) -> &AttributeMap {
            static EMPTY: std::sync::OnceLock<AttributeMap> = std::sync::OnceLock::new();
            EMPTY.get_or_init(AttributeMap::new)
        }
        fn block_attributes(&self) -> Option<&AttributeMap> {
            None
        }
    }

    struct FakeState {
        root: NodeKey,
        nodes: StdHashMap<NodeKey, FakeNode>,
    }

    impl EditorState for FakeState {
        fn root_key(&self) -> NodeKey {
            self.root
        }
        fn node(&self, key: NodeKey) -> Option<&dyn Node> {
            self.nodes.get(&key).map(|n| n as &dyn Node)
        }
        fn dirty_type(&self) -> DirtyType {
            DirtyType::Partial
        }
        fn dirty_set(&self) -> &DirtySet {
            static EMPTY: std::sync::OnceLock<DirtySet> = std::sync::OnceLock::new();
            EMPTY.get_or_init(DirtySet::new)
        }
        fn selection(&self) -> Option<crate::model::Selection> {
            None
        }
    }

    fn root_with_children(children: Vec<NodeKey>) -> FakeState {
        let root = NodeKey(0);
        let mut nodes = StdHashMap::new();
        nodes.insert(
            root,
            FakeNode {
                kind: NodeKind::Element,
                parent: None,
                children: children.clone(),
            },
        );
        for c in children {
            nodes.insert(
                c,
                FakeNode {
                    kind: NodeKind::Decorator,
                    parent: Some(root),
                    children: vec![],
                },
            );
        }
        FakeState { root, nodes }
    }

    #[test]
    fn new_decorator_is_created() {
        let prev = root_with_children(vec![]);
        let next = root_with_children(vec![NodeKey(1)]);
        let range_index = RangeIndex::new(false);
        let buffer = RopeBuffer::new();
        let mut cache = DecoratorPositionCache::new();
        let ops = reconcile(
            next.root_key(),
            &prev,
            &next,
            &range_index,
            next.dirty_set(),
            &buffer,
            &mut cache,
        );
        assert_eq!(ops, vec![Instruction::DecoratorCreate { key: NodeKey(1) }]);
        assert_eq!(cache.view_state(NodeKey(1)), Some(DecoratorViewState::NeedsCreation));
    }

    #[test]
    fn removed_decorator_at_root_is_torn_down() {
        let prev = root_with_children(vec![NodeKey(1)]);
        let next = root_with_children(vec![]);
        let range_index = RangeIndex::new(false);
        let buffer = RopeBuffer::new();
        let mut cache = DecoratorPositionCache::new();
        cache.state.insert(NodeKey(1), DecoratorViewState::HasView);
        let ops = reconcile(
            next.root_key(),
            &prev,
            &next,
            &range_index,
            next.dirty_set(),
            &buffer,
            &mut cache,
        );
        assert_eq!(ops, vec![Instruction::DecoratorRemove { key: NodeKey(1) }]);
        assert!(cache.view_state(NodeKey(1)).is_none());
    }
}
