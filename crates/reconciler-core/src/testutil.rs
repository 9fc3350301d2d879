//! A minimal in-memory `Node`/`EditorState` implementation used by tests
//! and benches. Not part of the public reconciler API surface proper —
//! any real integration supplies its own node model (spec §1 "the node
//! model itself... is out of scope").

use std::collections::HashMap;

use crate::model::{
    AttributeMap, DirtyReason, DirtySet, DirtyType, EditorState, Node, NodeKey, NodeKind, Selection,
};

#[derive(Debug, Clone, Default)]
pub struct TestNode {
    pub kind: NodeKind,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub preamble: String,
    pub text: String,
    pub postamble: String,
    pub style_attributes: AttributeMap,
    pub block_attributes: Option<AttributeMap>,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Element
    }
}

impl Node for TestNode {
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
        &self.preamble
    }
    fn text(&self) -> &str {
        &self.text
    }
    fn postamble(&self) -> &str {
        &self.postamble
    }
    fn style_attributes(&self) -> &AttributeMap {
        &self.style_attributes
    }
    fn block_attributes(&self) -> Option<&AttributeMap> {
        self.block_attributes.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct TestState {
    pub root: NodeKey,
    pub nodes: HashMap<NodeKey, TestNode>,
    pub dirty_type: DirtyType,
    pub dirty_set: DirtySet,
    pub selection: Option<Selection>,
}

impl Default for DirtyType {
    fn default() -> Self {
        DirtyType::None
    }
}

impl EditorState for TestState {
    fn root_key(&self) -> NodeKey {
        self.root
    }
    fn node(&self, key: NodeKey) -> Option<&dyn Node> {
        self.nodes.get(&key).map(|n| n as &dyn Node)
    }
    fn dirty_type(&self) -> DirtyType {
        self.dirty_type
    }
    fn dirty_set(&self) -> &DirtySet {
        &self.dirty_set
    }
    fn selection(&self) -> Option<Selection> {
        self.selection
    }
}

impl TestState {
    pub fn mark_dirty(&mut self, key: NodeKey, reason: DirtyReason) {
        self.dirty_set.insert(key, reason);
        if self.dirty_type == DirtyType::None {
            self.dirty_type = DirtyType::Partial;
        }
    }
}

/// Builds `root(NodeKey(0)) -> [paragraph(NodeKey(1)) -> text(NodeKey(2))]`
/// with the given text and postamble, a common fixture across fast-path
/// tests and benches.
pub fn one_paragraph_tree(text: &str, postamble: &str) -> TestState {
    let root_key = NodeKey(0);
    let para_key = NodeKey(1);
    let text_key = NodeKey(2);

    let mut nodes = HashMap::new();
    nodes.insert(
        root_key,
        TestNode {
            kind: NodeKind::Element,
            parent: None,
            children: vec![para_key],
            ..Default::default()
        },
    );
    nodes.insert(
        para_key,
        TestNode {
            kind: NodeKind::Element,
            parent: Some(root_key),
            children: vec![text_key],
            postamble: postamble.to_string(),
            ..Default::default()
        },
    );
    nodes.insert(
        text_key,
        TestNode {
            kind: NodeKind::Text,
            parent: Some(para_key),
            text: text.to_string(),
            ..Default::default()
        },
    );

    TestState {
        root: root_key,
        nodes,
        dirty_type: DirtyType::None,
        dirty_set: DirtySet::new(),
        selection: None,
    }
}

/// Builds a document of `n` sibling paragraphs under root, each holding
/// unique text, each postambled with "\n" except the last.
pub fn many_paragraphs_tree(n: usize) -> TestState {
    let root_key = NodeKey(0);
    let mut nodes = HashMap::new();
    let mut children = Vec::with_capacity(n);

    for i in 0..n {
        let para_key = NodeKey(10 + i as u64 * 2);
        let text_key = NodeKey(11 + i as u64 * 2);
        children.push(para_key);
        nodes.insert(
            para_key,
            TestNode {
                kind: NodeKind::Element,
                parent: Some(root_key),
                children: vec![text_key],
                postamble: if i + 1 < n { "\n".to_string() } else { String::new() },
                ..Default::default()
            },
        );
        nodes.insert(
            text_key,
            TestNode {
                kind: NodeKind::Text,
                parent: Some(para_key),
                text: format!("paragraph {i}"),
                ..Default::default()
            },
        );
    }

    nodes.insert(
        root_key,
        TestNode {
            kind: NodeKind::Element,
            parent: None,
            children,
            ..Default::default()
        },
    );

    TestState {
        root: root_key,
        nodes,
        dirty_type: DirtyType::None,
        dirty_set: DirtySet::new(),
        selection: None,
    }
}
