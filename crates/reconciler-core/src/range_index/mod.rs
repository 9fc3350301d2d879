//! `RangeIndex`: per-node intervals over the flat buffer, plus the
//! Fenwick-backed lazy location offset structure (spec §3.1, §4.1).

mod item;
pub use item::RangeCacheItem;

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;

use crate::error::ReconcileError;
use crate::fenwick::FenwickTree;
use crate::model::{Direction, EditorState, NodeKey, Part, Point};

/// Per-node intervals over the flat buffer. Owned exclusively by the
/// reconciler during `reconcile`; everything else only reads it (spec §5).
pub struct RangeIndex {
    items: HashMap<NodeKey, RangeCacheItem>,
    dfs_order: RefCell<Option<Vec<NodeKey>>>,
    fenwick: FenwickTree,
    next_node_index: u32,
    lazy_mode: bool,
    root: Option<NodeKey>,
}

impl RangeIndex {
    pub fn new(lazy_mode: bool) -> Self {
        Self {
            items: HashMap::new(),
            dfs_order: RefCell::new(None),
            fenwick: FenwickTree::new(),
            next_node_index: 0,
            lazy_mode,
            root: None,
        }
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy_mode
    }

    pub fn set_lazy_mode(&mut self, lazy: bool) {
        self.lazy_mode = lazy;
    }

    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }

    pub fn set_root(&mut self, key: NodeKey) {
        self.root = Some(key);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: NodeKey) -> Option<&RangeCacheItem> {
        self.items.get(&key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.items.contains_key(&key)
    }

    /// Allocate a fresh, never-reused Fenwick coordinate for a node being
    /// observed for the first time.
    pub fn allocate_node_index(&mut self) -> u32 {
        self.next_node_index += 1;
        self.fenwick.ensure_capacity(self.next_node_index as usize);
        self.next_node_index
    }

    pub fn insert_item(&mut self, key: NodeKey, item: RangeCacheItem) {
        self.fenwick.ensure_capacity(item.node_index as usize);
        self.items.insert(key, item);
        self.invalidate_dfs_order();
    }

    pub fn remove_item(&mut self, key: NodeKey) -> Option<RangeCacheItem> {
        let removed = self.items.remove(&key);
        if removed.is_some() {
            self.invalidate_dfs_order();
        }
        removed
    }

    /// Drop every item whose node is no longer reachable from root in
    /// `state` (pruned at the end of the reconcile that detaches it,
    /// spec §3.3).
    pub fn prune_detached(&mut self, state: &dyn EditorState) {
        let stale: Vec<NodeKey> = self
            .items
            .keys()
            .copied()
            .filter(|k| !state.is_attached(*k))
            .collect();
        for key in stale {
            self.items.remove(&key);
        }
        self.invalidate_dfs_order();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.fenwick.clear();
        self.next_node_index = 0;
        self.invalidate_dfs_order();
    }

    /// `item.location + fenwick.prefix_sum(item.node_index)` — the single
    /// accessor that is always correct regardless of lazy/eager mode
    /// (invariant P4/P5). Everything that needs a node's true position in
    /// the buffer goes through this, never through `item.location` alone.
    pub fn absolute_location(&self, key: NodeKey) -> Option<usize> {
        let item = self.items.get(&key)?;
        let delta = self.fenwick.prefix_sum(item.node_index as usize);
        Some((item.location as i64 + delta).max(0) as usize)
    }

    pub fn entire_range(&self, key: NodeKey) -> Option<Range<usize>> {
        let item = self.items.get(&key)?;
        let base = self.absolute_location(key)?;
        Some(item.entire_range(base))
    }

    pub fn preamble_range(&self, key: NodeKey) -> Option<Range<usize>> {
        let item = self.items.get(&key)?;
        let base = self.absolute_location(key)?;
        Some(item.preamble_range(base))
    }

    pub fn children_range(&self, key: NodeKey) -> Option<Range<usize>> {
        let item = self.items.get(&key)?;
        let base = self.absolute_location(key)?;
        Some(item.children_range(base))
    }

    pub fn text_range(&self, key: NodeKey) -> Option<Range<usize>> {
        let item = self.items.get(&key)?;
        let base = self.absolute_location(key)?;
        Some(item.text_range(base))
    }

    pub fn postamble_range(&self, key: NodeKey) -> Option<Range<usize>> {
        let item = self.items.get(&key)?;
        let base = self.absolute_location(key)?;
        Some(item.postamble_range(base))
    }

    /// Fold all pending Fenwick deltas into each item's `location`, then
    /// clear the tree. Must be called before any operation that reads raw
    /// `location` values without going through the Fenwick-aware
    /// accessor (notably structural deletes and applicator-time bounds).
    pub fn materialize_fenwick(&mut self) {
        if self.fenwick.is_clean() {
            return;
        }
        for item in self.items.values_mut() {
            let delta = self.fenwick.prefix_sum(item.node_index as usize);
            item.location = (item.location as i64 + delta).max(0) as usize;
        }
        self.fenwick.clear();
    }

    /// Adds `delta` to the location of every node whose `dfs_position`
    /// (eager mode) or `node_index` (lazy mode) is greater than `after`'s.
    /// See the Fenwick/dfs_position coherence note in DESIGN.md: lazy mode
    /// relies on newly-created subtrees always receiving freshly
    /// allocated (hence numerically larger) node indices, which holds for
    /// every fast path except reorder — reorder always materializes first
    /// and renumbers the nodes it moves.
    pub fn shift_suffix(&mut self, after: NodeKey, delta: i64) {
        if delta == 0 {
            return;
        }
        let Some(after_item) = self.items.get(&after).copied() else {
            return;
        };
        if self.lazy_mode {
            self.fenwick.add(after_item.node_index as usize + 1, delta);
        } else {
            let cutoff = after_item.dfs_position;
            for item in self.items.values_mut() {
                if item.dfs_position > cutoff {
                    item.location = (item.location as i64 + delta).max(0) as usize;
                }
            }
        }
    }

    /// Always-eager variant of `shift_suffix`, keyed by `dfs_position`
    /// rather than `node_index`. `node_index` ordering is only guaranteed
    /// to track document order for a subtree that was entirely allocated
    /// in the same call as the shift (true for every insert path); for
    /// deletions and reorders the anchor can be an older sibling whose
    /// index says nothing about its neighbors' relative document
    /// position, so those paths pay the O(N) `dfs_order` refresh instead
    /// of risking a wrong shift under lazy mode.
    pub fn shift_after_document_position(&mut self, after: NodeKey, delta: i64, state: &dyn EditorState) {
        if delta == 0 {
            return;
        }
        self.refresh_dfs_positions(state);
        let Some(cutoff) = self.items.get(&after).map(|i| i.dfs_position) else {
            return;
        };
        for item in self.items.values_mut() {
            if item.dfs_position > cutoff {
                item.location = (item.location as i64 + delta).max(0) as usize;
            }
        }
    }

    /// Shift every node in the index by `delta`. Used for inserts at the
    /// very start of the document (spec §8.2 boundary behavior).
    pub fn shift_all(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        if self.lazy_mode {
            self.fenwick.add(1, delta);
        } else {
            for item in self.items.values_mut() {
                item.location = (item.location as i64 + delta).max(0) as usize;
            }
        }
    }

    /// Walks the ancestor chain starting at `parent_key` (inclusive),
    /// adding `delta` to each ancestor's `children_length`. O(depth).
    pub fn propagate_children_delta(&mut self, parent_key: NodeKey, delta: i64, state: &dyn EditorState) {
        if delta == 0 {
            return;
        }
        let mut cursor = Some(parent_key);
        while let Some(key) = cursor {
            if let Some(item) = self.items.get_mut(&key) {
                item.children_length = (item.children_length as i64 + delta).max(0) as usize;
            }
            cursor = state.node(key).and_then(|n| n.parent());
        }
    }

    /// Rewrites `location`, part lengths, and the sum rule for `key` and
    /// all descendants in DFS order from `next_state`, writing fresh
    /// `location`s starting at `start_location`. Returns the written
    /// `entire_length`. Invalidates the cached DFS order; `node_index` is
    /// preserved for nodes that already had one, freshly allocated
    /// otherwise.
    pub fn recompute_subtree(
        &mut self,
        key: NodeKey,
        start_location: usize,
        state: &dyn EditorState,
    ) -> Result<usize, ReconcileError> {
        let node = state.node(key).ok_or(ReconcileError::UnknownKey)?;
        let preamble_length = node.preamble().len();
        let text_length = node.text().len();
        let postamble_length = node.postamble().len();
        let children: Vec<NodeKey> = node.children().to_vec();

        let mut cursor = start_location + preamble_length;
        let mut children_length = 0usize;
        for child in children {
            let child_len = self.recompute_subtree(child, cursor, state)?;
            cursor += child_len;
            children_length += child_len;
        }

        let entire = preamble_length + children_length + text_length + postamble_length;
        let node_index = match self.items.get(&key) {
            Some(existing) => existing.node_index,
            None => self.allocate_node_index(),
        };
        self.items.insert(
            key,
            RangeCacheItem {
                location: start_location,
                preamble_length,
                children_length,
                text_length,
                postamble_length,
                node_index,
                dfs_position: 0,
            },
        );
        self.dfs_order.replace(None);
        Ok(entire)
    }

    pub fn invalidate_dfs_order(&self) {
        *self.dfs_order.borrow_mut() = None;
    }

    pub fn dfs_order(&self, state: &dyn EditorState) -> Vec<NodeKey> {
        if let Some(cached) = self.dfs_order.borrow().as_ref() {
            return cached.clone();
        }
        let mut order = Vec::with_capacity(self.items.len());
        if let Some(root) = self.root {
            self.collect_dfs(root, state, &mut order);
        }
        *self.dfs_order.borrow_mut() = Some(order.clone());
        order
    }

    fn collect_dfs(&self, key: NodeKey, state: &dyn EditorState, out: &mut Vec<NodeKey>) {
        out.push(key);
        if let Some(node) = state.node(key) {
            for &child in node.children() {
                self.collect_dfs(child, state, out);
            }
        }
    }

    /// Re-stamp every item's `dfs_position` from a fresh traversal of
    /// `state`. Only needed before an eager `shift_suffix`/`shift_all`
    /// call — lazy mode never reads `dfs_position`.
    pub fn refresh_dfs_positions(&mut self, state: &dyn EditorState) {
        let order = self.dfs_order(state);
        for (pos, key) in order.iter().enumerate() {
            if let Some(item) = self.items.get_mut(key) {
                item.dfs_position = pos;
            }
        }
    }

    /// Renumber `node_index` for `keys` (given in desired Fenwick order)
    /// to fresh, contiguous, monotonically increasing indices. Used by
    /// the reorder path after `materialize_fenwick` to keep future
    /// lazy-mode suffix shifts coherent with the new document order.
    pub fn renumber(&mut self, keys: &[NodeKey]) {
        for key in keys {
            let fresh = self.allocate_node_index();
            if let Some(item) = self.items.get_mut(key) {
                item.node_index = fresh;
            }
        }
    }

    /// DFS descent from `location`: resolves to `(key, part, offset)`.
    /// Fails with `OutOfBounds` if `location` is outside the root's
    /// entire range.
    pub fn resolve(
        &self,
        location: usize,
        direction: Direction,
        state: &dyn EditorState,
    ) -> Result<Point, ReconcileError> {
        let root = self.root.ok_or(ReconcileError::UnknownKey)?;
        self.resolve_node(root, location, direction, state)
    }

    fn resolve_node(
        &self,
        key: NodeKey,
        location: usize,
        direction: Direction,
        state: &dyn EditorState,
    ) -> Result<Point, ReconcileError> {
        let item = *self.items.get(&key).ok_or(ReconcileError::UnknownKey)?;
        let base = self.absolute_location(key).ok_or(ReconcileError::UnknownKey)?;
        let entire = item.entire_range(base);
        if location < entire.start || location > entire.end {
            return Err(ReconcileError::OutOfBounds {
                location,
                buffer_len: entire.end,
            });
        }

        let segments = [
            (Part::Preamble, item.preamble_range(base)),
            (Part::ChildrenBoundary, item.children_range(base)),
            (Part::Text, item.text_range(base)),
            (Part::Postamble, item.postamble_range(base)),
        ];
        let candidates: Vec<usize> = (0..segments.len())
            .filter(|&i| segments[i].1.start <= location && location <= segments[i].1.end)
            .collect();
        // invariant: location is within [entire.start, entire.end], so at
        // least the part whose range spans it (or an adjacent zero-length
        // part at the same boundary) always matches.
        let chosen = match direction {
            Direction::Forward => *candidates.last().expect("location within entire range"),
            Direction::Backward => candidates[0],
        };
        let (part, range) = &segments[chosen];
        match part {
            Part::ChildrenBoundary => self.descend_children(key, location, direction, state),
            other => Ok(Point {
                key,
                part: *other,
                offset: location - range.start,
            }),
        }
    }

    fn descend_children(
        &self,
        parent: NodeKey,
        location: usize,
        direction: Direction,
        state: &dyn EditorState,
    ) -> Result<Point, ReconcileError> {
        let node = state.node(parent).ok_or(ReconcileError::UnknownKey)?;
        let mut matches = Vec::new();
        for &child in node.children() {
            if let Some(range) = self.entire_range(child) {
                if range.start <= location && location <= range.end {
                    matches.push(child);
                }
            }
        }
        if matches.is_empty() {
            return Ok(Point {
                key: parent,
                part: Part::ChildrenBoundary,
                offset: 0,
            });
        }
        let chosen = match direction {
            Direction::Forward => *matches.last().unwrap(),
            Direction::Backward => matches[0],
        };
        self.resolve_node(chosen, location, direction, state)
    }

    /// Inverse of `resolve`: maps a tree-level `Point` back to an absolute
    /// buffer location (spec §4.6 `resolve_inverse`).
    pub fn location_of(&self, point: Point) -> Option<usize> {
        let item = self.items.get(&point.key)?;
        let base = self.absolute_location(point.key)?;
        let part_start = match point.part {
            Part::Preamble => base,
            Part::ChildrenBoundary => base + item.preamble_length,
            Part::Text => base + item.preamble_length + item.children_length,
            Part::Postamble => base + item.preamble_length + item.children_length + item.text_length,
        };
        Some(part_start + point.offset)
    }

    /// Enumerates every covered preamble/text/postamble sub-range across
    /// nodes in document order, clipped to `range`. Used to apply
    /// cross-node edits (spec §4.1 `map`).
    pub fn map(&self, range: Range<usize>, state: &dyn EditorState) -> Vec<(NodeKey, Part, usize, usize)> {
        let mut out = Vec::new();
        for key in self.dfs_order(state) {
            let Some(item) = self.items.get(&key) else {
                continue;
            };
            let Some(base) = self.absolute_location(key) else {
                continue;
            };
            for (part, prange) in [
                (Part::Preamble, item.preamble_range(base)),
                (Part::Text, item.text_range(base)),
                (Part::Postamble, item.postamble_range(base)),
            ] {
                let s = prange.start.max(range.start);
                let e = prange.end.min(range.end);
                if s < e {
                    out.push((key, part, s - prange.start, e - prange.start));
                }
            }
        }
        out
    }
}
