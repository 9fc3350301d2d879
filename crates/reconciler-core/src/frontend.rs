//! The Frontend (consumed) interface (spec §6.3). Selection geometry,
//! decorator view lifecycle, and layout invalidation live on the other
//! side of this trait — out of scope for the core (spec §1), which only
//! posts work across it. Every call here happens after `end_editing`;
//! none may be invoked while the Applicator's batched session is open
//! (spec §5 "must not be held across any awaitable operation").

use std::ops::Range;

use crate::buffer::AttributedString;
use crate::model::{AttributeMap, NodeKey};

/// A selection already resolved to buffer-space locations (spec §4.6).
/// Tree-space `Selection` stays in `model`; this is what actually reaches
/// the native text view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSelection {
    Collapsed(usize),
    Directional { anchor: usize, focus: usize },
}

pub trait Frontend {
    fn update_native_selection(&mut self, selection: NativeSelection);
    fn reset_native_selection(&mut self);

    /// Sets the IME marked-text range and its internal (within-marked-
    /// string) selection (spec §4.3 "Composition").
    fn set_marked_text(&mut self, text: &AttributedString, internal_selection: Range<usize>);

    /// Posted asynchronously after `end_editing`; never inside a batched
    /// editing session.
    fn invalidate_layout(&mut self, range: Range<usize>);
    fn invalidate_display(&mut self, range: Range<usize>);

    /// Decorator view lifecycle (spec §4.5). The frontend is responsible
    /// for suppressing transition animations for these three calls.
    fn create_decorator_view(&mut self, key: NodeKey);
    fn remove_decorator_view(&mut self, key: NodeKey);
    fn redecorate(&mut self, key: NodeKey);

    /// Pushes a paragraph-level attribute bundle onto a node's host view
    /// (spec §4.3 fresh hydration's "block-attributes pass").
    fn apply_block_attributes(&mut self, key: NodeKey, attrs: &AttributeMap);
}

/// A `Frontend` that drops everything on the floor. Useful for tests and
/// for callers that only care about the buffer, not UI side effects.
#[derive(Debug, Default)]
pub struct NullFrontend {
    pub selection_calls: Vec<NativeSelection>,
    pub reset_calls: usize,
    pub marked_text_calls: Vec<(AttributedString, Range<usize>)>,
    pub invalidated_layout: Vec<Range<usize>>,
    pub invalidated_display: Vec<Range<usize>>,
    pub created: Vec<NodeKey>,
    pub removed: Vec<NodeKey>,
    pub redecorated: Vec<NodeKey>,
    pub block_attrs: Vec<(NodeKey, AttributeMap)>,
}

impl Frontend for NullFrontend {
    fn update_native_selection(&mut self, selection: NativeSelection) {
        self.selection_calls.push(selection);
    }

    fn reset_native_selection(&mut self) {
        self.reset_calls += 1;
    }

    fn set_marked_text(&mut self, text: &AttributedString, internal_selection: Range<usize>) {
        self.marked_text_calls.push((text.clone(), internal_selection));
    }

    fn invalidate_layout(&mut self, range: Range<usize>) {
        self.invalidated_layout.push(range);
    }

    fn invalidate_display(&mut self, range: Range<usize>) {
        self.invalidated_display.push(range);
    }

    fn create_decorator_view(&mut self, key: NodeKey) {
        self.created.push(key);
    }

    fn remove_decorator_view(&mut self, key: NodeKey) {
        self.removed.push(key);
    }

    fn redecorate(&mut self, key: NodeKey) {
        self.redecorated.push(key);
    }

    fn apply_block_attributes(&mut self, key: NodeKey, attrs: &AttributeMap) {
        self.block_attrs.push((key, attrs.clone()));
    }
}
