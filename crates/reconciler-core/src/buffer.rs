//! The flat buffer (spec §6.1). The buffer implementation itself is out of
//! scope for the core — it may be a gap buffer, piece table, or rope — so
//! the core speaks only to the [`Buffer`] trait. [`RopeBuffer`] is one
//! concrete, fully-working implementation (backed by `xi_rope::Rope`,
//! the same crate the teacher uses for its single source of truth) kept
//! here to make the crate testable end-to-end.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::{AttributeMap, AttributeValue};
use xi_rope::Rope;

/// A run of text carrying one uniform attribute set. Fast paths build
/// these from a node's preamble/text/postamble plus its style attributes;
/// cross-node inserts concatenate several runs into one `AttributedString`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttributedString {
    pub text: String,
    pub attributes: AttributeMap,
}

impl AttributedString {
    pub fn new(text: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            text: text.into(),
            attributes,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: AttributeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn concat(parts: impl IntoIterator<Item = AttributedString>) -> Self {
        let mut text = String::new();
        for part in parts {
            text.push_str(&part.text);
        }
        AttributedString {
            text,
            attributes: AttributeMap::new(),
        }
    }
}

/// Required operations the reconciler's Applicator drives (spec §6.1).
///
/// Every delete and every set-attributes call must clamp to the current
/// buffer length; every insert must clamp its location to
/// `[0, current_length]`. Implementations are expected to be bounds-safe
/// rather than panicking — the Applicator relies on this to stay correct
/// under the descending-location application order (spec §4.4).
pub trait Buffer {
    fn begin_editing(&mut self);
    fn end_editing(&mut self);
    fn length(&self) -> usize;
    fn delete_characters(&mut self, range: Range<usize>);
    fn insert(&mut self, text: &AttributedString, at: usize);
    fn replace_characters(&mut self, range: Range<usize>, with: &AttributedString);
    fn set_attributes(&mut self, attrs: &AttributeMap, range: Range<usize>);
    /// Canonicalize per-run attributes after edits (merge adjacent runs
    /// with identical attributes, drop zero-length runs).
    fn fix_attributes(&mut self, range: Range<usize>);
    fn attributed_substring(&self, range: Range<usize>) -> AttributedString;
    /// Used to locate attachment-marker characters when a decorator has no
    /// RangeIndex entry yet (spec §4.5).
    fn enumerate_attribute(
        &self,
        name: &str,
        range: Range<usize>,
        callback: &mut dyn FnMut(usize, Option<&AttributeValue>),
    );
}

fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let start = range.start.min(len);
    let end = range.end.min(len).max(start);
    start..end
}

/// One contiguous attribute run, kept in byte order with no gaps: every
/// byte of the buffer is covered by exactly one run (possibly with an
/// empty attribute set).
#[derive(Debug, Clone)]
struct Run {
    range: Range<usize>,
    attrs: AttributeMap,
}

/// Reference `Buffer` implementation over `xi_rope::Rope`, the same rope
/// crate the teacher's `Document` wraps directly as its single source of
/// truth. Attribute runs are tracked separately in a flat, merge-on-write
/// list — adequate for testing the reconciler; a production text view
/// backs this with its own attributed-string storage instead.
pub struct RopeBuffer {
    rope: Rope,
    runs: Vec<Run>,
    editing_depth: u32,
}

impl RopeBuffer {
    pub fn new() -> Self {
        Self {
            rope: Rope::from(""),
            runs: Vec::new(),
            editing_depth: 0,
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    fn normalize_runs(&mut self) {
        self.runs.retain(|r| !r.range.is_empty());
        self.runs.sort_by_key(|r| r.range.start);
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.range.end == run.range.start && last.attrs == run.attrs {
                    last.range.end = run.range.end;
                    continue;
                }
            }
            merged.push(run);
        }
        self.runs = merged;
    }

    fn shift_runs_after(&mut self, at: usize, delta: i64) {
        for run in &mut self.runs {
            if run.range.start >= at {
                run.range.start = (run.range.start as i64 + delta).max(0) as usize;
            }
            if run.range.end >= at {
                run.range.end = (run.range.end as i64 + delta).max(0) as usize;
            }
        }
        self.runs.retain(|r| r.range.start < r.range.end);
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer for RopeBuffer {
    fn begin_editing(&mut self) {
        self.editing_depth += 1;
    }

    fn end_editing(&mut self) {
        self.editing_depth = self.editing_depth.saturating_sub(1);
        if self.editing_depth == 0 {
            self.normalize_runs();
        }
    }

    fn length(&self) -> usize {
        self.rope.len()
    }

    fn delete_characters(&mut self, range: Range<usize>) {
        let range = clamp_range(range, self.length());
        if range.is_empty() {
            return;
        }
        let mut builder = xi_rope::delta::Builder::new(self.rope.len());
        builder.delete(range.clone());
        self.rope = builder.build().apply(&self.rope);
        let len = (range.end - range.start) as i64;
        self.shift_runs_after(range.end, -len);
    }

    fn insert(&mut self, text: &AttributedString, at: usize) {
        let at = at.min(self.length());
        if text.is_empty() {
            return;
        }
        let mut builder = xi_rope::delta::Builder::new(self.rope.len());
        builder.replace(at..at, Rope::from(text.text.as_str()));
        self.rope = builder.build().apply(&self.rope);
        self.shift_runs_after(at, text.len() as i64);
        self.runs.push(Run {
            range: at..at + text.len(),
            attrs: text.attributes.clone(),
        });
    }

    fn replace_characters(&mut self, range: Range<usize>, with: &AttributedString) {
        self.delete_characters(range.clone());
        self.insert(with, range.start.min(self.length()));
    }

    fn set_attributes(&mut self, attrs: &AttributeMap, range: Range<usize>) {
        let range = clamp_range(range, self.length());
        if range.is_empty() {
            return;
        }
        self.runs.push(Run {
            range,
            attrs: attrs.clone(),
        });
        self.normalize_runs();
    }

    fn fix_attributes(&mut self, range: Range<usize>) {
        let range = clamp_range(range, self.length());
        self.runs.retain(|r| !(r.range.start >= range.start && r.range.end <= range.end) || !r.range.is_empty());
        self.normalize_runs();
    }

    fn attributed_substring(&self, range: Range<usize>) -> AttributedString {
        let range = clamp_range(range, self.length());
        let text = self.rope.slice_to_cow(range.clone()).to_string();
        let attrs = self
            .runs
            .iter()
            .find(|r| r.range.start <= range.start && range.end <= r.range.end)
            .map(|r| r.attrs.clone())
            .unwrap_or_default();
        AttributedString { text, attributes: attrs }
    }

    fn enumerate_attribute(
        &self,
        name: &str,
        range: Range<usize>,
        callback: &mut dyn FnMut(usize, Option<&AttributeValue>),
    ) {
        let range = clamp_range(range, self.length());
        for run in &self.runs {
            if run.range.end <= range.start || run.range.start >= range.end {
                continue;
            }
            callback(run.range.start, run.attrs.get(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_delete_round_trips() {
        let mut buf = RopeBuffer::new();
        buf.begin_editing();
        buf.insert(&AttributedString::plain("hello"), 0);
        buf.end_editing();
        assert_eq!(buf.text(), "hello");

        buf.begin_editing();
        buf.delete_characters(1..3);
        buf.end_editing();
        assert_eq!(buf.text(), "hlo");
    }

    #[test]
    fn clamps_out_of_bounds_operations() {
        let mut buf = RopeBuffer::new();
        buf.begin_editing();
        buf.insert(&AttributedString::plain("abc"), 0);
        buf.delete_characters(1..100);
        buf.insert(&AttributedString::plain("z"), 1000);
        buf.end_editing();
        assert_eq!(buf.text(), "az");
    }

    #[test]
    fn attribute_runs_survive_shifts() {
        let mut buf = RopeBuffer::new();
        buf.begin_editing();
        buf.insert(&AttributedString::plain("hello world"), 0);
        let mut attrs = AttributeMap::new();
        attrs.insert("bold".into(), AttributeValue::Bool(true));
        buf.set_attributes(&attrs, 0..5);
        buf.insert(&AttributedString::plain("XX"), 0);
        buf.end_editing();

        let mut found_bold_start = None;
        buf.enumerate_attribute("bold", 0..buf.length(), &mut |start, v| {
            if v.is_some() {
                found_bold_start = Some(start);
            }
        });
        assert_eq!(found_bold_start, Some(2));
    }
}
