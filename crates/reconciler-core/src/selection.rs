//! Maps a tree-level selection onto absolute buffer locations and tells
//! the frontend to reflect it (spec §4.6). Runs after the Applicator has
//! committed the edit, never inside `begin_editing`/`end_editing`.

use crate::frontend::{Frontend, NativeSelection};
use crate::model::{EditorState, Point, Selection, SelectionPoint};
use crate::range_index::RangeIndex;

/// Projects `next`'s selection onto the buffer via `range_index` and
/// pushes it to `frontend`. A collapsed-or-absent selection whose
/// presence didn't change against `prev` is left alone; everything else
/// resets or repositions the native selection.
pub fn project(
    range_index: &RangeIndex,
    prev: &dyn EditorState,
    next: &dyn EditorState,
    frontend: &mut dyn Frontend,
) {
    let Some(selection) = next.selection() else {
        if prev.selection().is_some() {
            frontend.reset_native_selection();
        }
        return;
    };

    let resolved = match selection {
        Selection::Collapsed(point) => location_of(range_index, point).map(NativeSelection::Collapsed),
        Selection::Range { anchor, focus } => {
            match (location_of(range_index, anchor), location_of(range_index, focus)) {
                (Some(anchor), Some(focus)) => Some(NativeSelection::Directional { anchor, focus }),
                _ => None,
            }
        }
    };

    match resolved {
        Some(native) => frontend.update_native_selection(native),
        None => frontend.reset_native_selection(),
    }
}

/// Inverse of `RangeIndex::resolve`: a tree-space `(key, part, offset)`
/// back to an absolute buffer location (spec §4.6 `resolve_inverse`).
fn location_of(range_index: &RangeIndex, point: SelectionPoint) -> Option<usize> {
    range_index.location_of(Point {
        key: point.key,
        part: point.part,
        offset: point.offset,
    })
}
