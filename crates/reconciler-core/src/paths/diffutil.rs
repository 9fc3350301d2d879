//! Cheap structural comparisons shared by several classifier preconditions.

use crate::model::NodeKey;

/// If `next` equals `prev` with exactly one contiguous block of brand-new
/// keys spliced in (no removals, no reordering of the surviving keys),
/// returns `(insert_index, count)`.
pub fn contiguous_new_children(prev: &[NodeKey], next: &[NodeKey]) -> Option<(usize, usize)> {
    if next.len() <= prev.len() {
        return None;
    }
    let added = next.len() - prev.len();
    let mut prefix = 0;
    while prefix < prev.len() && prev[prefix] == next[prefix] {
        prefix += 1;
    }
    if prev[prefix..] == next[prefix + added..] {
        Some((prefix, added))
    } else {
        None
    }
}

/// Symmetric to [`contiguous_new_children`]: one contiguous block of keys
/// removed, survivors in the same relative order.
pub fn contiguous_removed_children(prev: &[NodeKey], next: &[NodeKey]) -> Option<(usize, usize)> {
    if prev.len() <= next.len() {
        return None;
    }
    let removed = prev.len() - next.len();
    let mut prefix = 0;
    while prefix < prev.len() && prefix < next.len() && prev[prefix] == next[prefix] {
        prefix += 1;
    }
    if prev.len() < prefix + removed {
        return None;
    }
    if next[prefix..] == prev[prefix + removed..] {
        Some((prefix, removed))
    } else {
        None
    }
}

/// True if `prev` and `next` are permutations of the same key set but not
/// identical in order.
pub fn same_key_set_reordered(prev: &[NodeKey], next: &[NodeKey]) -> bool {
    if prev.len() != next.len() || prev == next {
        return false;
    }
    let mut p = prev.to_vec();
    let mut n = next.to_vec();
    p.sort_by_key(|k| k.0);
    n.sort_by_key(|k| k.0);
    p == n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ids: &[u64]) -> Vec<NodeKey> {
        ids.iter().map(|&id| NodeKey(id)).collect()
    }

    #[test]
    fn detects_contiguous_insert_in_the_middle() {
        let prev = keys(&[1, 2, 3]);
        let next = keys(&[1, 2, 10, 11, 3]);
        assert_eq!(contiguous_new_children(&prev, &next), Some((2, 2)));
    }

    #[test]
    fn rejects_insert_combined_with_reorder() {
        let prev = keys(&[1, 2, 3]);
        let next = keys(&[1, 3, 10, 2]);
        assert_eq!(contiguous_new_children(&prev, &next), None);
    }

    #[test]
    fn detects_contiguous_removal() {
        let prev = keys(&[1, 2, 3, 4]);
        let next = keys(&[1, 4]);
        assert_eq!(contiguous_removed_children(&prev, &next), Some((1, 2)));
    }
}
