//! Pure reordering helpers shared by drag-and-drop and explicit up/down moves.
//!
//! Positions are zero-based. After any move an element's rank is its position, so persisting an
//! order means writing `orderby = index` for every element whose stored rank differs.

/// Move the element at `from` to `to`, shifting the elements in between.
///
/// Returns `None` when either index is out of range or `from == to`, which callers treat as
/// "nothing to do".
pub fn reorder<T: Clone>(sequence: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from == to || from >= sequence.len() || to >= sequence.len() {
        return None;
    }

    let mut moved = sequence.to_vec();
    let element = moved.remove(from);
    moved.insert(to, element);
    Some(moved)
}

/// Target of moving the element at `index` one position up. The first element stays put.
pub fn move_up(index: usize) -> Option<(usize, usize)> {
    index.checked_sub(1).map(|to| (index, to))
}

/// Target of moving the element at `index` one position down. The last element stays put.
pub fn move_down(index: usize, len: usize) -> Option<(usize, usize)> {
    let to = index.checked_add(1)?;
    (to < len).then_some((index, to))
}

/// Turn a drag result into `(from, to)` positions within `keys`.
///
/// Unresolved drops (`over == None`), drops onto the dragged element itself and keys that are
/// not in the sequence resolve to `None`.
pub fn resolve_drop<K: PartialEq>(keys: &[K], active: &K, over: Option<&K>) -> Option<(usize, usize)> {
    let over = over?;
    if active == over {
        return None;
    }
    let from = keys.iter().position(|k| k == active)?;
    let to = keys.iter().position(|k| k == over)?;
    Some((from, to))
}

/// The `(key, new rank)` pairs whose stored rank differs from their position.
pub fn rank_changes<K: Copy>(ranked: impl IntoIterator<Item = (K, i32)>) -> Vec<(K, i32)> {
    ranked
        .into_iter()
        .enumerate()
        .filter_map(|(position, (key, rank))| {
            let position = i32::try_from(position).ok()?;
            (rank != position).then_some((key, position))
        })
        .collect()
}
