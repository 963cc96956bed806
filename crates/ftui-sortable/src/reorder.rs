#![forbid(unsafe_code)]

//! Pure reordering algorithms.
//!
//! Nothing here mutates its input: every function returns fresh sequences and
//! callers decide whether to swap them in or mutate in place.
//!
//! # Algorithms
//!
//! - [`array_move`]: relocate one element inside one sequence.
//! - [`multi_move`]: lift a set of entries out of one or more collections
//!   (all at the same nesting level) and insert them as one contiguous block
//!   at a destination.
//!
//! # Invariants
//!
//! 1. Removals within a collection run from the highest index to the lowest,
//!    so no removal shifts an index that is still pending.
//! 2. The inserted block keeps the entries' combined source order: ascending
//!    collection id, then ascending index. Selection order is irrelevant.
//! 3. Elements that were not moved keep their relative order.
//! 4. Total element count over all touched collections is conserved.
//!
//! # Destination indices
//!
//! A destination index counts positions in the destination collection *after*
//! the moved entries have been removed from it, which is what
//! `array_move(seq, from, to)` means by `to`. Hosts that hit-test against
//! the current layout get a gap index instead; [`gap_to_destination`]
//! converts one into the other.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::CollectionId;

/// Position of one entry: a collection and an index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryPosition {
    pub collection: CollectionId,
    pub index: usize,
}

impl EntryPosition {
    #[must_use]
    pub const fn new(collection: CollectionId, index: usize) -> Self {
        Self { collection, index }
    }
}

/// Result of a [`multi_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiMove<T> {
    /// New contents of every touched collection (origins and destination).
    pub collections: BTreeMap<CollectionId, Vec<T>>,
    /// The moved values, in combined source order.
    pub moved: Vec<T>,
    /// Destination after clamping; `index` is where the block starts.
    pub destination: EntryPosition,
}

/// Reorder precondition failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// A multi-move was requested with nothing to move.
    EmptyMoveSet,
    IndexOutOfBounds {
        collection: CollectionId,
        index: usize,
        len: usize,
    },
    DuplicateSource {
        collection: CollectionId,
        index: usize,
    },
    UnknownCollection(CollectionId),
}

impl ReorderError {
    /// Attach a collection id to an error raised by a collection-agnostic helper.
    pub(crate) fn in_collection(self, id: CollectionId) -> Self {
        match self {
            Self::IndexOutOfBounds { index, len, .. } => Self::IndexOutOfBounds {
                collection: id,
                index,
                len,
            },
            Self::DuplicateSource { index, .. } => Self::DuplicateSource {
                collection: id,
                index,
            },
            other => other,
        }
    }
}

impl fmt::Display for ReorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMoveSet => write!(f, "multi-move requires at least one moved entry"),
            Self::IndexOutOfBounds {
                collection,
                index,
                len,
            } => write!(f, "index {index} out of bounds for {collection} (len {len})"),
            Self::DuplicateSource { collection, index } => {
                write!(f, "entry {index} of {collection} listed more than once")
            }
            Self::UnknownCollection(id) => write!(f, "{id} is not part of the move"),
        }
    }
}

impl std::error::Error for ReorderError {}

/// Move the element at `from` to `to`, shifting the elements in between.
///
/// `to` past the end clamps to the last position. Moving from `i` to `j`
/// and back from `j` to `i` restores the input.
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Result<Vec<T>, ReorderError> {
    let len = items.len();
    if from >= len {
        return Err(ReorderError::IndexOutOfBounds {
            collection: CollectionId::default(),
            index: from,
            len,
        });
    }
    let mut out = items.to_vec();
    let value = out.remove(from);
    out.insert(to.min(len - 1), value);
    Ok(out)
}

/// Split `items` into the kept elements and the removed ones.
///
/// Removal runs from the highest index down; the removed elements are
/// returned in ascending original order regardless of the order `indices`
/// were given in.
pub fn remove_indices<T: Clone>(
    items: &[T],
    indices: &[usize],
) -> Result<(Vec<T>, Vec<T>), ReorderError> {
    let len = items.len();
    let mut descending = indices.to_vec();
    descending.sort_unstable_by(|a, b| b.cmp(a));
    for pair in descending.windows(2) {
        if pair[0] == pair[1] {
            return Err(ReorderError::DuplicateSource {
                collection: CollectionId::default(),
                index: pair[0],
            });
        }
    }
    if let Some(&highest) = descending.first()
        && highest >= len
    {
        return Err(ReorderError::IndexOutOfBounds {
            collection: CollectionId::default(),
            index: highest,
            len,
        });
    }

    let mut kept = items.to_vec();
    let mut removed = Vec::with_capacity(descending.len());
    for index in descending {
        removed.push(kept.remove(index));
    }
    removed.reverse();
    Ok((kept, removed))
}

/// Sort positions into combined source order.
#[must_use]
pub fn source_order(mut positions: Vec<EntryPosition>) -> Vec<EntryPosition> {
    positions.sort_unstable();
    positions
}

/// Convert a pre-removal gap in `slot.collection` into a post-removal
/// destination index.
///
/// A gap `g` sits between elements `g - 1` and `g` of the collection as laid
/// out now. Every moved entry of the same collection that sits above the gap
/// disappears before insertion, pulling the gap up by one.
#[must_use]
pub fn gap_to_destination(slot: EntryPosition, moved: &[EntryPosition]) -> EntryPosition {
    let above = moved
        .iter()
        .filter(|entry| entry.collection == slot.collection && entry.index < slot.index)
        .count();
    EntryPosition::new(slot.collection, slot.index - above)
}

/// Move `sources` (possibly spanning several collections) to `destination`.
///
/// `collections` must contain every source collection and the destination
/// collection. Only touched collections appear in the result.
pub fn multi_move<T: Clone>(
    collections: &BTreeMap<CollectionId, Vec<T>>,
    sources: &[EntryPosition],
    destination: EntryPosition,
) -> Result<MultiMove<T>, ReorderError> {
    if sources.is_empty() {
        return Err(ReorderError::EmptyMoveSet);
    }
    if !collections.contains_key(&destination.collection) {
        return Err(ReorderError::UnknownCollection(destination.collection));
    }

    let mut by_collection: BTreeMap<CollectionId, Vec<usize>> = BTreeMap::new();
    for source in sources {
        by_collection
            .entry(source.collection)
            .or_default()
            .push(source.index);
    }

    let mut touched = BTreeMap::new();
    let mut moved = Vec::with_capacity(sources.len());
    // BTreeMap iteration is ascending by id, which is the combined source order.
    for (id, indices) in &by_collection {
        let items = collections
            .get(id)
            .ok_or(ReorderError::UnknownCollection(*id))?;
        let (kept, removed) =
            remove_indices(items, indices).map_err(|err| err.in_collection(*id))?;
        moved.extend(removed);
        touched.insert(*id, kept);
    }

    let mut target = match touched.remove(&destination.collection) {
        Some(kept) => kept,
        None => collections
            .get(&destination.collection)
            .cloned()
            .unwrap_or_default(),
    };
    let index = destination.index.min(target.len());
    let _ = target.splice(index..index, moved.iter().cloned());
    touched.insert(destination.collection, target);

    Ok(MultiMove {
        collections: touched,
        moved,
        destination: EntryPosition::new(destination.collection, index),
    })
}

/// Run [`multi_move`] and write the touched collections back into
/// `collections`. Returns the clamped destination.
pub fn apply_multi_move<T: Clone>(
    collections: &mut BTreeMap<CollectionId, Vec<T>>,
    sources: &[EntryPosition],
    destination: EntryPosition,
) -> Result<EntryPosition, ReorderError> {
    let outcome = multi_move(collections, sources, destination)?;
    for (id, items) in outcome.collections {
        collections.insert(id, items);
    }
    Ok(outcome.destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(raw: u64) -> CollectionId {
        CollectionId::new(raw)
    }

    fn pos(collection: u64, index: usize) -> EntryPosition {
        EntryPosition::new(cid(collection), index)
    }

    fn two_lists() -> BTreeMap<CollectionId, Vec<&'static str>> {
        let mut map = BTreeMap::new();
        map.insert(cid(0), vec!["a0", "a1", "a2"]);
        map.insert(cid(1), vec!["b0", "b1"]);
        map
    }

    // --- array_move ---

    #[test]
    fn array_move_forward() {
        let out = array_move(&[1, 2, 3, 4, 5], 1, 3).unwrap();
        assert_eq!(out, vec![1, 3, 4, 2, 5]);
    }

    #[test]
    fn array_move_backward() {
        let out = array_move(&[1, 2, 3, 4, 5], 4, 0).unwrap();
        assert_eq!(out, vec![5, 1, 2, 3, 4]);
    }

    #[test]
    fn array_move_same_index_is_identity() {
        let out = array_move(&['x', 'y', 'z'], 1, 1).unwrap();
        assert_eq!(out, vec!['x', 'y', 'z']);
    }

    #[test]
    fn array_move_clamps_destination() {
        let out = array_move(&[1, 2, 3], 0, 99).unwrap();
        assert_eq!(out, vec![2, 3, 1]);
    }

    #[test]
    fn array_move_rejects_bad_source() {
        assert!(matches!(
            array_move::<u8>(&[], 0, 0),
            Err(ReorderError::IndexOutOfBounds { index: 0, len: 0, .. })
        ));
    }

    // --- remove_indices ---

    #[test]
    fn remove_indices_any_order() {
        let items = ["x0", "x1", "x2", "x3"];
        let (kept, removed) = remove_indices(&items, &[1, 3]).unwrap();
        assert_eq!(kept, vec!["x0", "x2"]);
        assert_eq!(removed, vec!["x1", "x3"]);

        let (kept, removed) = remove_indices(&items, &[3, 1]).unwrap();
        assert_eq!(kept, vec!["x0", "x2"]);
        assert_eq!(removed, vec!["x1", "x3"]);
    }

    #[test]
    fn remove_indices_rejects_duplicates() {
        assert_eq!(
            remove_indices(&[1, 2, 3], &[2, 0, 2]),
            Err(ReorderError::DuplicateSource {
                collection: CollectionId::default(),
                index: 2
            })
        );
    }

    #[test]
    fn remove_indices_rejects_out_of_range() {
        assert!(matches!(
            remove_indices(&[1, 2, 3], &[3]),
            Err(ReorderError::IndexOutOfBounds { index: 3, len: 3, .. })
        ));
    }

    // --- multi_move ---

    #[test]
    fn multi_move_preserves_source_order_not_selection_order() {
        // a2 was selected before a0; the block still lands as a0, a2.
        let out = multi_move(&two_lists(), &[pos(0, 2), pos(0, 0)], pos(1, 1)).unwrap();
        assert_eq!(out.collections[&cid(0)], vec!["a1"]);
        assert_eq!(out.collections[&cid(1)], vec!["b0", "a0", "a2", "b1"]);
        assert_eq!(out.moved, vec!["a0", "a2"]);
        assert_eq!(out.destination, pos(1, 1));
    }

    #[test]
    fn multi_move_across_origins_orders_by_collection() {
        let mut map = two_lists();
        map.insert(cid(2), vec!["c0", "c1"]);
        let out = multi_move(&map, &[pos(1, 0), pos(0, 1)], pos(2, 2)).unwrap();
        assert_eq!(out.collections[&cid(2)], vec!["c0", "c1", "a1", "b0"]);
        assert_eq!(out.collections[&cid(0)], vec!["a0", "a2"]);
        assert_eq!(out.collections[&cid(1)], vec!["b1"]);
    }

    #[test]
    fn multi_move_within_one_collection() {
        let map = BTreeMap::from([(cid(0), vec![0, 1, 2, 3, 4, 5])]);
        // Post-removal list is [0, 2, 4, 5]; insert [1, 3] at 3.
        let out = multi_move(&map, &[pos(0, 3), pos(0, 1)], pos(0, 3)).unwrap();
        assert_eq!(out.collections[&cid(0)], vec![0, 2, 4, 1, 3, 5]);
        assert_eq!(out.collections.len(), 1);
    }

    #[test]
    fn multi_move_clamps_destination() {
        let out = multi_move(&two_lists(), &[pos(0, 0)], pos(1, 40)).unwrap();
        assert_eq!(out.collections[&cid(1)], vec!["b0", "b1", "a0"]);
        assert_eq!(out.destination, pos(1, 2));
    }

    #[test]
    fn multi_move_to_own_position_is_identity() {
        let out = multi_move(&two_lists(), &[pos(0, 1)], pos(0, 1)).unwrap();
        assert_eq!(out.collections[&cid(0)], vec!["a0", "a1", "a2"]);
    }

    #[test]
    fn multi_move_into_untouched_destination_includes_it() {
        let out = multi_move(&two_lists(), &[pos(1, 1)], pos(0, 0)).unwrap();
        assert_eq!(out.collections[&cid(0)], vec!["b1", "a0", "a1", "a2"]);
        assert_eq!(out.collections[&cid(1)], vec!["b0"]);
    }

    #[test]
    fn multi_move_rejects_empty() {
        assert_eq!(
            multi_move(&two_lists(), &[], pos(0, 0)),
            Err(ReorderError::EmptyMoveSet)
        );
    }

    #[test]
    fn multi_move_rejects_unknown_collections() {
        assert_eq!(
            multi_move(&two_lists(), &[pos(0, 0)], pos(9, 0)),
            Err(ReorderError::UnknownCollection(cid(9)))
        );
        assert_eq!(
            multi_move(&two_lists(), &[pos(8, 0)], pos(0, 0)),
            Err(ReorderError::UnknownCollection(cid(8)))
        );
    }

    #[test]
    fn multi_move_reports_collection_on_bad_index() {
        assert_eq!(
            multi_move(&two_lists(), &[pos(1, 5)], pos(0, 0)),
            Err(ReorderError::IndexOutOfBounds {
                collection: cid(1),
                index: 5,
                len: 2
            })
        );
    }

    #[test]
    fn apply_multi_move_writes_back() {
        let mut map = two_lists();
        let dest = apply_multi_move(&mut map, &[pos(0, 2), pos(0, 0)], pos(1, 1)).unwrap();
        assert_eq!(dest, pos(1, 1));
        assert_eq!(map[&cid(0)], vec!["a1"]);
        assert_eq!(map[&cid(1)], vec!["b0", "a0", "a2", "b1"]);
    }

    // --- gap conversion ---

    #[test]
    fn gap_below_moved_entries_shifts_up() {
        let moved = [pos(0, 0), pos(0, 2), pos(1, 0)];
        assert_eq!(gap_to_destination(pos(0, 4), &moved), pos(0, 2));
        assert_eq!(gap_to_destination(pos(0, 0), &moved), pos(0, 0));
        assert_eq!(gap_to_destination(pos(1, 2), &moved), pos(1, 1));
        assert_eq!(gap_to_destination(pos(2, 3), &moved), pos(2, 3));
    }

    #[test]
    fn gap_around_single_item_is_noop() {
        // Both gaps adjacent to item 2 resolve to index 2.
        let moved = [pos(0, 2)];
        assert_eq!(gap_to_destination(pos(0, 2), &moved).index, 2);
        assert_eq!(gap_to_destination(pos(0, 3), &moved).index, 2);
    }

    #[test]
    fn source_order_sorts_by_collection_then_index() {
        let sorted = source_order(vec![pos(1, 0), pos(0, 2), pos(0, 0)]);
        assert_eq!(sorted, vec![pos(0, 0), pos(0, 2), pos(1, 0)]);
    }

    #[test]
    fn error_display() {
        let err = ReorderError::IndexOutOfBounds {
            collection: cid(2),
            index: 4,
            len: 3,
        };
        assert_eq!(err.to_string(), "index 4 out of bounds for collection#2 (len 3)");
    }
}
