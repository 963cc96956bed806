#![forbid(unsafe_code)]

//! Ordered collections and their identifiers.
//!
//! [`OrderedCollection`] is the caller-side container the engine's commits
//! are applied to. The engine itself never owns list contents; it only
//! reports where things moved (see [`crate::reorder`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{MultiSortEnd, SortEnd};
use crate::reorder::{self, EntryPosition, ReorderError};

/// Identity of one sortable list.
///
/// Ids also order collections when moved entries from several lists are
/// merged back into one block: entries are concatenated in ascending
/// collection id, so hosts should assign ids in display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CollectionId(u64);

impl CollectionId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection#{}", self.0)
    }
}

impl From<u64> for CollectionId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// An ordered sequence of values identified by a [`CollectionId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedCollection<T> {
    id: CollectionId,
    items: Vec<T>,
}

impl<T> OrderedCollection<T> {
    #[must_use]
    pub fn new(id: CollectionId) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_vec(id: CollectionId, items: Vec<T>) -> Self {
        Self { id, items }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> CollectionId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Replace the contents wholesale (used when applying a computed commit).
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Insert at `index`, appending when `index` is past the end.
    pub fn insert(&mut self, index: usize, value: T) {
        let index = index.min(self.items.len());
        self.items.insert(index, value);
    }

    /// Remove the value at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Insert a block of values starting at `index` (clamped to append).
    pub fn splice_block(&mut self, index: usize, values: impl IntoIterator<Item = T>) {
        let index = index.min(self.items.len());
        let _ = self.items.splice(index..index, values);
    }

    /// Move one value from `from` to `to` in place.
    ///
    /// Same semantics as [`reorder::array_move`]: `to` is clamped to the last
    /// index, intervening values shift by one.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), ReorderError> {
        let len = self.items.len();
        if from >= len {
            return Err(ReorderError::IndexOutOfBounds {
                collection: self.id,
                index: from,
                len,
            });
        }
        let to = to.min(len - 1);
        let value = self.items.remove(from);
        self.items.insert(to, value);
        Ok(())
    }
}

impl<T: Clone> OrderedCollection<T> {
    /// Pure variant of [`move_item`](Self::move_item).
    pub fn moved(&self, from: usize, to: usize) -> Result<Self, ReorderError> {
        let items =
            reorder::array_move(&self.items, from, to).map_err(|err| err.in_collection(self.id))?;
        Ok(Self { id: self.id, items })
    }
}

impl<T: Clone> OrderedCollection<T> {
    /// Apply a single-item commit addressed to this collection.
    pub fn apply_sort_end(&mut self, end: &SortEnd) -> Result<(), ReorderError> {
        if end.collection != self.id {
            return Err(ReorderError::UnknownCollection(end.collection));
        }
        self.move_item(end.old_index, end.new_index)
    }

    /// Apply a block commit across `lists`, which must hold every source
    /// collection and the destination. Lists are left untouched on error.
    pub fn apply_multi_sort_end(
        lists: &mut [Self],
        end: &MultiSortEnd,
    ) -> Result<EntryPosition, ReorderError> {
        let contents: BTreeMap<CollectionId, Vec<T>> = lists
            .iter()
            .map(|list| (list.id, list.items.clone()))
            .collect();
        let outcome = reorder::multi_move(&contents, &end.sources(), end.destination())?;
        for list in lists.iter_mut() {
            if let Some(items) = outcome.collections.get(&list.id) {
                list.items.clone_from(items);
            }
        }
        Ok(outcome.destination)
    }
}

impl<'a, T> IntoIterator for &'a OrderedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
