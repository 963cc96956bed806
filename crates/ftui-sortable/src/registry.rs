#![forbid(unsafe_code)]

//! Registry of live sortable items and collections.
//!
//! The registry is the single source of truth mapping an [`ItemHandle`] to
//! its current `(collection, index)` position. Hosts keep it in sync as items
//! mount, unmount, or shift; the drag layer reindexes it itself after a
//! commit.
//!
//! # Invariants
//!
//! 1. Handles are non-zero and never reused within one registry.
//! 2. Each handle belongs to exactly one collection member list.
//! 3. Outside of an in-flight remount, indices in a collection form a
//!    contiguous `0..len` permutation. The registry does *not* enforce this:
//!    nested lists remounting out of order may transiently put two handles on
//!    one index. [`Registry::is_contiguous`] reports the current state.
//!
//! # Failure Modes
//!
//! - Removing an unknown handle is a logged no-op.
//! - Adding an item to an unknown collection creates the collection
//!   implicitly (children may mount before their list).
//! - A parent chain that loops (host bug) is cut after a bounded walk;
//!   the depth reported is the length walked so far.

use std::collections::BTreeMap;
use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collection::CollectionId;
use crate::geometry::Bounds;
use crate::reorder::EntryPosition;

const TARGET: &str = "ftui.sortable";

/// Upper bound on nesting walked by [`Registry::depth`].
const MAX_NESTING_DEPTH: usize = 64;

/// Opaque identity of one rendered item.
///
/// Stable across reorders and across moves between collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemHandle(u64);

impl ItemHandle {
    /// Raw numeric value (always non-zero).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Registered item state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub collection: CollectionId,
    pub index: usize,
    /// Disabled items keep their slot but can't be dragged or selected.
    pub disabled: bool,
    /// Always-selected ("current") item.
    pub pinned: bool,
    /// Last layout rectangle reported by the host.
    pub bounds: Option<Bounds>,
}

impl RegistryEntry {
    #[must_use]
    pub const fn position(&self) -> EntryPosition {
        EntryPosition::new(self.collection, self.index)
    }
}

/// Registered collection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionEntry {
    /// Item this collection is nested in, if any.
    pub parent: Option<ItemHandle>,
    pub disabled: bool,
    pub bounds: Option<Bounds>,
    members: Vec<ItemHandle>,
}

impl CollectionEntry {
    /// Handles currently registered in this collection, in registration order.
    #[must_use]
    pub fn members(&self) -> &[ItemHandle] {
        &self.members
    }
}

/// Table of live items and collections.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: AHashMap<ItemHandle, RegistryEntry>,
    collections: BTreeMap<CollectionId, CollectionEntry>,
    next_handle: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
            collections: BTreeMap::new(),
            next_handle: 1,
        }
    }

    // --- collections ---

    /// Register (or update) a collection.
    ///
    /// Re-registering keeps existing members, so a list that remounts after
    /// its children is not a problem.
    pub fn add_collection(&mut self, id: CollectionId, parent: Option<ItemHandle>, disabled: bool) {
        let entry = self.collections.entry(id).or_default();
        entry.parent = parent;
        entry.disabled = disabled;
    }

    /// Remove a collection, returning the handles that were still in it.
    ///
    /// Those handles are dropped from the registry as well.
    pub fn remove_collection(&mut self, id: CollectionId) -> Vec<ItemHandle> {
        let Some(entry) = self.collections.remove(&id) else {
            return Vec::new();
        };
        for handle in &entry.members {
            let _ = self.entries.remove(handle);
        }
        entry.members
    }

    #[must_use]
    pub fn collection(&self, id: CollectionId) -> Option<&CollectionEntry> {
        self.collections.get(&id)
    }

    pub fn collection_ids(&self) -> impl Iterator<Item = CollectionId> + '_ {
        self.collections.keys().copied()
    }

    /// Returns false if the collection is unknown.
    pub fn set_collection_disabled(&mut self, id: CollectionId, disabled: bool) -> bool {
        match self.collections.get_mut(&id) {
            Some(entry) => {
                entry.disabled = disabled;
                true
            }
            None => false,
        }
    }

    /// Returns false if the collection is unknown.
    pub fn set_collection_bounds(&mut self, id: CollectionId, bounds: Option<Bounds>) -> bool {
        match self.collections.get_mut(&id) {
            Some(entry) => {
                entry.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Nesting depth: 0 for root collections, parent depth + 1 otherwise.
    ///
    /// A parent that is not (yet) registered terminates the walk; check
    /// [`Registry::is_anchored`] before trusting the result.
    #[must_use]
    pub fn depth(&self, id: CollectionId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while depth < MAX_NESTING_DEPTH {
            let Some(parent) = self.collections.get(&current).and_then(|c| c.parent) else {
                break;
            };
            let Some(parent_entry) = self.entries.get(&parent) else {
                break;
            };
            depth += 1;
            current = parent_entry.collection;
        }
        depth
    }

    /// Whether every parent item on the chain above `id` is registered.
    ///
    /// A list whose parent item unmounted (or has not mounted yet) has no
    /// meaningful depth; [`Registry::depth`] undercounts it.
    #[must_use]
    pub fn is_anchored(&self, id: CollectionId) -> bool {
        let mut current = id;
        for _ in 0..MAX_NESTING_DEPTH {
            let Some(parent) = self.collections.get(&current).and_then(|c| c.parent) else {
                return true;
            };
            let Some(parent_entry) = self.entries.get(&parent) else {
                return false;
            };
            current = parent_entry.collection;
        }
        false
    }

    /// Whether `id` is nested (at any depth) inside the item `ancestor`.
    #[must_use]
    pub fn is_nested_in(&self, id: CollectionId, ancestor: ItemHandle) -> bool {
        let mut current = id;
        for _ in 0..MAX_NESTING_DEPTH {
            let Some(parent) = self.collections.get(&current).and_then(|c| c.parent) else {
                return false;
            };
            if parent == ancestor {
                return true;
            }
            let Some(parent_entry) = self.entries.get(&parent) else {
                return false;
            };
            current = parent_entry.collection;
        }
        false
    }

    // --- items ---

    /// Register an item and allocate its handle.
    pub fn add(
        &mut self,
        collection: CollectionId,
        index: usize,
        disabled: bool,
        pinned: bool,
    ) -> ItemHandle {
        let handle = ItemHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.entries.insert(
            handle,
            RegistryEntry {
                collection,
                index,
                disabled,
                pinned,
                bounds: None,
            },
        );
        self.collections
            .entry(collection)
            .or_default()
            .members
            .push(handle);
        handle
    }

    /// Unregister an item. Unknown handles are ignored.
    pub fn remove(&mut self, handle: ItemHandle) -> Option<RegistryEntry> {
        let Some(entry) = self.entries.remove(&handle) else {
            warn!(target: TARGET, handle = handle.get(), "remove of unknown sortable handle ignored");
            return None;
        };
        if let Some(collection) = self.collections.get_mut(&entry.collection) {
            collection.members.retain(|member| *member != handle);
        }
        Some(entry)
    }

    /// Update an item's index within its current collection.
    pub fn reindex(&mut self, handle: ItemHandle, new_index: usize) -> bool {
        match self.entries.get_mut(&handle) {
            Some(entry) => {
                entry.index = new_index;
                true
            }
            None => false,
        }
    }

    /// Move an item to another collection (or index).
    pub fn relocate(&mut self, handle: ItemHandle, collection: CollectionId, index: usize) -> bool {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return false;
        };
        let previous = entry.collection;
        entry.collection = collection;
        entry.index = index;
        if previous != collection {
            if let Some(old) = self.collections.get_mut(&previous) {
                old.members.retain(|member| *member != handle);
            }
            self.collections
                .entry(collection)
                .or_default()
                .members
                .push(handle);
        }
        true
    }

    pub fn set_disabled(&mut self, handle: ItemHandle, disabled: bool) -> bool {
        self.update(handle, |entry| entry.disabled = disabled)
    }

    pub fn set_pinned(&mut self, handle: ItemHandle, pinned: bool) -> bool {
        self.update(handle, |entry| entry.pinned = pinned)
    }

    pub fn set_bounds(&mut self, handle: ItemHandle, bounds: Option<Bounds>) -> bool {
        self.update(handle, |entry| entry.bounds = bounds)
    }

    fn update(&mut self, handle: ItemHandle, f: impl FnOnce(&mut RegistryEntry)) -> bool {
        match self.entries.get_mut(&handle) {
            Some(entry) => {
                f(entry);
                true
            }
            None => false,
        }
    }

    // --- lookup ---

    #[must_use]
    pub fn get(&self, handle: ItemHandle) -> Option<&RegistryEntry> {
        self.entries.get(&handle)
    }

    #[must_use]
    pub fn contains(&self, handle: ItemHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of registered items across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of items registered in `collection`.
    #[must_use]
    pub fn collection_len(&self, collection: CollectionId) -> usize {
        self.collections
            .get(&collection)
            .map_or(0, |entry| entry.members.len())
    }

    /// All registered items, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemHandle, &RegistryEntry)> + '_ {
        self.entries.iter().map(|(handle, entry)| (*handle, entry))
    }

    /// The handle at `(collection, index)`.
    ///
    /// When a remount transiently puts two handles on one index, the one with
    /// the lowest handle id wins.
    #[must_use]
    pub fn handle_at(&self, collection: CollectionId, index: usize) -> Option<ItemHandle> {
        self.collections
            .get(&collection)?
            .members
            .iter()
            .copied()
            .filter(|handle| self.entries.get(handle).is_some_and(|e| e.index == index))
            .min()
    }

    /// Handles of `collection` sorted by index (ties broken by handle id).
    #[must_use]
    pub fn ordered_handles(&self, collection: CollectionId) -> Vec<ItemHandle> {
        let Some(entry) = self.collections.get(&collection) else {
            return Vec::new();
        };
        let mut handles = entry.members.clone();
        handles.sort_by_key(|handle| {
            (
                self.entries.get(handle).map_or(usize::MAX, |e| e.index),
                *handle,
            )
        });
        handles
    }

    /// Whether the indices of `collection` are exactly `0..len`.
    #[must_use]
    pub fn is_contiguous(&self, collection: CollectionId) -> bool {
        self.ordered_handles(collection)
            .iter()
            .enumerate()
            .all(|(expected, handle)| {
                self.entries
                    .get(handle)
                    .is_some_and(|entry| entry.index == expected)
            })
    }

    /// Whether `handle` may be pressed, dragged, or selected right now.
    #[must_use]
    pub fn is_draggable(&self, handle: ItemHandle) -> bool {
        let Some(entry) = self.entries.get(&handle) else {
            return false;
        };
        !entry.disabled
            && !self
                .collections
                .get(&entry.collection)
                .is_some_and(|collection| collection.disabled)
    }

    /// Whether `collection` exists and accepts drops.
    #[must_use]
    pub fn accepts_drops(&self, collection: CollectionId) -> bool {
        self.collections
            .get(&collection)
            .is_some_and(|entry| !entry.disabled)
    }
}
