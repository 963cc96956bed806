#![forbid(unsafe_code)]

//! Input modifiers and the outcomes the drag layer emits.
//!
//! Pointer entry points on [`crate::DragLayer`] return the [`SortEvent`]s
//! they produced instead of invoking callbacks, so hosts apply them after
//! the layer is back in a settled state (and may freely re-register items
//! while doing so).
//!
//! # Invariants
//!
//! 1. At most one reorder event (`SortEnd` or `MultiSortEnd`) is emitted per
//!    drag, and only on commit.
//! 2. `MultiSortEnd::moved_entries` is non-empty and in source order.
//! 3. A `SortStart` is always followed by exactly one `SortEnd`,
//!    `MultiSortEnd`, or `SortCancel`.

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::collection::CollectionId;
use crate::hit_test::DropSlot;
use crate::registry::ItemHandle;
use crate::reorder::{self, EntryPosition, ReorderError};
use crate::session::CancelReason;

bitflags! {
    /// Modifier keys held during a pointer press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// Ctrl or Meta: the press adds to (or removes from) the selection
    /// instead of replacing it.
    #[must_use]
    pub fn is_additive(self) -> bool {
        self.intersects(Self::CTRL | Self::SUPER)
    }
}

/// One moved item and where it was before the move.
///
/// Field order matters: the derived ordering is the combined source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MovedEntry {
    pub collection: CollectionId,
    pub index: usize,
    pub handle: ItemHandle,
}

impl MovedEntry {
    #[must_use]
    pub const fn position(&self) -> EntryPosition {
        EntryPosition::new(self.collection, self.index)
    }
}

/// Single item reordered within its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEnd {
    pub collection: CollectionId,
    pub old_index: usize,
    pub new_index: usize,
}

impl SortEnd {
    /// Apply to the caller's copy of the collection.
    pub fn apply<T: Clone>(&self, items: &mut Vec<T>) -> Result<(), ReorderError> {
        *items = reorder::array_move(items, self.old_index, self.new_index)
            .map_err(|err| err.in_collection(self.collection))?;
        Ok(())
    }

    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.old_index == self.new_index
    }
}

/// Block move of one or more items, possibly across collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSortEnd {
    pub destination_collection: CollectionId,
    /// Start of the block in the destination, counted after removal.
    pub destination_index: usize,
    pub moved_entries: Vec<MovedEntry>,
}

impl MultiSortEnd {
    #[must_use]
    pub fn sources(&self) -> Vec<EntryPosition> {
        self.moved_entries.iter().map(MovedEntry::position).collect()
    }

    #[must_use]
    pub const fn destination(&self) -> EntryPosition {
        EntryPosition::new(self.destination_collection, self.destination_index)
    }

    /// Apply to caller-owned collections keyed by id.
    pub fn apply<T: Clone>(
        &self,
        collections: &mut BTreeMap<CollectionId, Vec<T>>,
    ) -> Result<EntryPosition, ReorderError> {
        reorder::apply_multi_move(collections, &self.sources(), self.destination())
    }
}

/// Observable outcome of a drag-layer entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SortEvent {
    /// Ordinary selection or pinned set changed; carries selected ∪ pinned.
    SelectionChanged { selected: Vec<ItemHandle> },
    /// Press crossed the distance threshold and became a drag.
    SortStart {
        origin_collection: CollectionId,
        moved: Vec<MovedEntry>,
    },
    /// Hover target changed while dragging.
    SortOver { target: Option<DropSlot> },
    SortEnd(SortEnd),
    MultiSortEnd(MultiSortEnd),
    SortCancel { reason: CancelReason },
}

impl SortEvent {
    /// Whether this event commits a reorder.
    #[must_use]
    pub fn is_reorder(&self) -> bool {
        matches!(self, Self::SortEnd(_) | Self::MultiSortEnd(_))
    }

    #[must_use]
    pub fn is_selection_change(&self) -> bool {
        matches!(self, Self::SelectionChanged { .. })
    }
}
