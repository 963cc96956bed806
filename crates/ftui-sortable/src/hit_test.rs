#![forbid(unsafe_code)]

//! Resolving a pointer position to a drop slot.
//!
//! The drag layer never inspects layout itself; it asks a [`HitTester`].
//! [`BoundsHitTester`] works from the rectangles hosts report through
//! [`Registry::set_bounds`] and [`Registry::set_collection_bounds`].
//!
//! A [`DropSlot`] is a *gap* in the collection as currently laid out: slot
//! `i` sits between items `i - 1` and `i`. The drag layer converts it into a
//! post-removal destination when committing.

use serde::{Deserialize, Serialize};

use crate::collection::CollectionId;
use crate::event::MovedEntry;
use crate::geometry::{Bounds, Position};
use crate::registry::{ItemHandle, Registry};

/// Gap in a collection, counted in the current layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DropSlot {
    pub collection: CollectionId,
    pub index: usize,
}

impl DropSlot {
    #[must_use]
    pub const fn new(collection: CollectionId, index: usize) -> Self {
        Self { collection, index }
    }
}

/// What the active drag is allowed to drop into.
#[derive(Debug, Clone, Copy)]
pub struct HitQuery<'a> {
    pub origin_collection: CollectionId,
    /// Nesting depth of the origin; drops are restricted to this level.
    pub origin_depth: usize,
    pub cross_collection: bool,
    pub moved: &'a [MovedEntry],
}

impl HitQuery<'_> {
    /// Whether a slot in `collection` is admissible for this drag.
    #[must_use]
    pub fn admits(&self, registry: &Registry, collection: CollectionId) -> bool {
        if !self.cross_collection && collection != self.origin_collection {
            return false;
        }
        if !registry.accepts_drops(collection)
            || !registry.is_anchored(collection)
            || registry.depth(collection) != self.origin_depth
        {
            return false;
        }
        // A block can't be dropped inside one of its own members.
        !self
            .moved
            .iter()
            .any(|entry| registry.is_nested_in(collection, entry.handle))
    }
}

/// Spatial lookup collaborator.
pub trait HitTester {
    /// The slot under `position`, or `None` if there is no valid target.
    fn resolve(
        &self,
        position: Position,
        query: &HitQuery<'_>,
        registry: &Registry,
    ) -> Option<DropSlot>;
}

/// Default hit tester using registered bounds.
///
/// Items win over collection rectangles; among overlapping rectangles the
/// smallest area wins, ties going to the lower handle or collection id.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsHitTester;

impl BoundsHitTester {
    fn item_slot(
        position: Position,
        query: &HitQuery<'_>,
        registry: &Registry,
    ) -> Option<DropSlot> {
        let mut best: Option<(u64, ItemHandle, DropSlot)> = None;
        for (handle, entry) in registry.iter() {
            let Some(bounds) = entry.bounds else {
                continue;
            };
            // Disabled rows are never anchors; the point falls through to
            // the collection's append slot.
            if entry.disabled
                || !bounds.contains(position)
                || !query.admits(registry, entry.collection)
            {
                continue;
            }
            let index = if bounds.in_upper_half(position) {
                entry.index
            } else {
                entry.index + 1
            };
            let key = (bounds.area(), handle);
            if best.is_none_or(|(area, h, _)| key < (area, h)) {
                best = Some((key.0, key.1, DropSlot::new(entry.collection, index)));
            }
        }
        best.map(|(_, _, slot)| slot)
    }

    fn collection_slot(
        position: Position,
        query: &HitQuery<'_>,
        registry: &Registry,
    ) -> Option<DropSlot> {
        registry
            .collection_ids()
            .filter_map(|id| {
                let bounds: Bounds = registry.collection(id)?.bounds?;
                (bounds.contains(position) && query.admits(registry, id))
                    .then_some((bounds.area(), id))
            })
            .min()
            .map(|(_, id)| DropSlot::new(id, registry.collection_len(id)))
    }
}

impl HitTester for BoundsHitTester {
    fn resolve(
        &self,
        position: Position,
        query: &HitQuery<'_>,
        registry: &Registry,
    ) -> Option<DropSlot> {
        Self::item_slot(position, query, registry)
            .or_else(|| Self::collection_slot(position, query, registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(raw: u64) -> CollectionId {
        CollectionId::new(raw)
    }

    /// Two root lists side by side, rows of height 2, width 10.
    fn layout() -> (Registry, Vec<ItemHandle>, Vec<ItemHandle>) {
        let mut reg = Registry::new();
        reg.add_collection(cid(0), None, false);
        reg.add_collection(cid(1), None, false);
        let a: Vec<_> = (0..3).map(|i| reg.add(cid(0), i, false, false)).collect();
        let b: Vec<_> = (0..2).map(|i| reg.add(cid(1), i, false, false)).collect();
        for (i, h) in a.iter().enumerate() {
            reg.set_bounds(*h, Some(Bounds::new(0, i as i32 * 2, 10, 2)));
        }
        for (i, h) in b.iter().enumerate() {
            reg.set_bounds(*h, Some(Bounds::new(20, i as i32 * 2, 10, 2)));
        }
        reg.set_collection_bounds(cid(0), Some(Bounds::new(0, 0, 10, 10)));
        reg.set_collection_bounds(cid(1), Some(Bounds::new(20, 0, 10, 10)));
        (reg, a, b)
    }

    fn query(moved: &[MovedEntry], cross: bool) -> HitQuery<'_> {
        HitQuery {
            origin_collection: cid(0),
            origin_depth: 0,
            cross_collection: cross,
            moved,
        }
    }

    #[test]
    fn upper_and_lower_half() {
        let (reg, _, _) = layout();
        let q = query(&[], true);
        let t = BoundsHitTester;
        assert_eq!(
            t.resolve(Position::new(1, 2), &q, &reg),
            Some(DropSlot::new(cid(0), 1))
        );
        assert_eq!(
            t.resolve(Position::new(1, 3), &q, &reg),
            Some(DropSlot::new(cid(0), 2))
        );
    }

    #[test]
    fn empty_area_of_collection_appends() {
        let (reg, _, _) = layout();
        let t = BoundsHitTester;
        assert_eq!(
            t.resolve(Position::new(25, 8), &query(&[], true), &reg),
            Some(DropSlot::new(cid(1), 2))
        );
        assert_eq!(t.resolve(Position::new(15, 1), &query(&[], true), &reg), None);
    }

    #[test]
    fn cross_collection_can_be_disabled() {
        let (reg, _, _) = layout();
        let t = BoundsHitTester;
        assert_eq!(t.resolve(Position::new(21, 0), &query(&[], false), &reg), None);
        assert!(t.resolve(Position::new(21, 0), &query(&[], true), &reg).is_some());
    }

    #[test]
    fn disabled_row_is_not_an_anchor() {
        let (mut reg, a, _) = layout();
        reg.set_disabled(a[1], true);
        let t = BoundsHitTester;
        // Upper half of a[1] falls through to the append slot of list 0.
        assert_eq!(
            t.resolve(Position::new(1, 2), &query(&[], true), &reg),
            Some(DropSlot::new(cid(0), 3))
        );
        // Neighbouring rows still resolve normally.
        assert_eq!(
            t.resolve(Position::new(1, 4), &query(&[], true), &reg),
            Some(DropSlot::new(cid(0), 2))
        );
    }

    #[test]
    fn orphaned_nested_list_rejects_drops() {
        let mut reg = Registry::new();
        reg.add_collection(cid(0), None, false);
        let part = reg.add(cid(0), 0, false, false);
        reg.add_collection(cid(5), Some(part), false);
        let lesson = reg.add(cid(5), 0, false, false);
        reg.set_bounds(lesson, Some(Bounds::new(2, 2, 8, 2)));
        reg.set_collection_bounds(cid(5), Some(Bounds::new(2, 2, 8, 4)));
        reg.remove(part);
        assert!(!reg.is_anchored(cid(5)));
        // The orphan reports depth 0 but must not pass as a root list.
        let q = query(&[], true);
        assert!(!q.admits(&reg, cid(5)));
        assert_eq!(BoundsHitTester.resolve(Position::new(3, 2), &q, &reg), None);
    }

    #[test]
    fn disabled_collection_rejects_drops() {
        let (mut reg, _, _) = layout();
        reg.set_collection_disabled(cid(1), true);
        assert_eq!(
            BoundsHitTester.resolve(Position::new(21, 0), &query(&[], true), &reg),
            None
        );
    }

    #[test]
    fn other_depths_are_skipped() {
        let (mut reg, a, _) = layout();
        reg.add_collection(cid(7), Some(a[0]), false);
        let child = reg.add(cid(7), 0, false, false);
        reg.set_bounds(child, Some(Bounds::new(2, 0, 4, 1)));
        // The nested child overlaps a[0] but lives one level deeper.
        assert_eq!(
            BoundsHitTester.resolve(Position::new(3, 0), &query(&[], true), &reg),
            Some(DropSlot::new(cid(0), 0))
        );
    }

    #[test]
    fn smallest_overlapping_item_wins() {
        let (mut reg, a, _) = layout();
        reg.set_bounds(a[1], Some(Bounds::new(0, 0, 10, 6)));
        assert_eq!(
            BoundsHitTester.resolve(Position::new(1, 0), &query(&[], true), &reg),
            Some(DropSlot::new(cid(0), 0))
        );
    }

    #[test]
    fn cannot_drop_into_own_descendant() {
        let mut reg = Registry::new();
        reg.add_collection(cid(0), None, false);
        let part = reg.add(cid(0), 0, false, false);
        reg.add_collection(cid(5), Some(part), false);
        reg.set_collection_bounds(cid(5), Some(Bounds::new(0, 0, 10, 10)));
        let moved = [MovedEntry {
            collection: cid(0),
            index: 0,
            handle: part,
        }];
        let q = HitQuery {
            origin_collection: cid(0),
            origin_depth: 1,
            cross_collection: true,
            moved: &moved,
        };
        assert!(!q.admits(&reg, cid(5)));
    }
}
