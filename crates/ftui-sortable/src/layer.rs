#![forbid(unsafe_code)]

//! The drag-layer coordinator.
//!
//! [`DragLayer`] owns the registry, the selection, and the drag machine, and
//! is the only surface hosts talk to. Each entry point returns the
//! [`SortEvent`]s it produced; by the time the caller sees them the layer is
//! settled (idle after a commit or cancel), so re-registering items in
//! response is always safe.
//!
//! # Click vs drag
//!
//! Selection toggles happen on release of a press that never crossed the
//! distance threshold. A press that became a drag never touches the
//! selection. A non-additive press on background clears the ordinary
//! selection immediately.
//!
//! # Snapshot
//!
//! Pressing a selected or pinned item (with multi-select on) drags every
//! selected and pinned item at the pressed item's nesting level. Pressing
//! anything else drags only that item.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, debug_span, info, warn};

use crate::collection::CollectionId;
use crate::config::SortableConfig;
use crate::element::DragHelper;
use crate::error::SortableError;
use crate::event::{Modifiers, MovedEntry, MultiSortEnd, SortEnd, SortEvent};
use crate::geometry::{Bounds, Position};
use crate::hit_test::{BoundsHitTester, DropSlot, HitQuery, HitTester};
use crate::registry::{ItemHandle, Registry};
use crate::reorder::{self, EntryPosition};
use crate::selection::SelectionSet;
use crate::session::{CancelReason, DragEffect, DragMachine, DragPhase, DragSession};

const TARGET: &str = "ftui.sortable";

/// Coordinator for one tree of sortable collections.
#[derive(Debug, Clone)]
pub struct DragLayer<H = BoundsHitTester> {
    config: SortableConfig,
    registry: Registry,
    selection: SelectionSet,
    machine: DragMachine,
    hit_tester: H,
}

impl DragLayer<BoundsHitTester> {
    /// Layer with the default bounds-based hit tester.
    pub fn new(config: SortableConfig) -> Result<Self, SortableError> {
        Self::with_hit_tester(config, BoundsHitTester)
    }
}

impl<H: HitTester> DragLayer<H> {
    pub fn with_hit_tester(config: SortableConfig, hit_tester: H) -> Result<Self, SortableError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: Registry::new(),
            selection: SelectionSet::new(),
            machine: DragMachine::new(config.distance_threshold, config.hover_hysteresis),
            hit_tester,
        })
    }

    // --- queries ---

    #[must_use]
    pub const fn config(&self) -> &SortableConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Selected or pinned.
    #[must_use]
    pub fn is_selected(&self, handle: ItemHandle) -> bool {
        self.selection.is_marked(handle)
    }

    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.machine.session()
    }

    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.machine.phase()
    }

    /// Helper view of the active drag. `None` unless dragging.
    #[must_use]
    pub fn helper(&self) -> Option<DragHelper> {
        if !self.machine.is_dragging() {
            return None;
        }
        self.machine.session().map(DragHelper::from_session)
    }

    // --- registration ---

    /// Register (or re-register) a collection nested in `parent`, if any.
    pub fn register_collection(
        &mut self,
        id: CollectionId,
        parent: Option<ItemHandle>,
        disabled: bool,
    ) -> Vec<SortEvent> {
        let was_disabled = self
            .registry
            .collection(id)
            .is_some_and(|entry| entry.disabled);
        self.registry.add_collection(id, parent, was_disabled);
        debug!(target: TARGET, collection = %id, ?parent, disabled, "collection registered");
        self.apply_collection_disabled(id, disabled)
    }

    /// Drop a collection and every item still registered in it.
    pub fn unregister_collection(&mut self, id: CollectionId) -> Vec<SortEvent> {
        let removed = self.registry.remove_collection(id);
        debug!(target: TARGET, collection = %id, items = removed.len(), "collection unregistered");
        self.purge(&removed)
    }

    pub fn register(
        &mut self,
        collection: CollectionId,
        index: usize,
        disabled: bool,
        pinned: bool,
    ) -> ItemHandle {
        let handle = self.registry.add(collection, index, disabled, pinned);
        if pinned && self.registry.is_draggable(handle) {
            self.selection.pin(handle);
        }
        debug!(target: TARGET, %handle, %collection, index, disabled, pinned, "item registered");
        handle
    }

    /// Unregister an item. Cancels the drag if the item was being moved.
    pub fn unregister(&mut self, handle: ItemHandle) -> Vec<SortEvent> {
        if self.registry.remove(handle).is_none() {
            return Vec::new();
        }
        debug!(target: TARGET, %handle, "item unregistered");
        self.purge(&[handle])
    }

    pub fn update_index(&mut self, handle: ItemHandle, index: usize) -> Result<(), SortableError> {
        if self.registry.reindex(handle, index) {
            Ok(())
        } else {
            Err(SortableError::UnknownHandle(handle))
        }
    }

    /// Disabling removes the item from the selection and from any drag.
    pub fn update_disabled(
        &mut self,
        handle: ItemHandle,
        disabled: bool,
    ) -> Result<Vec<SortEvent>, SortableError> {
        if !self.registry.set_disabled(handle, disabled) {
            return Err(SortableError::UnknownHandle(handle));
        }
        if disabled {
            Ok(self.purge(&[handle]))
        } else {
            Ok(self.restore_pins(&[handle]))
        }
    }

    /// Mark or unmark the host's "current" item.
    pub fn update_pinned(
        &mut self,
        handle: ItemHandle,
        pinned: bool,
    ) -> Result<Vec<SortEvent>, SortableError> {
        if !self.registry.set_pinned(handle, pinned) {
            return Err(SortableError::UnknownHandle(handle));
        }
        let changed = if pinned {
            self.registry.is_draggable(handle) && self.selection.pin(handle)
        } else {
            self.selection.unpin(handle)
        };
        Ok(self.selection_events(changed))
    }

    pub fn set_bounds(
        &mut self,
        handle: ItemHandle,
        bounds: Option<Bounds>,
    ) -> Result<(), SortableError> {
        if self.registry.set_bounds(handle, bounds) {
            Ok(())
        } else {
            Err(SortableError::UnknownHandle(handle))
        }
    }

    pub fn set_collection_bounds(
        &mut self,
        id: CollectionId,
        bounds: Option<Bounds>,
    ) -> Result<(), SortableError> {
        if self.registry.set_collection_bounds(id, bounds) {
            Ok(())
        } else {
            Err(SortableError::UnknownCollection(id))
        }
    }

    /// Disable (or re-enable) a whole collection.
    pub fn set_collection_disabled(
        &mut self,
        id: CollectionId,
        disabled: bool,
    ) -> Result<Vec<SortEvent>, SortableError> {
        if self.registry.collection(id).is_none() {
            return Err(SortableError::UnknownCollection(id));
        }
        Ok(self.apply_collection_disabled(id, disabled))
    }

    fn apply_collection_disabled(&mut self, id: CollectionId, disabled: bool) -> Vec<SortEvent> {
        self.registry.set_collection_disabled(id, disabled);
        let members = self
            .registry
            .collection(id)
            .map(|entry| entry.members().to_vec())
            .unwrap_or_default();
        if disabled {
            self.purge(&members)
        } else {
            self.restore_pins(&members)
        }
    }

    // --- pointer entry points ---

    /// Pointer pressed on `handle`, or on background when `None`.
    pub fn on_pointer_down(
        &mut self,
        handle: Option<ItemHandle>,
        position: Position,
        modifiers: Modifiers,
    ) -> Result<Vec<SortEvent>, SortableError> {
        if self.machine.is_active() {
            debug!(target: TARGET, ?handle, "press ignored: drag already in progress");
            return Ok(Vec::new());
        }
        let Some(pressed) = handle else {
            let changed = !modifiers.is_additive() && self.selection.clear_all();
            return Ok(self.selection_events(changed));
        };
        let origin_collection = self
            .registry
            .get(pressed)
            .ok_or(SortableError::UnknownHandle(pressed))?
            .collection;
        if !self.registry.is_draggable(pressed) {
            debug!(target: TARGET, handle = %pressed, "press on disabled item ignored");
            return Ok(Vec::new());
        }

        let origin_depth = self.registry.depth(origin_collection);
        let moved = self.snapshot(pressed, origin_collection, origin_depth);
        let session = DragSession::new(
            pressed,
            moved,
            origin_collection,
            origin_depth,
            modifiers,
            position,
        );
        let transition = self.machine.press(session);
        debug!(
            target: TARGET,
            transition_id = transition.transition_id,
            handle = %pressed,
            moved = self.machine.session().map_or(0, |s| s.moved().len()),
            "drag armed"
        );
        Ok(Vec::new())
    }

    pub fn on_pointer_move(&mut self, position: Position) -> Result<Vec<SortEvent>, SortableError> {
        let transition = self.machine.pointer_move(position);
        let mut events = Vec::new();
        match transition.effect {
            DragEffect::DragStarted { total_delta, .. } => {
                if let Some(session) = self.machine.session() {
                    debug!(
                        target: TARGET,
                        transition_id = transition.transition_id,
                        origin = %session.origin_collection(),
                        moved = session.moved().len(),
                        ?total_delta,
                        "drag started"
                    );
                    events.push(SortEvent::SortStart {
                        origin_collection: session.origin_collection(),
                        moved: session.moved().to_vec(),
                    });
                }
                self.refresh_hover(position, &mut events);
            }
            DragEffect::DragUpdated { .. } => self.refresh_hover(position, &mut events),
            _ => {}
        }
        Ok(events)
    }

    pub fn on_pointer_up(&mut self) -> Result<Vec<SortEvent>, SortableError> {
        let (transition, session) = self.machine.release();
        let Some(session) = session else {
            return Ok(Vec::new());
        };
        match transition.effect {
            DragEffect::Clicked { pressed } => Ok(self.click(pressed, session.modifiers())),
            DragEffect::Committed { target } => self.commit(&session, target),
            DragEffect::Canceled { reason } => {
                info!(target: TARGET, ?reason, "drag canceled");
                Ok(vec![SortEvent::SortCancel { reason }])
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn on_pointer_cancel(&mut self) -> Result<Vec<SortEvent>, SortableError> {
        Ok(self.cancel(CancelReason::PointerCancel))
    }

    pub fn on_blur(&mut self) -> Result<Vec<SortEvent>, SortableError> {
        Ok(self.cancel(CancelReason::Blur))
    }

    /// Return to idle no matter what; for hosts that lost the pointer-up.
    pub fn force_cancel(&mut self) -> Result<Vec<SortEvent>, SortableError> {
        Ok(self.cancel(CancelReason::Programmatic))
    }

    // --- internals ---

    fn snapshot(
        &self,
        pressed: ItemHandle,
        origin_collection: CollectionId,
        origin_depth: usize,
    ) -> Vec<MovedEntry> {
        // Without cross-collection drags nothing may change collection, so
        // marked items elsewhere stay put.
        let same_list = !self.config.cross_collection_drag;
        let handles = if self.config.is_multiple && self.selection.is_marked(pressed) {
            self.selection
                .marked()
                .into_iter()
                .filter(|handle| {
                    self.registry.is_draggable(*handle)
                        && self.registry.get(*handle).is_some_and(|e| {
                            if same_list {
                                e.collection == origin_collection
                            } else {
                                self.registry.depth(e.collection) == origin_depth
                            }
                        })
                })
                .collect()
        } else {
            vec![pressed]
        };
        handles
            .into_iter()
            .filter_map(|handle| {
                self.registry.get(handle).map(|entry| MovedEntry {
                    collection: entry.collection,
                    index: entry.index,
                    handle,
                })
            })
            .collect()
    }

    fn refresh_hover(&mut self, position: Position, events: &mut Vec<SortEvent>) {
        let Some(session) = self.machine.session() else {
            return;
        };
        let query = HitQuery {
            origin_collection: session.origin_collection(),
            origin_depth: session.origin_depth(),
            cross_collection: self.config.cross_collection_drag,
            moved: session.moved(),
        };
        let target = self.hit_tester.resolve(position, &query, &self.registry);
        let transition = self.machine.set_hover(target);
        if let DragEffect::HoverChanged { from, to } = transition.effect {
            debug!(target: TARGET, ?from, ?to, "hover changed");
            events.push(SortEvent::SortOver { target: to });
        }
    }

    fn click(&mut self, pressed: ItemHandle, modifiers: Modifiers) -> Vec<SortEvent> {
        if !self.config.is_multiple || !self.registry.is_draggable(pressed) {
            return Vec::new();
        }
        let changed = self.selection.toggle(pressed, modifiers.is_additive());
        debug!(target: TARGET, handle = %pressed, changed, "click");
        self.selection_events(changed)
    }

    fn commit(
        &mut self,
        session: &DragSession,
        target: DropSlot,
    ) -> Result<Vec<SortEvent>, SortableError> {
        let _span = debug_span!(
            "sortable.commit",
            origin = %session.origin_collection(),
            destination = %target.collection,
            moved = session.moved().len(),
        )
        .entered();

        let query = HitQuery {
            origin_collection: session.origin_collection(),
            origin_depth: session.origin_depth(),
            cross_collection: self.config.cross_collection_drag,
            moved: session.moved(),
        };
        if !query.admits(&self.registry, target.collection) {
            warn!(target: TARGET, slot = ?target, "drop target no longer valid");
            return Ok(vec![SortEvent::SortCancel {
                reason: CancelReason::NoDropTarget,
            }]);
        }

        let mut touched: BTreeSet<CollectionId> =
            session.moved().iter().map(|entry| entry.collection).collect();
        touched.insert(target.collection);
        // Collections can drift while the pointer is down; work from the
        // registry's current handle order rather than the press-time indices.
        let mut orders: BTreeMap<CollectionId, Vec<ItemHandle>> = BTreeMap::new();
        for id in &touched {
            if !self.registry.is_contiguous(*id) {
                warn!(target: TARGET, collection = %id, "committing into non-contiguous collection");
            }
            orders.insert(*id, self.registry.ordered_handles(*id));
        }

        let mut moved = Vec::with_capacity(session.moved().len());
        for entry in session.moved() {
            let current = self
                .registry
                .get(entry.handle)
                .ok_or(SortableError::UnknownHandle(entry.handle))?
                .collection;
            let index = orders
                .get(&current)
                .and_then(|order| order.iter().position(|h| *h == entry.handle))
                .ok_or(SortableError::UnknownHandle(entry.handle))?;
            moved.push(MovedEntry {
                collection: current,
                index,
                handle: entry.handle,
            });
        }
        moved.sort_unstable();
        debug_assert!(!moved.is_empty(), "drag session committed with nothing moved");
        if moved.is_empty() {
            return Err(SortableError::EmptyMoveSet);
        }

        let sources: Vec<EntryPosition> = moved.iter().map(MovedEntry::position).collect();
        let gap_len = orders.get(&target.collection).map_or(0, Vec::len);
        let gap = EntryPosition::new(target.collection, target.index.min(gap_len));
        let destination = reorder::gap_to_destination(gap, &sources);
        let outcome = reorder::multi_move(&orders, &sources, destination)?;
        for (id, handles) in &outcome.collections {
            for (index, handle) in handles.iter().enumerate() {
                self.registry.relocate(*handle, *id, index);
            }
        }

        let destination = outcome.destination;
        let event = if moved.len() == 1 && moved[0].collection == destination.collection {
            SortEvent::SortEnd(SortEnd {
                collection: destination.collection,
                old_index: moved[0].index,
                new_index: destination.index,
            })
        } else {
            SortEvent::MultiSortEnd(MultiSortEnd {
                destination_collection: destination.collection,
                destination_index: destination.index,
                moved_entries: moved,
            })
        };
        info!(
            target: TARGET,
            destination = %destination.collection,
            index = destination.index,
            "drag committed"
        );
        Ok(vec![event])
    }

    fn cancel(&mut self, reason: CancelReason) -> Vec<SortEvent> {
        match self.machine.cancel(reason) {
            Some((transition, session)) => {
                info!(
                    target: TARGET,
                    transition_id = transition.transition_id,
                    ?reason,
                    pressed = %session.pressed(),
                    "drag canceled"
                );
                vec![SortEvent::SortCancel { reason }]
            }
            None => Vec::new(),
        }
    }

    /// Forget `handles` in the selection; cancel the drag if any is moving.
    fn purge(&mut self, handles: &[ItemHandle]) -> Vec<SortEvent> {
        if handles.is_empty() {
            return Vec::new();
        }
        let moving = self
            .machine
            .session()
            .is_some_and(|session| handles.iter().any(|h| session.contains(*h)));
        let mut events = if moving {
            self.cancel(CancelReason::OriginUnregistered)
        } else {
            Vec::new()
        };
        let changed = self.selection.retain(|handle| !handles.contains(&handle));
        events.extend(self.selection_events(changed));
        events
    }

    /// Re-pin handles whose registry entry is still flagged pinned.
    fn restore_pins(&mut self, handles: &[ItemHandle]) -> Vec<SortEvent> {
        let mut changed = false;
        for handle in handles {
            let pinned = self.registry.get(*handle).is_some_and(|e| e.pinned);
            if pinned && self.registry.is_draggable(*handle) {
                changed |= self.selection.pin(*handle);
            }
        }
        self.selection_events(changed)
    }

    fn selection_events(&self, changed: bool) -> Vec<SortEvent> {
        if changed {
            vec![SortEvent::SelectionChanged {
                selected: self.selection.marked(),
            }]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(raw: u64) -> CollectionId {
        CollectionId::new(raw)
    }

    fn layer_with_list(len: usize) -> (DragLayer, Vec<ItemHandle>) {
        let mut layer = DragLayer::new(SortableConfig::default()).unwrap();
        layer.register_collection(cid(0), None, false);
        let handles = (0..len)
            .map(|i| {
                let h = layer.register(cid(0), i, false, false);
                layer
                    .set_bounds(h, Some(Bounds::new(0, i as i32 * 2, 10, 2)))
                    .unwrap();
                h
            })
            .collect();
        (layer, handles)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = DragLayer::new(SortableConfig::default().with_hover_hysteresis(0)).unwrap_err();
        assert!(matches!(err, SortableError::Config(_)));
    }

    #[test]
    fn unknown_handle_press_errors() {
        let (mut layer, hs) = layer_with_list(1);
        layer.unregister(hs[0]);
        assert_eq!(
            layer.on_pointer_down(Some(hs[0]), Position::default(), Modifiers::NONE),
            Err(SortableError::UnknownHandle(hs[0]))
        );
    }

    #[test]
    fn register_pinned_pins_selection() {
        let mut layer = DragLayer::new(SortableConfig::default()).unwrap();
        let h = layer.register(cid(0), 0, false, true);
        assert!(layer.is_selected(h));
        assert!(layer.selection().is_pinned(h));
    }

    #[test]
    fn helper_only_while_dragging() {
        let (mut layer, hs) = layer_with_list(3);
        layer
            .on_pointer_down(Some(hs[0]), Position::new(1, 0), Modifiers::NONE)
            .unwrap();
        assert!(layer.helper().is_none());
        layer.on_pointer_move(Position::new(1, 4)).unwrap();
        let helper = layer.helper().unwrap();
        assert_eq!(helper.moved, vec![hs[0]]);
        assert_eq!(helper.pointer_delta, (0, 4));
    }

    #[test]
    fn press_while_active_is_ignored() {
        let (mut layer, hs) = layer_with_list(2);
        layer
            .on_pointer_down(Some(hs[0]), Position::new(0, 0), Modifiers::NONE)
            .unwrap();
        layer
            .on_pointer_down(Some(hs[1]), Position::new(0, 2), Modifiers::NONE)
            .unwrap();
        assert_eq!(layer.session().unwrap().pressed(), hs[0]);
    }

    #[test]
    fn update_index_unknown_handle() {
        let (mut layer, hs) = layer_with_list(1);
        assert!(layer.update_index(hs[0], 0).is_ok());
        layer.unregister(hs[0]);
        assert!(layer.update_index(hs[0], 0).is_err());
        assert!(layer.set_collection_bounds(cid(9), None).is_err());
    }
}
