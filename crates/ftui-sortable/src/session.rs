#![forbid(unsafe_code)]

//! Drag session lifecycle.
//!
//! [`DragMachine`] owns the one drag transaction that may exist at a time:
//!
//! ```text
//! Idle -> Armed -> Dragging -> Idle (commit or cancel)
//!           \--------------> Idle (click or cancel)
//! ```
//!
//! A press arms the machine with a [`DragSession`] snapshot. Pointer travel
//! below the distance threshold keeps it armed; releasing then is a click.
//! Reaching the threshold promotes it to dragging, after which the host's
//! hover target is tracked until release.
//!
//! # Invariants
//!
//! 1. At most one session exists; a press while not idle is a no-op.
//! 2. A session is consumed exactly once: by release (click/commit) or by
//!    cancel.
//! 3. Click and drag never both happen for one press.
//! 4. Every step returns a [`DragTransition`] with a monotonically increasing
//!    `transition_id`, including no-ops.
//!
//! # Failure Modes
//!
//! - A host that never delivers pointer-up leaves the machine armed or
//!   dragging. [`DragMachine::force_cancel`] is the safety valve.

use serde::{Deserialize, Serialize};

use crate::collection::CollectionId;
use crate::event::{Modifiers, MovedEntry};
use crate::geometry::Position;
use crate::hit_test::DropSlot;
use crate::registry::ItemHandle;

/// Default press-to-drag distance, matching the classic sortable setup.
pub const DEFAULT_DISTANCE_THRESHOLD: u16 = 3;

/// Default minimum travel between hover re-resolutions while dragging.
pub const DEFAULT_HOVER_HYSTERESIS: u16 = 1;

/// Coarse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

/// Why a session ended without a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Released while not over any valid target.
    NoDropTarget,
    /// Host reported pointer-cancel.
    PointerCancel,
    /// A moved item was unregistered, disabled, or lost its collection.
    OriginUnregistered,
    /// Focus loss.
    Blur,
    /// [`DragMachine::force_cancel`].
    Programmatic,
}

/// Explicit diagnostics for events that were safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    ThresholdNotReached,
    BelowHysteresis,
    HoverUnchanged,
    NotDragging,
}

/// Effect produced by one lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Armed {
        pressed: ItemHandle,
        origin: Position,
    },
    DragStarted {
        origin: Position,
        current: Position,
        total_delta: (i32, i32),
    },
    DragUpdated {
        previous: Position,
        current: Position,
        total_delta: (i32, i32),
    },
    HoverChanged {
        from: Option<DropSlot>,
        to: Option<DropSlot>,
    },
    Clicked {
        pressed: ItemHandle,
    },
    Committed {
        target: DropSlot,
    },
    Canceled {
        reason: CancelReason,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One state-machine step with deterministic telemetry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragPhase,
    pub to: DragPhase,
    pub effect: DragEffect,
}

/// Snapshot and pointer state of one drag transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pressed: ItemHandle,
    moved: Vec<MovedEntry>,
    origin_collection: CollectionId,
    origin_depth: usize,
    modifiers: Modifiers,
    origin: Position,
    current: Position,
    hover: Option<DropSlot>,
}

impl DragSession {
    /// Build a session. `moved` is sorted into source order here.
    #[must_use]
    pub fn new(
        pressed: ItemHandle,
        mut moved: Vec<MovedEntry>,
        origin_collection: CollectionId,
        origin_depth: usize,
        modifiers: Modifiers,
        origin: Position,
    ) -> Self {
        moved.sort_unstable();
        moved.dedup_by_key(|entry| entry.handle);
        Self {
            pressed,
            moved,
            origin_collection,
            origin_depth,
            modifiers,
            origin,
            current: origin,
            hover: None,
        }
    }

    #[must_use]
    pub const fn pressed(&self) -> ItemHandle {
        self.pressed
    }

    /// Moved entries in source order.
    #[must_use]
    pub fn moved(&self) -> &[MovedEntry] {
        &self.moved
    }

    #[must_use]
    pub fn moved_handles(&self) -> Vec<ItemHandle> {
        self.moved.iter().map(|entry| entry.handle).collect()
    }

    #[must_use]
    pub fn contains(&self, handle: ItemHandle) -> bool {
        self.moved.iter().any(|entry| entry.handle == handle)
    }

    #[must_use]
    pub const fn origin_collection(&self) -> CollectionId {
        self.origin_collection
    }

    #[must_use]
    pub const fn origin_depth(&self) -> usize {
        self.origin_depth
    }

    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    #[must_use]
    pub const fn current(&self) -> Position {
        self.current
    }

    /// Total pointer travel since the press.
    #[must_use]
    pub const fn pointer_delta(&self) -> (i32, i32) {
        self.current.delta_from(self.origin)
    }

    #[must_use]
    pub const fn hover(&self) -> Option<DropSlot> {
        self.hover
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Armed(DragSession),
    Dragging(DragSession),
}

impl DragState {
    const fn phase(&self) -> DragPhase {
        match self {
            Self::Idle => DragPhase::Idle,
            Self::Armed(_) => DragPhase::Armed,
            Self::Dragging(_) => DragPhase::Dragging,
        }
    }
}

/// Runtime lifecycle machine for sortable drags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragMachine {
    state: DragState,
    distance_threshold: u16,
    hover_hysteresis: u16,
    transition_counter: u64,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_THRESHOLD, DEFAULT_HOVER_HYSTERESIS)
    }
}

impl DragMachine {
    /// A zero threshold makes the first pointer move start the drag.
    #[must_use]
    pub fn new(distance_threshold: u16, hover_hysteresis: u16) -> Self {
        Self {
            state: DragState::Idle,
            distance_threshold,
            hover_hysteresis: hover_hysteresis.max(1),
            transition_counter: 0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.state.phase()
    }

    /// Whether the machine is armed or dragging.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(session) | DragState::Dragging(session) => Some(session),
        }
    }

    #[must_use]
    pub const fn distance_threshold(&self) -> u16 {
        self.distance_threshold
    }

    #[must_use]
    pub const fn hover_hysteresis(&self) -> u16 {
        self.hover_hysteresis
    }

    /// Idle → Armed. Rejected (no-op) while another session is active.
    pub fn press(&mut self, session: DragSession) -> DragTransition {
        let from = self.phase();
        if self.is_active() {
            return self.finish(
                from,
                DragEffect::Noop {
                    reason: DragNoopReason::ActiveDragAlreadyInProgress,
                },
            );
        }
        let effect = DragEffect::Armed {
            pressed: session.pressed,
            origin: session.origin,
        };
        self.state = DragState::Armed(session);
        self.finish(from, effect)
    }

    /// Track pointer travel; may promote Armed → Dragging.
    pub fn pointer_move(&mut self, position: Position) -> DragTransition {
        let from = self.phase();
        let threshold = self.distance_threshold;
        let hysteresis = self.hover_hysteresis;
        let effect = match std::mem::take(&mut self.state) {
            DragState::Idle => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            DragState::Armed(mut session) => {
                session.current = position;
                if position.reached(session.origin, threshold) {
                    let effect = DragEffect::DragStarted {
                        origin: session.origin,
                        current: position,
                        total_delta: session.pointer_delta(),
                    };
                    self.state = DragState::Dragging(session);
                    effect
                } else {
                    self.state = DragState::Armed(session);
                    DragEffect::Noop {
                        reason: DragNoopReason::ThresholdNotReached,
                    }
                }
            }
            DragState::Dragging(mut session) => {
                let previous = session.current;
                if position.reached(previous, hysteresis) {
                    session.current = position;
                    let effect = DragEffect::DragUpdated {
                        previous,
                        current: position,
                        total_delta: session.pointer_delta(),
                    };
                    self.state = DragState::Dragging(session);
                    effect
                } else {
                    self.state = DragState::Dragging(session);
                    DragEffect::Noop {
                        reason: DragNoopReason::BelowHysteresis,
                    }
                }
            }
        };
        self.finish(from, effect)
    }

    /// Record the resolved hover target. Only meaningful while dragging.
    pub fn set_hover(&mut self, target: Option<DropSlot>) -> DragTransition {
        let from = self.phase();
        let effect = match &mut self.state {
            DragState::Dragging(session) if session.hover == target => DragEffect::Noop {
                reason: DragNoopReason::HoverUnchanged,
            },
            DragState::Dragging(session) => {
                let previous = std::mem::replace(&mut session.hover, target);
                DragEffect::HoverChanged {
                    from: previous,
                    to: target,
                }
            }
            _ => DragEffect::Noop {
                reason: DragNoopReason::NotDragging,
            },
        };
        self.finish(from, effect)
    }

    /// Pointer released. Returns the consumed session, if any.
    ///
    /// Armed → click; Dragging with a hover target → commit; Dragging
    /// without one → cancel.
    pub fn release(&mut self) -> (DragTransition, Option<DragSession>) {
        let from = self.phase();
        match std::mem::take(&mut self.state) {
            DragState::Idle => (
                self.finish(
                    from,
                    DragEffect::Noop {
                        reason: DragNoopReason::IdleWithoutActiveDrag,
                    },
                ),
                None,
            ),
            DragState::Armed(session) => (
                self.finish(
                    from,
                    DragEffect::Clicked {
                        pressed: session.pressed,
                    },
                ),
                Some(session),
            ),
            DragState::Dragging(session) => {
                let effect = match session.hover {
                    Some(target) => DragEffect::Committed { target },
                    None => DragEffect::Canceled {
                        reason: CancelReason::NoDropTarget,
                    },
                };
                (self.finish(from, effect), Some(session))
            }
        }
    }

    /// Cancel the active session, if any.
    pub fn cancel(&mut self, reason: CancelReason) -> Option<(DragTransition, DragSession)> {
        let from = self.phase();
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Armed(session) | DragState::Dragging(session) => {
                Some((self.finish(from, DragEffect::Canceled { reason }), session))
            }
        }
    }

    /// Unconditionally return to Idle.
    ///
    /// For host cleanup paths that lost the pointer-up. Returns `None` when
    /// already idle.
    pub fn force_cancel(&mut self) -> Option<DragTransition> {
        self.cancel(CancelReason::Programmatic)
            .map(|(transition, _)| transition)
    }

    fn finish(&mut self, from: DragPhase, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.phase(),
            effect,
        }
    }
}
