#![forbid(unsafe_code)]

//! Sortable: selection, drag sessions, and reordering for nested lists.
//!
//! # Role in FrankenTUI
//! `ftui-sortable` is the interaction engine behind drag-to-reorder lists.
//! It knows nothing about rendering or terminal input; hosts translate
//! their pointer events into [`DragLayer`] calls and apply the returned
//! [`SortEvent`]s to their own data.
//!
//! # Primary responsibilities
//! - **Registry**: which item sits where, including nested collections.
//! - **SelectionSet**: click-toggled multi-select plus pinned items.
//! - **DragMachine**: the press / drag / drop lifecycle with a distance
//!   threshold separating clicks from drags.
//! - **Reorder**: pure single- and multi-item moves that keep the moved
//!   items in their original relative order.
//!
//! # Example
//! ```
//! use ftui_sortable::{Bounds, CollectionId, DragLayer, Modifiers, Position, SortEvent, SortableConfig};
//!
//! let mut layer = DragLayer::new(SortableConfig::default()).unwrap();
//! let list = CollectionId::new(1);
//! layer.register_collection(list, None, false);
//! let rows: Vec<_> = (0..3)
//!     .map(|i| {
//!         let h = layer.register(list, i, false, false);
//!         layer.set_bounds(h, Some(Bounds::new(0, i as i32 * 2, 20, 2))).unwrap();
//!         h
//!     })
//!     .collect();
//!
//! layer.on_pointer_down(Some(rows[0]), Position::new(1, 0), Modifiers::NONE).unwrap();
//! layer.on_pointer_move(Position::new(1, 5)).unwrap();
//! let events = layer.on_pointer_up().unwrap();
//! assert!(matches!(&events[..], [SortEvent::SortEnd(end)] if end.new_index == 2));
//! ```

pub mod collection;
pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hit_test;
pub mod layer;
pub mod registry;
pub mod reorder;
pub mod selection;
pub mod session;

pub use collection::{CollectionId, OrderedCollection};
pub use config::{ConfigError, SortableConfig};
pub use element::{DragHelper, ElementConfig, ElementKind, ElementMarker, SortableElement};
pub use error::SortableError;
pub use event::{Modifiers, MovedEntry, MultiSortEnd, SortEnd, SortEvent};
pub use geometry::{Bounds, Position};
pub use hit_test::{BoundsHitTester, DropSlot, HitQuery, HitTester};
pub use layer::DragLayer;
pub use registry::{ItemHandle, Registry};
pub use reorder::{EntryPosition, MultiMove, ReorderError};
pub use selection::SelectionSet;
pub use session::{CancelReason, DragMachine, DragPhase, DragSession};
