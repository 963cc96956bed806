#![forbid(unsafe_code)]

//! Host-side wrapper for sortable items.
//!
//! [`SortableElement`] pairs a host widget value with its [`ItemHandle`] and
//! answers the two questions a renderer asks every frame: is this item
//! selected, and is it part of the active drag. [`DragHelper`] describes
//! what a drag preview should show.

use serde::{Deserialize, Serialize};

use crate::collection::CollectionId;
use crate::error::SortableError;
use crate::hit_test::{DropSlot, HitTester};
use crate::layer::DragLayer;
use crate::registry::ItemHandle;
use crate::session::DragSession;

/// One item, or a group of selected items rendered together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ElementKind<T> {
    Single(T),
    SelectionGroup(Vec<T>),
}

impl<T> ElementKind<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::SelectionGroup(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let slice = match self {
            Self::Single(item) => std::slice::from_ref(item),
            Self::SelectionGroup(items) => items.as_slice(),
        };
        slice.iter()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// Keep the inner widget reachable through [`SortableElement::wrapped`].
    pub with_ref: bool,
}

/// Render-time markers for one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMarker {
    /// Selected or pinned.
    pub selected: bool,
    pub pinned: bool,
    /// Part of the active drag's moved set (only once the drag has started).
    pub dragging: bool,
    pub disabled: bool,
}

/// A host widget registered as a sortable item.
#[derive(Debug, Clone)]
pub struct SortableElement<W> {
    handle: ItemHandle,
    inner: W,
    config: ElementConfig,
}

impl<W> SortableElement<W> {
    #[must_use]
    pub const fn new(handle: ItemHandle, inner: W, config: ElementConfig) -> Self {
        Self {
            handle,
            inner,
            config,
        }
    }

    #[must_use]
    pub const fn handle(&self) -> ItemHandle {
        self.handle
    }

    #[must_use]
    pub const fn config(&self) -> ElementConfig {
        self.config
    }

    /// The wrapped widget. Only reachable when built with `with_ref`.
    pub fn wrapped(&self) -> Result<&W, SortableError> {
        if self.config.with_ref {
            Ok(&self.inner)
        } else {
            Err(SortableError::WrappedInstanceUnavailable)
        }
    }

    pub fn wrapped_mut(&mut self) -> Result<&mut W, SortableError> {
        if self.config.with_ref {
            Ok(&mut self.inner)
        } else {
            Err(SortableError::WrappedInstanceUnavailable)
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    #[must_use]
    pub fn marker<H: HitTester>(&self, layer: &DragLayer<H>) -> ElementMarker {
        ElementMarker {
            selected: layer.is_selected(self.handle),
            pinned: layer.selection().is_pinned(self.handle),
            dragging: layer
                .helper()
                .is_some_and(|helper| helper.moved.contains(&self.handle)),
            disabled: !layer.registry().is_draggable(self.handle),
        }
    }
}

/// Drag preview description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragHelper {
    /// Moved handles in source order.
    pub moved: Vec<ItemHandle>,
    pub origin_collection: CollectionId,
    pub pointer_delta: (i32, i32),
    pub hover: Option<DropSlot>,
}

impl DragHelper {
    #[must_use]
    pub fn from_session(session: &DragSession) -> Self {
        Self {
            moved: session.moved_handles(),
            origin_collection: session.origin_collection(),
            pointer_delta: session.pointer_delta(),
            hover: session.hover(),
        }
    }

    /// `Single` for a one-item drag, `SelectionGroup` otherwise.
    #[must_use]
    pub fn kind(&self) -> ElementKind<ItemHandle> {
        match self.moved.as_slice() {
            [only] => ElementKind::Single(*only),
            many => ElementKind::SelectionGroup(many.to_vec()),
        }
    }
}
