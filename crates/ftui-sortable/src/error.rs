#![forbid(unsafe_code)]

//! Top-level error type for drag-layer operations.

use std::fmt;

use crate::collection::CollectionId;
use crate::config::ConfigError;
use crate::registry::ItemHandle;
use crate::reorder::ReorderError;

/// Failures surfaced by [`crate::DragLayer`] and [`crate::SortableElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortableError {
    UnknownHandle(ItemHandle),
    UnknownCollection(CollectionId),
    Config(ConfigError),
    Reorder(ReorderError),
    /// The element was built without `with_ref`.
    WrappedInstanceUnavailable,
    /// A commit found no moved entries. Indicates a bookkeeping bug.
    EmptyMoveSet,
}

impl fmt::Display for SortableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHandle(handle) => write!(f, "{handle} is not registered"),
            Self::UnknownCollection(id) => write!(f, "{id} is not registered"),
            Self::Config(err) => write!(f, "invalid sortable config: {err}"),
            Self::Reorder(err) => write!(f, "reorder failed: {err}"),
            Self::WrappedInstanceUnavailable => write!(
                f,
                "wrapped instance is only available when the element is created with with_ref"
            ),
            Self::EmptyMoveSet => write!(f, "drag committed with an empty moved set"),
        }
    }
}

impl std::error::Error for SortableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Reorder(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SortableError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<ReorderError> for SortableError {
    fn from(err: ReorderError) -> Self {
        match err {
            ReorderError::EmptyMoveSet => Self::EmptyMoveSet,
            other => Self::Reorder(other),
        }
    }
}
