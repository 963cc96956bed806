#![forbid(unsafe_code)]

//! Drag-layer configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::{DEFAULT_DISTANCE_THRESHOLD, DEFAULT_HOVER_HYSTERESIS};

/// Options recognized by [`crate::DragLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortableConfig {
    /// Pointer travel (Euclidean) before a press becomes a drag.
    pub distance_threshold: u16,
    /// Whether click-to-toggle multi-select is enabled at all.
    pub is_multiple: bool,
    /// Whether drops may target a different collection than the origin.
    pub cross_collection_drag: bool,
    /// Minimum pointer travel between hover re-resolutions while dragging.
    pub hover_hysteresis: u16,
}

impl Default for SortableConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            is_multiple: true,
            cross_collection_drag: true,
            hover_hysteresis: DEFAULT_HOVER_HYSTERESIS,
        }
    }
}

impl SortableConfig {
    #[must_use]
    pub fn with_distance_threshold(mut self, distance: u16) -> Self {
        self.distance_threshold = distance;
        self
    }

    #[must_use]
    pub fn with_multiple(mut self, enabled: bool) -> Self {
        self.is_multiple = enabled;
        self
    }

    #[must_use]
    pub fn with_cross_collection_drag(mut self, enabled: bool) -> Self {
        self.cross_collection_drag = enabled;
        self
    }

    #[must_use]
    pub fn with_hover_hysteresis(mut self, hysteresis: u16) -> Self {
        self.hover_hysteresis = hysteresis;
        self
    }

    /// Single-item drags only; clicks never touch the selection.
    #[must_use]
    pub fn single_select(self) -> Self {
        self.with_multiple(false)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hover_hysteresis == 0 {
            return Err(ConfigError::InvalidHoverHysteresis {
                hover_hysteresis: self.hover_hysteresis,
            });
        }
        Ok(())
    }
}

/// Invalid [`SortableConfig`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidHoverHysteresis { hover_hysteresis: u16 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHoverHysteresis { hover_hysteresis } => write!(
                f,
                "hover_hysteresis must be greater than zero (got {hover_hysteresis})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
