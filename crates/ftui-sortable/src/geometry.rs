#![forbid(unsafe_code)]

//! Host-agnostic pointer positions and item bounds.
//!
//! Coordinates are signed so hosts can report pointers that wander outside
//! the scroll container (negative offsets) without clamping. Units are
//! whatever the host lays items out in: terminal cells or CSS pixels.

use serde::{Deserialize, Serialize};

/// A pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise delta from `origin` to `self`.
    #[must_use]
    pub const fn delta_from(self, origin: Self) -> (i32, i32) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Whether the Euclidean distance to `other` is at least `threshold`.
    ///
    /// Computed on squared integers so large coordinates never overflow.
    #[must_use]
    pub fn reached(self, other: Self, threshold: u16) -> bool {
        let (dx, dy) = self.delta_from(other);
        let threshold = i64::from(threshold);
        let squared = i64::from(dx) * i64::from(dx) + i64::from(dy) * i64::from(dy);
        squared >= threshold * threshold
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle reported by the host for an item or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    #[inline]
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        let (x, y) = (i64::from(pos.x), i64::from(pos.y));
        x >= i64::from(self.x) && x < self.right() && y >= i64::from(self.y) && y < self.bottom()
    }

    /// Whether `pos` falls in the upper half of the rectangle.
    ///
    /// Used to split an item into a "before" and an "after" drop zone.
    #[must_use]
    pub fn in_upper_half(&self, pos: Position) -> bool {
        let offset = i64::from(pos.y) - i64::from(self.y);
        offset * 2 < i64::from(self.height)
    }
}
