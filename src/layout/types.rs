//! Core layout value types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned rectangle in points. Origin top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    /// Frame at `(x, y)` with the given size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Strict overlap: rectangles that merely touch do not intersect.
    pub fn intersects(&self, other: &Frame) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Smallest frame containing both.
    pub fn union(&self, other: &Frame) -> Frame {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Frame {
            x,
            y,
            width: self.max_x().max(other.max_x()) - x,
            height: self.max_y().max(other.max_y()) - y,
        }
    }
}

/// Number of layout columns. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnCount(usize);

/// Error returned when attempting to create a ColumnCount of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Column count must be >= 1 (got {0})")]
pub struct InvalidColumnCount(pub usize);

impl ColumnCount {
    /// Single-column (list) layout.
    pub const ONE: Self = Self(1);

    /// Smart constructor that validates the count is >= 1.
    pub fn new(count: usize) -> Result<Self, InvalidColumnCount> {
        if count == 0 {
            Err(InvalidColumnCount(count))
        } else {
            Ok(Self(count))
        }
    }

    /// Get the raw count.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for ColumnCount {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<usize> for ColumnCount {
    type Error = InvalidColumnCount;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

/// How the next non-full-width item picks its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementRule {
    /// Column with the smallest current height; ties go to the lowest index.
    #[default]
    ShortestFirst,
    /// Item index modulo column count.
    LeftToRight,
    /// Item index modulo column count, counted from the rightmost column.
    RightToLeft,
}

impl PlacementRule {
    /// Kebab-case name used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementRule::ShortestFirst => "shortest-first",
            PlacementRule::LeftToRight => "left-to-right",
            PlacementRule::RightToLeft => "right-to-left",
        }
    }
}

impl fmt::Display for PlacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized placement rule name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown placement rule: {0} (expected shortest-first, left-to-right or right-to-left)")]
pub struct UnknownPlacementRule(pub String);

impl FromStr for PlacementRule {
    type Err = UnknownPlacementRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shortest-first" => Ok(PlacementRule::ShortestFirst),
            "left-to-right" => Ok(PlacementRule::LeftToRight),
            "right-to-left" => Ok(PlacementRule::RightToLeft),
            other => Err(UnknownPlacementRule(other.to_string())),
        }
    }
}

/// Placement of one item of the visible projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacementRect {
    /// Index into the visible projection.
    pub index: usize,
    pub frame: Frame,
    /// Column the item was placed in; 0 for full-width items.
    pub column: usize,
    pub full_width: bool,
}
