//! Layout data types
//!
//! All layout values are millimeters with the origin at the top-left corner
//! of the page and y growing downwards. The PDF adapter flips the axis.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular area in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Whether the interiors of the two rectangles share any area
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether `other` lies inside this rectangle, within `tolerance`
    pub fn contains(&self, other: &Rect, tolerance: f32) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }
}

/// Position within a grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major position of a flat cell index
    pub fn from_index(index: usize, size: usize) -> Self {
        Self {
            row: index / size,
            col: index % size,
        }
    }
}

/// Drawing target for one cell
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellRect {
    /// Flat row-major index
    pub index: usize,
    pub position: GridPosition,
    pub rect: Rect,
}

/// Where a card's name is printed
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TitlePlacement {
    pub center_x: f32,
    pub baseline_y: f32,
    pub font_size_pt: f32,
}

/// Complete geometry of one grid inside its slot
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Slot assigned to this grid on the page
    pub slot: Rect,
    /// Area reserved for cells (after title band and insets)
    pub cell_area: Rect,
    /// The square actually covered by cells, centered in `cell_area`
    pub grid_bounds: Rect,
    pub title: Option<TitlePlacement>,
    pub size: usize,
    /// Side of one drawn cell
    pub cell_size: f32,
    pub gap: f32,
    /// Row-major cell rectangles
    pub cells: Vec<CellRect>,
}
