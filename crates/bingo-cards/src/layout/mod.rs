//! Layout calculation modules for card printing
//!
//! This module handles all the geometric calculations:
//! - Page slots (where each grid goes on a page)
//! - Grid geometry (title band, cell area, cell rectangles)

mod grid;
mod page;
mod types;

pub use grid::*;
pub use page::*;
pub use types::*;
