//! Page slot calculation
//!
//! A page holds one, two or four grid slots laid out in a column/row grid
//! inside the page margins.

use crate::types::GridsPerPage;

use super::{GridPosition, Rect};

/// Physical page and its packing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Gap between neighbouring slots; never applied at page edges
    pub slot_gap: f32,
}

impl PageGeometry {
    pub fn page_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Page minus the outer margin
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.margin,
            self.margin,
            self.width - 2.0 * self.margin,
            self.height - 2.0 * self.margin,
        )
    }
}

/// Slot rectangles for the first `count_on_page` grids of a page.
///
/// Slots fill row by row. Interior edges give up half the slot gap each, so
/// neighbouring slots are exactly `slot_gap` apart.
pub fn page_slots(
    page: &PageGeometry,
    grids_per_page: GridsPerPage,
    count_on_page: usize,
) -> Vec<Rect> {
    let (cols, rows) = grids_per_page.grid_dimensions();
    let content = page.content_rect();
    let slot_width = content.width / cols as f32;
    let slot_height = content.height / rows as f32;
    let half_gap = page.slot_gap / 2.0;

    (0..count_on_page.min(grids_per_page.count()))
        .map(|i| {
            let pos = GridPosition::from_index(i, cols);

            let (x, width) = interior_span(content.x, slot_width, pos.col, cols, half_gap);
            let (y, height) = interior_span(content.y, slot_height, pos.row, rows, half_gap);

            Rect::new(x, y, width, height)
        })
        .collect()
}

/// Start and length of track `index` out of `count`, trimming half the gap
/// from each interior edge.
fn interior_span(origin: f32, track: f32, index: usize, count: usize, half_gap: f32) -> (f32, f32) {
    let mut start = origin + index as f32 * track;
    let mut length = track;

    if index > 0 {
        start += half_gap;
        length -= half_gap;
    }
    if index + 1 < count {
        length -= half_gap;
    }

    (start, length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> PageGeometry {
        PageGeometry {
            width: 210.0,
            height: 297.0,
            margin: 8.0,
            slot_gap: 6.0,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_single_slot_fills_content_area() {
        let slots = page_slots(&a4(), GridsPerPage::One, 1);
        assert_eq!(slots, vec![Rect::new(8.0, 8.0, 194.0, 281.0)]);
    }

    #[test]
    fn test_two_slots_side_by_side() {
        let slots = page_slots(&a4(), GridsPerPage::Two, 2);
        assert_eq!(slots.len(), 2);

        let (left, right) = (slots[0], slots[1]);
        assert!(approx(left.x, 8.0));
        assert!(approx(left.width, 94.0));
        assert!(approx(right.x, 8.0 + 97.0 + 3.0));
        assert!(approx(right.width, 94.0));
        assert!(approx(right.right(), 202.0));
        assert!(approx(right.x - left.right(), 6.0));
        // Single row: no vertical gap
        assert!(approx(left.height, 281.0));
    }

    #[test]
    fn test_four_slots_two_by_two() {
        let slots = page_slots(&a4(), GridsPerPage::Four, 4);
        assert_eq!(slots.len(), 4);

        assert!(approx(slots[0].y, 8.0));
        assert!(approx(slots[2].y - slots[0].bottom(), 6.0));
        assert!(approx(slots[3].bottom(), 289.0));
        assert!(approx(slots[1].x - slots[0].right(), 6.0));

        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_short_last_page() {
        let slots = page_slots(&a4(), GridsPerPage::Four, 3);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots, page_slots(&a4(), GridsPerPage::Four, 4)[..3].to_vec());
    }
}
