//! Grid geometry within a slot
//!
//! Titled themes reserve a band above the grid for the card name. Artwork
//! themes drop the title and anchor the grid to the bottom of the slot so the
//! top of the background stays visible.

use crate::constants::*;
use crate::theme::ThemeStyle;
use crate::types::GridsPerPage;

use super::{CellRect, GridLayout, GridPosition, Rect, TitlePlacement};

/// Compute the full layout of a `size` x `size` grid inside `slot`.
pub fn compute_grid_layout(
    slot: Rect,
    size: usize,
    style: &ThemeStyle,
    grids_per_page: GridsPerPage,
) -> GridLayout {
    let single = grids_per_page == GridsPerPage::One;
    let area_x = slot.x + GRID_SIDE_INSET_MM;
    let area_width = (slot.width - 2.0 * GRID_SIDE_INSET_MM).max(0.0);

    let (cell_area, title) = if style.shows_title {
        let band = if single {
            TITLE_BAND_SINGLE_MM
        } else {
            TITLE_BAND_MULTI_MM
        };
        let title = TitlePlacement {
            center_x: slot.center_x(),
            baseline_y: slot.y
                + if single {
                    TITLE_BASELINE_SINGLE_MM
                } else {
                    TITLE_BASELINE_MULTI_MM
                },
            font_size_pt: if single {
                TITLE_FONT_SINGLE_PT
            } else {
                TITLE_FONT_MULTI_PT
            },
        };
        let height = (slot.height - band - TITLE_BOTTOM_INSET_MM).max(0.0);
        (Rect::new(area_x, slot.y + band, area_width, height), Some(title))
    } else {
        let height = slot.height * ARTWORK_GRID_HEIGHT_RATIO;
        let y = slot.bottom() - height - ARTWORK_GRID_BOTTOM_INSET_MM;
        (Rect::new(area_x, y, area_width, height), None)
    };

    let side = cell_area.width.min(cell_area.height);
    let grid_bounds = Rect::new(
        cell_area.x + (cell_area.width - side) / 2.0,
        cell_area.y + (cell_area.height - side) / 2.0,
        side,
        side,
    );

    let gap = style.cell_gap_mm;
    let cell_size = if size == 0 {
        0.0
    } else {
        ((side - (size - 1) as f32 * gap) / size as f32).max(0.0)
    };

    let cells = grid_cells(&grid_bounds, size, cell_size, gap);

    GridLayout {
        slot,
        cell_area,
        grid_bounds,
        title,
        size,
        cell_size,
        gap,
        cells,
    }
}

/// Row-major cell rectangles; cells are square and `gap` apart
fn grid_cells(bounds: &Rect, size: usize, cell_size: f32, gap: f32) -> Vec<CellRect> {
    (0..size * size)
        .map(|index| {
            let position = GridPosition::from_index(index, size);
            let x = bounds.x + position.col as f32 * (cell_size + gap);
            let y = bounds.y + position.row as f32 * (cell_size + gap);
            CellRect {
                index,
                position,
                rect: Rect::new(x, y, cell_size, cell_size),
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageGeometry, page_slots};
    use crate::types::Theme;

    const TOLERANCE: f32 = 1e-3;

    fn a4() -> PageGeometry {
        PageGeometry {
            width: 210.0,
            height: 297.0,
            margin: 8.0,
            slot_gap: 6.0,
        }
    }

    #[test]
    fn test_cells_are_disjoint_and_contained() {
        for theme in [Theme::Standard, Theme::Christmas, Theme::Birthday] {
            let style = ThemeStyle::for_theme(theme);
            for gpp in [GridsPerPage::One, GridsPerPage::Two, GridsPerPage::Four] {
                for slot in page_slots(&a4(), gpp, gpp.count()) {
                    for size in 3..=7 {
                        let layout = compute_grid_layout(slot, size, &style, gpp);
                        assert_eq!(layout.cells.len(), size * size);

                        let total: f32 = layout.cells.iter().map(|c| c.rect.area()).sum();
                        assert!(total <= layout.cell_area.area() + TOLERANCE);

                        for (i, a) in layout.cells.iter().enumerate() {
                            assert!(layout.cell_area.contains(&a.rect, TOLERANCE));
                            assert!(slot.contains(&a.rect, TOLERANCE));
                            assert_eq!(a.rect.width, a.rect.height);
                            for b in &layout.cells[i + 1..] {
                                assert!(!a.rect.overlaps(&b.rect), "{:?} vs {:?}", a, b);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_standard_single_layout() {
        let style = ThemeStyle::for_theme(Theme::Standard);
        let slot = page_slots(&a4(), GridsPerPage::One, 1)[0];
        let layout = compute_grid_layout(slot, 5, &style, GridsPerPage::One);

        let title = layout.title.unwrap();
        assert_eq!(title.font_size_pt, 14.0);
        assert!((title.baseline_y - 16.0).abs() < TOLERANCE);
        assert!((title.center_x - 105.0).abs() < TOLERANCE);

        // 190mm wide, 269mm tall: width-bound, centered vertically
        assert!((layout.cell_area.width - 190.0).abs() < TOLERANCE);
        assert!((layout.grid_bounds.width - 190.0).abs() < TOLERANCE);
        assert!(layout.grid_bounds.y > layout.cell_area.y);
        assert!(
            (layout.grid_bounds.center_y() - layout.cell_area.center_y()).abs() < TOLERANCE
        );

        let expected_cell = (190.0 - 4.0 * 0.1) / 5.0;
        assert!((layout.cell_size - expected_cell).abs() < TOLERANCE);
    }

    #[test]
    fn test_cell_position_formula() {
        let style = ThemeStyle::for_theme(Theme::Standard);
        let slot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let layout = compute_grid_layout(slot, 4, &style, GridsPerPage::One);

        let cell = &layout.cells[6]; // row 1, col 2
        assert_eq!(cell.position, GridPosition::new(1, 2));
        let pitch = layout.cell_size + layout.gap;
        assert!((cell.rect.x - (layout.grid_bounds.x + 2.0 * pitch)).abs() < TOLERANCE);
        assert!((cell.rect.y - (layout.grid_bounds.y + pitch)).abs() < TOLERANCE);

        let last = layout.cells.last().unwrap();
        assert!((last.rect.right() - layout.grid_bounds.right()).abs() < TOLERANCE);
        assert!((last.rect.bottom() - layout.grid_bounds.bottom()).abs() < TOLERANCE);
    }

    #[test]
    fn test_artwork_grid_anchored_to_bottom() {
        let style = ThemeStyle::for_theme(Theme::Christmas);
        let slot = page_slots(&a4(), GridsPerPage::One, 1)[0];
        let layout = compute_grid_layout(slot, 5, &style, GridsPerPage::One);

        assert!(layout.title.is_none());
        assert!((layout.cell_area.height - 281.0 * 0.68).abs() < TOLERANCE);
        assert!((layout.cell_area.bottom() - (slot.bottom() - 2.0)).abs() < TOLERANCE);
        // Upper third of the slot stays clear for the artwork
        assert!(layout.grid_bounds.y > slot.y + slot.height * 0.3);
    }

    #[test]
    fn test_multi_grid_title_is_smaller() {
        let style = ThemeStyle::for_theme(Theme::Standard);
        let slot = page_slots(&a4(), GridsPerPage::Four, 1)[0];
        let layout = compute_grid_layout(slot, 3, &style, GridsPerPage::Four);

        let title = layout.title.unwrap();
        assert_eq!(title.font_size_pt, 8.0);
        assert!((title.baseline_y - (slot.y + 4.0)).abs() < TOLERANCE);
        assert!((layout.cell_area.y - (slot.y + 5.0)).abs() < TOLERANCE);
    }

    #[test]
    fn test_center_cell_sits_in_middle() {
        let style = ThemeStyle::for_theme(Theme::Standard);
        let slot = Rect::new(0.0, 0.0, 120.0, 132.0);
        let layout = compute_grid_layout(slot, 5, &style, GridsPerPage::One);

        let center = &layout.cells[crate::allocate::center_index(5).unwrap()];
        assert_eq!(center.position, GridPosition::new(2, 2));
        assert!((center.rect.center_x() - layout.grid_bounds.center_x()).abs() < TOLERANCE);
        assert!((center.rect.center_y() - layout.grid_bounds.center_y()).abs() < TOLERANCE);
    }
}
