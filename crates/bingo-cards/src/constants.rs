//! Shared constants for card layout and rendering
//!
//! Lengths are millimeters unless the name says otherwise.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Page
// =============================================================================

/// Outer page margin
pub const DEFAULT_MARGIN_MM: f32 = 8.0;

/// Gap between two grid slots sharing a page
pub const DEFAULT_SLOT_GAP_MM: f32 = 6.0;

// =============================================================================
// Grid Slot
// =============================================================================

/// Horizontal inset of the cell area inside its slot (each side)
pub const GRID_SIDE_INSET_MM: f32 = 2.0;

/// Title band height above the grid, one grid per page
pub const TITLE_BAND_SINGLE_MM: f32 = 10.0;

/// Title band height above the grid, several grids per page
pub const TITLE_BAND_MULTI_MM: f32 = 5.0;

/// Space left under the grid when a title band is shown
pub const TITLE_BOTTOM_INSET_MM: f32 = 2.0;

/// Title baseline offset from the slot top, one grid per page
pub const TITLE_BASELINE_SINGLE_MM: f32 = 8.0;

/// Title baseline offset from the slot top, several grids per page
pub const TITLE_BASELINE_MULTI_MM: f32 = 4.0;

pub const TITLE_FONT_SINGLE_PT: f32 = 14.0;
pub const TITLE_FONT_MULTI_PT: f32 = 8.0;

/// Share of the slot height given to the grid on background-artwork themes
pub const ARTWORK_GRID_HEIGHT_RATIO: f32 = 0.68;

/// Distance between the grid area and the slot bottom on artwork themes
pub const ARTWORK_GRID_BOTTOM_INSET_MM: f32 = 2.0;

// =============================================================================
// Free Space
// =============================================================================

pub const FREE_SPACE_GLYPH_SINGLE_PT: f32 = 18.0;
pub const FREE_SPACE_GLYPH_MULTI_PT: f32 = 10.0;

/// Inner/outer radius ratio of the five-pointed star
pub const STAR_INNER_RATIO: f32 = 0.382;

// =============================================================================
// Text
// =============================================================================

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

// =============================================================================
// Bezier Curve Constants
// =============================================================================

/// Control point factor for approximating circles with Bezier curves.
/// 4 * (sqrt(2) - 1) / 3 ≈ 0.552284749831
pub const BEZIER_CIRCLE_FACTOR: f32 = 0.552284749831;

// =============================================================================
// Assets
// =============================================================================

/// Side of the square photo embedded in print documents (pixels)
pub const PRINT_PHOTO_SIZE_PX: u32 = 400;

/// Maximum background size, A4 at ~210 DPI (pixels)
pub const BACKGROUND_MAX_PX: (u32, u32) = (1754, 2480);

pub const JPEG_QUALITY: u8 = 95;

/// Concurrent asset fetches per run
pub const DEFAULT_ASSET_WORKERS: usize = 8;
