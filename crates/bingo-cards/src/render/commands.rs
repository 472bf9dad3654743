//! Theme-agnostic cell rendering
//!
//! Produces backend-neutral [`DrawCommand`]s. The PDF writer and the preview
//! tree both consume the same command lists.

use crate::assets::NormalizedAsset;
use crate::constants::*;
use crate::layout::{Rect, TitlePlacement};
use crate::theme::{Fill, Rgb, Stroke, ThemeStyle};
use crate::types::{GridsPerPage, SourceRef};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One drawing primitive in page millimeters (top-left origin)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum DrawCommand {
    /// Optionally rounded rectangle, filled and/or outlined
    Shape {
        rect: Rect,
        corner_radius: f32,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    /// Normalized raster asset stretched over `rect`
    Image { rect: Rect, source: SourceRef },
    /// Five-pointed free-space star
    Star {
        center_x: f32,
        center_y: f32,
        outer_radius: f32,
        color: Rgb,
    },
    /// Single line of text centered on `center_x`
    Text {
        text: String,
        center_x: f32,
        baseline_y: f32,
        font_size_pt: f32,
        color: Rgb,
    },
}

/// What a cell shows
#[derive(Debug, Clone, Copy)]
pub enum CellContent<'a> {
    FreeSpace,
    /// A photo; empty assets are skipped but the tile is still drawn
    Image(&'a NormalizedAsset),
    /// The cell references an image that no longer exists
    Missing,
}

/// Draw one cell: base tile, content, then border on top.
pub fn render_cell(
    rect: &Rect,
    content: CellContent<'_>,
    style: &ThemeStyle,
    grids_per_page: GridsPerPage,
) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::Shape {
        rect: *rect,
        corner_radius: style.corner_radius_mm,
        fill: Some(style.cell_fill),
        stroke: None,
    }];

    match content {
        CellContent::FreeSpace => {
            let glyph_pt = if grids_per_page == GridsPerPage::One {
                FREE_SPACE_GLYPH_SINGLE_PT
            } else {
                FREE_SPACE_GLYPH_MULTI_PT
            };
            let diameter = pt_to_mm(glyph_pt).min(rect.width * 0.8);
            commands.push(DrawCommand::Star {
                center_x: rect.center_x(),
                center_y: rect.center_y(),
                outer_radius: diameter / 2.0,
                color: style.free_space_color,
            });
        }
        CellContent::Image(asset) if !asset.is_empty() => {
            commands.push(DrawCommand::Image {
                rect: rect.inset(style.image_inset_mm),
                source: asset.source.clone(),
            });
        }
        CellContent::Image(asset) => {
            log::debug!("Skipping empty asset {}", asset.source);
        }
        CellContent::Missing => {}
    }

    commands.push(DrawCommand::Shape {
        rect: *rect,
        corner_radius: style.corner_radius_mm,
        fill: None,
        stroke: Some(style.cell_border),
    });

    commands
}

/// Card name above the grid
pub fn render_title(title: &TitlePlacement, name: &str, style: &ThemeStyle) -> DrawCommand {
    DrawCommand::Text {
        text: name.to_string(),
        center_x: title.center_x,
        baseline_y: title.baseline_y,
        font_size_pt: title.font_size_pt,
        color: style.title_color,
    }
}

/// Background artwork, or a flat fill when the artwork is unavailable
pub fn render_background(
    rect: &Rect,
    artwork: Option<&NormalizedAsset>,
    style: &ThemeStyle,
) -> DrawCommand {
    match artwork {
        Some(asset) if !asset.is_empty() => DrawCommand::Image {
            rect: *rect,
            source: asset.source.clone(),
        },
        _ => DrawCommand::Shape {
            rect: *rect,
            corner_radius: 0.0,
            fill: Some(Fill::opaque(style.fallback_fill)),
            stroke: None,
        },
    }
}
