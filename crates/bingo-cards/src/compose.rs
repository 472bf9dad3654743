//! Page compositing
//!
//! Packs grids onto pages and turns each page into draw commands by running
//! the geometry calculator and the cell renderer over every slot. The result
//! is backend-neutral; see [`crate::render`] for the PDF and preview adapters.

use crate::assets::AssetCache;
use crate::layout::{GridLayout, PageGeometry, Rect, compute_grid_layout, page_slots};
use crate::options::RenderOptions;
use crate::render::{CellContent, DrawCommand, render_background, render_cell, render_title};
use crate::theme::{Fill, Rgb, ThemeStyle};
use crate::types::*;
use std::collections::HashMap;

/// Every page of a document, ready for an output adapter
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub pages: Vec<ComposedPage>,
}

impl ComposedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All commands of all pages in paint order
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.pages.iter().flat_map(|page| page.commands())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPage {
    /// Zero-based page number
    pub index: usize,
    /// Page fill and background artwork, painted first
    pub background: Vec<DrawCommand>,
    pub cards: Vec<ComposedCard>,
}

impl ComposedPage {
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.background
            .iter()
            .chain(self.cards.iter().flat_map(|card| card.commands.iter()))
    }
}

/// One grid placed in its slot
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedCard {
    pub grid_id: String,
    pub name: String,
    pub layout: GridLayout,
    pub commands: Vec<DrawCommand>,
}

/// Background rotation index for a slot.
///
/// Single-grid pages rotate by page number, packed pages by slot position so
/// neighbouring grids get different artwork.
pub fn background_index(page_index: usize, slot_index: usize, grids_per_page: GridsPerPage) -> usize {
    if grids_per_page == GridsPerPage::One {
        page_index
    } else {
        slot_index
    }
}

/// Background references a document of `grid_count` grids will draw
pub fn required_backgrounds(
    style: &ThemeStyle,
    grids_per_page: GridsPerPage,
    grid_count: usize,
) -> Vec<SourceRef> {
    let per_page = grids_per_page.count();
    let mut refs: Vec<SourceRef> = Vec::new();
    for position in 0..grid_count {
        let index = background_index(position / per_page, position % per_page, grids_per_page);
        if let Some(reference) = style.background_for(index) {
            if !refs.contains(&reference) {
                refs.push(reference);
            }
        }
    }
    refs
}

/// Lay out and render `grids` in input order, `grids_per_page` per page.
///
/// Assets are looked up in `assets` only; anything absent or empty renders as
/// an empty tile (photos) or a flat tint (backgrounds).
pub fn composite(
    grids: &[Grid],
    images: &[BingoImage],
    style: &ThemeStyle,
    grids_per_page: GridsPerPage,
    options: &RenderOptions,
    assets: &AssetCache,
) -> ComposedDocument {
    let (page_width, page_height) = options.paper_size.dimensions_mm();
    let geometry = PageGeometry {
        width: page_width,
        height: page_height,
        margin: options.margin_mm,
        slot_gap: options.slot_gap_mm,
    };
    let sources: HashMap<&str, &SourceRef> = images
        .iter()
        .map(|image| (image.id.as_str(), &image.source))
        .collect();

    let pages = grids
        .chunks(grids_per_page.count())
        .enumerate()
        .map(|(page_index, page_grids)| {
            compose_page(
                page_index,
                page_grids,
                &geometry,
                style,
                grids_per_page,
                &sources,
                assets,
            )
        })
        .collect();

    ComposedDocument {
        page_width_mm: page_width,
        page_height_mm: page_height,
        pages,
    }
}

fn compose_page(
    page_index: usize,
    grids: &[Grid],
    geometry: &PageGeometry,
    style: &ThemeStyle,
    grids_per_page: GridsPerPage,
    sources: &HashMap<&str, &SourceRef>,
    assets: &AssetCache,
) -> ComposedPage {
    let slots = page_slots(geometry, grids_per_page, grids.len());

    let mut background = vec![DrawCommand::Shape {
        rect: geometry.page_rect(),
        corner_radius: 0.0,
        fill: Some(Fill::opaque(Rgb::WHITE)),
        stroke: None,
    }];

    if style.has_background_artwork() {
        // One full-page backdrop, or one per slot on packed pages
        let targets: Vec<(usize, Rect)> = if grids_per_page == GridsPerPage::One {
            vec![(background_index(page_index, 0, grids_per_page), geometry.page_rect())]
        } else {
            slots
                .iter()
                .enumerate()
                .map(|(slot_index, slot)| {
                    (background_index(page_index, slot_index, grids_per_page), *slot)
                })
                .collect()
        };

        for (index, rect) in targets {
            let artwork = style
                .background_for(index)
                .and_then(|reference| assets.get(&reference));
            background.push(render_background(&rect, artwork, style));
        }
    }

    let cards = grids
        .iter()
        .zip(slots)
        .map(|(grid, slot)| compose_card(grid, slot, style, grids_per_page, sources, assets))
        .collect::<Vec<_>>();

    log::debug!(
        "Composed page {} with {} card(s)",
        page_index + 1,
        cards.len()
    );

    ComposedPage {
        index: page_index,
        background,
        cards,
    }
}

fn compose_card(
    grid: &Grid,
    slot: Rect,
    style: &ThemeStyle,
    grids_per_page: GridsPerPage,
    sources: &HashMap<&str, &SourceRef>,
    assets: &AssetCache,
) -> ComposedCard {
    let layout = compute_grid_layout(slot, grid.size(), style, grids_per_page);
    let mut commands = Vec::new();

    if let Some(title) = &layout.title {
        commands.push(render_title(title, &grid.name, style));
    }

    if let Some(border) = style.grid_border {
        commands.push(DrawCommand::Shape {
            rect: layout.grid_bounds,
            corner_radius: 0.0,
            fill: None,
            stroke: Some(border),
        });
    }

    for cell_rect in &layout.cells {
        let content = match grid.cells.get(cell_rect.index) {
            Some(Cell::FreeSpace) => CellContent::FreeSpace,
            Some(Cell::Image(id)) => match sources.get(id.as_str()).and_then(|s| assets.get(s)) {
                Some(asset) => CellContent::Image(asset),
                None => {
                    log::debug!("{}: no asset for image {}", grid.name, id);
                    CellContent::Missing
                }
            },
            None => CellContent::Missing,
        };
        commands.extend(render_cell(&cell_rect.rect, content, style, grids_per_page));
    }

    ComposedCard {
        grid_id: grid.id.clone(),
        name: grid.name.clone(),
        layout,
        commands,
    }
}
