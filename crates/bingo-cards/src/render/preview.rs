use crate::compose::ComposedDocument;
use crate::layout::{CellRect, Rect};

use super::DrawCommand;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// On-screen layout tree built from the same commands as the PDF
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreviewDocument {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub pages: Vec<PreviewPage>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreviewPage {
    pub index: usize,
    pub background: Vec<DrawCommand>,
    pub cards: Vec<PreviewCard>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreviewCard {
    pub grid_id: String,
    pub name: String,
    pub slot: Rect,
    /// Hit areas for interactive previews
    pub cells: Vec<CellRect>,
    pub nodes: Vec<DrawCommand>,
}

impl From<&ComposedDocument> for PreviewDocument {
    fn from(doc: &ComposedDocument) -> Self {
        let pages = doc
            .pages
            .iter()
            .map(|page| PreviewPage {
                index: page.index,
                background: page.background.clone(),
                cards: page
                    .cards
                    .iter()
                    .map(|card| PreviewCard {
                        grid_id: card.grid_id.clone(),
                        name: card.name.clone(),
                        slot: card.layout.slot,
                        cells: card.layout.cells.clone(),
                        nodes: card.commands.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            page_width_mm: doc.page_width_mm,
            page_height_mm: doc.page_height_mm,
            pages,
        }
    }
}

impl PreviewDocument {
    pub fn card_count(&self) -> usize {
        self.pages.iter().map(|p| p.cards.len()).sum()
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::types::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::types::BingoError::Config(format!("Failed to serialize preview: {}", e)))
    }
}
