use crate::allocate::required_images_per_grid;
use crate::constants::*;
use crate::types::*;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest and largest grid sizes accepted by [`GameConfig::validate`]
pub const GRID_SIZE_RANGE: std::ops::RangeInclusive<usize> = 3..=7;

/// A bingo game: what to generate and how to print it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameConfig {
    pub id: String,
    pub display_name: String,
    pub grid_size: usize,
    pub theme: Theme,
    /// Number of cards to generate
    pub card_count: usize,
    pub grids_per_page: GridsPerPage,
}

impl GameConfig {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            grid_size: 5,
            theme: Theme::Standard,
            card_count: 10,
            grids_per_page: GridsPerPage::One,
        }
    }

    /// Minimum pool size to fill one card without repeats
    pub fn required_images(&self) -> usize {
        required_images_per_grid(self.grid_size)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !GRID_SIZE_RANGE.contains(&self.grid_size) {
            return Err(BingoError::Config(format!(
                "grid size must be between {} and {}, got {}",
                GRID_SIZE_RANGE.start(),
                GRID_SIZE_RANGE.end(),
                self.grid_size
            )));
        }

        if self.card_count == 0 {
            return Err(BingoError::Config(
                "at least one card must be generated".to_string(),
            ));
        }

        Ok(())
    }

    /// Load a game from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| BingoError::Config(format!("Failed to parse game: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save a game to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BingoError::Config(format!("Failed to serialize game: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Print and asset settings for one document run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct RenderOptions {
    pub paper_size: PaperSize,
    pub margin_mm: f32,
    /// Gap between grid slots on multi-grid pages
    pub slot_gap_mm: f32,
    /// Side of normalized photos in pixels
    pub photo_size_px: u32,
    /// Fit-inside bounds for backgrounds in pixels
    pub background_max_px: (u32, u32),
    pub jpeg_quality: u8,
    /// Concurrent asset fetches
    pub asset_workers: usize,
    /// Abort the run if asset resolution takes longer than this
    pub asset_deadline_secs: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            margin_mm: DEFAULT_MARGIN_MM,
            slot_gap_mm: DEFAULT_SLOT_GAP_MM,
            photo_size_px: PRINT_PHOTO_SIZE_PX,
            background_max_px: BACKGROUND_MAX_PX,
            jpeg_quality: JPEG_QUALITY,
            asset_workers: DEFAULT_ASSET_WORKERS,
            asset_deadline_secs: None,
        }
    }
}

impl RenderOptions {
    pub fn asset_deadline(&self) -> Option<Duration> {
        self.asset_deadline_secs.map(Duration::from_secs)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.paper_size.dimensions_mm();
        if self.margin_mm < 0.0 || 2.0 * self.margin_mm >= width.min(height) {
            return Err(BingoError::Config(format!(
                "margin of {}mm leaves no printable area",
                self.margin_mm
            )));
        }

        let content = (width - 2.0 * self.margin_mm).min(height - 2.0 * self.margin_mm);
        if self.slot_gap_mm < 0.0 || self.slot_gap_mm >= content {
            return Err(BingoError::Config(format!(
                "slot gap of {}mm leaves no room for the grids",
                self.slot_gap_mm
            )));
        }

        if self.photo_size_px == 0 {
            return Err(BingoError::Config("photo size must be positive".to_string()));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(BingoError::Config(format!(
                "JPEG quality must be 1-100, got {}",
                self.jpeg_quality
            )));
        }

        if self.asset_workers == 0 {
            return Err(BingoError::Config(
                "at least one asset worker is required".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| BingoError::Config(format!("Failed to parse render options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }
}
