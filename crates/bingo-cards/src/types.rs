use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug)]
pub enum BingoError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Not enough images: {required} required per card, {available} available")]
    InsufficientImages { required: usize, available: usize },
    #[error("Unknown game: {0}")]
    UnknownGame(String),
    #[error("Unknown grid group: {0}")]
    UnknownGridGroup(String),
    #[error("Unknown grid: {0}")]
    UnknownGrid(String),
    #[error("No grids to render")]
    NoGrids,
    #[error("Asset fetch exceeded its deadline")]
    AssetTimeout,
    #[error("Asset error: {0}")]
    Asset(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BingoError>;

/// Reference to raw image bytes, resolvable by an [`AssetSource`](crate::AssetSource).
///
/// For user photos this is a path or key inside the blob store; for theme
/// backgrounds it is a path relative to the built-in asset directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct SourceRef(String);

impl SourceRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SourceRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SourceRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A photo in a game's image pool
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BingoImage {
    pub id: String,
    pub game_id: String,
    pub name: String,
    pub source: SourceRef,
}

/// Content of one grid position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Cell {
    /// The always-covered center cell of odd-sized grids
    FreeSpace,
    /// Reference to a [`BingoImage`] by id
    Image(String),
}

impl Cell {
    pub fn image_id(&self) -> Option<&str> {
        match self {
            Cell::FreeSpace => None,
            Cell::Image(id) => Some(id),
        }
    }

    pub fn is_free_space(&self) -> bool {
        matches!(self, Cell::FreeSpace)
    }
}

/// A batch of grids generated together from one configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridGroup {
    pub id: String,
    pub game_id: String,
    pub name: String,
    pub size: usize,
}

/// One playable bingo card
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    pub id: String,
    pub group_id: String,
    pub name: String,
    /// Row-major, `size * size` entries
    pub cells: Vec<Cell>,
}

impl Grid {
    /// Side length, derived from the cell count
    pub fn size(&self) -> usize {
        let mut size = 0;
        while (size + 1) * (size + 1) <= self.cells.len() {
            size += 1;
        }
        size
    }
}

/// A grid that has been allocated but not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewGrid {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PaperSize {
    #[default]
    A4,
    A5,
    Letter,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Portrait dimensions in millimeters
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }
}

/// How many grids share one printed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "usize", into = "usize")
)]
pub enum GridsPerPage {
    #[default]
    One,
    Two,
    Four,
}

impl GridsPerPage {
    pub fn count(self) -> usize {
        match self {
            GridsPerPage::One => 1,
            GridsPerPage::Two => 2,
            GridsPerPage::Four => 4,
        }
    }

    /// Slot grid as (columns, rows)
    pub fn grid_dimensions(self) -> (usize, usize) {
        match self {
            GridsPerPage::One => (1, 1),
            GridsPerPage::Two => (2, 1),
            GridsPerPage::Four => (2, 2),
        }
    }
}

impl TryFrom<usize> for GridsPerPage {
    type Error = BingoError;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            1 => Ok(GridsPerPage::One),
            2 => Ok(GridsPerPage::Two),
            4 => Ok(GridsPerPage::Four),
            other => Err(BingoError::Config(format!(
                "grids per page must be 1, 2 or 4, got {}",
                other
            ))),
        }
    }
}

impl From<GridsPerPage> for usize {
    fn from(value: GridsPerPage) -> Self {
        value.count()
    }
}

/// Visual theme of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Theme {
    #[default]
    Standard,
    Christmas,
    Birthday,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Standard => "standard",
            Theme::Christmas => "christmas",
            Theme::Birthday => "birthday",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = BingoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Theme::Standard),
            "christmas" => Ok(Theme::Christmas),
            "birthday" => Ok(Theme::Birthday),
            other => Err(BingoError::Config(format!("unknown theme '{}'", other))),
        }
    }
}
