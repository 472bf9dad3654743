//! Per-theme style table
//!
//! Rendering code is theme-agnostic: it looks up a [`ThemeStyle`] once and
//! consults its fields instead of branching on the theme.

use crate::types::{SourceRef, Theme};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Components in the 0.0-1.0 range used by PDF color operators
    pub fn unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Line color and width
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stroke {
    pub color: Rgb,
    pub width_mm: f32,
}

/// Area color with opacity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fill {
    pub color: Rgb,
    pub alpha: f32,
}

impl Fill {
    pub const fn opaque(color: Rgb) -> Self {
        Self { color, alpha: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeStyle {
    pub theme: Theme,
    /// Full-page artwork, cycled by page or slot index
    pub backgrounds: &'static [&'static str],
    /// Flat fill used when the artwork is missing
    pub fallback_fill: Rgb,
    /// Card name above each grid
    pub shows_title: bool,
    pub title_color: Rgb,
    /// Outline around the whole grid
    pub grid_border: Option<Stroke>,
    /// Base tile under every cell
    pub cell_fill: Fill,
    /// Outline drawn over every cell
    pub cell_border: Stroke,
    pub corner_radius_mm: f32,
    /// Image inset from the cell edge
    pub image_inset_mm: f32,
    /// Spacing between neighbouring cells
    pub cell_gap_mm: f32,
    pub free_space_color: Rgb,
}

const CHRISTMAS_BACKGROUNDS: &[&str] = &[
    "noel/noel_red.png",
    "noel/noel_green.png",
    "noel/noel_golden.png",
    "noel/noel_gray.png",
];

const BIRTHDAY_BACKGROUNDS: &[&str] = &[
    "birthday/anniv1.png",
    "birthday/anniv2.png",
    "birthday/anniv3.png",
    "birthday/anniv4.png",
];

const GRAY_300: Rgb = Rgb::new(209, 213, 219);
const GRAY_400: Rgb = Rgb::new(156, 163, 175);
const GRAY_800: Rgb = Rgb::new(31, 41, 55);
const STAR_GOLD: Rgb = Rgb::new(250, 204, 21);

impl ThemeStyle {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Standard => Self {
                theme,
                backgrounds: &[],
                fallback_fill: Rgb::WHITE,
                shows_title: true,
                title_color: GRAY_800,
                grid_border: Some(Stroke {
                    color: GRAY_300,
                    width_mm: 0.5,
                }),
                cell_fill: Fill::opaque(Rgb::WHITE),
                cell_border: Stroke {
                    color: GRAY_400,
                    width_mm: 0.1,
                },
                corner_radius_mm: 0.0,
                image_inset_mm: 0.3,
                cell_gap_mm: 0.1,
                free_space_color: STAR_GOLD,
            },
            Theme::Christmas => Self::artwork(theme, CHRISTMAS_BACKGROUNDS, Rgb::new(254, 242, 242)),
            Theme::Birthday => Self::artwork(theme, BIRTHDAY_BACKGROUNDS, Rgb::new(253, 242, 248)),
        }
    }

    fn artwork(theme: Theme, backgrounds: &'static [&'static str], fallback_fill: Rgb) -> Self {
        Self {
            theme,
            backgrounds,
            fallback_fill,
            shows_title: false,
            title_color: GRAY_800,
            grid_border: None,
            cell_fill: Fill {
                color: Rgb::WHITE,
                alpha: 0.95,
            },
            cell_border: Stroke {
                color: Rgb::WHITE,
                width_mm: 0.5,
            },
            corner_radius_mm: 2.0,
            image_inset_mm: 0.5,
            cell_gap_mm: 0.5,
            free_space_color: STAR_GOLD,
        }
    }

    pub fn has_background_artwork(&self) -> bool {
        !self.backgrounds.is_empty()
    }

    /// Artwork for the given rotation index
    pub fn background_for(&self, index: usize) -> Option<SourceRef> {
        if self.backgrounds.is_empty() {
            return None;
        }
        Some(SourceRef::new(self.backgrounds[index % self.backgrounds.len()]))
    }

    /// All artwork references, in rotation order
    pub fn background_refs(&self) -> Vec<SourceRef> {
        self.backgrounds.iter().map(|path| SourceRef::new(*path)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_style() {
        let style = ThemeStyle::for_theme(Theme::Standard);
        assert!(!style.has_background_artwork());
        assert!(style.shows_title);
        assert!(style.grid_border.is_some());
        assert_eq!(style.corner_radius_mm, 0.0);
        assert_eq!(style.background_for(0), None);
    }

    #[test]
    fn test_artwork_styles() {
        for theme in [Theme::Christmas, Theme::Birthday] {
            let style = ThemeStyle::for_theme(theme);
            assert!(style.has_background_artwork());
            assert!(!style.shows_title);
            assert!(style.grid_border.is_none());
            assert_eq!(style.backgrounds.len(), 4);
            assert!(style.cell_fill.alpha < 1.0);
            assert!(style.corner_radius_mm > 0.0);
        }
    }

    #[test]
    fn test_background_rotation_cycles() {
        let style = ThemeStyle::for_theme(Theme::Christmas);
        assert_eq!(
            style.background_for(0),
            Some(SourceRef::new("noel/noel_red.png"))
        );
        assert_eq!(
            style.background_for(3),
            Some(SourceRef::new("noel/noel_gray.png"))
        );
        assert_eq!(style.background_for(4), style.background_for(0));
        assert_eq!(style.background_for(6), style.background_for(2));
    }

    #[test]
    fn test_rgb_unit() {
        assert_eq!(Rgb::WHITE.unit(), (1.0, 1.0, 1.0));
        assert_eq!(Rgb::new(0, 0, 0).unit(), (0.0, 0.0, 0.0));
    }
}
