//! Layout configuration.
//!
//! [§ 13.2 Page boxes](https://www.w3.org/TR/CSS2/page.html#page-box)
//!
//! "The page box is a rectangular region that contains two areas: the page
//! area ... and the margin area."

use serde::{Deserialize, Serialize};

use crate::geometry::{EdgeSizes, Rect};
use crate::style::DEFAULT_FONT_SIZE;

/// Page size and margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Margin area around the page area.
    pub margin: EdgeSizes,
}

impl Default for PageConfig {
    /// US Letter with half-inch margins.
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: EdgeSizes::uniform(36.0),
        }
    }
}

impl PageConfig {
    /// A named paper size (`letter`, `legal`, `a4`, `a5`), case-insensitive.
    #[must_use]
    pub fn from_size_name(name: &str) -> Option<Self> {
        let (width, height) = match name.to_ascii_lowercase().as_str() {
            "letter" => (612.0, 792.0),
            "legal" => (612.0, 1008.0),
            "a4" => (595.28, 841.89),
            "a5" => (419.53, 595.28),
            _ => return None,
        };
        Some(Self {
            width,
            height,
            ..Self::default()
        })
    }

    /// Swap width and height.
    #[must_use]
    pub const fn landscape(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            margin: self.margin,
        }
    }

    /// The page area: the page box minus its margins.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height).shrink(self.margin)
    }
}

/// Options for one layout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page geometry.
    pub page: PageConfig,
    /// Font used when a frame's family is empty.
    pub default_font: String,
    /// Root font size in points.
    pub default_font_size: f32,
    /// Upper bound on float-placement probes per reflow pass.
    pub float_iteration_limit: u32,
    /// Split content across pages; when false everything lands on one page.
    pub paginate: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            default_font: "serif".to_string(),
            default_font_size: DEFAULT_FONT_SIZE,
            float_iteration_limit: 100,
            paginate: true,
        }
    }
}

impl LayoutConfig {
    /// Default options on the given page.
    #[must_use]
    pub fn with_page(page: PageConfig) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }
}
