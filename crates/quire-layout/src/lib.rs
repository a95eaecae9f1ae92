//! CSS 2.1 visual formatting model for paged output.
//!
//! # Scope
//!
//! This crate turns a tree of styled boxes into positioned, sized frames on
//! pages, and walks the result in paint order:
//!
//! - **Frame tree** ([§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen))
//!   - Arena of frames with parent/child/sibling links
//!   - Behaviour selection from `display`, `float` and `position`
//!   - Page splits, deep copies and resets for the retry after a break
//!
//! - **Reflow** ([§ 10 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html))
//!   - Block widths, heights and margin collapsing
//!   - Line boxes, text breaking, `text-align` and `vertical-align`
//!   - Floats and clearance
//!   - Absolute, fixed and relative positioning
//!   - Lists, generated content, counters and quotes
//!
//! - **Tables** ([§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html))
//!   - Cellmap grid with row and column spans
//!   - Collapsing border conflict resolution
//!   - Automatic and fixed column width distribution
//!
//! - **Pagination** ([§ 13 Paged media](https://www.w3.org/TR/CSS2/page.html))
//!   - `page-break-*` properties, split and retry
//!   - Fixed boxes repeated on every page
//!
//! - **Painting** ([Appendix E](https://www.w3.org/TR/CSS2/zindex.html))
//!   - Stack buckets, `overflow` clips, transforms and opacity
//!   - A [`paint::Canvas`] trait and a recording implementation
//!
//! # Not Implemented
//!
//! - Cascade and selector matching: styles arrive already computed
//! - Font shaping and glyph rendering: see [`font::FontMetrics`]
//! - Output encoding: see [`paint::Canvas`]

/// Table grid, border conflict resolution and column widths.
pub mod cellmap;
/// Page geometry and layout options.
pub mod config;
/// Paged documents: the pagination driver.
pub mod document;
/// Structural layout errors.
pub mod error;
/// Font metrics provider interface.
pub mod font;
/// Points, rectangles and box edges.
pub mod geometry;
/// Line boxes.
pub mod line_box;
/// Paint order and the canvas interface.
pub mod paint;
/// Layout behaviours.
pub mod reflow;
/// Specified and used style values.
pub mod style;
/// The frame tree.
pub mod tree;

// Re-exports for convenience
pub use cellmap::Cellmap;
pub use config::{LayoutConfig, PageConfig};
pub use document::{Document, RenderOutput};
pub use error::{LayoutError, Result};
pub use font::{ApproximateFontMetrics, FontMetrics};
pub use geometry::{BoxRects, EdgeSizes, Point, Rect};
pub use line_box::LineBox;
pub use paint::{Canvas, PaintCommand, RecordingCanvas, Renderer};
pub use reflow::Flow;
pub use style::{SpecifiedStyle, UsedValues};
pub use tree::{Behavior, BoxNode, Frame, FrameId, FrameKind, FrameTree, ImageSource};
pub use quire_common::{Diagnostic, Diagnostics};
