//! CSS Painting
//!
//! [CSS 2.1 Appendix E - Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! Painting turns laid-out pages into canvas calls:
//!
//! ```text
//! Style → Reflow → Paint → Canvas
//!                            ↓
//!                 PDF writer / RecordingCanvas
//! ```

mod canvas;
mod display_list;
mod painter;
mod walker;

pub use canvas::{AffineTransform, Canvas, StrokeStyle, TextStyle};
pub use display_list::{PaintCommand, RecordingCanvas};
pub use painter::inner_radius;
pub use walker::{Renderer, stack_key, transform_matrix};
