//! Display list - a recorded sequence of canvas calls
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! [`RecordingCanvas`] implements [`Canvas`] by storing every call in
//! painting order (back to front). Tests assert on the list; the CLI prints
//! it or serializes it to JSON.

use std::fmt;

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::style::{BorderRadius, Color};

use super::canvas::{AffineTransform, Canvas, StrokeStyle, TextStyle};

/// A single recorded drawing command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PaintCommand {
    /// A new page begins.
    NewPage {
        /// Page width.
        width: f32,
        /// Page height.
        height: f32,
    },
    /// Stroke a line.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Line width.
        width: f32,
        /// Stroke color.
        color: Color,
        /// Dash pattern.
        style: StrokeStyle,
    },
    /// Stroke a rectangle outline.
    Rect {
        /// Outline rectangle.
        rect: Rect,
        /// Line width.
        width: f32,
        /// Stroke color.
        color: Color,
    },
    /// Fill a rectangle.
    ///
    /// Used for backgrounds and solid borders.
    FillRect {
        /// Filled area.
        rect: Rect,
        /// Corner radii; all zero for sharp corners.
        radius: BorderRadius,
        /// Fill color.
        color: Color,
    },
    /// Fill a polygon.
    Polygon {
        /// Vertices in order.
        points: Vec<Point>,
        /// Fill color.
        color: Color,
    },
    /// Fill or stroke a circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f32,
        /// Color.
        color: Color,
        /// Filled rather than stroked.
        filled: bool,
    },
    /// Draw an image (replaced element content).
    ///
    /// Step 5: "the replaced content of replaced inline-level elements"
    Image {
        /// Destination rectangle.
        rect: Rect,
        /// Image key.
        src: String,
    },
    /// Draw text.
    ///
    /// Step 7: "the element's text"
    Text {
        /// Baseline origin.
        origin: Point,
        /// The characters.
        text: String,
        /// Font, size, color and spacing.
        style: TextStyle,
    },
    /// Push a clip rectangle onto the clip stack.
    PushClip {
        /// Clip rectangle.
        rect: Rect,
        /// Corner radii of a rounded clip.
        radius: BorderRadius,
    },
    /// Pop the most recent clip rectangle from the clip stack.
    PopClip,
    /// Save the graphics state.
    Save,
    /// Restore the graphics state.
    Restore,
    /// Concatenate a transform.
    Transform {
        /// The matrix.
        matrix: AffineTransform,
    },
    /// Set the opacity.
    Opacity {
        /// Alpha in `0.0..=1.0`.
        value: f32,
    },
}

impl fmt::Display for PaintCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewPage { width, height } => write!(f, "new-page {width}x{height}"),
            Self::Line {
                from, to, width, ..
            } => write!(
                f,
                "line ({}, {}) -> ({}, {}) w={width}",
                from.x, from.y, to.x, to.y
            ),
            Self::Rect { rect, width, .. } => write!(
                f,
                "rect {} {} {} {} w={width}",
                rect.x, rect.y, rect.width, rect.height
            ),
            Self::FillRect { rect, color, .. } => write!(
                f,
                "fill-rect {} {} {} {} {color}",
                rect.x, rect.y, rect.width, rect.height
            ),
            Self::Polygon { points, color } => write!(f, "polygon n={} {color}", points.len()),
            Self::Circle {
                center,
                radius,
                filled,
                ..
            } => write!(
                f,
                "circle ({}, {}) r={radius}{}",
                center.x,
                center.y,
                if *filled { " filled" } else { "" }
            ),
            Self::Image { rect, src } => write!(
                f,
                "image {src} {} {} {} {}",
                rect.x, rect.y, rect.width, rect.height
            ),
            Self::Text {
                origin,
                text,
                style,
            } => write!(
                f,
                "text ({}, {}) {}pt {text:?}",
                origin.x, origin.y, style.size
            ),
            Self::PushClip { rect, .. } => write!(
                f,
                "push-clip {} {} {} {}",
                rect.x, rect.y, rect.width, rect.height
            ),
            Self::PopClip => f.write_str("pop-clip"),
            Self::Save => f.write_str("save"),
            Self::Restore => f.write_str("restore"),
            Self::Transform { matrix } => write!(f, "transform {:?}", matrix.0),
            Self::Opacity { value } => write!(f, "opacity {value}"),
        }
    }
}

/// A canvas that records every call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingCanvas {
    commands: Vec<PaintCommand>,
    pages: usize,
}

impl RecordingCanvas {
    /// Create an empty recording.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            pages: 0,
        }
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take the recorded commands.
    #[must_use]
    pub fn into_commands(self) -> Vec<PaintCommand> {
        self.commands
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The text of every `Text` command, in painting order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn new_page(&mut self, width: f32, height: f32) {
        self.pages += 1;
        self.commands.push(PaintCommand::NewPage { width, height });
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn line(&mut self, from: Point, to: Point, width: f32, color: Color, style: StrokeStyle) {
        self.commands.push(PaintCommand::Line {
            from,
            to,
            width,
            color,
            style,
        });
    }

    fn rect(&mut self, rect: Rect, width: f32, color: Color) {
        self.commands.push(PaintCommand::Rect { rect, width, color });
    }

    fn fill_rect(&mut self, rect: Rect, radius: BorderRadius, color: Color) {
        self.commands
            .push(PaintCommand::FillRect { rect, radius, color });
    }

    fn polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(PaintCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn circle(&mut self, center: Point, radius: f32, color: Color, filled: bool) {
        self.commands.push(PaintCommand::Circle {
            center,
            radius,
            color,
            filled,
        });
    }

    fn image(&mut self, rect: Rect, src: &str) {
        self.commands.push(PaintCommand::Image {
            rect,
            src: src.to_string(),
        });
    }

    fn text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        self.commands.push(PaintCommand::Text {
            origin,
            text: text.to_string(),
            style: style.clone(),
        });
    }

    fn push_clip(&mut self, rect: Rect, radius: BorderRadius) {
        self.commands.push(PaintCommand::PushClip { rect, radius });
    }

    fn pop_clip(&mut self) {
        self.commands.push(PaintCommand::PopClip);
    }

    fn save(&mut self) {
        self.commands.push(PaintCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(PaintCommand::Restore);
    }

    fn transform(&mut self, matrix: AffineTransform) {
        self.commands.push(PaintCommand::Transform { matrix });
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.commands.push(PaintCommand::Opacity { value: opacity });
    }
}
