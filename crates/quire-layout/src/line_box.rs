//! Line boxes.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The rectangular area that contains the boxes that form a line is called a
//! line box."
//!
//! A block container keeps one `LineBox` per line of inline content, plus one
//! per block-level child so that the vertical cursor is always the bottom of
//! the last line.

use serde::Serialize;

use crate::tree::FrameId;

/// One horizontal strip of frames inside a block container.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineBox {
    /// Frames placed on this line, in order.
    pub frames: Vec<FrameId>,
    /// Top edge.
    pub y: f32,
    /// Accumulated width of the placed frames.
    pub w: f32,
    /// Height, grown as frames are added.
    pub h: f32,
    /// Width reserved by left floats.
    pub left: f32,
    /// Width reserved by right floats.
    pub right: f32,
    /// Extra indentation (the first line's `text-indent`).
    pub indent: f32,
    /// Number of words on the line. Only set when the line is justified;
    /// zero otherwise.
    pub wc: usize,
    /// The line was ended by a forced break.
    pub br: bool,
    /// Holds inline content rather than a single block-level child.
    pub inline: bool,
    /// Float offsets have been computed for the current `y`.
    pub floats_resolved: bool,
}

impl LineBox {
    /// An empty inline line starting at `y`.
    #[must_use]
    pub fn new(y: f32) -> Self {
        Self {
            y,
            inline: true,
            ..Self::default()
        }
    }

    /// Returns true if nothing has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Left edge of the next frame relative to the container's content box.
    #[must_use]
    pub fn cursor(&self) -> f32 {
        self.left + self.indent + self.w
    }

    /// Width still free on the line inside a container `width` wide.
    #[must_use]
    pub fn available_width(&self, width: f32) -> f32 {
        width - self.left - self.right - self.indent - self.w
    }

    /// Width available to the line's content as a whole.
    #[must_use]
    pub fn content_width(&self, width: f32) -> f32 {
        width - self.left - self.right - self.indent
    }

    /// Move the line down, invalidating its float offsets.
    pub fn move_to(&mut self, y: f32) {
        if (self.y - y).abs() > f32::EPSILON {
            self.y = y;
            self.floats_resolved = false;
        }
    }

    /// Record a placed frame.
    pub fn push(&mut self, frame: FrameId, width: f32, height: f32) {
        self.frames.push(frame);
        self.w += width;
        self.h = self.h.max(height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_width_accounts_for_floats_and_indent() {
        let mut line = LineBox::new(10.0);
        line.left = 50.0;
        line.right = 20.0;
        line.indent = 5.0;
        line.push(FrameId(1), 30.0, 14.0);
        assert!((line.available_width(200.0) - 95.0).abs() < 0.01);
        assert!((line.cursor() - 85.0).abs() < 0.01);
        assert!((line.bottom() - 24.0).abs() < 0.01);
    }

    #[test]
    fn test_moving_invalidates_float_offsets() {
        let mut line = LineBox::new(0.0);
        line.floats_resolved = true;
        line.move_to(0.0);
        assert!(line.floats_resolved);
        line.move_to(12.0);
        assert!(!line.floats_resolved);
    }
}
