//! Box model geometry.
//!
//! [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
//!
//! All lengths are in points (1/72 inch). A frame's `position` is the top-left
//! corner of its margin box; the other three boxes are derived from it and the
//! frame's used edge sizes.

use serde::{Deserialize, Serialize};

/// A point in page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate, growing downward.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle positioned in page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grow the rectangle outward by the given edges.
    #[must_use]
    pub fn expand(&self, edges: EdgeSizes) -> Self {
        Self {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.horizontal(),
            height: self.height + edges.vertical(),
        }
    }

    /// Shrink the rectangle inward by the given edges.
    #[must_use]
    pub fn shrink(&self, edges: EdgeSizes) -> Self {
        Self {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Shift by an offset.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// The same size on all four edges.
    #[must_use]
    pub const fn uniform(size: f32) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }

    /// `left + right`
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// `top + bottom`
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl std::ops::Add for EdgeSizes {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

/// The four nested boxes of a laid-out frame.
///
/// ```text
/// margin box ⊃ border box ⊃ padding box ⊃ content box
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxRects {
    /// Outermost box, including margins.
    pub margin: Rect,
    /// Border edge.
    pub border: Rect,
    /// Padding edge.
    pub padding: Rect,
    /// Content area.
    pub content: Rect,
}

impl BoxRects {
    /// Derive all four boxes from the margin-box corner, the content size and
    /// the used edges.
    #[must_use]
    pub fn from_parts(
        origin: Point,
        content_width: f32,
        content_height: f32,
        margin: EdgeSizes,
        border: EdgeSizes,
        padding: EdgeSizes,
    ) -> Self {
        let content = Rect {
            x: origin.x + margin.left + border.left + padding.left,
            y: origin.y + margin.top + border.top + padding.top,
            width: content_width,
            height: content_height,
        };
        let padding_box = content.expand(padding);
        let border_box = padding_box.expand(border);
        let margin_box = border_box.expand(margin);
        Self {
            margin: margin_box,
            border: border_box,
            padding: padding_box,
            content,
        }
    }
}

/// Two floats are equal within layout tolerance.
#[must_use]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_rects_nest() {
        let rects = BoxRects::from_parts(
            Point::new(10.0, 20.0),
            100.0,
            50.0,
            EdgeSizes::uniform(5.0),
            EdgeSizes::uniform(2.0),
            EdgeSizes::uniform(3.0),
        );
        assert!(approx_eq(rects.content.x, 20.0));
        assert!(approx_eq(rects.border.width, 110.0));
        assert!(approx_eq(rects.margin.width, 120.0));
        assert!(approx_eq(rects.margin.x, 10.0));
        assert!(approx_eq(rects.margin.bottom(), 20.0 + 50.0 + 20.0));
    }

    #[test]
    fn test_union_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 5.0);
        let u = a.union(&b);
        assert!(approx_eq(u.y, -5.0));
        assert!(approx_eq(u.right(), 25.0));
        assert!(approx_eq(u.bottom(), 10.0));
    }
}
