//! The drawing surface interface.
//!
//! Layout never rasterizes. The paint walker drives a [`Canvas`] with
//! primitive operations in stacking order; the host turns them into PDF
//! operators, pixels, or (for tests and the CLI) a recorded display list.

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::style::{BorderRadius, Color};

/// Dash pattern of a stroked line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeStyle {
    /// Continuous.
    #[default]
    Solid,
    /// Dashes three times the line width.
    Dashed,
    /// Dots one line width apart.
    Dotted,
}

/// Font and spacing of a text run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    /// Font family; empty selects the host's default face.
    pub font: String,
    /// Font size in points.
    pub size: f32,
    /// Fill color.
    pub color: Color,
    /// Extra space after every space character (`word-spacing` plus any
    /// justification).
    pub word_spacing: f32,
    /// Extra space after every glyph (`letter-spacing`).
    pub char_spacing: f32,
}

/// [CSS Transforms § 7.1 2D transform functions](https://www.w3.org/TR/css-transforms-1/#two-d-transform-functions)
///
/// A 2D affine matrix `[a b c d e f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AffineTransform(pub [f32; 6]);

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    /// The identity matrix.
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `translate(tx, ty)`
    #[must_use]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `scale(sx, sy)`
    #[must_use]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// `rotate(deg)`, clockwise in a y-down coordinate system.
    #[must_use]
    pub fn rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// `skewX(deg)`
    #[must_use]
    pub fn skew_x(degrees: f32) -> Self {
        Self([1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0])
    }

    /// `skewY(deg)`
    #[must_use]
    pub fn skew_y(degrees: f32) -> Self {
        Self([1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0])
    }

    /// `self × other`: `other` applies to a point first.
    #[must_use]
    pub fn then(self, other: Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }

    /// Map a point.
    #[must_use]
    pub fn apply(self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    /// Returns true for the identity matrix.
    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }
}

/// Primitive drawing operations of a paged output surface.
///
/// Coordinates are points with the origin at the top-left corner of the
/// page and y growing downwards.
pub trait Canvas {
    /// Start a new page of the given size. Every other call draws on the
    /// current page.
    fn new_page(&mut self, width: f32, height: f32);

    /// Number of pages started so far.
    fn page_count(&self) -> usize;

    /// Stroke a straight line.
    fn line(&mut self, from: Point, to: Point, width: f32, color: Color, style: StrokeStyle);

    /// Stroke the outline of a rectangle.
    fn rect(&mut self, rect: Rect, width: f32, color: Color);

    /// Fill a rectangle, optionally with rounded corners.
    fn fill_rect(&mut self, rect: Rect, radius: BorderRadius, color: Color);

    /// Fill a closed polygon.
    fn polygon(&mut self, points: &[Point], color: Color);

    /// Fill or stroke a circle.
    fn circle(&mut self, center: Point, radius: f32, color: Color, filled: bool);

    /// Draw the image stored under `src`, scaled into `rect`.
    fn image(&mut self, rect: Rect, src: &str);

    /// Draw a run of text with its baseline starting at `origin`.
    fn text(&mut self, origin: Point, text: &str, style: &TextStyle);

    /// Intersect the clip region with a (possibly rounded) rectangle.
    fn push_clip(&mut self, rect: Rect, radius: BorderRadius);

    /// Undo the most recent [`Canvas::push_clip`].
    fn pop_clip(&mut self);

    /// Save the graphics state (transform and opacity).
    fn save(&mut self);

    /// Restore the most recently saved graphics state.
    fn restore(&mut self);

    /// Concatenate a matrix to the current transform.
    fn transform(&mut self, matrix: AffineTransform);

    /// Set the opacity for following operations, until the next
    /// [`Canvas::restore`].
    fn set_opacity(&mut self, opacity: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 0.001 && (a.y - b.y).abs() < 0.001
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        let m = AffineTransform::translate(10.0, 0.0).then(AffineTransform::scale(2.0, 2.0));
        assert!(close(m.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0)));
    }

    #[test]
    fn test_rotate_quarter_turn_is_clockwise() {
        let m = AffineTransform::rotate(90.0);
        assert!(close(m.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
    }
}
