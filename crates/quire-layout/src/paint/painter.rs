//! Painter - the decorations of one frame
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! Backgrounds, borders, replaced content, text, decorations and list
//! markers. The walker decides the order; this module only draws.

use crate::cellmap::CollapsedBorder;
use crate::error::Result;
use crate::geometry::{EdgeSizes, Point, Rect};
use crate::reflow::table;
use crate::style::{BorderRadius, BorderStyle, Color, ListStyleType, TextDecoration};
use crate::tree::{Behavior, Frame, FrameKind, FrameTree};

use super::canvas::{Canvas, StrokeStyle, TextStyle};

/// Paint everything a frame draws for itself, excluding its children.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] for a stale id in a table lookup.
pub fn paint_frame(tree: &FrameTree, frame: &Frame, canvas: &mut dyn Canvas) -> Result<()> {
    match frame.behavior {
        Behavior::Page | Behavior::Null => {}
        Behavior::Text => paint_text(frame, canvas),
        Behavior::ListMarker => paint_marker(frame, canvas),
        Behavior::Image => {
            paint_box(tree, frame, canvas)?;
            if let FrameKind::Image { src, .. } = &frame.kind {
                canvas.image(frame.rects().content, src);
            }
        }
        _ => paint_box(tree, frame, canvas)?,
    }
    Ok(())
}

/// [CSS 2.1 Appendix E.2 Step 2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
/// "the background color of the element" then "the border of the element".
fn paint_box(tree: &FrameTree, frame: &Frame, canvas: &mut dyn Canvas) -> Result<()> {
    let border_box = frame.rects().border;
    if let Some(bg) = frame.style.background_color
        && !bg.is_transparent()
    {
        // [CSS Backgrounds § 3.7](https://www.w3.org/TR/css-backgrounds-3/#background-painting-area)
        //
        // "The initial value of 'background-clip' is 'border-box', meaning
        // the background is painted within the border box."
        canvas.fill_rect(border_box, frame.style.border_radius, bg);
    }
    let sides = border_sides(tree, frame)?;
    paint_borders(canvas, border_box, frame.used.border, &sides);
    Ok(())
}

/// The four sides drawn for a frame, top, right, bottom, left. A cell under
/// the collapsing border model draws the winners of its grid edges.
fn border_sides(tree: &FrameTree, frame: &Frame) -> Result<[CollapsedBorder; 4]> {
    let style = &frame.style;
    let own = [
        CollapsedBorder::from_side(&style.border_top, style),
        CollapsedBorder::from_side(&style.border_right, style),
        CollapsedBorder::from_side(&style.border_bottom, style),
        CollapsedBorder::from_side(&style.border_left, style),
    ];
    if frame.behavior != Behavior::TableCell {
        return Ok(own);
    }
    let Ok(table_id) = table::enclosing_table(tree, frame.id) else {
        return Ok(own);
    };
    let map = table::cellmap(tree, table_id)?;
    if !map.is_collapsed() {
        return Ok(own);
    }
    let Ok(span) = map.span(frame.id) else {
        return Ok(own);
    };
    let edge = |row: usize, column: usize, horizontal: bool, fallback: CollapsedBorder| {
        map.border(row, column, horizontal).unwrap_or(fallback)
    };
    let [top, right, bottom, left] = own;
    Ok([
        edge(span.row, span.column, true, top),
        edge(span.row, span.column + span.colspan, false, right),
        edge(span.row + span.rowspan, span.column, true, bottom),
        edge(span.row, span.column, false, left),
    ])
}

#[derive(Clone, Copy)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// The band of a border side between fractions `from` and `to` of its
/// width, measured inwards from the outer edge. Corners are mitred.
fn band(outer: Rect, widths: EdgeSizes, side: Side, from: f32, to: f32) -> [Point; 4] {
    let inset = |t: f32| {
        outer.shrink(EdgeSizes {
            top: widths.top * t,
            right: widths.right * t,
            bottom: widths.bottom * t,
            left: widths.left * t,
        })
    };
    let (o, i) = (inset(from), inset(to));
    let tl = |r: Rect| Point::new(r.x, r.y);
    let tr = |r: Rect| Point::new(r.right(), r.y);
    let br = |r: Rect| Point::new(r.right(), r.bottom());
    let bl = |r: Rect| Point::new(r.x, r.bottom());
    match side {
        Side::Top => [tl(o), tr(o), tr(i), tl(i)],
        Side::Right => [tr(o), br(o), br(i), tr(i)],
        Side::Bottom => [br(o), bl(o), bl(i), br(i)],
        Side::Left => [bl(o), tl(o), tl(i), bl(i)],
    }
}

/// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
fn paint_borders(
    canvas: &mut dyn Canvas,
    border_box: Rect,
    widths: EdgeSizes,
    sides: &[CollapsedBorder; 4],
) {
    let order = [Side::Top, Side::Right, Side::Bottom, Side::Left];
    for (side, border) in order.into_iter().zip(sides) {
        let width = match side {
            Side::Top => widths.top,
            Side::Right => widths.right,
            Side::Bottom => widths.bottom,
            Side::Left => widths.left,
        };
        if width <= 0.0 || !border.style.is_visible() || border.color.is_transparent() {
            continue;
        }
        let color = border.color;
        // "The color of the top and left borders is darker (inset) or lighter
        // (outset) than that of the bottom and right borders."
        let top_left = matches!(side, Side::Top | Side::Left);
        let dark = color.shade(0.5);
        let light = color.shade(1.5);
        match border.style {
            BorderStyle::None | BorderStyle::Hidden => {}
            BorderStyle::Solid => canvas.polygon(&band(border_box, widths, side, 0.0, 1.0), color),
            BorderStyle::Double => {
                // "Two solid lines. The sum of the two lines and the space
                // between them equals the value of 'border-width'."
                canvas.polygon(&band(border_box, widths, side, 0.0, 1.0 / 3.0), color);
                canvas.polygon(&band(border_box, widths, side, 2.0 / 3.0, 1.0), color);
            }
            BorderStyle::Dashed | BorderStyle::Dotted => {
                let [a, b, c, d] = band(border_box, widths, side, 0.0, 1.0);
                let from = Point::new((a.x + d.x) / 2.0, (a.y + d.y) / 2.0);
                let to = Point::new((b.x + c.x) / 2.0, (b.y + c.y) / 2.0);
                let stroke = if border.style == BorderStyle::Dashed {
                    StrokeStyle::Dashed
                } else {
                    StrokeStyle::Dotted
                };
                canvas.line(from, to, width, color, stroke);
            }
            BorderStyle::Groove | BorderStyle::Ridge => {
                let (outer, inner) = if border.style == BorderStyle::Groove {
                    (dark, light)
                } else {
                    (light, dark)
                };
                canvas.polygon(&band(border_box, widths, side, 0.0, 0.5), outer);
                canvas.polygon(&band(border_box, widths, side, 0.5, 1.0), inner);
            }
            BorderStyle::Inset | BorderStyle::Outset => {
                let shade = if (border.style == BorderStyle::Inset) == top_left {
                    dark
                } else {
                    light
                };
                canvas.polygon(&band(border_box, widths, side, 0.0, 1.0), shade);
            }
        }
    }
}

fn text_style(frame: &Frame) -> TextStyle {
    let style = &frame.style;
    TextStyle {
        font: style.font_family.clone(),
        size: style.font_size,
        color: style.color,
        word_spacing: style.word_spacing + frame.used.justify_spacing,
        char_spacing: style.letter_spacing,
    }
}

/// [CSS 2.1 Appendix E.2 Step 7](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
/// "the element's text", followed by its decoration.
fn paint_text(frame: &Frame, canvas: &mut dyn Canvas) {
    let Some(text) = frame.text() else {
        return;
    };
    if text.is_empty() || frame.style.color.is_transparent() {
        return;
    }
    let Some(pos) = frame.position else {
        return;
    };
    let style = text_style(frame);
    let baseline = pos.y + frame.used.baseline;
    canvas.text(Point::new(pos.x, baseline), text, &style);
    paint_decoration(frame, baseline, canvas);
}

/// [§ 16.3.1 Underlining, overlining, striking](https://www.w3.org/TR/CSS2/text.html#lining-striking-props)
///
/// "The thickness and position of these lines is user agent dependent."
/// Lines are a sixteenth of the font size thick; the underline sits a
/// tenth of an em below the baseline, the line-through 0.3em above it and
/// the overline at the top of the em box.
fn paint_decoration(frame: &Frame, baseline: f32, canvas: &mut dyn Canvas) {
    let size = frame.style.font_size;
    let y = match frame.style.text_decoration {
        TextDecoration::None => return,
        TextDecoration::Underline => baseline + size * 0.1,
        TextDecoration::Overline => baseline - size * 0.8,
        TextDecoration::LineThrough => baseline - size * 0.3,
    };
    let Some(pos) = frame.position else {
        return;
    };
    canvas.line(
        Point::new(pos.x, y),
        Point::new(pos.x + frame.used.width, y),
        size / 16.0,
        frame.style.color,
        StrokeStyle::Solid,
    );
}

/// [§ 12.6.2 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
///
/// Shapes for `disc`, `circle` and `square`; the formatted number for the
/// numbering styles.
fn paint_marker(frame: &Frame, canvas: &mut dyn Canvas) {
    let Some(pos) = frame.position else {
        return;
    };
    let style = &frame.style;
    let baseline = pos.y + frame.used.baseline;
    let size = style.font_size;
    let radius = size * 0.18;
    let center = Point::new(pos.x + size * 0.25, baseline - size * 0.3);
    let color: Color = style.color;
    match style.list_style_type {
        ListStyleType::None => {}
        ListStyleType::Disc => canvas.circle(center, radius, color, true),
        ListStyleType::Circle => canvas.circle(center, radius, color, false),
        ListStyleType::Square => canvas.fill_rect(
            Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0),
            BorderRadius::default(),
            color,
        ),
        _ => {
            if !frame.used.marker_text.is_empty() {
                canvas.text(Point::new(pos.x, baseline), &frame.used.marker_text, &text_style(frame));
            }
        }
    }
}

/// Radii of the padding edge: "the padding edge (inner border) radius is the
/// outer border radius minus the corresponding border thickness."
#[must_use]
pub fn inner_radius(radius: BorderRadius, border: EdgeSizes) -> BorderRadius {
    BorderRadius {
        top_left: (radius.top_left - border.left.max(border.top)).max(0.0),
        top_right: (radius.top_right - border.right.max(border.top)).max(0.0),
        bottom_right: (radius.bottom_right - border.right.max(border.bottom)).max(0.0),
        bottom_left: (radius.bottom_left - border.left.max(border.bottom)).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{PaintCommand, RecordingCanvas};

    #[test]
    fn test_double_border_draws_two_bands() {
        let mut canvas = RecordingCanvas::new();
        let side = CollapsedBorder {
            width: 3.0,
            style: BorderStyle::Double,
            color: Color::BLACK,
        };
        let none = CollapsedBorder {
            width: 0.0,
            style: BorderStyle::None,
            color: Color::BLACK,
        };
        paint_borders(
            &mut canvas,
            Rect::new(0.0, 0.0, 30.0, 30.0),
            EdgeSizes {
                top: 3.0,
                ..EdgeSizes::default()
            },
            &[side, none, none, none],
        );
        let polygons = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, PaintCommand::Polygon { .. }))
            .count();
        assert_eq!(polygons, 2);
    }

    #[test]
    fn test_inner_radius_subtracts_border() {
        let r = inner_radius(BorderRadius::uniform(10.0), EdgeSizes::uniform(4.0));
        assert!((r.top_left - 6.0).abs() < 0.01);
        let r = inner_radius(BorderRadius::uniform(2.0), EdgeSizes::uniform(4.0));
        assert!(r.is_zero());
    }
}
