//! List item markers.
//!
//! [§ 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
//!
//! "An element with 'display: list-item' generates a principal block box for
//! the element's content and, depending on the values of 'list-style-type'
//! and 'list-style-image', possibly also a marker box as a visual indication
//! that the element is a list item."

use crate::error::Result;
use crate::geometry::Point;
use crate::style::ListStylePosition;
use crate::tree::{FrameId, FrameTree};

use super::{Flow, LayoutContext, font_name, generated, line};

/// The marker's rendered text: the item number for numbering styles, the
/// bullet glyph for shapes, nothing for `none`.
fn marker_label(tree: &FrameTree, id: FrameId) -> Result<String> {
    let style = tree.style(id)?;
    let value = generated::counter_value(tree, id, generated::LIST_ITEM);
    let label = generated::format_counter(value, style.list_style_type);
    if label.is_empty() || style.list_style_type.is_bullet() {
        Ok(label)
    } else {
        Ok(format!("{label}."))
    }
}

/// Width of the marker box: its label plus one space of separation.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn marker_width(tree: &FrameTree, ctx: &LayoutContext<'_>, id: FrameId) -> Result<f32> {
    let label = marker_label(tree, id)?;
    if label.is_empty() {
        return Ok(0.0);
    }
    let style = tree.style(id)?;
    Ok(ctx.metrics.text_width(
        &format!("{label} "),
        font_name(&style, ctx.config),
        style.font_size,
        0.0,
        style.letter_spacing,
    ))
}

/// Lay out a marker.
///
/// "outside: The marker box is outside the principal block box." It hangs
/// to the left of the first line and takes no room on it. "inside: The
/// marker box is placed as the first inline box in the principal block box."
///
/// # Errors
///
/// Structural errors from the tree.
pub fn reflow(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    block: Option<FrameId>,
) -> Result<Flow> {
    let style = tree.style(id)?;
    let label = marker_label(tree, id)?;
    let width = marker_width(tree, ctx, id)?;
    let line_height = super::line_height(ctx, &style);
    {
        let f = tree.frame_mut(id)?;
        f.used.width = width;
        f.used.height = line_height;
        f.used.line_height = line_height;
        f.used.baseline = super::text_baseline(ctx, &style, line_height);
        f.used.marker_text = if style.list_style_type.is_bullet() {
            String::new()
        } else {
            label
        };
    }

    let Some(block) = block else {
        let cb = tree.frame(id)?.containing_block;
        tree.frame_mut(id)?.position = Some(Point::new(cb.x - width, cb.y));
        return Ok(Flow::Complete);
    };
    if style.list_style_position == ListStylePosition::Inside {
        tree.frame_mut(id)?.position = None;
        return line::place_atomic(tree, ctx, block, id);
    }

    let content = line::content_box(tree, block)?;
    let y = line::current(tree, block)?.y;
    tree.frame_mut(id)?.position = Some(Point::new(content.x - width, y));
    Ok(Flow::Complete)
}
