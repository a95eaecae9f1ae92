//! Inline boxes.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "When an inline box exceeds the width of a line box, it is split into
//! several boxes and these boxes are distributed across several line boxes."
//!
//! An inline box has no line of its own: its children go onto the lines of
//! the enclosing block container, with the box's left and right edges
//! reserved around them. Once those lines are aligned, [`fit_bounds`] wraps
//! each fragment around whatever of its content ended up on one line.

use crate::error::Result;
use crate::geometry::{EdgeSizes, Point};
use crate::tree::{Behavior, FrameId, FrameTree};

use super::{Flow, LayoutContext, float, font_name, line};

/// Lay out an inline box's children on the lines of `block`.
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
    let frame = tree.frame(id)?;
    let style = frame.style.clone();
    let cb = frame.containing_block;
    let fragment = frame.fragment;
    let fs = style.font_size;

    // "The 'height' property does not apply. The height of the content area
    // should be based on the font."
    let font = font_name(&style, ctx.config);
    let content_height = ctx.metrics.font_height(font, fs);
    let mut border = style.border_widths();
    let mut padding = style.padding_widths(cb.width);
    let mut margin = EdgeSizes {
        left: style.margin_left.to_pt(cb.width, fs).unwrap_or(0.0),
        right: style.margin_right.to_pt(cb.width, fs).unwrap_or(0.0),
        ..EdgeSizes::default()
    };
    // "Horizontal margins, borders, and padding are respected between these
    // boxes", but not where the box was split.
    if fragment.continues_before {
        margin.left = 0.0;
        border.left = 0.0;
        padding.left = 0.0;
    }
    let line_height = super::line_height(ctx, &style);
    {
        let f = tree.frame_mut(id)?;
        f.used.margin = margin;
        f.used.border = border;
        f.used.padding = padding;
        f.used.width = 0.0;
        f.used.height = content_height;
        f.used.content_height = content_height;
        f.used.line_height = line_height;
        f.position = None;
    }

    let Some(block) = block else {
        tree.frame_mut(id)?.position = Some(Point::new(cb.x, cb.y));
        return Ok(Flow::Complete);
    };

    let has_content = tree
        .children(id)
        .any(|c| tree.frame(c).is_ok_and(|f| f.is_in_flow()));
    if !has_content {
        // An empty inline box is placed as a unit; it still wraps if its
        // edges do not fit.
        let parent = tree.parent(id);
        let flow = line::place_atomic(tree, ctx, block, id)?;
        // A wrap that moved the box into a following fragment lays it out
        // again there.
        if tree.parent(id) == parent {
            place_out_of_flow_children(tree, ctx, id, block)?;
        }
        return Ok(flow);
    }

    let left_edge = margin.left + border.left + padding.left;
    let x = line::cursor_x(tree, ctx, block)?;
    let y = line::current(tree, block)?.y;
    tree.frame_mut(id)?.position = Some(Point::new(x, y));
    line::reserve(tree, block, left_edge)?;

    let mut child = tree.first_child(id);
    while let Some(c) = child {
        tree.set_containing_block(c, cb)?;
        let f = tree.frame(c)?;
        if f.is_absolute() {
            record_static_position(tree, ctx, c, block)?;
        } else if f.is_floating() {
            float::place(tree, ctx, c, block)?;
        } else if let Flow::Break(at) = super::reflow(tree, ctx, c, Some(block))? {
            return Ok(Flow::Break(at));
        }
        if tree.parent(c) != Some(id) {
            break;
        }
        child = tree.next_sibling(c);
    }

    // A split moved the rest of the children into a following fragment,
    // which reserves its own right edge.
    if !tree.frame(id)?.fragment.continues_after {
        let right_edge = margin.right + border.right + padding.right;
        line::reserve(tree, block, right_edge)?;
    }
    Ok(Flow::Complete)
}

/// Record where an absolutely positioned box would have been in the flow
/// and hand it to the nearest positioned ancestor.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if an id is stale.
pub fn record_static_position(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    block: FrameId,
) -> Result<()> {
    let x = line::cursor_x(tree, ctx, block)?;
    let y = line::current(tree, block)?.y;
    let position = tree.frame(id)?.style.position;
    tree.frame_mut(id)?.used.static_position = Some(Point::new(x, y));
    ctx.defer_positioned(id, position);
    Ok(())
}

fn place_out_of_flow_children(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    block: FrameId,
) -> Result<()> {
    for c in tree.child_ids(id) {
        let f = tree.frame(c)?;
        if f.is_absolute() {
            record_static_position(tree, ctx, c, block)?;
        } else if f.is_floating() {
            float::place(tree, ctx, c, block)?;
        }
    }
    Ok(())
}

/// Fit every inline box below `block` around its laid-out content, inner
/// boxes first, then apply relative offsets.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if an id is stale.
pub fn fit_bounds(tree: &mut FrameTree, ctx: &LayoutContext<'_>, block: FrameId) -> Result<()> {
    for child in tree.child_ids(block) {
        if tree.frame(child)?.behavior == Behavior::Inline {
            fit_inline(tree, ctx, child)?;
        }
    }
    Ok(())
}

fn fit_inline(tree: &mut FrameTree, ctx: &LayoutContext<'_>, id: FrameId) -> Result<()> {
    for child in tree.child_ids(id) {
        if tree.frame(child)?.behavior == Behavior::Inline {
            fit_inline(tree, ctx, child)?;
        }
    }

    let frame = tree.frame(id)?;
    if frame.position.is_none() {
        return Ok(());
    }
    let style = frame.style.clone();
    let mut used = frame.used.clone();
    if frame.fragment.continues_after {
        used.margin.right = 0.0;
        used.border.right = 0.0;
        used.padding.right = 0.0;
    }

    // STEP 1: Horizontal extent of the content that landed on the line.
    let mut left = f32::INFINITY;
    let mut right = f32::NEG_INFINITY;
    let mut baseline: Option<f32> = None;
    let mut top = f32::INFINITY;
    for child in tree.children(id) {
        let f = tree.frame(child)?;
        if !f.is_in_flow() {
            continue;
        }
        let Some(pos) = f.position else { continue };
        left = left.min(pos.x);
        right = right.max(pos.x + f.margin_width());
        top = top.min(pos.y);
        if baseline.is_none() && f.behavior == Behavior::Text {
            let font = font_name(&f.style, ctx.config);
            let size = f.style.font_size;
            let half_leading = (f.used.line_height - ctx.metrics.font_height(font, size)) / 2.0;
            baseline = Some(pos.y + half_leading + ctx.metrics.font_baseline(font, size));
        }
    }
    if left.is_finite() {
        // STEP 2: The content area hangs from the baseline by the box's own
        // font metrics.
        let font = font_name(&style, ctx.config);
        let content_top = baseline.map_or(top, |b| {
            b - ctx.metrics.font_baseline(font, style.font_size)
        });
        let x = left - used.margin.left - used.border.left - used.padding.left;
        let y = content_top - used.border.top - used.padding.top;
        let width = (right - left).max(0.0);
        let f = tree.frame_mut(id)?;
        f.position = Some(Point::new(x, y));
        f.used.width = width;
        f.used.margin = used.margin;
        f.used.border = used.border;
        f.used.padding = used.padding;
    }

    super::apply_relative_offset(tree, id)
}
