//! Absolutely positioned boxes.
//!
//! [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
//!
//! "In the absolute positioning model, a box is explicitly offset with
//! respect to its containing block. It is removed from the normal flow
//! entirely (it has no impact on later siblings)."
//!
//! Such boxes are queued while the flow runs and placed once the box that
//! contains them has its final geometry: the padding box of the nearest
//! positioned ancestor, or the page area.

use crate::error::Result;
use crate::geometry::{EdgeSizes, Point, Rect};
use crate::style::{LengthOrAuto, SpecifiedStyle};
use crate::tree::{Behavior, ContainingBlock, FrameId, FrameTree};

use super::{Flow, LayoutContext, block, margins, sizing};

/// Place every queued frame against `area`.
///
/// # Errors
///
/// Structural errors from the frames' subtrees.
pub fn place_all(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    frames: &[FrameId],
    area: Rect,
) -> Result<()> {
    for &id in frames {
        if !tree.is_live(id) {
            continue;
        }
        tree.set_containing_block(
            id,
            ContainingBlock {
                x: area.x,
                y: area.y,
                width: area.width,
                height: Some(area.height),
            },
        )?;
        ctx.unbreakable += 1;
        let flow = super::reflow(tree, ctx, id, None);
        ctx.unbreakable -= 1;
        let _: Flow = flow?;
    }
    Ok(())
}

/// The offsets and size on one axis, each `None` when `auto`.
struct Axis {
    start: Option<f32>,
    size: Option<f32>,
    end: Option<f32>,
    margin_start: Option<f32>,
    margin_end: Option<f32>,
}

/// Used start offset, size and margins on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Solved {
    start: f32,
    size: f32,
    margin_start: f32,
    margin_end: f32,
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
///
/// "The constraint that determines the used values for these elements is:
///
///   'left' + 'margin-left' + 'border-left-width' + 'padding-left' + 'width'
///   + 'padding-right' + 'border-right-width' + 'margin-right' + 'right' =
///   width of containing block"
///
/// The vertical axis in § 10.6.4 has the same shape, so both go through
/// here. `static_start` is the offset the box would have had in the flow;
/// `content` yields the content-based size given the space available to it.
fn solve(
    axis: &Axis,
    extent: f32,
    edges: f32,
    static_start: f32,
    content: &mut dyn FnMut(f32) -> Result<f32>,
) -> Result<Solved> {
    // "If all three of 'left', 'width', and 'right' are 'auto': First set any
    // 'auto' values for 'margin-left' and 'margin-right' to 0. Then ... set
    // 'left' to the static position."
    if axis.start.is_none() && axis.size.is_none() && axis.end.is_none() {
        let ms = axis.margin_start.unwrap_or(0.0);
        let me = axis.margin_end.unwrap_or(0.0);
        let size = content(extent - static_start - ms - me - edges)?;
        return Ok(Solved {
            start: static_start,
            size,
            margin_start: ms,
            margin_end: me,
        });
    }

    // "If none of the three is 'auto': If both 'margin-left' and
    // 'margin-right' are 'auto', solve the equation under the extra
    // constraint that the two margins get equal values."
    if let (Some(start), Some(size), Some(end)) = (axis.start, axis.size, axis.end) {
        let remaining = extent - start - size - end - edges;
        let (ms, me) = match (axis.margin_start, axis.margin_end) {
            (None, None) if remaining >= 0.0 => (remaining / 2.0, remaining / 2.0),
            (None, None) => (0.0, remaining),
            (None, Some(me)) => (remaining - me, me),
            (Some(ms), None) => (ms, remaining - ms),
            // Over-constrained: the end offset is ignored.
            (Some(ms), Some(me)) => (ms, me),
        };
        return Ok(Solved {
            start,
            size,
            margin_start: ms,
            margin_end: me,
        });
    }

    // "Otherwise, set 'auto' values for 'margin-left' and 'margin-right' to 0,
    // and pick the one of the following six rules that applies."
    let ms = axis.margin_start.unwrap_or(0.0);
    let me = axis.margin_end.unwrap_or(0.0);
    let fixed = ms + me + edges;
    let solved = match (axis.start, axis.size, axis.end) {
        // RULE 1: "'left' and 'width' are 'auto' and 'right' is not 'auto',
        // then the width is shrink-to-fit. Then solve for 'left'."
        (None, None, Some(end)) => {
            let size = content(extent - end - fixed)?;
            (extent - end - fixed - size, size)
        }
        // RULE 2: "'left' and 'right' are 'auto' and 'width' is not 'auto',
        // then ... set 'left' to the static position."
        (None, Some(size), None) => (static_start, size),
        // RULE 3: "'width' and 'right' are 'auto' and 'left' is not 'auto',
        // then the width is shrink-to-fit."
        (Some(start), None, None) => (start, content(extent - start - fixed)?),
        // RULE 4: "'left' is 'auto', 'width' and 'right' are not 'auto', then
        // solve for 'left'"
        (None, Some(size), Some(end)) => (extent - end - fixed - size, size),
        // RULE 5: "'width' is 'auto', 'left' and 'right' are not 'auto', then
        // solve for 'width'"
        (Some(start), None, Some(end)) => (start, (extent - start - end - fixed).max(0.0)),
        // RULE 6: "'right' is 'auto', 'left' and 'width' are not 'auto', then
        // solve for 'right'"
        (Some(start), Some(size), _) => (start, size),
        (None, None, None) => (static_start, content(extent - static_start - fixed)?),
    };
    Ok(Solved {
        start: solved.0,
        size: solved.1,
        margin_start: ms,
        margin_end: me,
    })
}

fn offset(value: LengthOrAuto, reference: Option<f32>, style: &SpecifiedStyle) -> Option<f32> {
    value.to_pt_opt(reference, style.font_size)
}

/// Lay out an absolutely positioned frame inside its containing block.
///
/// # Errors
///
/// Structural errors from the subtree.
pub fn reflow(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<Flow> {
    let frame = tree.frame(id)?;
    let style = frame.style.clone();
    let cb = frame.containing_block;
    let cb_height = cb.height.unwrap_or(0.0);
    let static_position = frame
        .used
        .static_position
        .unwrap_or(Point::new(cb.x, cb.y));
    let replaced = frame.behavior == Behavior::Image;

    let border = style.border_widths();
    let padding = style.padding_widths(cb.width);
    let edges_h = margins::horizontal_edges(border, padding);
    let edges_v = border.vertical() + padding.vertical();
    let fs = style.font_size;

    // STEP 1: Horizontal.
    let intrinsic = if replaced {
        Some(super::image::used_size(tree, id)?)
    } else {
        None
    };
    let horizontal = Axis {
        start: offset(style.left, Some(cb.width), &style),
        size: intrinsic
            .map(|(w, _)| w)
            .or_else(|| margins::specified_width(&style, cb.width, edges_h)),
        end: offset(style.right, Some(cb.width), &style),
        margin_start: style.margin_left.to_pt(cb.width, fs),
        margin_end: style.margin_right.to_pt(cb.width, fs),
    };
    let (min_w, max_w) = margins::width_limits(&style, cb.width, edges_h);
    let mut shrink = |available: f32| -> Result<f32> {
        let (min, max) = sizing::content_min_max(tree, ctx, id)?;
        Ok(sizing::shrink_to_fit(min, max, available.max(0.0)))
    };
    let mut h = solve(
        &horizontal,
        cb.width,
        edges_h,
        static_position.x - cb.x,
        &mut shrink,
    )?;
    let clamped = max_w.map_or(h.size, |max| h.size.min(max)).max(min_w);
    if (clamped - h.size).abs() > f32::EPSILON {
        // "the rules above are applied again", with the clamped width.
        let again = Axis {
            size: Some(clamped),
            ..horizontal
        };
        h = solve(&again, cb.width, edges_h, static_position.x - cb.x, &mut |_| {
            Ok(clamped)
        })?;
    }

    // STEP 2: Lay out the content at a provisional top so the auto height
    // is known.
    let top = offset(style.top, cb.height, &style);
    let bottom = offset(style.bottom, cb.height, &style);
    let margin_top = style.margin_top.to_pt(cb.width, fs);
    let margin_bottom = style.margin_bottom.to_pt(cb.width, fs);
    let specified_height = intrinsic
        .map(|(_, hgt)| hgt)
        .or_else(|| margins::specified_height(&style, cb.height, edges_v));
    let provisional_top = top.unwrap_or(static_position.y - cb.y);
    {
        let f = tree.frame_mut(id)?;
        f.used.margin = EdgeSizes {
            top: margin_top.unwrap_or(0.0),
            right: h.margin_end,
            bottom: margin_bottom.unwrap_or(0.0),
            left: h.margin_start,
        };
        f.used.border = border;
        f.used.padding = padding;
        f.used.width = h.size;
        f.used.height = specified_height.unwrap_or(0.0);
        f.used.line_height = super::line_height(ctx, &style);
        f.position = Some(Point::new(cb.x + h.start, cb.y + provisional_top));
    }

    ctx.positioned.push(Vec::new());
    let floats_start = ctx.floats.len();
    let content_height = if replaced {
        specified_height.unwrap_or(0.0)
    } else {
        let _: Flow = block::layout_children(tree, ctx, id)?;
        let frame = tree.frame(id)?;
        let content = frame.rects().content;
        let mut bottom_edge = frame.lines.last().map_or(content.y, |l| l.bottom());
        if let Some(float_bottom) = ctx.floats.lowest_since(floats_start) {
            bottom_edge = bottom_edge.max(float_bottom);
        }
        (bottom_edge - content.y).max(0.0)
    };

    // STEP 3: Vertical, § 10.6.4.
    let vertical = Axis {
        start: top,
        size: specified_height,
        end: bottom,
        margin_start: margin_top,
        margin_end: margin_bottom,
    };
    let v = solve(
        &vertical,
        cb_height,
        edges_v,
        static_position.y - cb.y,
        &mut |_| Ok(content_height),
    )?;
    let height = margins::clamp_height(&style, cb.height, edges_v, v.size);
    {
        let f = tree.frame_mut(id)?;
        f.used.height = height;
        f.used.content_height = content_height;
        f.used.margin.top = v.margin_start;
        f.used.margin.bottom = v.margin_end;
    }
    // Content was laid out below the provisional margin and top.
    let dy = (v.start + v.margin_start) - (provisional_top + margin_top.unwrap_or(0.0));
    let pos = tree.frame(id)?.position.unwrap_or_default();
    tree.translate(id, 0.0, dy)?;
    tree.frame_mut(id)?.position = Some(Point::new(pos.x, cb.y + v.start));

    // STEP 4: Nested absolutely positioned boxes use this padding box.
    let deferred = ctx.positioned.pop().unwrap_or_default();
    let area = tree.frame(id)?.rects().padding;
    place_all(tree, ctx, &deferred, area)?;
    tracing::trace!(frame = %id, border_box = ?tree.frame(id)?.rects().border, "placed absolute box");
    Ok(Flow::Complete)
}
