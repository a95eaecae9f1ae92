//! Block containers.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties. Vertical margins between adjacent block-level boxes in a
//! block formatting context collapse."
//!
//! The same behavior lays out floats and inline-blocks (shrink-to-fit) and
//! hands absolutely positioned boxes to [`super::absolute`].

use crate::error::Result;
use crate::geometry::{EdgeSizes, Point};
use crate::line_box::LineBox;
use crate::style::{Clear, CollapsedMargin, PageBreak, Position};
use crate::tree::{Behavior, ContainingBlock, FrameId, FrameTree};

use super::margins::{self, Horizontal};
use super::{Flow, LayoutContext, absolute, align, float, inline, line, list_marker, sizing};

/// Lay out a block container and its children.
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
    if frame.is_absolute() {
        return absolute::reflow(tree, ctx, id);
    }
    let style = frame.style.clone();
    let cb = frame.containing_block;
    let floating = frame.is_floating();
    let inline_block = frame.is_inline_level();
    let in_flow = frame.is_block_level();
    let bfc = margins::establishes_bfc(frame);
    let continues_before = frame.fragment.continues_before;
    let fs = style.font_size;

    let mut border = style.border_widths();
    let mut padding = style.padding_widths(cb.width);
    let (mut margin_top, margin_bottom) = margins::vertical_margins(&style, cb.width);
    if continues_before {
        margin_top = 0.0;
        border.top = 0.0;
        padding.top = 0.0;
    }
    let edges_h = margins::horizontal_edges(border, padding);
    let edges_v = border.vertical() + padding.vertical();

    // STEP 1: Width and horizontal margins.
    let specified = margins::specified_width(&style, cb.width, edges_h);
    let horizontal = if floating || inline_block {
        // [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
        // "If 'margin-left', or 'margin-right' are computed as 'auto', their
        // used value is '0'."
        let margin_left = style.margin_left.to_pt(cb.width, fs).unwrap_or(0.0);
        let margin_right = style.margin_right.to_pt(cb.width, fs).unwrap_or(0.0);
        let width = match specified {
            Some(w) => w,
            None => {
                let (min, max) = sizing::content_min_max(tree, ctx, id)?;
                let available = (cb.width - margin_left - margin_right - edges_h).max(0.0);
                sizing::shrink_to_fit(min, max, available)
            }
        };
        let (min_w, max_w) = margins::width_limits(&style, cb.width, edges_h);
        let width = max_w.map_or(width, |max| width.min(max)).max(min_w);
        Horizontal {
            margin_left,
            width,
            margin_right,
        }
    } else {
        margins::resolve_width_clamped(&style, cb.width, specified, edges_h)
    };

    // STEP 2: Top margin, collapsed with the preceding sibling and the chain
    // of first children where nothing separates them.
    let frame = tree.frame(id)?;
    let absorbed = frame.used.top_absorbed;
    let mut top_margins = CollapsedMargin::new(margin_top);
    if in_flow && !continues_before {
        top_margins = margins::own_top_margins(frame, margin_top);
        let separated = border.top > 0.0 || padding.top > 0.0;
        if !separated && !bfc && !absorbed {
            top_margins = top_margins.merge(margins::collapse_top_chain(
                tree,
                id,
                horizontal.width,
            ));
        }
        margin_top = if absorbed { 0.0 } else { top_margins.resolve() };
    }

    // STEP 3: Clearance.
    // "Clearance is introduced as spacing above the margin-top of an element.
    // It is used to push the element vertically past the float."
    if in_flow
        && style.clear != Clear::None
        && let Some(float_bottom) = ctx.floats.clearance(style.clear)
    {
        let hypothetical = cb.y + margin_top;
        if float_bottom > hypothetical {
            margin_top += float_bottom - hypothetical;
        }
    }

    let specified_height = margins::specified_height(&style, cb.height, edges_v);
    let line_height = super::line_height(ctx, &style);
    {
        let f = tree.frame_mut(id)?;
        f.used.margin = EdgeSizes {
            top: margin_top,
            right: horizontal.margin_right,
            bottom: margin_bottom,
            left: horizontal.margin_left,
        };
        f.used.border = border;
        f.used.padding = padding;
        f.used.width = horizontal.width;
        f.used.height = specified_height.unwrap_or(0.0);
        f.used.line_height = line_height;
        f.used.top_margins = top_margins;
        f.position = Some(Point::new(cb.x, cb.y));
    }

    // STEP 4: Children.
    let relative = style.position == Position::Relative;
    if relative {
        ctx.positioned.push(Vec::new());
    }
    let floats_start = ctx.floats.len();
    if inline_block {
        ctx.unbreakable += 1;
    }
    let flow = layout_children(tree, ctx, id);
    if inline_block {
        ctx.unbreakable -= 1;
    }
    let flow = flow?;

    // STEP 5: Height.
    let content = tree.frame(id)?.rects().content;
    let mut content_bottom = tree
        .frame(id)?
        .lines
        .last()
        .map_or(content.y, LineBox::bottom);
    // "In addition, if the element has any floating descendants whose bottom
    // margin edge is below the element's bottom content edge, then the
    // height is increased to include those edges."
    if bfc
        && specified_height.is_none()
        && let Some(bottom) = ctx.floats.lowest_since(floats_start)
    {
        content_bottom = content_bottom.max(bottom);
    }

    let mut bottom_margins = CollapsedMargin::new(margin_bottom);
    let min_height = style.min_height.to_pt_opt(cb.height, fs).unwrap_or(0.0);
    if in_flow
        && !bfc
        && !flow.is_break()
        && specified_height.is_none()
        && min_height <= 0.0
        && border.bottom <= 0.0
        && padding.bottom <= 0.0
        && let Some(shrink) = collapse_last_child(tree, id, &mut bottom_margins)?
    {
        content_bottom -= shrink;
    }

    let content_height = (content_bottom - content.y).max(0.0);
    let height = margins::clamp_height(
        &style,
        cb.height,
        edges_v,
        specified_height.unwrap_or(content_height),
    );

    let mut used_margin_top = margin_top;
    let mut used_margin_bottom = bottom_margins.resolve();
    // "The top and bottom margins of a box that does not establish a new
    // block formatting context and that has zero computed 'min-height', zero
    // or 'auto' computed 'height', and no in-flow children" are adjoining.
    if in_flow
        && !absorbed
        && !bfc
        && height <= 0.0
        && edges_v <= 0.0
        && min_height <= 0.0
        && has_no_line_content(tree, id)?
    {
        bottom_margins = top_margins.merge(bottom_margins);
        used_margin_top = 0.0;
        used_margin_bottom = bottom_margins.resolve();
    }
    if flow.is_break() {
        used_margin_bottom = 0.0;
        bottom_margins = CollapsedMargin::default();
    }
    {
        let f = tree.frame_mut(id)?;
        f.used.height = height;
        f.used.content_height = content_height;
        f.used.margin.top = used_margin_top;
        f.used.margin.bottom = used_margin_bottom;
        f.used.bottom_margins = bottom_margins;
        f.used.broken = flow.is_break();
    }
    if (used_margin_top - margin_top).abs() > f32::EPSILON {
        // Children were placed below the margin that collapsed through.
        for child in tree.child_ids(id) {
            tree.translate(child, 0.0, used_margin_top - margin_top)?;
        }
    }

    // STEP 6: Relative offset, then the absolutely positioned descendants
    // that wait for this box.
    if in_flow {
        super::apply_relative_offset(tree, id)?;
    }
    if relative {
        let deferred = ctx.positioned.pop().unwrap_or_default();
        let area = tree.frame(id)?.rects().padding;
        absolute::place_all(tree, ctx, &deferred, area)?;
    }

    if inline_block && let Some(block) = block {
        return line::place_atomic(tree, ctx, block, id);
    }
    Ok(flow)
}

/// "The bottom margin of an in-flow block box with a 'height' of 'auto' and
/// a 'min-height' of zero collapses with its last in-flow block-level
/// child's bottom margin if the box has no bottom padding and no bottom
/// border and the child's bottom margin does not collapse with a top margin
/// that has clearance."
///
/// Moves the last child's bottom margin into `bottom_margins`; returns how
/// much the content shrank.
fn collapse_last_child(
    tree: &mut FrameTree,
    id: FrameId,
    bottom_margins: &mut CollapsedMargin,
) -> Result<Option<f32>> {
    let lines = &tree.frame(id)?.lines;
    // The last line is the empty one opened after the last block.
    let Some(last) = lines.iter().rev().find(|l| !l.is_empty()) else {
        return Ok(None);
    };
    if last.inline || last.frames.len() != 1 {
        return Ok(None);
    }
    let child = last.frames[0];
    let f = tree.frame(child)?;
    if !f.is_block_level() {
        return Ok(None);
    }
    let shrink = f.used.margin.bottom;
    *bottom_margins = bottom_margins.merge(f.used.bottom_margins);
    tree.frame_mut(child)?.used.margin.bottom = 0.0;
    Ok(Some(shrink))
}

fn has_no_line_content(tree: &FrameTree, id: FrameId) -> Result<bool> {
    Ok(tree
        .frame(id)?
        .lines
        .iter()
        .all(|l| l.is_empty() || l.h <= 0.0))
}

/// A frame whose `clear` moves it below a float on this page.
fn has_clearance(tree: &FrameTree, ctx: &LayoutContext<'_>, id: FrameId) -> Result<bool> {
    let clear = tree.frame(id)?.style.clear;
    Ok(clear != Clear::None && ctx.floats.clearance(clear).is_some())
}

/// The next sibling of `id` that can hold content.
fn next_content_sibling(tree: &FrameTree, id: FrameId) -> Option<FrameId> {
    let mut next = tree.next_sibling(id);
    while let Some(n) = next {
        let filler = tree.frame(n).is_ok_and(|f| {
            f.behavior == Behavior::Null || f.is_absolute() || f.is_collapsible_whitespace()
        });
        if !filler {
            return Some(n);
        }
        next = tree.next_sibling(n);
    }
    None
}

/// Lay out the children of a block container whose position, width and
/// edges are already set, building its line boxes.
///
/// # Errors
///
/// Structural errors from the tree.
pub fn layout_children(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
) -> Result<Flow> {
    let flow = flow_children(tree, ctx, id)?;
    inline::fit_bounds(tree, ctx, id)?;
    Ok(flow)
}

fn flow_children(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<Flow> {
    let frame = tree.frame(id)?;
    let content = frame.rects().content;
    let style = frame.style.clone();
    let continues_before = frame.fragment.continues_before;
    let cb_height = margins::specified_height(
        &style,
        frame.containing_block.height,
        frame.used.border.vertical() + frame.used.padding.vertical(),
    );
    {
        let indent = if continues_before {
            0.0
        } else {
            style.text_indent.to_pt(content.width, style.font_size)
        };
        let f = tree.frame_mut(id)?;
        f.lines.clear();
        let mut first = LineBox::new(content.y);
        first.indent = indent;
        f.lines.push(first);
    }

    let mut prev_block: Option<FrameId> = None;
    let mut child = tree.first_child(id);
    while let Some(c) = child {
        let y = line::current(tree, id)?.y;
        tree.set_containing_block(
            c,
            ContainingBlock {
                x: content.x,
                y,
                width: content.width,
                height: cb_height,
            },
        )?;
        let f = tree.frame(c)?;
        if f.behavior == Behavior::Null {
            let _ = super::reflow(tree, ctx, c, Some(id))?;
        } else if f.is_absolute() {
            inline::record_static_position(tree, ctx, c, id)?;
        } else if f.is_floating() {
            float::place(tree, ctx, c, id)?;
        } else if f.behavior == Behavior::ListMarker && !f.is_inline_level() {
            let _ = list_marker::reflow(tree, ctx, c, Some(id))?;
        } else if f.is_inline_level() {
            if let Flow::Break(at) = super::reflow(tree, ctx, c, Some(id))? {
                line::truncate_at(tree, id, at)?;
                return Ok(Flow::Break(at));
            }
            if !line::current(tree, id)?.is_empty() {
                prev_block = None;
            }
        } else {
            if let Flow::Break(at) = line::close_inline_line(tree, ctx, id)? {
                line::truncate_at(tree, id, at)?;
                return Ok(Flow::Break(at));
            }
            if let Flow::Break(at) = flow_block_child(tree, ctx, id, c, prev_block)? {
                return Ok(Flow::Break(at));
            }
            prev_block = Some(c);

            // [§ 13.3.1](https://www.w3.org/TR/CSS2/page.html#page-break-props)
            // "always: Always force a page break after the generated box."
            if tree.frame(c)?.style.page_break_after == PageBreak::Always
                && let Some(next) = next_content_sibling(tree, c)
                && let Flow::Break(at) = super::break_before(tree, ctx, next)
            {
                return Ok(Flow::Break(at));
            }
        }
        child = tree.next_sibling(c);
    }

    // The last line is aligned but no new line opens below it.
    let current = line::current(tree, id)?;
    if !current.is_empty() && current.inline {
        align::finish_line(tree, ctx, id, true)?;
        if let Flow::Break(at) = line::check_line(tree, ctx, id)? {
            line::truncate_at(tree, id, at)?;
            return Ok(Flow::Break(at));
        }
    }
    Ok(Flow::Complete)
}

/// Lay out one block-level child of `id`, collapsing its top margin with
/// the bottom margin of `prev`, and check it against the page.
fn flow_block_child(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    child: FrameId,
    prev: Option<FrameId>,
) -> Result<Flow> {
    // "bottom margin of box and top margin of its next in-flow following
    // sibling" are adjoining.
    if let Some(prev) = prev
        && !has_clearance(tree, ctx, child)?
    {
        let (prev_margins, prev_bottom) = {
            let p = tree.frame(prev)?;
            (p.used.bottom_margins, p.used.margin.bottom)
        };
        tree.frame_mut(prev)?.used.margin.bottom = 0.0;
        let lines = &mut tree.frame_mut(id)?.lines;
        let n = lines.len();
        if n >= 2 {
            lines[n - 2].h -= prev_bottom;
            let bottom = lines[n - 2].bottom();
            lines[n - 1].move_to(bottom);
        }
        let y = line::current(tree, id)?.y;
        let c = tree.frame_mut(child)?;
        c.containing_block.y = y;
        c.used.top_margins = prev_margins;
        c.used.top_resolved = true;
    }

    let first_on_page = !ctx.has_content;
    let flow = super::reflow(tree, ctx, child, Some(id))?;
    let flow = super::avoid_break_inside(tree, ctx, child, flow, first_on_page)?;
    match flow {
        Flow::Break(at) if at == child || tree.is_descendant_of(child, at) => Ok(flow),
        Flow::Break(_) => {
            line::add_block_line(tree, id, child)?;
            Ok(flow)
        }
        Flow::Complete => {
            line::add_block_line(tree, id, child)?;
            let check = super::check_page_full(tree, ctx, child, first_on_page)?;
            if let Flow::Break(at) = check {
                line::truncate_at(tree, id, at)?;
                return Ok(check);
            }
            if tree.frame(child)?.margin_height() > 0.0 {
                ctx.has_content = true;
            }
            Ok(Flow::Complete)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::font::ApproximateFontMetrics;
    use crate::style::{Length, LengthOrAuto, SpecifiedStyle};
    use quire_common::Diagnostics;

    fn cb(width: f32) -> ContainingBlock {
        ContainingBlock {
            x: 0.0,
            y: 0.0,
            width,
            height: None,
        }
    }

    #[test]
    fn test_auto_height_is_sum_of_children() {
        let metrics = ApproximateFontMetrics;
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        let mut tree = FrameTree::new();

        let outer = tree.create_element("div", SpecifiedStyle::block());
        for h in [30.0, 50.0] {
            let mut s = SpecifiedStyle::block();
            s.height = LengthOrAuto::pt(h);
            let child = tree.create_element("div", s);
            tree.append_child(outer, child).unwrap();
        }
        tree.set_containing_block(outer, cb(400.0)).unwrap();
        assert_eq!(reflow(&mut tree, &mut ctx, outer, None).unwrap(), Flow::Complete);
        let f = tree.frame(outer).unwrap();
        assert!((f.used.height - 80.0).abs() < 0.01);
        assert!((f.used.width - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_padding_blocks_parent_child_collapse() {
        let metrics = ApproximateFontMetrics;
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        let mut tree = FrameTree::new();

        let mut outer_style = SpecifiedStyle::block();
        outer_style.padding_top = Length::pt(1.0);
        let outer = tree.create_element("div", outer_style);
        let mut inner_style = SpecifiedStyle::block();
        inner_style.margin_top = LengthOrAuto::pt(20.0);
        inner_style.height = LengthOrAuto::pt(10.0);
        let inner = tree.create_element("div", inner_style);
        tree.append_child(outer, inner).unwrap();
        tree.set_containing_block(outer, cb(400.0)).unwrap();

        let _ = reflow(&mut tree, &mut ctx, outer, None).unwrap();
        let outer_f = tree.frame(outer).unwrap();
        assert!(outer_f.used.margin.top.abs() < 0.01);
        // 1 padding + 20 margin + 10 content
        assert!((outer_f.used.height - 30.0).abs() < 0.01);
        let inner_border = tree.frame(inner).unwrap().rects().border;
        assert!((inner_border.y - 21.0).abs() < 0.01);
    }

    #[test]
    fn test_float_shrinks_to_content() {
        let metrics = ApproximateFontMetrics;
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        let mut tree = FrameTree::new();

        let mut float_style = SpecifiedStyle::block();
        float_style.float = crate::style::Float::Left;
        let float = tree.create_element("div", float_style.clone());
        let text = tree.create_text(
            "abcd",
            std::rc::Rc::new(SpecifiedStyle::inherit(&float_style, crate::style::Display::Inline)),
        );
        tree.append_child(float, text).unwrap();
        tree.set_containing_block(float, cb(400.0)).unwrap();

        let _ = reflow(&mut tree, &mut ctx, float, None).unwrap();
        assert!((tree.frame(float).unwrap().used.width - 24.0).abs() < 0.01);
    }
}
