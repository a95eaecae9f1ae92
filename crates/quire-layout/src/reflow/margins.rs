//! Horizontal and vertical box-model resolution shared by the block-level
//! behaviors.
//!
//! [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
//!
//! [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)

use crate::geometry::EdgeSizes;
use crate::style::{BoxSizing, Clear, CollapsedMargin, Display, Overflow, SpecifiedStyle};
use crate::tree::{Behavior, Frame, FrameId, FrameTree};

/// Resolved horizontal margins and content width.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Horizontal {
    /// Used `margin-left`.
    pub margin_left: f32,
    /// Used content width.
    pub width: f32,
    /// Used `margin-right`.
    pub margin_right: f32,
}

/// Border and padding on the horizontal axis.
#[must_use]
pub fn horizontal_edges(border: EdgeSizes, padding: EdgeSizes) -> f32 {
    border.horizontal() + padding.horizontal()
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "The following constraints must hold among the used values of the other
/// properties:
///
///   'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
///   'padding-right' + 'border-right-width' + 'margin-right'
///   = width of containing block"
///
/// `width` is the content width to use, or `None` for `auto`; `edges` is
/// the horizontal border plus padding.
#[must_use]
pub fn resolve_width(
    style: &SpecifiedStyle,
    cb_width: f32,
    width: Option<f32>,
    edges: f32,
) -> Horizontal {
    let fs = style.font_size;
    let mut margin_left = style.margin_left.to_pt(cb_width, fs);
    let mut margin_right = style.margin_right.to_pt(cb_width, fs);

    // STEP 1: Over-constrained boxes treat auto margins as zero.
    // "If 'width' is not 'auto' and 'border-left-width' + 'padding-left' +
    // 'width' + 'padding-right' + 'border-right-width' (plus any of
    // 'margin-left' or 'margin-right' that are not 'auto') is larger than
    // the width of the containing block, then any 'auto' values for
    // 'margin-left' or 'margin-right' are, for the following rules, treated
    // as zero."
    if let Some(w) = width {
        let total = w + edges + margin_left.unwrap_or(0.0) + margin_right.unwrap_or(0.0);
        if total > cb_width {
            margin_left = Some(margin_left.unwrap_or(0.0));
            margin_right = Some(margin_right.unwrap_or(0.0));
        }
    }

    match (width, margin_left, margin_right) {
        // RULE A: "If 'width' is set to 'auto', any other 'auto' values become
        // '0' and 'width' follows from the resulting equality."
        (None, ml, mr) => {
            let ml = ml.unwrap_or(0.0);
            let mr = mr.unwrap_or(0.0);
            let w = cb_width - ml - mr - edges;
            if w >= 0.0 {
                Horizontal {
                    margin_left: ml,
                    width: w,
                    margin_right: mr,
                }
            } else {
                Horizontal {
                    margin_left: ml,
                    width: 0.0,
                    margin_right: cb_width - ml - edges,
                }
            }
        }
        // RULE B: "If both 'margin-left' and 'margin-right' are 'auto', their
        // used values are equal."
        (Some(w), None, None) => {
            let remaining = (cb_width - w - edges) / 2.0;
            Horizontal {
                margin_left: remaining,
                width: w,
                margin_right: remaining,
            }
        }
        // RULE C: "If there is exactly one value specified as 'auto', its used
        // value follows from the equality."
        (Some(w), None, Some(mr)) => Horizontal {
            margin_left: cb_width - w - edges - mr,
            width: w,
            margin_right: mr,
        },
        // RULE D: over-constrained; "the specified value of 'margin-right' is
        // ignored and the value is calculated so as to make the equality true."
        (Some(w), Some(ml), _) => Horizontal {
            margin_left: ml,
            width: w,
            margin_right: cb_width - w - edges - ml,
        },
    }
}

/// Specified content width, honoring `box-sizing`. `None` for `auto`.
#[must_use]
pub fn specified_width(style: &SpecifiedStyle, cb_width: f32, edges: f32) -> Option<f32> {
    let w = style.width.to_pt(cb_width, style.font_size)?;
    Some(content_size(style, w, edges))
}

/// Specified content height, honoring `box-sizing`. `None` for `auto` or a
/// percentage of an indefinite height.
#[must_use]
pub fn specified_height(style: &SpecifiedStyle, cb_height: Option<f32>, edges: f32) -> Option<f32> {
    let h = style.height.to_pt_opt(cb_height, style.font_size)?;
    Some(content_size(style, h, edges))
}

fn content_size(style: &SpecifiedStyle, size: f32, edges: f32) -> f32 {
    match style.box_sizing {
        BoxSizing::ContentBox => size.max(0.0),
        BoxSizing::BorderBox => (size - edges).max(0.0),
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// Content-box `min-width` and `max-width`.
#[must_use]
pub fn width_limits(style: &SpecifiedStyle, cb_width: f32, edges: f32) -> (f32, Option<f32>) {
    let fs = style.font_size;
    let min = content_size(style, style.min_width.to_pt(cb_width, fs), edges);
    let max = style
        .max_width
        .map(|m| content_size(style, m.to_pt(cb_width, fs), edges));
    (min, max)
}

/// [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
///
/// "1. The tentative used height is calculated ... 2. If this tentative
/// height is greater than 'max-height', the rules above are applied again
/// ... 3. If the resulting height is smaller than 'min-height', the rules
/// above are applied again." Percentages of an indefinite height are
/// ignored.
#[must_use]
pub fn clamp_height(style: &SpecifiedStyle, cb_height: Option<f32>, edges: f32, height: f32) -> f32 {
    let fs = style.font_size;
    let mut h = height;
    if let Some(max) = style
        .max_height
        .and_then(|m| m.to_pt_opt(cb_height, fs))
        .map(|m| content_size(style, m, edges))
    {
        h = h.min(max);
    }
    if let Some(min) = style
        .min_height
        .to_pt_opt(cb_height, fs)
        .map(|m| content_size(style, m, edges))
    {
        h = h.max(min);
    }
    h
}

/// Resolve the horizontal box with `min-width`/`max-width` applied.
///
/// "If the tentative used width is greater than 'max-width', the rules above
/// are applied again, but this time using the computed value of 'max-width'
/// as the computed value for 'width'. If the resulting width is smaller than
/// 'min-width', the rules above are applied again, but this time using the
/// value of 'min-width' as the computed value for 'width'."
#[must_use]
pub fn resolve_width_clamped(
    style: &SpecifiedStyle,
    cb_width: f32,
    width: Option<f32>,
    edges: f32,
) -> Horizontal {
    let (min, max) = width_limits(style, cb_width, edges);
    let mut h = resolve_width(style, cb_width, width, edges);
    if let Some(max) = max
        && h.width > max
    {
        h = resolve_width(style, cb_width, Some(max), edges);
    }
    if h.width < min {
        h = resolve_width(style, cb_width, Some(min), edges);
    }
    h
}

/// Vertical margins; `auto` is zero for block-level boxes in normal flow.
///
/// "Note that percentages on vertical margins refer to the width of the
/// containing block."
#[must_use]
pub fn vertical_margins(style: &SpecifiedStyle, cb_width: f32) -> (f32, f32) {
    let fs = style.font_size;
    (
        style.margin_top.to_pt(cb_width, fs).unwrap_or(0.0),
        style.margin_bottom.to_pt(cb_width, fs).unwrap_or(0.0),
    )
}

/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "Floats, absolutely positioned elements, block containers (such as
/// inline-blocks, table-cells, and table-captions) that are not block boxes,
/// and block boxes with 'overflow' other than 'visible' (except when that
/// value has been propagated to the viewport) establish new block formatting
/// contexts for their contents."
#[must_use]
pub fn establishes_bfc(frame: &Frame) -> bool {
    frame.is_floating()
        || frame.is_absolute()
        || frame.style.display == Display::InlineBlock
        || frame.behavior == Behavior::TableCell
        || frame.style.overflow != Overflow::Visible
}

/// Top border or padding separates the box's margin from its first child's.
#[must_use]
pub fn top_separated(frame: &Frame) -> bool {
    frame.used.border.top > 0.0 || frame.used.padding.top > 0.0
}

/// Bottom border or padding separates the box's margin from its last child's.
#[must_use]
pub fn bottom_separated(frame: &Frame) -> bool {
    frame.used.border.bottom > 0.0 || frame.used.padding.bottom > 0.0
}

/// Children skipped when looking for the first or last in-flow child.
fn skipped(frame: &Frame) -> bool {
    frame.behavior == Behavior::Null
        || frame.is_absolute()
        || frame.is_floating()
        || frame.is_collapsible_whitespace()
        || (frame.behavior == Behavior::ListMarker && !frame.is_inline_level())
}

/// The first in-flow child of `id`, if it is block-level.
#[must_use]
pub fn first_block_child(tree: &FrameTree, id: FrameId) -> Option<FrameId> {
    let child = tree
        .children(id)
        .find(|c| tree.frame(*c).is_ok_and(|f| !skipped(f)))?;
    tree.frame(child)
        .is_ok_and(Frame::is_block_level)
        .then_some(child)
}

/// "The top margin of an in-flow block element collapses with its first
/// in-flow block-level child's top margin if the element has no top border,
/// no top padding, and the child has no clearance."
///
/// Collects the top margins of the chain of first children below `id` that
/// collapse into it, marking each as absorbed. `cb_width` is the content
/// width of `id`, against which the first child's percentages resolve.
pub fn collapse_top_chain(tree: &mut FrameTree, id: FrameId, cb_width: f32) -> CollapsedMargin {
    let mut margins = CollapsedMargin::default();
    let mut parent = id;
    let mut width = cb_width;
    loop {
        let Some(child) = first_block_child(tree, parent) else {
            break;
        };
        let Ok(frame) = tree.frame(child) else { break };
        if frame.style.clear != Clear::None
            || !matches!(frame.behavior, Behavior::Block | Behavior::Table)
        {
            break;
        }
        let style = &frame.style;
        let (top, _) = vertical_margins(style, width);
        margins = margins.adjoin(top);
        let separated = style.border_top.used_width() > 0.0
            || style.padding_top.to_pt(width, style.font_size) > 0.0
            || establishes_bfc(frame)
            || frame.behavior == Behavior::Table;
        let child_width = style
            .width
            .to_pt(width, style.font_size)
            .unwrap_or(width);
        if let Ok(f) = tree.frame_mut(child) {
            f.used.top_absorbed = true;
        }
        if separated {
            break;
        }
        parent = child;
        width = child_width;
    }
    margins
}

/// The frame's own top margin set: nothing if it collapsed into its parent,
/// otherwise its margin merged with any sibling margin preset by the parent.
#[must_use]
pub fn own_top_margins(frame: &Frame, margin_top: f32) -> CollapsedMargin {
    if frame.used.top_absorbed {
        return CollapsedMargin::default();
    }
    let own = CollapsedMargin::new(margin_top);
    if frame.used.top_resolved {
        own.merge(frame.used.top_margins)
    } else {
        own
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::LengthOrAuto;

    fn style(width: LengthOrAuto, left: LengthOrAuto, right: LengthOrAuto) -> SpecifiedStyle {
        let mut s = SpecifiedStyle::block();
        s.width = width;
        s.margin_left = left;
        s.margin_right = right;
        s
    }

    #[test]
    fn test_auto_margins_center() {
        let s = style(LengthOrAuto::pt(200.0), LengthOrAuto::Auto, LengthOrAuto::Auto);
        let h = resolve_width(&s, 600.0, Some(200.0), 0.0);
        assert!((h.margin_left - 200.0).abs() < 0.01);
        assert!((h.margin_right - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_over_constrained_absorbs_into_right_margin() {
        let s = style(LengthOrAuto::pt(300.0), LengthOrAuto::pt(50.0), LengthOrAuto::pt(50.0));
        let h = resolve_width(&s, 600.0, Some(300.0), 20.0);
        assert!((h.margin_left - 50.0).abs() < 0.01);
        assert!((h.margin_right - 230.0).abs() < 0.01);
        let total = h.margin_left + h.width + h.margin_right + 20.0;
        assert!((total - 600.0).abs() < 0.01);
    }

    #[test]
    fn test_auto_width_fills_and_auto_margins_become_zero() {
        let s = style(LengthOrAuto::Auto, LengthOrAuto::Auto, LengthOrAuto::pt(10.0));
        let h = resolve_width(&s, 600.0, None, 30.0);
        assert!(h.margin_left.abs() < 0.01);
        assert!((h.width - 560.0).abs() < 0.01);
    }

    #[test]
    fn test_too_wide_box_treats_auto_margins_as_zero() {
        let s = style(LengthOrAuto::pt(700.0), LengthOrAuto::Auto, LengthOrAuto::Auto);
        let h = resolve_width(&s, 600.0, Some(700.0), 0.0);
        assert!(h.margin_left.abs() < 0.01);
        assert!((h.margin_right + 100.0).abs() < 0.01);
    }

    #[test]
    fn test_max_then_min_width() {
        let mut s = style(LengthOrAuto::Auto, LengthOrAuto::pt(0.0), LengthOrAuto::pt(0.0));
        s.max_width = Some(crate::style::Length::pt(100.0));
        let h = resolve_width_clamped(&s, 600.0, None, 0.0);
        assert!((h.width - 100.0).abs() < 0.01);
        assert!((h.margin_right - 500.0).abs() < 0.01);
        s.min_width = crate::style::Length::pt(150.0);
        let h = resolve_width_clamped(&s, 600.0, None, 0.0);
        assert!((h.width - 150.0).abs() < 0.01);
    }

    #[test]
    fn test_border_box_sizing_subtracts_edges() {
        let mut s = SpecifiedStyle::block();
        s.width = LengthOrAuto::pt(100.0);
        s.box_sizing = BoxSizing::BorderBox;
        assert_eq!(specified_width(&s, 500.0, 30.0), Some(70.0));
    }
}
