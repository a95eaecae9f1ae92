//! Replaced images.
//!
//! [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
//!
//! "If 'height' and 'width' both have computed values of 'auto' and the
//! element also has an intrinsic width, then that intrinsic width is the
//! used value of 'width'."

use crate::error::Result;
use crate::geometry::{EdgeSizes, Point};
use crate::style::CollapsedMargin;
use crate::tree::{FrameId, FrameKind, FrameTree};

use super::{Flow, LayoutContext, line, margins};

/// Used content width and height of an image.
///
/// A missing dimension follows from the other one and the intrinsic ratio.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn used_size(tree: &FrameTree, id: FrameId) -> Result<(f32, f32)> {
    let frame = tree.frame(id)?;
    let (iw, ih) = match frame.kind {
        FrameKind::Image { width, height, .. } => (width.max(0.0), height.max(0.0)),
        _ => (0.0, 0.0),
    };
    let style = &frame.style;
    let cb = frame.containing_block;
    let border = style.border_widths();
    let padding = style.padding_widths(cb.width);
    let edges_h = margins::horizontal_edges(border, padding);
    let edges_v = border.vertical() + padding.vertical();

    let width = margins::specified_width(style, cb.width, edges_h);
    let height = margins::specified_height(style, cb.height, edges_v);
    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        // "Otherwise, if 'width' has a computed value of 'auto', and the
        // element has an intrinsic ratio then the used value of 'width' is:
        // (used height) * (intrinsic ratio)"
        (Some(w), None) if iw > 0.0 => (w, w * ih / iw),
        (None, Some(h)) if ih > 0.0 => (h * iw / ih, h),
        (Some(w), None) => (w, ih),
        (None, Some(h)) => (iw, h),
        (None, None) => (iw, ih),
    };

    let (min_w, max_w) = margins::width_limits(style, cb.width, edges_h);
    let mut w = w.max(min_w);
    if let Some(max) = max_w {
        w = w.min(max).max(min_w);
    }
    let h = margins::clamp_height(style, cb.height, edges_v, h);
    Ok((w.max(0.0), h.max(0.0)))
}

/// Lay out an image: inline images join the line of `block`, block-level
/// ones sit at the top of their containing block.
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
    if tree.frame(id)?.is_absolute() {
        return super::absolute::reflow(tree, ctx, id);
    }
    let (width, height) = used_size(tree, id)?;
    let frame = tree.frame(id)?;
    let style = frame.style.clone();
    let cb = frame.containing_block;
    let inline = frame.is_inline_level();
    let block_level = frame.is_block_level();
    let fs = style.font_size;

    let border = style.border_widths();
    let padding = style.padding_widths(cb.width);
    let edges = margins::horizontal_edges(border, padding);
    let (margin_left, margin_right) = if block_level {
        let h = margins::resolve_width(&style, cb.width, Some(width), edges);
        (h.margin_left, h.margin_right)
    } else {
        (
            style.margin_left.to_pt(cb.width, fs).unwrap_or(0.0),
            style.margin_right.to_pt(cb.width, fs).unwrap_or(0.0),
        )
    };
    let (margin_top, margin_bottom) = margins::vertical_margins(&style, cb.width);
    let margin_top = if block_level {
        margins::own_top_margins(frame, margin_top).resolve()
    } else {
        margin_top
    };

    let line_height = super::line_height(ctx, &style);
    {
        let f = tree.frame_mut(id)?;
        f.used.margin = EdgeSizes {
            top: margin_top,
            right: margin_right,
            bottom: margin_bottom,
            left: margin_left,
        };
        f.used.border = border;
        f.used.padding = padding;
        f.used.width = width;
        f.used.height = height;
        f.used.content_height = height;
        f.used.line_height = line_height;
        f.used.bottom_margins = CollapsedMargin::new(margin_bottom);
    }

    if inline && let Some(block) = block {
        tree.frame_mut(id)?.position = None;
        return line::place_atomic(tree, ctx, block, id);
    }
    tree.frame_mut(id)?.position = Some(Point::new(cb.x, cb.y));
    if block_level {
        super::apply_relative_offset(tree, id)?;
    }
    Ok(Flow::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::font::ApproximateFontMetrics;
    use crate::style::{Display, LengthOrAuto, SpecifiedStyle};
    use crate::tree::ContainingBlock;
    use quire_common::Diagnostics;
    use std::rc::Rc;

    fn image(tree: &mut FrameTree, style: SpecifiedStyle) -> FrameId {
        let id = tree.create(
            FrameKind::Image {
                src: "logo.png".to_string(),
                width: 200.0,
                height: 100.0,
            },
            Rc::new(style),
        );
        tree.set_containing_block(
            id,
            ContainingBlock {
                x: 0.0,
                y: 0.0,
                width: 400.0,
                height: None,
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn test_intrinsic_ratio_fills_missing_height() {
        let mut tree = FrameTree::new();

        let natural = image(&mut tree, SpecifiedStyle::with_display(Display::Inline));
        assert_eq!(used_size(&tree, natural).unwrap(), (200.0, 100.0));

        let mut half = SpecifiedStyle::with_display(Display::Inline);
        half.width = LengthOrAuto::percent(25.0);
        let half = image(&mut tree, half);
        assert_eq!(used_size(&tree, half).unwrap(), (100.0, 50.0));
    }

    #[test]
    fn test_block_image_centers_with_auto_margins() {
        let metrics = ApproximateFontMetrics;
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        let mut tree = FrameTree::new();

        let mut style = SpecifiedStyle::block();
        style.margin_left = LengthOrAuto::Auto;
        style.margin_right = LengthOrAuto::Auto;
        let id = image(&mut tree, style);
        assert_eq!(reflow(&mut tree, &mut ctx, id, None).unwrap(), Flow::Complete);
        let margin = tree.frame(id).unwrap().used.margin;
        assert!((margin.left - 100.0).abs() < 0.01);
        assert!((margin.right - 100.0).abs() < 0.01);
    }
}
