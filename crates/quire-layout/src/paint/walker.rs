//! The paint walker.
//!
//! [§ 9.9 Layered presentation](https://www.w3.org/TR/CSS2/visuren.html#layers)
//!
//! "An element in CSS 2 may have a stack level, which describes its position
//! within a set of elements sharing the same stacking context."
//!
//! Each frame paints itself, then its children grouped into stack buckets:
//! an explicit `z-index` sorts at `z + 1`, other floated or positioned boxes
//! at 1, everything else at 0. Buckets paint in ascending order and, within a
//! bucket, in document order.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::geometry::Point;
use crate::style::{Position, TransformFunction, Visibility};
use crate::tree::{Behavior, Frame, FrameId, FrameTree};

use super::canvas::{AffineTransform, Canvas};
use super::painter;

/// The stack bucket of a frame among its siblings.
#[must_use]
pub fn stack_key(frame: &Frame) -> i32 {
    match frame.style.z_index {
        Some(z) => z.saturating_add(1),
        None if frame.is_floating() || frame.style.position != Position::Static => 1,
        None => 0,
    }
}

/// [CSS Transforms § 6 The transform rendering model](https://www.w3.org/TR/css-transforms-1/#transform-rendering)
///
/// "The transformation matrix is computed from the transform and
/// transform-origin properties": translate to the origin, apply each
/// function left to right, translate back.
#[must_use]
pub fn transform_matrix(frame: &Frame) -> AffineTransform {
    let style = &frame.style;
    let border = frame.rects().border;
    let fs = style.font_size;
    let origin = Point::new(
        border.x + style.transform_origin.0.to_pt(border.width, fs),
        border.y + style.transform_origin.1.to_pt(border.height, fs),
    );
    let mut matrix = AffineTransform::translate(origin.x, origin.y);
    for function in &style.transform {
        let step = match *function {
            TransformFunction::Translate(tx, ty) => {
                AffineTransform::translate(tx.to_pt(border.width, fs), ty.to_pt(border.height, fs))
            }
            TransformFunction::Rotate(deg) => AffineTransform::rotate(deg),
            TransformFunction::Scale(sx, sy) => AffineTransform::scale(sx, sy),
            TransformFunction::SkewX(deg) => AffineTransform::skew_x(deg),
            TransformFunction::SkewY(deg) => AffineTransform::skew_y(deg),
            TransformFunction::Matrix(m) => AffineTransform(m),
        };
        matrix = matrix.then(step);
    }
    matrix.then(AffineTransform::translate(-origin.x, -origin.y))
}

/// Drives a [`Canvas`] over laid-out pages.
pub struct Renderer;

impl Renderer {
    /// Paint one page frame and everything on it.
    ///
    /// # Errors
    ///
    /// [`crate::LayoutError::DetachedFrame`] if the page or a frame on it was
    /// disposed.
    pub fn paint_page(tree: &FrameTree, page: FrameId, canvas: &mut dyn Canvas) -> Result<()> {
        let frame = tree.frame(page)?;
        let page_box = frame.rects().border;
        canvas.new_page(page_box.width, page_box.height);
        tracing::debug!(%page, number = canvas.page_count(), "painting page");
        Self::paint_children(tree, page, canvas)
    }

    fn paint_children(tree: &FrameTree, id: FrameId, canvas: &mut dyn Canvas) -> Result<()> {
        let mut buckets: BTreeMap<i32, Vec<FrameId>> = BTreeMap::new();
        for child in tree.children(id) {
            buckets
                .entry(stack_key(tree.frame(child)?))
                .or_default()
                .push(child);
        }
        for frames in buckets.values() {
            for &child in frames {
                Self::paint(tree, child, canvas)?;
            }
        }
        Ok(())
    }

    fn paint(tree: &FrameTree, id: FrameId, canvas: &mut dyn Canvas) -> Result<()> {
        let frame = tree.frame(id)?;
        if frame.position.is_none() || frame.behavior == Behavior::Null {
            return Ok(());
        }
        // [§ 11.2 Visibility](https://www.w3.org/TR/CSS2/visufx.html#visibility)
        if frame.style.visibility != Visibility::Visible {
            return Ok(());
        }

        let transformed = !frame.style.transform.is_empty();
        if transformed {
            canvas.save();
            canvas.transform(transform_matrix(frame));
        }

        // The frame's opacity already includes its ancestors'.
        if frame.opacity < 1.0 {
            canvas.save();
            canvas.set_opacity(frame.opacity);
            painter::paint_frame(tree, frame, canvas)?;
            canvas.restore();
        } else {
            painter::paint_frame(tree, frame, canvas)?;
        }

        // [§ 11.1.1 Overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
        //
        // "Clipping ... the content is clipped to the padding edge."
        let clips = frame.style.overflow.clips() && frame.behavior != Behavior::Text;
        if clips {
            let radius = painter::inner_radius(frame.style.border_radius, frame.used.border);
            canvas.push_clip(frame.rects().padding, radius);
        }
        Self::paint_children(tree, id, canvas)?;
        if clips {
            canvas.pop_clip();
        }

        if transformed {
            canvas.restore();
        }
        Ok(())
    }
}
