//! Line box bookkeeping on a block container.
//!
//! The block container owns its lines; inline-level descendants reach them
//! through the container's id. These helpers keep the current line's float
//! offsets fresh, place frames at the line's cursor, and close lines,
//! checking each finished line against the page bottom.

use crate::error::Result;
use crate::geometry::Rect;
use crate::line_box::LineBox;
use crate::tree::{Behavior, FrameId, FrameTree};

use super::{Flow, LayoutContext, align, text};

static EMPTY_LINE: LineBox = LineBox {
    frames: Vec::new(),
    y: 0.0,
    w: 0.0,
    h: 0.0,
    left: 0.0,
    right: 0.0,
    indent: 0.0,
    wc: 0,
    br: false,
    inline: true,
    floats_resolved: false,
};

/// The current (last) line of `block`.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn current(tree: &FrameTree, block: FrameId) -> Result<&LineBox> {
    Ok(tree.frame(block)?.lines.last().unwrap_or(&EMPTY_LINE))
}

/// Mutable access to the current line, creating it at the content top if
/// the block has none yet.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn current_mut(tree: &mut FrameTree, block: FrameId) -> Result<&mut LineBox> {
    let top = tree.frame(block)?.rects().content.y;
    let frame = tree.frame_mut(block)?;
    if frame.lines.is_empty() {
        frame.lines.push(LineBox::new(top));
    }
    let last = frame.lines.len() - 1;
    Ok(&mut frame.lines[last])
}

/// Content box of a block container.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn content_box(tree: &FrameTree, block: FrameId) -> Result<Rect> {
    Ok(tree.frame(block)?.rects().content)
}

/// Recompute the current line's float offsets if its position changed since
/// they were last computed.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn resolve_floats(tree: &mut FrameTree, ctx: &LayoutContext<'_>, block: FrameId) -> Result<()> {
    let content = content_box(tree, block)?;
    let strut = tree.frame(block)?.used.line_height;
    let line = current_mut(tree, block)?;
    if line.floats_resolved {
        return Ok(());
    }
    let band = line.h.max(strut);
    let (left, right) = ctx
        .floats
        .offsets(line.y, line.y + band, content.x, content.right());
    line.left = left;
    line.right = right;
    line.floats_resolved = true;
    Ok(())
}

/// Mark the current line's float offsets stale.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn invalidate_floats(tree: &mut FrameTree, block: FrameId) -> Result<()> {
    current_mut(tree, block)?.floats_resolved = false;
    Ok(())
}

/// Width still free on the current line.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn available_width(
    tree: &mut FrameTree,
    ctx: &LayoutContext<'_>,
    block: FrameId,
) -> Result<f32> {
    resolve_floats(tree, ctx, block)?;
    let width = content_box(tree, block)?.width;
    Ok(current(tree, block)?.available_width(width))
}

/// Left edge for the next frame on the current line.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn cursor_x(tree: &mut FrameTree, ctx: &LayoutContext<'_>, block: FrameId) -> Result<f32> {
    resolve_floats(tree, ctx, block)?;
    let x = content_box(tree, block)?.x;
    Ok(x + current(tree, block)?.cursor())
}

/// Reserve horizontal space on the current line without placing a frame
/// (the left and right edges of inline boxes).
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn reserve(tree: &mut FrameTree, block: FrameId, width: f32) -> Result<()> {
    current_mut(tree, block)?.w += width;
    Ok(())
}

/// Place a laid-out frame at the cursor of the current line and move the
/// cursor past it.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn add_frame(
    tree: &mut FrameTree,
    ctx: &LayoutContext<'_>,
    block: FrameId,
    frame: FrameId,
) -> Result<()> {
    let x = cursor_x(tree, ctx, block)?;
    let y = current(tree, block)?.y;
    let (old, width, height) = {
        let f = tree.frame(frame)?;
        (f.position, f.margin_width(), f.margin_height())
    };
    match old {
        Some(p) => tree.translate(frame, x - p.x, y - p.y)?,
        None => tree.frame_mut(frame)?.position = Some(crate::geometry::Point::new(x, y)),
    }
    let line = current_mut(tree, block)?;
    line.push(frame, width, height);
    line.inline = true;
    Ok(())
}

/// Shift every frame on the current line right by `dx` (a left float was
/// placed beside them).
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn shift_line(tree: &mut FrameTree, block: FrameId, dx: f32) -> Result<()> {
    let frames = current(tree, block)?.frames.clone();
    for f in frames {
        tree.translate(f, dx, 0.0)?;
    }
    Ok(())
}

/// End the current line and start a new one below it.
///
/// The finished line is aligned, then checked against the page bottom: a
/// line that crosses it and is not the first content on the page breaks
/// before its first frame. `br` marks a line ended by a forced break.
///
/// # Errors
///
/// Structural errors while aligning.
pub fn add_line(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    block: FrameId,
    br: bool,
) -> Result<Flow> {
    current_mut(tree, block)?.br = br;
    align::finish_line(tree, ctx, block, false)?;
    let flow = check_line(tree, ctx, block)?;
    let bottom = current(tree, block)?.bottom();
    tree.frame_mut(block)?.lines.push(LineBox::new(bottom));
    Ok(flow)
}

/// Page check for the current line, which must already be aligned.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn check_line(tree: &FrameTree, ctx: &mut LayoutContext<'_>, block: FrameId) -> Result<Flow> {
    let line = current(tree, block)?;
    if line.is_empty() || !line.inline {
        return Ok(Flow::Complete);
    }
    let first_on_page = !ctx.has_content;
    let overflows = line.bottom() > ctx.page_bottom + 0.01;
    let first_frame = line.frames[0];
    if line.h > 0.0 {
        ctx.has_content = true;
    }
    if overflows && ctx.breaks_allowed() {
        if first_on_page {
            ctx.diagnostics
                .warn_once("page", "a line taller than the page area overflows it");
        } else {
            return Ok(super::break_before(tree, ctx, first_frame));
        }
    }
    Ok(Flow::Complete)
}

/// Close the current line if it holds inline content, so that a
/// block-level child can start on a fresh line.
///
/// # Errors
///
/// Structural errors while aligning.
pub fn close_inline_line(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    block: FrameId,
) -> Result<Flow> {
    if current(tree, block)?.is_empty() {
        return Ok(Flow::Complete);
    }
    add_line(tree, ctx, block, false)
}

/// Record a block-level child as its own line and start a new line below.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn add_block_line(tree: &mut FrameTree, block: FrameId, child: FrameId) -> Result<()> {
    let height = tree.frame(child)?.margin_height();
    let width = tree.frame(child)?.margin_width();
    let line = current_mut(tree, block)?;
    line.frames.push(child);
    line.inline = false;
    line.w = width;
    line.h = height;
    let bottom = line.bottom();
    tree.frame_mut(block)?.lines.push(LineBox::new(bottom));
    Ok(())
}

/// Index of the first line holding `at` or one of its descendants.
#[must_use]
pub fn line_of(tree: &FrameTree, block: FrameId, at: FrameId) -> Option<usize> {
    let lines = &tree.frame(block).ok()?.lines;
    lines.iter().position(|l| {
        l.frames
            .iter()
            .any(|f| *f == at || tree.is_descendant_of(*f, at))
    })
}

/// Drop the lines from the one holding `at` onward, keeping an empty line
/// at the cut so the content height ends there.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn truncate_at(tree: &mut FrameTree, block: FrameId, at: FrameId) -> Result<()> {
    let Some(index) = line_of(tree, block, at) else {
        return Ok(());
    };
    let frame = tree.frame_mut(block)?;
    let y = frame.lines[index].y;
    frame.lines.truncate(index);
    frame.lines.push(LineBox::new(y));
    Ok(())
}

/// Place an atomic inline-level frame (an image, inline-block or empty
/// inline box) on the current line, starting a new line first when it does
/// not fit beside content already there.
///
/// When the frame follows other content of an enclosing inline box, the
/// wrap splits that box: the frame is reset and moves to the head of the
/// next fragment, which lays it out again on the new line.
///
/// # Errors
///
/// Structural errors while aligning.
pub fn place_atomic(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    block: FrameId,
    frame: FrameId,
) -> Result<Flow> {
    let width = tree.frame(frame)?.margin_width();
    let available = available_width(tree, ctx, block)?;
    if width > available + 0.01 && !current(tree, block)?.is_empty() {
        if follows_inline_content(tree, frame, block)? {
            text::split_inline_ancestors(tree, frame, block)?;
            let summary = tree.reset(frame)?;
            ctx.quote_depth -= summary.quote_delta;
            tracing::trace!(%frame, "atomic box wraps into next fragment");
            return add_line(tree, ctx, block, false);
        }
        if let Flow::Break(at) = add_line(tree, ctx, block, false)? {
            return Ok(Flow::Break(at));
        }
    }
    add_frame(tree, ctx, block, frame)?;
    Ok(Flow::Complete)
}

/// Whether `frame` sits in an inline box after in-flow siblings.
fn follows_inline_content(tree: &FrameTree, frame: FrameId, block: FrameId) -> Result<bool> {
    let Some(parent) = tree.parent(frame) else {
        return Ok(false);
    };
    if parent == block || tree.frame(parent)?.behavior != Behavior::Inline {
        return Ok(false);
    }
    let mut prev = tree.prev_sibling(frame);
    while let Some(p) = prev {
        if tree.frame(p)?.is_in_flow() {
            return Ok(true);
        }
        prev = tree.prev_sibling(p);
    }
    Ok(false)
}
