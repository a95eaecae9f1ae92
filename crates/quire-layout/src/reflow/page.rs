//! Page boxes.
//!
//! [§ 13.2 Page boxes: the @page rule](https://www.w3.org/TR/CSS2/page.html#page-box)
//!
//! "The page box is a rectangular region that contains two areas: the page
//! area ... and the margin area."
//!
//! The page frame is sized to the paper with its padding set to the page
//! margins, so its content box is the page area. Its children are the
//! content root for this page and any fixed boxes repeated from earlier
//! pages.

use crate::error::Result;
use crate::geometry::{EdgeSizes, Point};
use crate::tree::{ContainingBlock, FrameId, FrameTree};

use super::{Flow, LayoutContext, absolute};

/// Lay out one page.
///
/// # Errors
///
/// Structural errors from the content.
pub fn reflow(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<Flow> {
    let page = ctx.config.page;
    let area = page.content_rect();
    {
        let f = tree.frame_mut(id)?;
        f.position = Some(Point::new(0.0, 0.0));
        f.used.margin = EdgeSizes::default();
        f.used.border = EdgeSizes::default();
        f.used.padding = page.margin;
        f.used.width = area.width;
        f.used.height = area.height;
    }
    ctx.page_top = area.y;
    ctx.page_bottom = area.bottom();
    tracing::debug!(page = %id, width = page.width, height = page.height, "page start");

    let mut flow = Flow::Complete;
    for child in tree.child_ids(id) {
        let frame = tree.frame(child)?;
        if frame.repeated {
            ctx.defer_positioned(child, frame.style.position);
            continue;
        }
        tree.set_containing_block(
            child,
            ContainingBlock {
                x: area.x,
                y: area.y,
                width: area.width,
                height: Some(area.height),
            },
        )?;
        ctx.root = Some(child);
        if let Flow::Break(at) = super::reflow(tree, ctx, child, None)? {
            flow = Flow::Break(at);
        }
    }

    let queued = ctx.positioned.first_mut().map(std::mem::take).unwrap_or_default();
    absolute::place_all(tree, ctx, &queued, area)?;
    tracing::debug!(page = %id, broken = flow.is_break(), "page finish");
    Ok(flow)
}
