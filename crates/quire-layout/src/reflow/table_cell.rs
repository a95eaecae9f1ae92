//! Table cells.
//!
//! [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
//!
//! A cell is a block container whose border box is cut from the table grid:
//! its left edge and width come from the columns it spans, its top from the
//! row it starts in. The height is settled by the table once every row the
//! cell spans is known.

use crate::error::Result;
use crate::geometry::{EdgeSizes, Point};
use crate::line_box::LineBox;
use crate::tree::{FrameId, FrameTree};

use super::{Flow, LayoutContext, block, margins, table};

/// Lay out the content of a cell inside its grid rectangle.
///
/// # Errors
///
/// [`crate::LayoutError::NoEnclosingTable`] outside a table,
/// [`crate::LayoutError::NotInCellmap`] if the cell was never registered.
pub fn reflow(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<Flow> {
    let table_id = table::enclosing_table(tree, id)?;
    let (x, width, y) = {
        let map = table::cellmap(tree, table_id)?;
        (map.cell_x(id)?, map.cell_width(id)?, map.cell_y(id)?)
    };
    let border = table::cell_border(tree, table_id, id)?;
    let style = tree.style(id)?;
    let table_width = tree.frame(table_id)?.used.width;
    let padding = style.padding_widths(table_width);
    let content_width = (width - border.horizontal() - padding.horizontal()).max(0.0);
    let edges_v = border.vertical() + padding.vertical();
    let specified_height = margins::specified_height(&style, None, edges_v);

    {
        let f = tree.frame_mut(id)?;
        f.used.margin = EdgeSizes::default();
        f.used.border = border;
        f.used.padding = padding;
        f.used.width = content_width;
        f.used.height = 0.0;
        f.used.line_height = super::line_height(ctx, &style);
        f.position = Some(Point::new(x, y));
    }

    let floats_start = ctx.floats.len();
    let flow = block::layout_children(tree, ctx, id)?;

    let frame = tree.frame(id)?;
    let content = frame.rects().content;
    let mut bottom = frame.lines.last().map_or(content.y, LineBox::bottom);
    if let Some(float_bottom) = ctx.floats.lowest_since(floats_start) {
        bottom = bottom.max(float_bottom);
    }
    let content_height = (bottom - content.y).max(0.0);
    let height = specified_height.map_or(content_height, |h| h.max(content_height));
    let f = tree.frame_mut(id)?;
    f.used.content_height = content_height;
    f.used.height = height;
    Ok(flow)
}
