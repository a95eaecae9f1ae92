//! Row groups (`thead`, `tbody`, `tfoot`).
//!
//! [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
//!
//! A row group stacks its rows and is the place where a table may break
//! across pages: between two rows, never inside one.

use crate::error::Result;
use crate::geometry::Point;
use crate::tree::{Behavior, ContainingBlock, FrameId, FrameTree};

use super::{Flow, LayoutContext, table, table_row};

/// Lay out the rows of a group, checking each against the page.
///
/// # Errors
///
/// [`crate::LayoutError::NoEnclosingTable`] outside a table, and structural
/// errors from the rows.
pub fn reflow(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<Flow> {
    let table_id = table::enclosing_table(tree, id)?;
    let cb = tree.frame(id)?.containing_block;
    let spacing = table::cellmap(tree, table_id)?.spacing().1;
    {
        let f = tree.frame_mut(id)?;
        f.used.width = cb.width;
        f.used.height = 0.0;
        f.position = Some(Point::new(cb.x, cb.y));
    }

    let mut cursor = cb.y;
    let mut bottom = cb.y;
    for row in tree.child_ids(id) {
        if tree.frame(row)?.behavior != Behavior::TableRow {
            continue;
        }
        tree.set_containing_block(
            row,
            ContainingBlock {
                x: cb.x,
                y: cursor,
                width: cb.width,
                height: None,
            },
        )?;
        let first_on_page = !ctx.has_content;
        let flow = table_row::reflow(tree, ctx, row)?;
        let flow = super::avoid_break_inside(tree, ctx, row, flow, first_on_page)?;
        let flow = match flow {
            Flow::Complete => super::check_page_full(tree, ctx, row, first_on_page)?,
            broken => broken,
        };
        if let Flow::Break(at) = flow {
            tree.frame_mut(id)?.used.height = (bottom - cb.y).max(0.0);
            tracing::debug!(group = %id, %at, "table breaks between rows");
            return Ok(flow);
        }
        let row_frame = tree.frame(row)?;
        if row_frame.used.height > 0.0 {
            ctx.has_content = true;
        }
        bottom = row_frame.rects().border.bottom();
        cursor = bottom + spacing;
    }

    tree.frame_mut(id)?.used.height = (bottom - cb.y).max(0.0);
    Ok(Flow::Complete)
}
