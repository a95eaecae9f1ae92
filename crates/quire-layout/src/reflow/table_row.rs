//! Table rows.
//!
//! [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
//!
//! "The height of a 'table-row' element's box is calculated once the user
//! agent has all the cells in the row available: it is the maximum of the
//! row's computed 'height', the computed 'height' of each cell in the row,
//! and the minimum height (MIN) required by the cells."

use crate::error::Result;
use crate::geometry::Point;
use crate::style::VerticalAlign;
use crate::tree::{Behavior, ContainingBlock, FrameId, FrameTree};

use super::{Flow, LayoutContext, table, table_cell};

/// Lay out the cells that start in this row and size the row.
///
/// A row missing from the cellmap (its table was split and rebuilt without
/// it) is recorded as a diagnostic and parked at the table's position.
///
/// # Errors
///
/// [`crate::LayoutError::NoEnclosingTable`] outside a table, and structural
/// errors from the cells.
pub fn reflow(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<Flow> {
    let table_id = table::enclosing_table(tree, id)?;
    let cb = tree.frame(id)?.containing_block;
    let Some(index) = table::cellmap(tree, table_id)?.row_of(id) else {
        ctx.diagnostics.warn_once(
            "table",
            &format!("row {id} is missing from the cellmap of table {table_id}"),
        );
        let fallback = tree.frame(table_id)?.position.unwrap_or_default();
        let f = tree.frame_mut(id)?;
        f.position = Some(fallback);
        f.used.width = 0.0;
        f.used.height = 0.0;
        return Ok(Flow::Complete);
    };

    let style = tree.style(id)?;
    {
        let map = table::cellmap_mut(tree, table_id)?;
        map.set_row_y(index, cb.y);
        if let Some(h) = style.height.to_pt_opt(None, style.font_size) {
            map.set_min_row_height(index, h);
        }
    }

    // STEP 1: Cells starting here.
    let cells = table::cellmap(tree, table_id)?.cells_starting_in_row(index);
    ctx.unbreakable += 1;
    let mut result = Ok(());
    for &cell in &cells {
        tree.set_containing_block(
            cell,
            ContainingBlock {
                x: cb.x,
                y: cb.y,
                width: cb.width,
                height: None,
            },
        )?;
        if let Err(e) = table_cell::reflow(tree, ctx, cell) {
            result = Err(e);
            break;
        }
    }
    ctx.unbreakable -= 1;
    result?;

    // STEP 2: "The baseline of a cell is the baseline of the first in-flow
    // line box in the cell." Cells aligned on the baseline share the row's.
    align_baselines(tree, &cells)?;

    // STEP 3: Row height.
    for &cell in &cells {
        let height = tree.frame(cell)?.rects().border.height;
        table::cellmap_mut(tree, table_id)?.add_cell_height(cell, height)?;
    }
    let height = table::cellmap(tree, table_id)?
        .rows()
        .get(index)
        .map_or(0.0, |r| r.height);
    let f = tree.frame_mut(id)?;
    f.position = Some(Point::new(cb.x, cb.y));
    f.used.width = cb.width;
    f.used.height = height;
    Ok(Flow::Complete)
}

/// Distance from a cell's top border edge to the baseline of its first line.
fn first_baseline(tree: &FrameTree, cell: FrameId) -> Result<Option<f32>> {
    let frame = tree.frame(cell)?;
    let top = frame.rects().border.y;
    let Some(line) = frame.lines.iter().find(|l| !l.is_empty() && l.inline) else {
        return Ok(None);
    };
    let Some(&first) = line.frames.first() else {
        return Ok(None);
    };
    let f = tree.frame(first)?;
    let pos = f.position.unwrap_or_default();
    let baseline = if matches!(f.behavior, Behavior::Text | Behavior::ListMarker) {
        pos.y + f.used.baseline
    } else {
        pos.y + f.margin_height()
    };
    Ok(Some(baseline - top))
}

fn align_baselines(tree: &mut FrameTree, cells: &[FrameId]) -> Result<()> {
    let mut offsets = Vec::new();
    for &cell in cells {
        if tree.frame(cell)?.style.vertical_align != VerticalAlign::Baseline {
            continue;
        }
        if let Some(b) = first_baseline(tree, cell)? {
            offsets.push((cell, b));
        }
    }
    let Some(row_baseline) = offsets.iter().map(|(_, b)| *b).reduce(f32::max) else {
        return Ok(());
    };
    for (cell, b) in offsets {
        let shift = row_baseline - b;
        if shift <= 0.0 {
            continue;
        }
        for child in tree.child_ids(cell) {
            tree.translate(child, 0.0, shift)?;
        }
        let f = tree.frame_mut(cell)?;
        for line in &mut f.lines {
            line.y += shift;
        }
        f.used.height += shift;
        f.used.content_height += shift;
    }
    Ok(())
}
