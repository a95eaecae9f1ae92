//! Tables.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! Table layout runs in two phases. The min/max probe walks row groups,
//! rows and cells into the table's [`Cellmap`] and measures every cell; width
//! assignment then picks the table width and distributes it over the
//! columns. Rows are laid out top to bottom by the row-group behavior, and
//! every frame inside the table reads its geometry back from the cellmap.

use crate::cellmap::{Cellmap, ColumnSizing};
use crate::error::{LayoutError, Result};
use crate::geometry::{EdgeSizes, Point};
use crate::style::{BoxSizing, CollapsedMargin, Length, LengthOrAuto, TableLayout, VerticalAlign};
use crate::tree::{Behavior, ContainingBlock, FrameId, FrameTree};

use super::{Flow, LayoutContext, margins, sizing, table_row_group};

/// The cellmap of `table`.
///
/// # Errors
///
/// [`LayoutError::NotInCellmap`] if the table was never measured.
pub fn cellmap(tree: &FrameTree, table: FrameId) -> Result<&Cellmap> {
    tree.frame(table)?
        .cellmap
        .as_deref()
        .ok_or(LayoutError::NotInCellmap {
            table,
            frame: table,
        })
}

/// Mutable access to the cellmap of `table`.
///
/// # Errors
///
/// [`LayoutError::NotInCellmap`] if the table was never measured.
pub fn cellmap_mut(tree: &mut FrameTree, table: FrameId) -> Result<&mut Cellmap> {
    tree.frame_mut(table)?
        .cellmap
        .as_deref_mut()
        .ok_or(LayoutError::NotInCellmap {
            table,
            frame: table,
        })
}

/// The table a row group, row or cell belongs to.
///
/// # Errors
///
/// [`LayoutError::NoEnclosingTable`] if there is none.
pub fn enclosing_table(tree: &FrameTree, id: FrameId) -> Result<FrameId> {
    tree.ancestors(id)
        .find(|a| tree.frame(*a).is_ok_and(|f| f.behavior == Behavior::Table))
        .ok_or(LayoutError::NoEnclosingTable(id))
}

/// Border and padding of the table box itself. Under the collapsing model
/// the table has no padding and half of its outer grid borders.
fn table_edges(tree: &FrameTree, id: FrameId, cb_width: f32) -> Result<(EdgeSizes, EdgeSizes)> {
    let frame = tree.frame(id)?;
    let map = cellmap(tree, id)?;
    if map.is_collapsed() {
        Ok((map.outer_border(), EdgeSizes::default()))
    } else {
        Ok((
            frame.style.border_widths(),
            frame.style.padding_widths(cb_width),
        ))
    }
}

/// Border of a cell: its share of the grid edges when collapsed, its own
/// border otherwise.
///
/// # Errors
///
/// [`LayoutError::NotInCellmap`] if the cell is not registered.
pub fn cell_border(tree: &FrameTree, table: FrameId, cell: FrameId) -> Result<EdgeSizes> {
    let map = cellmap(tree, table)?;
    if map.is_collapsed() {
        map.cell_border(cell)
    } else {
        Ok(tree.style(cell)?.border_widths())
    }
}

/// Build the cellmap of `id` and derive its column constraints.
fn probe(tree: &mut FrameTree, ctx: &LayoutContext<'_>, id: FrameId) -> Result<()> {
    let style = tree.style(id)?;
    let mut map = tree
        .frame_mut(id)?
        .cellmap
        .take()
        .map_or_else(|| Cellmap::for_style(&style), |b| *b);
    map.build(tree, id)?;
    tree.frame_mut(id)?.cellmap = Some(Box::new(map));

    let cells = cellmap(tree, id)?.cells().to_vec();
    for cell in cells {
        let (min, max, sizing) = measure_cell(tree, ctx, id, cell)?;
        cellmap_mut(tree, id)?.set_cell_widths(cell, min, max, sizing);
    }
    cellmap_mut(tree, id)?.compute_columns();
    Ok(())
}

/// Border-box minimum and maximum widths of a cell and how its width was
/// specified.
fn measure_cell(
    tree: &mut FrameTree,
    ctx: &LayoutContext<'_>,
    table: FrameId,
    cell: FrameId,
) -> Result<(f32, f32, ColumnSizing)> {
    let style = tree.style(cell)?;
    let border = cell_border(tree, table, cell)?;
    let fs = style.font_size;
    let padding = |p: Length| match p {
        Length::Percent(_) => 0.0,
        l => l.to_pt(0.0, fs).max(0.0),
    };
    let edges = border.horizontal() + padding(style.padding_left) + padding(style.padding_right);
    let (min, max) = sizing::content_min_max(tree, ctx, cell)?;
    let (min, max) = (min + edges, max + edges);
    let sizing = match style.width {
        LengthOrAuto::Auto => ColumnSizing::Auto,
        LengthOrAuto::Length(Length::Percent(p)) => ColumnSizing::Percent(p),
        LengthOrAuto::Length(l) => {
            let w = l.to_pt(0.0, fs);
            ColumnSizing::Absolute(match style.box_sizing {
                BoxSizing::ContentBox => w + edges,
                BoxSizing::BorderBox => w.max(edges),
            })
        }
    };
    Ok((min, max, sizing))
}

/// Border-box minimum and maximum widths of a table.
///
/// # Errors
///
/// Structural errors from the table's subtree.
pub fn measure(tree: &mut FrameTree, ctx: &LayoutContext<'_>, id: FrameId) -> Result<(f32, f32)> {
    probe(tree, ctx, id)?;
    let (border, _) = table_edges(tree, id, 0.0)?;
    let style = tree.style(id)?;
    let fs = style.font_size;
    let padding = if cellmap(tree, id)?.is_collapsed() {
        0.0
    } else {
        [style.padding_left, style.padding_right]
            .iter()
            .map(|p| match p {
                Length::Percent(_) => 0.0,
                l => l.to_pt(0.0, fs).max(0.0),
            })
            .sum()
    };
    let (min, max) = cellmap(tree, id)?.min_max();
    let edges = border.horizontal() + padding;
    Ok((min + edges, max + edges))
}

/// [§ 17.5.2 Table width algorithms](https://www.w3.org/TR/CSS2/tables.html#width-layout)
///
/// Content width of the table before it is distributed over the columns.
fn table_width(
    map: &Cellmap,
    specified: Option<f32>,
    fixed_layout: bool,
    available: f32,
) -> f32 {
    let (min, max) = map.min_max();
    match specified {
        Some(w) if fixed_layout => w,
        Some(w) => w.max(min),
        // A percentage column is a share of the whole available width.
        None if map.has_percent_columns() => available.max(min),
        // "If the table's containing block width is wider than the maximum
        // width, use the maximum width; otherwise use the containing block
        // width, unless that is narrower than the minimum width."
        None if max <= available => max,
        None => available.max(min),
    }
}

/// Lay out a table.
///
/// # Errors
///
/// Structural errors from the table's subtree or cellmap.
pub fn reflow(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    _block: Option<FrameId>,
) -> Result<Flow> {
    probe(tree, ctx, id)?;

    let frame = tree.frame(id)?;
    let style = frame.style.clone();
    let cb = frame.containing_block;
    let in_flow = frame.is_block_level();
    let absorbed = frame.used.top_absorbed;
    let continues_before = frame.fragment.continues_before;
    let (border, padding) = table_edges(tree, id, cb.width)?;
    let edges_h = margins::horizontal_edges(border, padding);
    let edges_v = border.vertical() + padding.vertical();
    let fs = style.font_size;

    // STEP 1: Width, then columns.
    let specified = margins::specified_width(&style, cb.width, edges_h);
    let margin_left = style.margin_left.to_pt(cb.width, fs).unwrap_or(0.0);
    let margin_right = style.margin_right.to_pt(cb.width, fs).unwrap_or(0.0);
    let available = (cb.width - margin_left - margin_right - edges_h).max(0.0);
    let fixed_layout = style.table_layout == TableLayout::Fixed && specified.is_some();
    let width = {
        let map = cellmap(tree, id)?;
        if map.is_locked() {
            map.min_max().0
        } else {
            table_width(map, specified, fixed_layout, available)
        }
    };
    let width = {
        let map = cellmap_mut(tree, id)?;
        if fixed_layout {
            map.assign_fixed_widths(width)
        } else {
            map.assign_widths(width)
        }
    };
    let horizontal = if in_flow {
        margins::resolve_width(&style, cb.width, Some(width), edges_h)
    } else {
        margins::Horizontal {
            margin_left,
            width,
            margin_right,
        }
    };

    // STEP 2: Vertical margins, as for any block-level box.
    let (mut margin_top, margin_bottom) = margins::vertical_margins(&style, cb.width);
    if continues_before {
        margin_top = 0.0;
    }
    let mut top_margins = CollapsedMargin::new(margin_top);
    if in_flow && !continues_before {
        top_margins = margins::own_top_margins(tree.frame(id)?, margin_top);
        margin_top = if absorbed { 0.0 } else { top_margins.resolve() };
    }
    if in_flow
        && style.clear != crate::style::Clear::None
        && let Some(float_bottom) = ctx.floats.clearance(style.clear)
        && float_bottom > cb.y + margin_top
    {
        margin_top = float_bottom - cb.y;
    }
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
        f.used.width = width;
        f.used.height = 0.0;
        f.used.top_margins = top_margins;
        f.used.line_height = super::line_height(ctx, &style);
        f.position = Some(Point::new(cb.x, cb.y));
    }
    let content = tree.frame(id)?.rects().content;
    cellmap_mut(tree, id)?.position_columns(content.x);

    // STEP 3: Row groups.
    let spacing = cellmap(tree, id)?.spacing().1;
    let mut cursor = content.y + spacing;
    let mut flow = Flow::Complete;
    for group in tree.child_ids(id) {
        if tree.frame(group)?.behavior != Behavior::TableRowGroup {
            continue;
        }
        tree.set_containing_block(
            group,
            ContainingBlock {
                x: content.x,
                y: cursor,
                width: content.width,
                height: None,
            },
        )?;
        let first_on_page = !ctx.has_content;
        let group_flow = table_row_group::reflow(tree, ctx, group)?;
        let group_flow = super::avoid_break_inside(tree, ctx, group, group_flow, first_on_page)?;
        let rows = cellmap(tree, id)?.group_rows(group).unwrap_or_default();
        let g = tree.frame(group)?;
        if g.used.height > 0.0 || !rows.is_empty() {
            cursor = g.rects().border.bottom() + spacing;
        }
        if let Flow::Break(at) = group_flow {
            if at == group || tree.is_descendant_of(id, at) {
                cursor = g.rects().border.y;
            }
            flow = group_flow;
            break;
        }
    }
    finish_cells(tree, id)?;

    // STEP 4: Height.
    let content_height = if tree.children(id).next().is_some() {
        (cursor - content.y).max(0.0)
    } else {
        0.0
    };
    let specified_height = margins::specified_height(&style, cb.height, edges_v);
    let height = specified_height.map_or(content_height, |h| h.max(content_height));
    {
        let f = tree.frame_mut(id)?;
        f.used.height = height;
        f.used.content_height = content_height;
        f.used.bottom_margins = CollapsedMargin::new(margin_bottom);
        f.used.broken = flow.is_break();
        if flow.is_break() {
            f.used.margin.bottom = 0.0;
            f.used.bottom_margins = CollapsedMargin::default();
        }
    }
    if flow.is_break() {
        cellmap_mut(tree, id)?.lock();
    }
    if in_flow {
        super::apply_relative_offset(tree, id)?;
    }
    tracing::trace!(table = %id, columns = cellmap(tree, id)?.columns().len(), "laid out table");
    Ok(flow)
}

/// [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
///
/// Stretch every laid-out cell over the rows it spans and place its content
/// by the cell's `vertical-align`: "top: The top of the cell box is aligned
/// with the top of the first row it spans. bottom: The bottom of the cell
/// box is aligned with the bottom of the last row it spans. middle: The
/// center of the cell is aligned with the center of the rows it spans."
fn finish_cells(tree: &mut FrameTree, table: FrameId) -> Result<()> {
    let cells = cellmap(tree, table)?.cells().to_vec();
    for cell in cells {
        if !tree.is_live(cell) || tree.frame(cell)?.position.is_none() {
            continue;
        }
        let height = cellmap(tree, table)?.cell_height(cell)?;
        let f = tree.frame(cell)?;
        let edges = f.used.border.vertical() + f.used.padding.vertical();
        let content_height = f.used.content_height;
        let available = (height - edges).max(content_height);
        let shift = match f.style.vertical_align {
            VerticalAlign::Middle => (available - content_height) / 2.0,
            VerticalAlign::Bottom => available - content_height,
            _ => 0.0,
        };
        tree.frame_mut(cell)?.used.height = available;
        if shift > 0.0 {
            for child in tree.child_ids(cell) {
                tree.translate(child, 0.0, shift)?;
            }
            for line in &mut tree.frame_mut(cell)?.lines {
                line.y += shift;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::font::ApproximateFontMetrics;
    use crate::style::{Display, SpecifiedStyle};
    use quire_common::Diagnostics;

    #[test]
    fn test_width_prefers_max_then_fills() {
        let map = Cellmap::new(false, (0.0, 0.0));
        assert!((table_width(&map, None, false, 300.0)).abs() < 0.01);
        assert!((table_width(&map, Some(120.0), false, 300.0) - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_measure_sums_columns() {
        let metrics = ApproximateFontMetrics;
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        let mut tree = FrameTree::new();

        let table = tree.create_element("table", SpecifiedStyle::with_display(Display::Table));
        let group = tree.create_element("tbody", SpecifiedStyle::with_display(Display::TableRowGroup));
        let row = tree.create_element("tr", SpecifiedStyle::with_display(Display::TableRow));
        tree.append_child(table, group).unwrap();
        tree.append_child(group, row).unwrap();
        for word in ["ab", "abcd"] {
            let cell_style = SpecifiedStyle::with_display(Display::TableCell);
            let cell = tree.create_element("td", cell_style.clone());
            let text = tree.create_text(
                word,
                std::rc::Rc::new(SpecifiedStyle::inherit(&cell_style, Display::Inline)),
            );
            tree.append_child(row, cell).unwrap();
            tree.append_child(cell, text).unwrap();
        }
        let (min, max) = measure(&mut tree, &ctx, table).unwrap();
        assert!((min - 36.0).abs() < 0.01);
        assert!((max - 36.0).abs() < 0.01);
        assert_eq!(cellmap(&tree, table).unwrap().columns().len(), 2);
    }
}
