//! The logical grid behind a table.
//!
//! [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
//!
//! "Each cell occupies a rectangle of grid cells, which may span rows and
//! columns." A `Cellmap` assigns every cell its grid rectangle, keeps the
//! column and row geometry, resolves collapsed borders, and is the single
//! source of truth for the position and size of every frame inside a table.

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;

use crate::error::{LayoutError, Result};
use crate::geometry::EdgeSizes;
use crate::style::{BorderSide, BorderStyle, Color, SpecifiedStyle};
use crate::tree::{Behavior, FrameId, FrameTree};

/// How a column's width was specified by its cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub enum ColumnSizing {
    /// No cell gave a width.
    #[default]
    Auto,
    /// A fixed width in points.
    Absolute(f32),
    /// A percentage of the table width.
    Percent(f32),
}

impl ColumnSizing {
    /// Combine two specifications for the same column. Percentages beat
    /// absolute widths, which beat `auto`; within a kind the larger wins.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Percent(a), Self::Percent(b)) => Self::Percent(a.max(b)),
            (Self::Percent(_), _) => self,
            (_, Self::Percent(_)) => other,
            (Self::Absolute(a), Self::Absolute(b)) => Self::Absolute(a.max(b)),
            (Self::Absolute(_), Self::Auto) => self,
            (Self::Auto, _) => other,
        }
    }
}

/// Geometry of one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Column {
    /// Left edge of the column (page coordinates once positioned).
    pub x: f32,
    /// Minimum content width.
    pub min: f32,
    /// Maximum content width.
    pub max: f32,
    /// Width assigned by width distribution.
    pub used_width: f32,
    /// Sizing mode.
    pub sizing: ColumnSizing,
}

impl Column {
    /// Returns true for columns without a specified width.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.sizing == ColumnSizing::Auto
    }
}

/// Geometry of one row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    /// Top edge.
    pub y: f32,
    /// Height (maximum over the cells contributing to it).
    pub height: f32,
    /// The row frame, unless the row only exists because of a row span.
    pub frame: Option<FrameId>,
}

/// The grid rectangle occupied by a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// First row.
    pub row: usize,
    /// First column.
    pub column: usize,
    /// Rows covered.
    pub rowspan: usize,
    /// Columns covered.
    pub colspan: usize,
}

impl Span {
    /// Row indices covered.
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        self.row..self.row + self.rowspan
    }

    /// Column indices covered.
    #[must_use]
    pub fn columns(&self) -> Range<usize> {
        self.column..self.column + self.colspan
    }
}

/// A border after conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollapsedBorder {
    /// Width in points (zero for `none`/`hidden`).
    pub width: f32,
    /// Line style.
    pub style: BorderStyle,
    /// Color.
    pub color: Color,
}

impl CollapsedBorder {
    /// The border described by one side of a style.
    #[must_use]
    pub fn from_side(side: &BorderSide, style: &SpecifiedStyle) -> Self {
        Self {
            width: side.used_width(),
            style: side.style,
            color: style.border_color(side),
        }
    }
}

/// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
///
/// Pick the border drawn at an edge claimed by `first` and `second`.
///
/// 1. "Borders with the 'border-style' of 'hidden' take precedence over all
///    other conflicting borders."
/// 2. "Borders with a style of 'none' have the lowest priority."
/// 3. "If none of the styles are 'hidden' and at least one of them is not
///    'none', then narrow borders are discarded in favor of wider ones."
/// 4. "If border styles differ only in color, then a style set on a cell wins
///    over one on a row, which wins over a row group, column group, column,
///    and, lastly, table."
///
/// Callers pass candidates in that precedence order, so `first` wins ties.
#[must_use]
pub fn resolve_border_conflict(first: CollapsedBorder, second: CollapsedBorder) -> CollapsedBorder {
    if first.style == BorderStyle::Hidden {
        return first;
    }
    if second.style == BorderStyle::Hidden {
        return second;
    }
    if second.style == BorderStyle::None {
        return first;
    }
    if first.style == BorderStyle::None {
        return second;
    }
    if second.width > first.width {
        return second;
    }
    if first.width > second.width {
        return first;
    }
    if second.style.conflict_rank() > first.style.conflict_rank() {
        second
    } else {
        first
    }
}

/// Resolved borders along the top and left edges of one grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeBorders {
    /// Horizontal edge above the grid cell.
    pub horizontal: Option<CollapsedBorder>,
    /// Vertical edge left of the grid cell.
    pub vertical: Option<CollapsedBorder>,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
struct CellMetrics {
    frame: FrameId,
    min: f32,
    max: f32,
    sizing: ColumnSizing,
}

/// The grid of one table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cellmap {
    table: Option<FrameId>,
    columns: Vec<Column>,
    rows: Vec<Row>,
    grid: Vec<Vec<Option<FrameId>>>,
    #[serde(skip)]
    spans: HashMap<FrameId, Span>,
    #[serde(skip)]
    row_index: HashMap<FrameId, usize>,
    #[serde(skip)]
    groups: HashMap<FrameId, Range<usize>>,
    cell_order: Vec<FrameId>,
    borders: Vec<Vec<EdgeBorders>>,
    #[serde(skip)]
    metrics: Vec<CellMetrics>,
    collapsed: bool,
    spacing: (f32, f32),
    locked: bool,
    current_row: Option<usize>,
    column_cursor: usize,
    next_row: usize,
}

impl Cellmap {
    /// An empty map. `collapsed` selects the collapsing border model;
    /// `spacing` is `border-spacing` (ignored when collapsed).
    #[must_use]
    pub fn new(collapsed: bool, spacing: (f32, f32)) -> Self {
        Self {
            collapsed,
            spacing: if collapsed { (0.0, 0.0) } else { spacing },
            ..Self::default()
        }
    }

    /// A map for `style`'s border model.
    #[must_use]
    pub fn for_style(style: &SpecifiedStyle) -> Self {
        Self::new(
            style.border_collapse == crate::style::BorderCollapse::Collapse,
            style.border_spacing,
        )
    }

    /// Walk row groups, rows and cells of `table` and assign every cell its
    /// grid rectangle. Locked column widths survive the rebuild.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the table's subtree holds stale ids.
    pub fn build(&mut self, tree: &FrameTree, table: FrameId) -> Result<()> {
        self.table = Some(table);
        self.rows.clear();
        self.grid.clear();
        self.spans.clear();
        self.row_index.clear();
        self.groups.clear();
        self.cell_order.clear();
        self.borders.clear();
        self.metrics.clear();
        self.current_row = None;
        self.column_cursor = 0;
        self.next_row = 0;
        if !self.locked {
            self.columns.clear();
        }

        for group in tree.children(table) {
            if tree.frame(group)?.behavior != Behavior::TableRowGroup {
                continue;
            }
            let start = self.next_row;
            for row in tree.children(group) {
                if tree.frame(row)?.behavior != Behavior::TableRow {
                    continue;
                }
                self.start_row(row);
                for cell in tree.children(row) {
                    let frame = tree.frame(cell)?;
                    if frame.behavior != Behavior::TableCell {
                        continue;
                    }
                    self.add_cell(cell, frame.style.rowspan, frame.style.colspan);
                }
            }
            let _ = self.groups.insert(group, start..self.next_row);
        }

        if self.collapsed {
            self.resolve_borders(tree, table)?;
        }
        Ok(())
    }

    fn start_row(&mut self, frame: FrameId) {
        let r = self.next_row;
        self.ensure_size(r + 1, self.columns.len());
        self.rows[r].frame = Some(frame);
        let _ = self.row_index.insert(frame, r);
        self.current_row = Some(r);
        self.column_cursor = 0;
        self.next_row += 1;
    }

    /// Place a cell at the first free column of the current row.
    fn add_cell(&mut self, frame: FrameId, rowspan: usize, colspan: usize) {
        let rowspan = rowspan.max(1);
        let colspan = colspan.max(1);
        let row = self.current_row.unwrap_or(0);
        let mut column = self.column_cursor;
        while self
            .grid
            .get(row)
            .and_then(|r| r.get(column))
            .is_some_and(Option::is_some)
        {
            column += 1;
        }
        self.ensure_size(row + rowspan, column + colspan);
        for r in row..row + rowspan {
            for c in column..column + colspan {
                self.grid[r][c] = Some(frame);
            }
        }
        let _ = self.spans.insert(
            frame,
            Span {
                row,
                column,
                rowspan,
                colspan,
            },
        );
        self.cell_order.push(frame);
        self.column_cursor = column + colspan;
    }

    /// Grow the grid; counts never shrink while cells are being added.
    fn ensure_size(&mut self, rows: usize, columns: usize) {
        if rows > self.rows.len() {
            self.rows.resize_with(rows, Row::default);
        }
        if columns > self.columns.len() {
            self.columns.resize_with(columns, Column::default);
        }
        let width = self.columns.len();
        if self.grid.len() < self.rows.len() {
            self.grid.resize_with(self.rows.len(), Vec::new);
        }
        for row in &mut self.grid {
            if row.len() < width {
                row.resize(width, None);
            }
        }
    }

    fn resolve_borders(&mut self, tree: &FrameTree, table: FrameId) -> Result<()> {
        let rows = self.rows.len();
        let cols = self.columns.len();
        self.borders = vec![vec![EdgeBorders::default(); cols + 1]; rows + 1];

        let order = self.cell_order.clone();
        for cell in order {
            let span = self.span(cell)?;
            let style = tree.style(cell)?;
            self.claim_box(&style, span.rows(), span.columns());
        }
        let row_frames: Vec<(usize, FrameId)> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(r, row)| row.frame.map(|f| (r, f)))
            .collect();
        for (r, frame) in row_frames {
            let style = tree.style(frame)?;
            self.claim_box(&style, r..r + 1, 0..cols);
        }
        let mut groups: Vec<(FrameId, Range<usize>)> =
            self.groups.iter().map(|(f, r)| (*f, r.clone())).collect();
        groups.sort_by_key(|(_, r)| r.start);
        for (frame, range) in groups {
            if range.is_empty() {
                continue;
            }
            let style = tree.style(frame)?;
            self.claim_box(&style, range, 0..cols);
        }
        let style = tree.style(table)?;
        self.claim_box(&style, 0..rows, 0..cols);
        Ok(())
    }

    /// Offer the four sides of a box covering `rows` × `columns` as
    /// candidates for the edges around that rectangle.
    fn claim_box(&mut self, style: &SpecifiedStyle, rows: Range<usize>, columns: Range<usize>) {
        if rows.is_empty() || columns.is_empty() {
            return;
        }
        let top = CollapsedBorder::from_side(&style.border_top, style);
        let bottom = CollapsedBorder::from_side(&style.border_bottom, style);
        let left = CollapsedBorder::from_side(&style.border_left, style);
        let right = CollapsedBorder::from_side(&style.border_right, style);
        for c in columns.clone() {
            self.claim(rows.start, c, Axis::Horizontal, top);
            self.claim(rows.end, c, Axis::Horizontal, bottom);
        }
        for r in rows {
            self.claim(r, columns.start, Axis::Vertical, left);
            self.claim(r, columns.end, Axis::Vertical, right);
        }
    }

    fn claim(&mut self, row: usize, column: usize, axis: Axis, candidate: CollapsedBorder) {
        let Some(edge) = self.borders.get_mut(row).and_then(|r| r.get_mut(column)) else {
            return;
        };
        let slot = match axis {
            Axis::Horizontal => &mut edge.horizontal,
            Axis::Vertical => &mut edge.vertical,
        };
        *slot = Some(match *slot {
            Some(current) => resolve_border_conflict(current, candidate),
            None => candidate,
        });
    }

    /// The resolved border at a grid edge.
    #[must_use]
    pub fn border(&self, row: usize, column: usize, horizontal: bool) -> Option<CollapsedBorder> {
        let edge = self.borders.get(row)?.get(column)?;
        if horizontal {
            edge.horizontal
        } else {
            edge.vertical
        }
    }

    fn edge_width(&self, row: usize, column: usize, horizontal: bool) -> f32 {
        self.border(row, column, horizontal).map_or(0.0, |b| b.width)
    }

    /// [§ 17.6.2 The collapsing border model](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
    ///
    /// "Borders are centered on the grid lines between the cells." A cell
    /// lays out with half of each resolved edge.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for an unregistered frame.
    pub fn cell_border(&self, frame: FrameId) -> Result<EdgeSizes> {
        let span = self.span(frame)?;
        let top = span
            .columns()
            .map(|c| self.edge_width(span.row, c, true))
            .fold(0.0, f32::max);
        let bottom = span
            .columns()
            .map(|c| self.edge_width(span.row + span.rowspan, c, true))
            .fold(0.0, f32::max);
        let left = span
            .rows()
            .map(|r| self.edge_width(r, span.column, false))
            .fold(0.0, f32::max);
        let right = span
            .rows()
            .map(|r| self.edge_width(r, span.column + span.colspan, false))
            .fold(0.0, f32::max);
        Ok(EdgeSizes {
            top: top / 2.0,
            right: right / 2.0,
            bottom: bottom / 2.0,
            left: left / 2.0,
        })
    }

    /// Half of the widest resolved border along each outer edge; the table's
    /// used border in the collapsing model.
    #[must_use]
    pub fn outer_border(&self) -> EdgeSizes {
        let rows = self.rows.len();
        let cols = self.columns.len();
        let top = (0..cols).map(|c| self.edge_width(0, c, true)).fold(0.0, f32::max);
        let bottom = (0..cols)
            .map(|c| self.edge_width(rows, c, true))
            .fold(0.0, f32::max);
        let left = (0..rows).map(|r| self.edge_width(r, 0, false)).fold(0.0, f32::max);
        let right = (0..rows)
            .map(|r| self.edge_width(r, cols, false))
            .fold(0.0, f32::max);
        EdgeSizes {
            top: top / 2.0,
            right: right / 2.0,
            bottom: bottom / 2.0,
            left: left / 2.0,
        }
    }

    /// Record the content widths and specified width of a cell. Column
    /// constraints are derived by [`Cellmap::compute_columns`].
    pub fn set_cell_widths(&mut self, frame: FrameId, min: f32, max: f32, sizing: ColumnSizing) {
        self.metrics.push(CellMetrics {
            frame,
            min,
            max: max.max(min),
            sizing,
        });
    }

    /// [§ 17.5.2.2 Automatic table layout](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
    ///
    /// Derive per-column minimum and maximum widths: single-column cells
    /// first, then spanning cells widen their columns evenly where the
    /// columns fall short.
    pub fn compute_columns(&mut self) {
        if self.locked {
            return;
        }
        for column in &mut self.columns {
            *column = Column::default();
        }
        let metrics = std::mem::take(&mut self.metrics);
        let (single, spanning): (Vec<_>, Vec<_>) = metrics
            .iter()
            .filter_map(|m| self.spans.get(&m.frame).map(|s| (*m, *s)))
            .partition(|(_, s)| s.colspan == 1);

        for (m, span) in single {
            let column = &mut self.columns[span.column];
            column.min = column.min.max(m.min);
            column.max = column.max.max(m.max);
            column.sizing = column.sizing.merge(m.sizing);
        }
        for (m, span) in spanning {
            let n = span.colspan as f32;
            let gaps = self.spacing.0 * (n - 1.0);
            let range = span.columns();
            let min_sum: f32 = self.columns[range.clone()].iter().map(|c| c.min).sum::<f32>() + gaps;
            let max_sum: f32 = self.columns[range.clone()].iter().map(|c| c.max).sum::<f32>() + gaps;
            let sizing = match m.sizing {
                ColumnSizing::Auto => ColumnSizing::Auto,
                ColumnSizing::Absolute(w) => ColumnSizing::Absolute((w - gaps).max(0.0) / n),
                ColumnSizing::Percent(p) => ColumnSizing::Percent(p / n),
            };
            for column in &mut self.columns[range] {
                if m.min > min_sum {
                    column.min += (m.min - min_sum) / n;
                }
                if m.max > max_sum {
                    column.max += (m.max - max_sum) / n;
                }
                if column.is_auto() {
                    column.sizing = sizing;
                }
            }
        }
        for column in &mut self.columns {
            if let ColumnSizing::Absolute(w) = column.sizing {
                column.min = column.min.max(w);
                column.max = column.min;
            }
            column.max = column.max.max(column.min);
        }
        self.metrics = metrics;
    }

    /// Total horizontal spacing that is not part of any column.
    #[must_use]
    pub fn width_delta(&self) -> f32 {
        if self.columns.is_empty() {
            return 0.0;
        }
        self.spacing.0 * (self.columns.len() as f32 + 1.0)
    }

    /// Total vertical spacing between and around rows.
    #[must_use]
    pub fn height_delta(&self) -> f32 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.spacing.1 * (self.rows.len() as f32 + 1.0)
    }

    /// Minimum and maximum content width of the table, spacing included.
    #[must_use]
    pub fn min_max(&self) -> (f32, f32) {
        let min: f32 = self.columns.iter().map(|c| c.min).sum();
        let max: f32 = self.columns.iter().map(|c| c.max).sum();
        let delta = self.width_delta();
        (min + delta, max + delta)
    }

    /// Returns true if any column has a percentage width.
    #[must_use]
    pub fn has_percent_columns(&self) -> bool {
        self.columns
            .iter()
            .any(|c| matches!(c.sizing, ColumnSizing::Percent(_)))
    }

    /// Distribute `width` (the table's content width) over the columns.
    ///
    /// Returns the width actually used, which exceeds `width` only when the
    /// columns' minimums do not fit. A locked map keeps its widths.
    pub fn assign_widths(&mut self, width: f32) -> f32 {
        if self.locked || self.columns.is_empty() {
            return self.used_total();
        }
        let available = (width - self.width_delta()).max(0.0);
        let has_percent = self.has_percent_columns();
        let has_auto = self.columns.iter().any(Column::is_auto);
        let has_absolute = self
            .columns
            .iter()
            .any(|c| matches!(c.sizing, ColumnSizing::Absolute(_)));

        if !has_percent && has_auto {
            self.distribute_auto(available);
        } else if !has_percent && has_absolute {
            self.distribute_absolute(available);
        } else {
            self.distribute_percent(available, has_auto);
        }
        self.reconcile(available);
        self.used_total()
    }

    /// Case 1: no percentage columns. Absolute columns take their width;
    /// auto columns share the rest, by their min/max spread while below the
    /// maximum and in proportion to their maximum above it.
    fn distribute_auto(&mut self, width: f32) {
        let mut rest = width;
        for column in &mut self.columns {
            if let ColumnSizing::Absolute(_) = column.sizing {
                column.used_width = column.min;
                rest -= column.min;
            }
        }
        let (min, max) = self
            .columns
            .iter()
            .filter(|c| c.is_auto())
            .fold((0.0, 0.0), |(a, b), c| (a + c.min, b + c.max));
        let count = self.columns.iter().filter(|c| c.is_auto()).count() as f32;
        for column in self.columns.iter_mut().filter(|c| c.is_auto()) {
            column.used_width = if rest >= max {
                if max > 0.0 {
                    column.max + (rest - max) * column.max / max
                } else {
                    rest / count
                }
            } else if max > min {
                column.min + (rest - min) * (column.max - column.min) / (max - min)
            } else {
                column.min
            };
        }
    }

    /// Case 2: every column absolute. Extra space goes in proportion to each
    /// column's minimum.
    fn distribute_absolute(&mut self, width: f32) {
        let min: f32 = self.columns.iter().map(|c| c.min).sum();
        let count = self.columns.len() as f32;
        for column in &mut self.columns {
            column.used_width = if min > 0.0 {
                column.min + (width - min) * column.min / min
            } else {
                width / count
            };
        }
    }

    /// Case 3: percentages present. Percentages are normalized, then
    /// absolute and percent columns are satisfied in column order out of
    /// what the auto columns' minimums leave; auto columns split the rest.
    fn distribute_percent(&mut self, width: f32, has_auto: bool) {
        let total_percent: f32 = self
            .columns
            .iter()
            .map(|c| match c.sizing {
                ColumnSizing::Percent(p) => p,
                _ => 0.0,
            })
            .sum();
        let scale = if total_percent > 100.0 || (!has_auto && total_percent > 0.0) {
            100.0 / total_percent
        } else {
            1.0
        };

        let absolute: f32 = self
            .columns
            .iter()
            .filter(|c| matches!(c.sizing, ColumnSizing::Absolute(_)))
            .map(|c| c.min)
            .sum();
        let auto_min: f32 = self.columns.iter().filter(|c| c.is_auto()).map(|c| c.min).sum();
        let mut used = auto_min + absolute;
        let percent_base = if has_auto { width } else { (width - absolute).max(0.0) };

        for column in &mut self.columns {
            match column.sizing {
                ColumnSizing::Absolute(_) => column.used_width = column.min,
                ColumnSizing::Percent(p) => {
                    let wanted = (p * scale / 100.0 * percent_base).max(column.min);
                    let room = (width - used).max(column.min);
                    column.used_width = wanted.min(room);
                    used += column.used_width;
                }
                ColumnSizing::Auto => column.used_width = column.min,
            }
        }

        let auto_count = self.columns.iter().filter(|c| c.is_auto()).count();
        if auto_count > 0 {
            let leftover = (width - used).max(0.0) / auto_count as f32;
            for column in self.columns.iter_mut().filter(|c| c.is_auto()) {
                column.used_width += leftover;
            }
        }
    }

    /// Make every column at least its minimum and the sum equal `width`
    /// when the minimums allow it.
    fn reconcile(&mut self, width: f32) {
        for column in &mut self.columns {
            column.used_width = column.used_width.max(column.min);
        }
        let sum: f32 = self.columns.iter().map(|c| c.used_width).sum();
        let diff = width - sum;
        if diff > 0.01 {
            let weight: f32 = self.columns.iter().map(|c| c.used_width).sum();
            let count = self.columns.len() as f32;
            for column in &mut self.columns {
                column.used_width += if weight > 0.0 {
                    diff * column.used_width / weight
                } else {
                    diff / count
                };
            }
        } else if diff < -0.01 {
            let slack: f32 = self.columns.iter().map(|c| c.used_width - c.min).sum();
            if slack > 0.0 {
                let take = (-diff).min(slack);
                for column in &mut self.columns {
                    column.used_width -= take * (column.used_width - column.min) / slack;
                }
            }
        }
    }

    /// [§ 17.5.2.1 Fixed table layout](https://www.w3.org/TR/CSS2/tables.html#fixed-table-layout)
    ///
    /// "A column element with a value other than 'auto' for the 'width'
    /// property sets the width for that column. Otherwise, a cell in the
    /// first row with a value other than 'auto' for the 'width' property
    /// determines the width for that column." Remaining columns share the
    /// rest equally. The widths are locked afterwards.
    pub fn assign_fixed_widths(&mut self, width: f32) -> f32 {
        if self.locked || self.columns.is_empty() {
            return self.used_total();
        }
        let available = (width - self.width_delta()).max(0.0);
        for column in &mut self.columns {
            *column = Column::default();
        }
        let first_row: Vec<CellMetrics> = self
            .metrics
            .iter()
            .copied()
            .filter(|m| self.spans.get(&m.frame).is_some_and(|s| s.row == 0))
            .collect();
        for m in first_row {
            let Some(span) = self.spans.get(&m.frame).copied() else {
                continue;
            };
            let n = span.colspan as f32;
            for column in &mut self.columns[span.columns()] {
                column.sizing = match m.sizing {
                    ColumnSizing::Absolute(w) => ColumnSizing::Absolute(w / n),
                    ColumnSizing::Percent(p) => ColumnSizing::Percent(p / n),
                    ColumnSizing::Auto => ColumnSizing::Auto,
                };
            }
        }
        let mut rest = available;
        for column in &mut self.columns {
            column.used_width = match column.sizing {
                ColumnSizing::Absolute(w) => w,
                ColumnSizing::Percent(p) => p / 100.0 * available,
                ColumnSizing::Auto => 0.0,
            };
            rest -= column.used_width;
        }
        let auto_count = self.columns.iter().filter(|c| c.is_auto()).count();
        if auto_count > 0 {
            let share = rest.max(0.0) / auto_count as f32;
            for column in self.columns.iter_mut().filter(|c| c.is_auto()) {
                column.used_width = share;
            }
        } else if rest > 0.0 {
            let count = self.columns.len() as f32;
            for column in &mut self.columns {
                column.used_width += rest / count;
            }
        }
        for column in &mut self.columns {
            column.min = column.used_width;
            column.max = column.used_width;
        }
        self.lock();
        self.used_total()
    }

    fn used_total(&self) -> f32 {
        self.columns.iter().map(|c| c.used_width).sum::<f32>() + self.width_delta()
    }

    /// Place the columns starting at the table's content-box left edge.
    pub fn position_columns(&mut self, x: f32) {
        let mut cursor = x + self.spacing.0;
        for column in &mut self.columns {
            column.x = cursor;
            cursor += column.used_width + self.spacing.0;
        }
    }

    /// Record the top edge of a row.
    pub fn set_row_y(&mut self, row: usize, y: f32) {
        if let Some(r) = self.rows.get_mut(row) {
            r.y = y;
        }
    }

    /// Let a cell's height contribute to the rows it spans, divided evenly.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for an unregistered frame.
    pub fn add_cell_height(&mut self, frame: FrameId, height: f32) -> Result<()> {
        let span = self.span(frame)?;
        let gaps = self.spacing.1 * (span.rowspan as f32 - 1.0);
        let share = (height - gaps).max(0.0) / span.rowspan as f32;
        for r in span.rows() {
            if let Some(row) = self.rows.get_mut(r) {
                row.height = row.height.max(share);
            }
        }
        Ok(())
    }

    /// Raise a row to at least `height`.
    pub fn set_min_row_height(&mut self, row: usize, height: f32) {
        if let Some(r) = self.rows.get_mut(row) {
            r.height = r.height.max(height);
        }
    }

    /// The grid rectangle of a cell.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for an unregistered frame.
    pub fn span(&self, frame: FrameId) -> Result<Span> {
        self.spans.get(&frame).copied().ok_or(LayoutError::NotInCellmap {
            table: self.table.unwrap_or(frame),
            frame,
        })
    }

    /// Left edge of a cell.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for an unregistered frame.
    pub fn cell_x(&self, frame: FrameId) -> Result<f32> {
        let span = self.span(frame)?;
        Ok(self.columns.get(span.column).map_or(0.0, |c| c.x))
    }

    /// Border-box width of a cell: its columns plus the spacing between them.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for an unregistered frame.
    pub fn cell_width(&self, frame: FrameId) -> Result<f32> {
        let span = self.span(frame)?;
        let columns: f32 = self
            .columns
            .get(span.columns())
            .map_or(0.0, |cs| cs.iter().map(|c| c.used_width).sum());
        Ok(columns + self.spacing.0 * (span.colspan as f32 - 1.0))
    }

    /// Top edge of a cell.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for an unregistered frame.
    pub fn cell_y(&self, frame: FrameId) -> Result<f32> {
        let span = self.span(frame)?;
        Ok(self.rows.get(span.row).map_or(0.0, |r| r.y))
    }

    /// Border-box height of a cell: its rows plus the spacing between them.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for an unregistered frame.
    pub fn cell_height(&self, frame: FrameId) -> Result<f32> {
        let span = self.span(frame)?;
        let rows: f32 = span
            .rows()
            .filter_map(|r| self.rows.get(r))
            .map(|r| r.height)
            .sum();
        Ok(rows + self.spacing.1 * (span.rowspan as f32 - 1.0))
    }

    /// Index of a row frame, if registered.
    #[must_use]
    pub fn row_of(&self, frame: FrameId) -> Option<usize> {
        self.row_index.get(&frame).copied()
    }

    /// Row range of a row-group frame, if registered.
    #[must_use]
    pub fn group_rows(&self, frame: FrameId) -> Option<Range<usize>> {
        self.groups.get(&frame).cloned()
    }

    /// Cells whose span starts at `row`, in column order.
    #[must_use]
    pub fn cells_starting_in_row(&self, row: usize) -> Vec<FrameId> {
        self.cell_order
            .iter()
            .copied()
            .filter(|f| self.spans.get(f).is_some_and(|s| s.row == row))
            .collect()
    }

    /// Every registered cell in document order.
    #[must_use]
    pub fn cells(&self) -> &[FrameId] {
        &self.cell_order
    }

    /// The frame occupying a grid position.
    #[must_use]
    pub fn cell_at(&self, row: usize, column: usize) -> Option<FrameId> {
        self.grid.get(row)?.get(column).copied().flatten()
    }

    /// Column records.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Row records.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// `border-spacing` in effect (zero when collapsed).
    #[must_use]
    pub const fn spacing(&self) -> (f32, f32) {
        self.spacing
    }

    /// Returns true under the collapsing border model.
    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Freeze the column widths.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Returns true once the column widths are frozen.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// A map holding only this map's column widths, locked. Used for the
    /// continuation of a table split across pages so that its columns line
    /// up with the first fragment.
    #[must_use]
    pub fn locked_copy(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            collapsed: self.collapsed,
            spacing: self.spacing,
            locked: true,
            ..Self::default()
        }
    }

    /// Shift all column and row edges.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        for column in &mut self.columns {
            column.x += dx;
        }
        for row in &mut self.rows {
            row.y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn border(width: f32, style: BorderStyle) -> CollapsedBorder {
        CollapsedBorder {
            width,
            style,
            color: Color::BLACK,
        }
    }

    fn map_with(columns: &[(f32, f32, ColumnSizing)]) -> Cellmap {
        let mut map = Cellmap::new(false, (0.0, 0.0));
        map.columns = columns
            .iter()
            .map(|&(min, max, sizing)| Column {
                min,
                max,
                sizing,
                ..Column::default()
            })
            .collect();
        map
    }

    fn used(map: &Cellmap) -> Vec<f32> {
        map.columns().iter().map(|c| c.used_width).collect()
    }

    #[test]
    fn test_hidden_beats_wider() {
        let hidden = border(0.0, BorderStyle::Hidden);
        let wide = border(10.0, BorderStyle::Solid);
        assert_eq!(resolve_border_conflict(wide, hidden).style, BorderStyle::Hidden);
        assert_eq!(resolve_border_conflict(hidden, wide).style, BorderStyle::Hidden);
    }

    #[test]
    fn test_wider_then_style_rank_then_first() {
        let thin = border(1.0, BorderStyle::Double);
        let thick = border(3.0, BorderStyle::Inset);
        assert_eq!(resolve_border_conflict(thin, thick), thick);

        let dashed = border(2.0, BorderStyle::Dashed);
        let double = border(2.0, BorderStyle::Double);
        assert_eq!(resolve_border_conflict(dashed, double), double);

        let mut red = border(2.0, BorderStyle::Solid);
        red.color = Color::rgb(255, 0, 0);
        let blue = CollapsedBorder {
            color: Color::rgb(0, 0, 255),
            ..red
        };
        assert_eq!(resolve_border_conflict(red, blue).color, red.color);
    }

    #[test]
    fn test_none_loses_to_anything_visible() {
        let none = border(5.0, BorderStyle::None);
        let dotted = border(0.5, BorderStyle::Dotted);
        assert_eq!(resolve_border_conflict(none, dotted), dotted);
    }

    #[test]
    fn test_auto_columns_below_max_use_spread() {
        let mut map = map_with(&[
            (10.0, 110.0, ColumnSizing::Auto),
            (10.0, 10.0, ColumnSizing::Auto),
        ]);
        let total = map.assign_widths(70.0);
        assert!((total - 70.0).abs() < 0.01);
        let widths = used(&map);
        assert!((widths[0] - 60.0).abs() < 0.01);
        assert!((widths[1] - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_auto_columns_above_max_scale_by_max() {
        let mut map = map_with(&[
            (10.0, 100.0, ColumnSizing::Auto),
            (10.0, 300.0, ColumnSizing::Auto),
        ]);
        let _ = map.assign_widths(800.0);
        let widths = used(&map);
        assert!((widths[0] - 200.0).abs() < 0.01);
        assert!((widths[1] - 600.0).abs() < 0.01);
    }

    #[test]
    fn test_all_absolute_scale_by_min() {
        let mut map = map_with(&[
            (100.0, 100.0, ColumnSizing::Absolute(100.0)),
            (300.0, 300.0, ColumnSizing::Absolute(300.0)),
        ]);
        let _ = map.assign_widths(800.0);
        let widths = used(&map);
        assert!((widths[0] - 200.0).abs() < 0.01);
        assert!((widths[1] - 600.0).abs() < 0.01);
    }

    #[test]
    fn test_percent_and_auto_column() {
        let mut map = map_with(&[
            (50.0, 80.0, ColumnSizing::Percent(30.0)),
            (50.0, 200.0, ColumnSizing::Auto),
        ]);
        let total = map.assign_widths(400.0);
        assert!((total - 400.0).abs() < 0.01);
        let widths = used(&map);
        assert!((widths[0] - 120.0).abs() < 0.01);
        assert!((widths[1] - 280.0).abs() < 0.01);
    }

    #[test]
    fn test_percent_over_hundred_is_normalized() {
        let mut map = map_with(&[
            (0.0, 10.0, ColumnSizing::Percent(150.0)),
            (0.0, 10.0, ColumnSizing::Percent(50.0)),
        ]);
        let _ = map.assign_widths(200.0);
        let widths = used(&map);
        assert!((widths[0] - 150.0).abs() < 0.01);
        assert!((widths[1] - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_distribution_respects_minimums_and_sums_to_width() {
        let mut map = map_with(&[
            (120.0, 150.0, ColumnSizing::Percent(10.0)),
            (40.0, 60.0, ColumnSizing::Absolute(40.0)),
            (30.0, 500.0, ColumnSizing::Auto),
        ]);
        map.spacing = (2.0, 0.0);
        let total = map.assign_widths(400.0);
        let sum: f32 = used(&map).iter().sum();
        assert!((sum + map.width_delta() - total).abs() < 0.01);
        assert!((total - 400.0).abs() < 0.01);
        for column in map.columns() {
            assert!(column.used_width + 0.01 >= column.min);
        }
    }

    #[test]
    fn test_locked_copy_keeps_widths() {
        let mut map = map_with(&[(10.0, 10.0, ColumnSizing::Auto)]);
        let _ = map.assign_widths(90.0);
        let copy = map.locked_copy();
        assert!(copy.is_locked());
        assert!((copy.columns()[0].used_width - 90.0).abs() < 0.01);
    }
}
