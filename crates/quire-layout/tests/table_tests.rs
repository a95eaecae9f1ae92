//! Integration tests for table grids, column widths and collapsed borders.

use std::rc::Rc;

use quire_layout::reflow::table::cellmap;
use quire_layout::style::{
    BorderCollapse, BorderSide, BorderStyle, Color, Display, Length, LengthOrAuto,
    SpecifiedStyle, VerticalAlign,
};
use quire_layout::{ApproximateFontMetrics, Cellmap, Document, FrameId, FrameTree, LayoutConfig};

fn element(tree: &mut FrameTree, parent: Option<FrameId>, style: SpecifiedStyle) -> FrameId {
    let id = tree.create_element("div", style);
    if let Some(parent) = parent {
        tree.append_child(parent, id).unwrap();
    }
    id
}

fn text(tree: &mut FrameTree, parent: FrameId, content: &str) -> FrameId {
    let style = SpecifiedStyle::inherit(&tree.style(parent).unwrap(), Display::Inline);
    let id = tree.create_text(content, Rc::new(style));
    tree.append_child(parent, id).unwrap();
    id
}

/// A table with one row group under `parent`; returns (table, group).
fn table(tree: &mut FrameTree, parent: Option<FrameId>, style: SpecifiedStyle) -> (FrameId, FrameId) {
    let table = element(tree, parent, style);
    let group = element(
        tree,
        Some(table),
        SpecifiedStyle::with_display(Display::TableRowGroup),
    );
    (table, group)
}

fn row(tree: &mut FrameTree, group: FrameId) -> FrameId {
    element(tree, Some(group), SpecifiedStyle::with_display(Display::TableRow))
}

fn cell(tree: &mut FrameTree, row: FrameId, style: SpecifiedStyle, content: &str) -> FrameId {
    let id = element(tree, Some(row), style);
    if !content.is_empty() {
        let _ = text(tree, id, content);
    }
    id
}

fn cell_style() -> SpecifiedStyle {
    SpecifiedStyle::with_display(Display::TableCell)
}

fn layout(tree: FrameTree, root: FrameId) -> Document {
    let mut doc = Document::new(tree, root, LayoutConfig::default());
    let _ = doc.layout(&ApproximateFontMetrics).unwrap();
    doc
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_percent_column_takes_its_share() {
    let mut tree = FrameTree::new();
    let mut root_style = SpecifiedStyle::block();
    root_style.width = LengthOrAuto::pt(400.0);
    let root = element(&mut tree, None, root_style);
    let (t, group) = table(&mut tree, Some(root), SpecifiedStyle::with_display(Display::Table));
    let r = row(&mut tree, group);
    let mut a_style = cell_style();
    a_style.width = LengthOrAuto::percent(30.0);
    let a = cell(&mut tree, r, a_style, "a");
    let b = cell(&mut tree, r, cell_style(), "abcd efgh");

    let doc = layout(tree, root);
    let tree = doc.tree();
    let map = cellmap(tree, t).unwrap();
    assert_close(map.columns()[0].used_width, 120.0);
    assert_close(map.columns()[1].used_width, 280.0);
    assert_close(tree.frame(t).unwrap().used.width, 400.0);
    assert_close(tree.frame(t).unwrap().used.height, 14.4);
    assert_close(tree.frame(a).unwrap().rects().border.x, 36.0);
    assert_close(tree.frame(b).unwrap().rects().border.x, 156.0);
}

#[test]
fn test_cells_in_a_row_share_its_height() {
    let mut tree = FrameTree::new();
    let mut root_style = SpecifiedStyle::block();
    root_style.width = LengthOrAuto::pt(60.0);
    let root = element(&mut tree, None, root_style);
    let (t, group) = table(&mut tree, Some(root), SpecifiedStyle::with_display(Display::Table));
    let r = row(&mut tree, group);
    let a = cell(&mut tree, r, cell_style(), "aaaa bbbb");
    let mut b_style = cell_style();
    b_style.vertical_align = VerticalAlign::Middle;
    let b = cell(&mut tree, r, b_style, "cc");

    let doc = layout(tree, root);
    let tree = doc.tree();
    // Minimums 24 and 12; the 24pt of slack goes by max minus min.
    let map = cellmap(tree, t).unwrap();
    assert_close(map.columns()[0].used_width, 48.0);
    assert_close(map.columns()[1].used_width, 12.0);

    assert_close(tree.frame(a).unwrap().used.height, 28.8);
    assert_close(tree.frame(b).unwrap().used.height, 28.8);
    let b_text = tree.first_child(b).unwrap();
    assert_close(tree.frame(b_text).unwrap().position.unwrap().y, 36.0 + 7.2);
    let a_text = tree.first_child(a).unwrap();
    assert_close(tree.frame(a_text).unwrap().position.unwrap().y, 36.0);
}

#[test]
fn test_rowspan_cell_covers_both_rows() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let (t, group) = table(&mut tree, Some(root), SpecifiedStyle::with_display(Display::Table));
    let first = row(&mut tree, group);
    let mut a_style = cell_style();
    a_style.rowspan = 2;
    let a = cell(&mut tree, first, a_style, "a");
    let _ = cell(&mut tree, first, cell_style(), "b");
    let second = row(&mut tree, group);
    let c = cell(&mut tree, second, cell_style(), "c");

    let doc = layout(tree, root);
    let tree = doc.tree();
    let map = cellmap(tree, t).unwrap();
    let span = map.span(c).unwrap();
    assert_eq!((span.row, span.column), (1, 1));
    assert_eq!(map.cell_at(1, 0), Some(a));
    assert_eq!(map.rows().len(), 2);

    assert_close(tree.frame(a).unwrap().used.height, 28.8);
    assert_close(tree.frame(c).unwrap().rects().border.y, 36.0 + 14.4);
}

#[test]
fn test_colspan_widens_the_grid() {
    let mut tree = FrameTree::new();
    let (t, group) = table(&mut tree, None, SpecifiedStyle::with_display(Display::Table));
    let first = row(&mut tree, group);
    let mut wide = cell_style();
    wide.colspan = 2;
    let d = cell(&mut tree, first, wide, "");
    let second = row(&mut tree, group);
    let e = cell(&mut tree, second, cell_style(), "");
    let f = cell(&mut tree, second, cell_style(), "");

    let mut map = Cellmap::for_style(&tree.style(t).unwrap());
    map.build(&tree, t).unwrap();
    assert_eq!(map.columns().len(), 2);
    assert_eq!(map.cell_at(0, 1), Some(d));
    assert_eq!(map.cell_at(1, 0), Some(e));
    assert_eq!(map.cell_at(1, 1), Some(f));
    assert_eq!(map.cells_starting_in_row(1), vec![e, f]);
}

#[test]
fn test_border_spacing_separates_cells() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut table_style = SpecifiedStyle::with_display(Display::Table);
    table_style.border_spacing = (4.0, 6.0);
    let (t, group) = table(&mut tree, Some(root), table_style);
    let r = row(&mut tree, group);
    let a = cell(&mut tree, r, cell_style(), "ab");
    let b = cell(&mut tree, r, cell_style(), "cd");

    let doc = layout(tree, root);
    let tree = doc.tree();
    let a_box = tree.frame(a).unwrap().rects().border;
    let b_box = tree.frame(b).unwrap().rects().border;
    assert_close(a_box.x, 40.0);
    assert_close(b_box.x, 56.0);
    assert_close(a_box.y, 42.0);
    // Two 12pt columns and three gaps.
    assert_close(tree.frame(t).unwrap().used.width, 36.0);
    assert_close(tree.frame(t).unwrap().used.height, 6.0 + 14.4 + 6.0);
}

#[test]
fn test_collapsed_border_precedence() {
    let mut tree = FrameTree::new();
    let mut table_style = SpecifiedStyle::with_display(Display::Table);
    table_style.border_collapse = BorderCollapse::Collapse;
    table_style.set_border(BorderSide::solid(1.0, Color::BLACK));
    let (t, group) = table(&mut tree, None, table_style);
    let r = row(&mut tree, group);

    let red = Color::rgb(255, 0, 0);
    let blue = Color::rgb(0, 0, 255);
    let mut a_style = cell_style();
    a_style.border_right = BorderSide {
        width: 3.0,
        style: BorderStyle::Dashed,
        color: Some(red),
    };
    let a = cell(&mut tree, r, a_style, "");
    let mut b_style = cell_style();
    b_style.border_left = BorderSide::solid(3.0, blue);
    b_style.border_top = BorderSide {
        width: 5.0,
        style: BorderStyle::Hidden,
        color: None,
    };
    let b = cell(&mut tree, r, b_style, "");

    let mut map = Cellmap::for_style(&tree.style(t).unwrap());
    map.build(&tree, t).unwrap();

    // Equal widths: solid outranks dashed.
    let shared = map.border(0, 1, false).unwrap();
    assert_eq!(shared.style, BorderStyle::Solid);
    assert_eq!(shared.color, blue);
    assert_close(shared.width, 3.0);

    // Hidden beats the table's solid border.
    assert_eq!(map.border(0, 1, true).unwrap().style, BorderStyle::Hidden);

    // A's own top is none, so the table's border shows.
    let corner = map.border(0, 0, true).unwrap();
    assert_eq!(corner.style, BorderStyle::Solid);
    assert_eq!(corner.color, Color::BLACK);
    assert_close(corner.width, 1.0);

    let a_border = map.cell_border(a).unwrap();
    assert_close(a_border.top, 0.5);
    assert_close(a_border.right, 1.5);
    let b_border = map.cell_border(b).unwrap();
    assert_close(b_border.top, 0.0);
    assert_close(b_border.left, 1.5);
    assert_close(b_border.right, 0.5);

    assert_close(map.outer_border().top, 0.5);
}

#[test]
fn test_collapsed_table_has_no_padding() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut table_style = SpecifiedStyle::with_display(Display::Table);
    table_style.border_collapse = BorderCollapse::Collapse;
    table_style.set_border(BorderSide::solid(2.0, Color::BLACK));
    table_style.set_padding(Length::pt(10.0));
    let (t, group) = table(&mut tree, Some(root), table_style);
    let r = row(&mut tree, group);
    let a = cell(&mut tree, r, cell_style(), "ab");

    let doc = layout(tree, root);
    let tree = doc.tree();
    let f = tree.frame(t).unwrap();
    assert_close(f.used.padding.left, 0.0);
    assert_close(f.used.border.left, 1.0);
    assert_close(tree.frame(a).unwrap().used.border.left, 1.0);
    assert_close(tree.frame(a).unwrap().rects().border.x, 37.0);
}
