//! Integration tests for page breaks, retries and repeated fixed boxes.
//!
//! Pages are 272x172 with 36pt margins: a 200x100 page area at (36, 36).

use std::rc::Rc;

use quire_layout::reflow::table::cellmap;
use quire_layout::reflow::{self, LayoutContext};
use quire_layout::style::{Display, LengthOrAuto, PageBreak, Position, SpecifiedStyle};
use quire_layout::tree::ContainingBlock;
use quire_layout::{
    ApproximateFontMetrics, Behavior, Diagnostics, Document, EdgeSizes, FrameId, FrameTree, LayoutConfig,
    PageConfig, RecordingCanvas,
};

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

fn block_of_height(height: f32) -> SpecifiedStyle {
    let mut style = SpecifiedStyle::block();
    style.height = LengthOrAuto::pt(height);
    style
}

fn small_pages() -> LayoutConfig {
    LayoutConfig::with_page(PageConfig {
        width: 272.0,
        height: 172.0,
        margin: EdgeSizes::uniform(36.0),
    })
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_overflowing_block_moves_to_next_page() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let blocks: Vec<_> = (0..5)
        .map(|_| element(&mut tree, Some(root), block_of_height(30.0)))
        .collect();

    let mut doc = Document::new(tree, root, small_pages());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    assert_eq!(pages.len(), 2);

    let t = doc.tree();
    assert_close(t.frame(blocks[2]).unwrap().rects().border.y, 96.0);
    assert!(t.is_descendant_of(blocks[2], pages[0]));
    // The fourth block would end at 156, past the 136 page bottom.
    assert!(t.is_descendant_of(blocks[3], pages[1]));
    assert_close(t.frame(blocks[3]).unwrap().rects().border.y, 36.0);
    assert_close(t.frame(blocks[4]).unwrap().rects().border.y, 66.0);
    assert!(doc.warnings().is_empty());
}

#[test]
fn test_split_parent_continues_on_next_page() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let section = element(&mut tree, Some(root), SpecifiedStyle::block());
    for _ in 0..4 {
        let _ = element(&mut tree, Some(section), block_of_height(30.0));
    }

    let mut doc = Document::new(tree, root, small_pages());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    assert_eq!(pages.len(), 2);

    let t = doc.tree();
    let first = t.frame(section).unwrap();
    assert!(first.fragment.continues_after);
    assert_close(first.used.height, 90.0);
    // The root splits too: its continuation on page two holds the section's.
    let root_continuation = t.child_ids(pages[1])[0];
    assert!(t.frame(root_continuation).unwrap().fragment.continues_before);
    let continuation = t.child_ids(root_continuation)[0];
    assert_eq!(t.next_sibling(section), None);
    let second = t.frame(continuation).unwrap();
    assert!(second.fragment.continues_before);
    assert_eq!(t.child_ids(continuation).len(), 1);
}

#[test]
fn test_page_break_before_always() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = element(&mut tree, Some(root), block_of_height(10.0));
    let mut forced = block_of_height(10.0);
    forced.page_break_before = PageBreak::Always;
    let second = element(&mut tree, Some(root), forced);

    let mut doc = Document::new(tree, root, small_pages());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(doc.tree().is_descendant_of(second, pages[1]));
    assert_close(doc.tree().frame(second).unwrap().rects().border.y, 36.0);
}

#[test]
fn test_page_break_after_always() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut forced = block_of_height(10.0);
    forced.page_break_after = PageBreak::Always;
    let _ = element(&mut tree, Some(root), forced);
    let second = element(&mut tree, Some(root), block_of_height(10.0));

    let mut doc = Document::new(tree, root, small_pages());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(doc.tree().is_descendant_of(second, pages[1]));
}

#[test]
fn test_break_before_first_content_is_ignored() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut forced = block_of_height(10.0);
    forced.page_break_before = PageBreak::Always;
    let _ = element(&mut tree, Some(root), forced);

    let mut doc = Document::new(tree, root, small_pages());
    assert_eq!(doc.layout(&ApproximateFontMetrics).unwrap().len(), 1);
}

#[test]
fn test_oversized_block_overflows_with_warning() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let tall = element(&mut tree, Some(root), block_of_height(150.0));

    let mut doc = Document::new(tree, root, small_pages());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    assert_eq!(pages.len(), 1);
    assert_close(doc.tree().frame(tall).unwrap().used.height, 150.0);
    assert!(doc.warnings().iter().any(|w| w.component == "page"));
}

#[test]
fn test_reset_then_reflow_reproduces_geometry() {
    let metrics = ApproximateFontMetrics;
    let config = small_pages();
    let mut diagnostics = Diagnostics::new();
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut first = block_of_height(10.0);
    first.margin_bottom = LengthOrAuto::pt(8.0);
    let a = element(&mut tree, Some(root), first);
    let p = element(&mut tree, Some(root), SpecifiedStyle::block());
    let words = text(&mut tree, p, "aaaa bbbb cccc dddd eeee ffff gggg hhhh");

    let cb = ContainingBlock {
        x: 36.0,
        y: 36.0,
        width: 200.0,
        height: Some(100.0),
    };
    let mut run = |tree: &mut FrameTree| {
        let mut ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        ctx.root = Some(root);
        tree.set_containing_block(root, cb).unwrap();
        let flow = reflow::reflow(tree, &mut ctx, root, None).unwrap();
        assert!(!flow.is_break());
        [a, p, words, root].map(|id| tree.frame(id).unwrap().rects().border)
    };

    let before = run(&mut tree);
    let summary = tree.reset(root).unwrap();
    assert!(summary.frames >= 4);
    let f = tree.frame(p).unwrap();
    assert!(f.position.is_none());
    assert!(f.lines.is_empty());

    let after = run(&mut tree);
    assert_eq!(before, after);
}

#[test]
fn test_fixed_box_repeats_on_every_page() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut fixed_style = block_of_height(20.0);
    fixed_style.position = Position::Fixed;
    fixed_style.width = LengthOrAuto::pt(50.0);
    fixed_style.top = LengthOrAuto::pt(0.0);
    fixed_style.left = LengthOrAuto::pt(0.0);
    let fixed = element(&mut tree, Some(root), fixed_style);
    for _ in 0..5 {
        let _ = element(&mut tree, Some(root), block_of_height(30.0));
    }

    let mut doc = Document::new(tree, root, small_pages());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    assert_eq!(pages.len(), 2);

    let t = doc.tree();
    assert!(t.is_descendant_of(fixed, pages[0]));
    assert!(!t.frame(fixed).unwrap().repeated);
    let copy = t
        .children(pages[1])
        .find(|c| t.frame(*c).unwrap().repeated)
        .expect("fixed box copied onto the second page");
    let border = t.frame(copy).unwrap().rects().border;
    assert_close(border.x, 36.0);
    assert_close(border.y, 36.0);
    assert_close(border.width, 50.0);
}

#[test]
fn test_text_flows_across_pages() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    // Six words per 200pt line, six 14.4pt lines per 100pt page.
    let content = "aaaa ".repeat(60);
    let _ = text(&mut tree, root, &content);

    let doc = Document::new(tree, root, small_pages());
    let mut canvas = RecordingCanvas::new();
    let output = doc.render(&ApproximateFontMetrics, &mut canvas).unwrap();
    assert_eq!(output.page_count, 2);
    let words: usize = canvas.texts().iter().map(|t| t.matches("aaaa").count()).sum();
    assert_eq!(words, 60);
}

#[test]
fn test_split_table_keeps_its_column_widths() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let table = element(&mut tree, Some(root), SpecifiedStyle::with_display(Display::Table));
    let group = element(
        &mut tree,
        Some(table),
        SpecifiedStyle::with_display(Display::TableRowGroup),
    );
    let mut rows = Vec::new();
    for _ in 0..8 {
        let row = element(&mut tree, Some(group), SpecifiedStyle::with_display(Display::TableRow));
        let cells = ["a", "bbbbbbbbbbbb"].map(|content| {
            let mut style = SpecifiedStyle::with_display(Display::TableCell);
            style.height = LengthOrAuto::pt(20.0);
            let cell = element(&mut tree, Some(row), style);
            let _ = text(&mut tree, cell, content);
            cell
        });
        rows.push((row, cells));
    }

    let mut doc = Document::new(tree, root, small_pages());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    assert_eq!(pages.len(), 2);

    let t = doc.tree();
    // Five 20pt rows fill the 100pt page area.
    assert!(t.is_descendant_of(rows[4].0, pages[0]));
    assert!(t.is_descendant_of(rows[5].0, pages[1]));

    let continued = t.child_ids(t.child_ids(pages[1])[0])[0];
    assert_eq!(t.frame(continued).unwrap().behavior, Behavior::Table);
    let map = cellmap(t, continued).unwrap();
    assert!(map.is_locked());
    let first = cellmap(t, table).unwrap();
    for (before, after) in first.columns().iter().zip(map.columns()) {
        assert_close(after.x, before.x);
        assert_close(after.used_width, before.used_width);
    }

    for (index, expected_x, expected_width) in [(0, 36.0, 6.0), (1, 42.0, 72.0)] {
        let head = t.frame(rows[0].1[index]).unwrap().rects().border;
        let moved = t.frame(rows[5].1[index]).unwrap().rects().border;
        assert_close(head.x, expected_x);
        assert_close(moved.x, expected_x);
        assert_close(moved.width, expected_width);
        assert_close(moved.y, 36.0);
    }
}
