//! Integration tests for floats and clearance.

use std::rc::Rc;

use quire_layout::style::{Clear, Display, Float, Length, LengthOrAuto, Overflow, SpecifiedStyle};
use quire_layout::{ApproximateFontMetrics, Document, FrameId, FrameTree, LayoutConfig};

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

fn floated(side: Float, width: f32, height: f32) -> SpecifiedStyle {
    let mut style = SpecifiedStyle::block();
    style.float = side;
    style.width = LengthOrAuto::pt(width);
    style.height = LengthOrAuto::pt(height);
    style
}

fn layout_with(tree: FrameTree, root: FrameId, config: LayoutConfig) -> Document {
    let mut doc = Document::new(tree, root, config);
    let _ = doc.layout(&ApproximateFontMetrics).unwrap();
    doc
}

fn layout(tree: FrameTree, root: FrameId) -> Document {
    layout_with(tree, root, LayoutConfig::default())
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_left_float_shortens_the_line() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let float = element(&mut tree, Some(root), floated(Float::Left, 100.0, 50.0));
    let words = text(&mut tree, root, "beside");

    let doc = layout(tree, root);
    let t = doc.tree();
    let float_box = t.frame(float).unwrap().rects().border;
    assert_close(float_box.x, 36.0);
    assert_close(float_box.y, 36.0);
    let origin = t.frame(words).unwrap().position.unwrap();
    assert_close(origin.x, 136.0);
    assert_close(origin.y, 36.0);
}

#[test]
fn test_right_float_hugs_the_right_edge() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let float = element(&mut tree, Some(root), floated(Float::Right, 100.0, 50.0));
    let words = text(&mut tree, root, "beside");

    let doc = layout(tree, root);
    let t = doc.tree();
    assert_close(t.frame(float).unwrap().rects().border.x, 36.0 + 540.0 - 100.0);
    assert_close(t.frame(words).unwrap().position.unwrap().x, 36.0);
}

#[test]
fn test_floats_stack_side_by_side() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let first = element(&mut tree, Some(root), floated(Float::Left, 100.0, 50.0));
    let second = element(&mut tree, Some(root), floated(Float::Left, 100.0, 20.0));

    let doc = layout(tree, root);
    let t = doc.tree();
    assert_close(t.frame(first).unwrap().rects().border.x, 36.0);
    let second_box = t.frame(second).unwrap().rects().border;
    assert_close(second_box.x, 136.0);
    assert_close(second_box.y, 36.0);
}

#[test]
fn test_float_too_wide_for_the_gap_moves_down() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = element(&mut tree, Some(root), floated(Float::Left, 300.0, 50.0));
    let wide = element(&mut tree, Some(root), floated(Float::Left, 300.0, 20.0));

    let doc = layout(tree, root);
    let wide_box = doc.tree().frame(wide).unwrap().rects().border;
    assert_close(wide_box.x, 36.0);
    assert_close(wide_box.y, 86.0);
}

#[test]
fn test_clear_moves_block_below_float() {
    let mut tree = FrameTree::new();
    let mut root_style = SpecifiedStyle::block();
    root_style.padding_top = Length::pt(1.0);
    let root = element(&mut tree, None, root_style);
    let _ = element(&mut tree, Some(root), floated(Float::Left, 100.0, 50.0));
    let mut cleared_style = SpecifiedStyle::block();
    cleared_style.clear = Clear::Left;
    cleared_style.height = LengthOrAuto::pt(10.0);
    let cleared = element(&mut tree, Some(root), cleared_style);

    let doc = layout(tree, root);
    assert_close(doc.tree().frame(cleared).unwrap().rects().border.y, 37.0 + 50.0);
}

#[test]
fn test_clear_right_ignores_left_floats() {
    let mut tree = FrameTree::new();
    let mut root_style = SpecifiedStyle::block();
    root_style.padding_top = Length::pt(1.0);
    let root = element(&mut tree, None, root_style);
    let _ = element(&mut tree, Some(root), floated(Float::Left, 100.0, 50.0));
    let mut cleared_style = SpecifiedStyle::block();
    cleared_style.clear = Clear::Right;
    cleared_style.height = LengthOrAuto::pt(10.0);
    let cleared = element(&mut tree, Some(root), cleared_style);

    let doc = layout(tree, root);
    assert_close(doc.tree().frame(cleared).unwrap().rects().border.y, 37.0);
}

#[test]
fn test_block_formatting_context_contains_its_floats() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut container_style = SpecifiedStyle::block();
    container_style.overflow = Overflow::Hidden;
    let container = element(&mut tree, Some(root), container_style);
    let _ = element(&mut tree, Some(container), floated(Float::Left, 100.0, 50.0));

    let doc = layout(tree, root);
    assert_close(doc.tree().frame(container).unwrap().used.height, 50.0);
}

#[test]
fn test_exhausted_float_budget_is_reported() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = element(&mut tree, Some(root), floated(Float::Left, 300.0, 50.0));
    let wide = element(&mut tree, Some(root), floated(Float::Left, 300.0, 20.0));

    let config = LayoutConfig {
        float_iteration_limit: 0,
        ..LayoutConfig::default()
    };
    let doc = layout_with(tree, root, config);
    // Placed where it stood, overlapping the gap.
    let wide_box = doc.tree().frame(wide).unwrap().rects().border;
    assert_close(wide_box.y, 36.0);
    assert!(doc.warnings().iter().any(|w| w.component == "float"));
}
