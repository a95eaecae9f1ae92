//! Integration tests for absolute, fixed and relative positioning.

use quire_layout::geometry::Point;
use quire_layout::style::{LengthOrAuto, Position, SpecifiedStyle};
use quire_layout::{ApproximateFontMetrics, Document, FrameId, FrameTree, LayoutConfig};

fn element(tree: &mut FrameTree, parent: Option<FrameId>, style: SpecifiedStyle) -> FrameId {
    let id = tree.create_element("div", style);
    if let Some(parent) = parent {
        tree.append_child(parent, id).unwrap();
    }
    id
}

fn block_of_height(height: f32) -> SpecifiedStyle {
    let mut style = SpecifiedStyle::block();
    style.height = LengthOrAuto::pt(height);
    style
}

/// An absolutely positioned 100x50 box.
fn absolute_box() -> SpecifiedStyle {
    let mut style = SpecifiedStyle::block();
    style.position = Position::Absolute;
    style.width = LengthOrAuto::pt(100.0);
    style.height = LengthOrAuto::pt(50.0);
    style
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
fn test_absolute_offsets_from_page_area() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut style = absolute_box();
    style.top = LengthOrAuto::pt(10.0);
    style.left = LengthOrAuto::pt(20.0);
    let abs = element(&mut tree, Some(root), style);

    let doc = layout(tree, root);
    let border = doc.tree().frame(abs).unwrap().rects().border;
    assert_close(border.x, 56.0);
    assert_close(border.y, 46.0);
    assert_close(border.width, 100.0);
    assert_close(border.height, 50.0);
}

#[test]
fn test_right_and_bottom_anchor_to_far_edges() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut style = absolute_box();
    style.right = LengthOrAuto::pt(10.0);
    style.bottom = LengthOrAuto::pt(10.0);
    let abs = element(&mut tree, Some(root), style);

    let doc = layout(tree, root);
    let border = doc.tree().frame(abs).unwrap().rects().border;
    assert_close(border.x, 36.0 + 540.0 - 10.0 - 100.0);
    assert_close(border.y, 36.0 + 720.0 - 10.0 - 50.0);
}

#[test]
fn test_left_and_right_stretch_auto_width() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut style = absolute_box();
    style.width = LengthOrAuto::Auto;
    style.left = LengthOrAuto::pt(40.0);
    style.right = LengthOrAuto::pt(100.0);
    let abs = element(&mut tree, Some(root), style);

    let doc = layout(tree, root);
    assert_close(doc.tree().frame(abs).unwrap().used.width, 400.0);
}

#[test]
fn test_absolute_box_does_not_move_later_siblings() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = element(&mut tree, Some(root), absolute_box());
    let after = element(&mut tree, Some(root), block_of_height(10.0));

    let doc = layout(tree, root);
    assert_close(doc.tree().frame(after).unwrap().rects().border.y, 36.0);
    assert_close(doc.tree().frame(root).unwrap().used.height, 10.0);
}

#[test]
fn test_auto_offsets_use_static_position() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = element(&mut tree, Some(root), block_of_height(20.0));
    let abs = element(&mut tree, Some(root), absolute_box());

    let doc = layout(tree, root);
    let f = doc.tree().frame(abs).unwrap();
    assert_eq!(f.used.static_position, Some(Point::new(36.0, 56.0)));
    assert_close(f.rects().border.y, 56.0);
    assert_close(f.rects().border.x, 36.0);
}

#[test]
fn test_relative_container_is_the_containing_block() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = element(&mut tree, Some(root), block_of_height(20.0));
    let mut container_style = block_of_height(100.0);
    container_style.position = Position::Relative;
    container_style.margin_left = LengthOrAuto::pt(50.0);
    let container = element(&mut tree, Some(root), container_style);
    let mut style = absolute_box();
    style.top = LengthOrAuto::pt(5.0);
    style.left = LengthOrAuto::pt(5.0);
    let abs = element(&mut tree, Some(container), style);

    let doc = layout(tree, root);
    let border = doc.tree().frame(abs).unwrap().rects().border;
    assert_close(border.x, 36.0 + 50.0 + 5.0);
    assert_close(border.y, 36.0 + 20.0 + 5.0);
}

#[test]
fn test_relative_offset_shifts_only_the_box() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut style = block_of_height(10.0);
    style.position = Position::Relative;
    style.top = LengthOrAuto::pt(5.0);
    style.left = LengthOrAuto::pt(7.0);
    let shifted = element(&mut tree, Some(root), style);
    let after = element(&mut tree, Some(root), block_of_height(10.0));

    let doc = layout(tree, root);
    let f = doc.tree().frame(shifted).unwrap();
    assert_eq!(f.used.relative_offset, Point::new(7.0, 5.0));
    assert_close(f.rects().border.x, 43.0);
    assert_close(f.rects().border.y, 41.0);
    assert_close(doc.tree().frame(after).unwrap().rects().border.y, 46.0);
}

#[test]
fn test_right_offset_moves_left() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut style = block_of_height(10.0);
    style.position = Position::Relative;
    style.right = LengthOrAuto::pt(6.0);
    let shifted = element(&mut tree, Some(root), style);

    let doc = layout(tree, root);
    assert_close(doc.tree().frame(shifted).unwrap().rects().border.x, 30.0);
}

#[test]
fn test_fixed_box_uses_the_page_area() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut container_style = block_of_height(100.0);
    container_style.position = Position::Relative;
    container_style.margin_top = LengthOrAuto::pt(200.0);
    let container = element(&mut tree, Some(root), container_style);
    let mut style = absolute_box();
    style.position = Position::Fixed;
    style.top = LengthOrAuto::pt(0.0);
    style.left = LengthOrAuto::pt(0.0);
    let fixed = element(&mut tree, Some(container), style);

    let doc = layout(tree, root);
    let border = doc.tree().frame(fixed).unwrap().rects().border;
    assert_close(border.x, 36.0);
    assert_close(border.y, 36.0);
}
