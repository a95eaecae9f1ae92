//! Integration tests for paint order, clips, transforms and opacity.

use std::rc::Rc;

use quire_layout::paint::{PaintCommand, transform_matrix};
use quire_layout::style::{
    Color, Display, Length, LengthOrAuto, Overflow, Position, SpecifiedStyle, TransformFunction,
    Visibility,
};
use quire_layout::{
    ApproximateFontMetrics, Document, FrameId, FrameTree, LayoutConfig, RecordingCanvas, Renderer,
};

const RED: Color = Color::rgb(255, 0, 0);
const GREEN: Color = Color::rgb(0, 128, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

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

/// A 10pt tall block filled with `color`.
fn filled(color: Color) -> SpecifiedStyle {
    let mut style = SpecifiedStyle::block();
    style.height = LengthOrAuto::pt(10.0);
    style.background_color = Some(color);
    style
}

fn render(tree: FrameTree, root: FrameId) -> RecordingCanvas {
    let doc = Document::new(tree, root, LayoutConfig::default());
    let mut canvas = RecordingCanvas::new();
    let _ = doc.render(&ApproximateFontMetrics, &mut canvas).unwrap();
    canvas
}

fn fill_colors(canvas: &RecordingCanvas) -> Vec<Color> {
    canvas
        .commands()
        .iter()
        .filter_map(|c| match c {
            PaintCommand::FillRect { color, .. } => Some(*color),
            _ => None,
        })
        .collect()
}

/// The command names, for asserting on brackets.
fn ops(canvas: &RecordingCanvas) -> Vec<String> {
    canvas
        .commands()
        .iter()
        .map(|c| serde_json::to_value(c).unwrap()["op"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_stack_buckets_paint_in_z_order() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut above = filled(RED);
    above.position = Position::Relative;
    above.z_index = Some(2);
    let _ = element(&mut tree, Some(root), above);
    let _ = element(&mut tree, Some(root), filled(GREEN));
    let mut below = filled(BLUE);
    below.position = Position::Relative;
    below.z_index = Some(-5);
    let _ = element(&mut tree, Some(root), below);

    let canvas = render(tree, root);
    assert_eq!(fill_colors(&canvas), vec![BLUE, GREEN, RED]);
}

#[test]
fn test_positioned_boxes_paint_after_static_ones() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut positioned = filled(RED);
    positioned.position = Position::Relative;
    let _ = element(&mut tree, Some(root), positioned);
    let _ = element(&mut tree, Some(root), filled(GREEN));

    let canvas = render(tree, root);
    assert_eq!(fill_colors(&canvas), vec![GREEN, RED]);
}

#[test]
fn test_overflow_hidden_brackets_children_with_a_clip() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut clipped = SpecifiedStyle::block();
    clipped.overflow = Overflow::Hidden;
    let container = element(&mut tree, Some(root), clipped);
    let _ = text(&mut tree, container, "inside");

    let canvas = render(tree, root);
    let ops = ops(&canvas);
    let push = ops.iter().position(|o| o == "push_clip").unwrap();
    assert_eq!(ops[push + 1], "text");
    assert_eq!(ops[push + 2], "pop_clip");
}

#[test]
fn test_transform_is_bracketed_by_save_and_restore() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut moved = filled(RED);
    moved.transform = vec![TransformFunction::Translate(Length::pt(10.0), Length::pt(0.0))];
    let moved_id = element(&mut tree, Some(root), moved);

    let mut doc = Document::new(tree, root, LayoutConfig::default());
    let pages = doc.layout(&ApproximateFontMetrics).unwrap();
    let matrix = transform_matrix(doc.tree().frame(moved_id).unwrap());
    assert!((matrix.0[4] - 10.0).abs() < 0.01);
    assert!(matrix.0[5].abs() < 0.01);

    let mut canvas = RecordingCanvas::new();
    Renderer::paint_page(doc.tree(), pages[0], &mut canvas).unwrap();
    assert_eq!(ops(&canvas), ["new_page", "save", "transform", "fill_rect", "restore"]);
}

#[test]
fn test_hidden_subtree_paints_nothing() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut hidden = filled(RED);
    hidden.visibility = Visibility::Hidden;
    hidden.height = LengthOrAuto::Auto;
    let container = element(&mut tree, Some(root), hidden);
    let _ = text(&mut tree, container, "secret");
    let _ = text(&mut tree, root, "shown");

    let canvas = render(tree, root);
    assert_eq!(canvas.texts(), vec!["shown"]);
    assert!(fill_colors(&canvas).is_empty());
}

#[test]
fn test_opacity_wraps_the_frame_in_a_group() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let mut faded = filled(GREEN);
    faded.opacity = 0.5;
    let _ = element(&mut tree, Some(root), faded);

    let canvas = render(tree, root);
    assert_eq!(ops(&canvas), ["new_page", "save", "opacity", "fill_rect", "restore"]);
    assert!(
        canvas
            .commands()
            .contains(&PaintCommand::Opacity { value: 0.5 })
    );
}

#[test]
fn test_text_origin_is_on_the_baseline() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = text(&mut tree, root, "hello");

    let canvas = render(tree, root);
    let origin = canvas
        .commands()
        .iter()
        .find_map(|c| match c {
            PaintCommand::Text { origin, .. } => Some(*origin),
            _ => None,
        })
        .unwrap();
    assert!((origin.x - 36.0).abs() < 0.01);
    assert!((origin.y - (36.0 + 9.6)).abs() < 0.01);
}

#[test]
fn test_commands_serialize_with_an_op_tag() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let _ = element(&mut tree, Some(root), filled(BLUE));

    let canvas = render(tree, root);
    let json = serde_json::to_value(canvas.commands()).unwrap();
    assert_eq!(json[0]["op"], "new_page");
    assert_eq!(json[0]["width"], 612.0);
    assert_eq!(json[1]["op"], "fill_rect");
    assert_eq!(json[1]["color"], serde_json::json!(BLUE.to_string()));
}
