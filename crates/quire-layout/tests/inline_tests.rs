//! Integration tests for line boxes, text breaking and alignment.
//!
//! Glyphs are 6pt wide and lines 14.4pt tall at the default 12pt size.

use std::rc::Rc;

use quire_layout::style::{
    Display, Length, LengthOrAuto, SpecifiedStyle, TextAlign, WhiteSpace,
};
use quire_layout::{ApproximateFontMetrics, Document, FrameId, FrameKind, FrameTree, LayoutConfig};

fn element(tree: &mut FrameTree, parent: Option<FrameId>, style: SpecifiedStyle) -> FrameId {
    let id = tree.create_element("p", style);
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

/// A block `width` points wide with the given alignment.
fn paragraph(width: f32, align: TextAlign) -> SpecifiedStyle {
    let mut style = SpecifiedStyle::block();
    style.width = LengthOrAuto::pt(width);
    style.text_align = align;
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
fn test_text_breaks_after_last_fitting_space() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, paragraph(60.0, TextAlign::Left));
    let head = text(&mut tree, root, "aaaa bbbb cccc");

    let doc = layout(tree, root);
    let t = doc.tree();
    assert_eq!(t.frame(head).unwrap().text(), Some("aaaa bbbb "));
    let tail = t.next_sibling(head).unwrap();
    let tail_frame = t.frame(tail).unwrap();
    assert_eq!(tail_frame.text(), Some("cccc"));
    let origin = tail_frame.position.unwrap();
    assert_close(origin.x, 36.0);
    assert_close(origin.y, 36.0 + 14.4);
}

#[test]
fn test_leading_spaces_are_dropped_at_line_start() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, paragraph(540.0, TextAlign::Left));
    let run = text(&mut tree, root, "   lead");

    let doc = layout(tree, root);
    let f = doc.tree().frame(run).unwrap();
    assert_eq!(f.text(), Some("lead"));
    assert_close(f.used.width, 24.0);
}

#[test]
fn test_justify_spreads_slack_over_word_gaps() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, paragraph(60.0, TextAlign::Justify));
    let head = text(&mut tree, root, "aa bb cc dd");

    let doc = layout(tree, root);
    let t = doc.tree();
    // "aa bb cc" is 48pt: 12pt of slack over two gaps.
    let first = t.frame(head).unwrap();
    assert_close(first.used.justify_spacing, 6.0);
    let last = t.frame(t.next_sibling(head).unwrap()).unwrap();
    assert_eq!(last.text(), Some("dd"));
    assert_close(last.used.justify_spacing, 0.0);
}

#[test]
fn test_center_and_right_alignment() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let centered = element(&mut tree, Some(root), paragraph(60.0, TextAlign::Center));
    let c = text(&mut tree, centered, "ab");
    let right = element(&mut tree, Some(root), paragraph(60.0, TextAlign::Right));
    let r = text(&mut tree, right, "ab");

    let doc = layout(tree, root);
    assert_close(doc.tree().frame(c).unwrap().position.unwrap().x, 36.0 + 24.0);
    assert_close(doc.tree().frame(r).unwrap().position.unwrap().x, 36.0 + 48.0);
}

#[test]
fn test_preserved_newline_forces_a_line() {
    let mut tree = FrameTree::new();
    let mut style = paragraph(540.0, TextAlign::Left);
    style.white_space = WhiteSpace::Pre;
    let root = element(&mut tree, None, style);
    let head = text(&mut tree, root, "ab\ncd");

    let doc = layout(tree, root);
    let t = doc.tree();
    assert_eq!(t.frame(head).unwrap().text(), Some("ab"));
    let tail = t.frame(t.next_sibling(head).unwrap()).unwrap();
    assert_eq!(tail.text(), Some("cd"));
    assert_close(tail.position.unwrap().y, 36.0 + 14.4);
    assert_eq!(t.frame(root).unwrap().lines.len(), 2);
}

#[test]
fn test_nowrap_overflows_instead_of_breaking() {
    let mut tree = FrameTree::new();
    let mut style = paragraph(30.0, TextAlign::Left);
    style.white_space = WhiteSpace::Nowrap;
    let root = element(&mut tree, None, style);
    let run = text(&mut tree, root, "aaaa bbbb cccc");

    let doc = layout(tree, root);
    let t = doc.tree();
    assert!(t.next_sibling(run).is_none());
    assert_close(t.frame(run).unwrap().used.width, 84.0);
    assert_eq!(t.frame(root).unwrap().lines.len(), 1);
}

#[test]
fn test_tall_image_lowers_the_baseline() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, SpecifiedStyle::block());
    let words = text(&mut tree, root, "ab ");
    let image = tree.create(
        FrameKind::Image {
            src: "logo".to_string(),
            width: 20.0,
            height: 30.0,
        },
        Rc::new(SpecifiedStyle::default()),
    );
    tree.append_child(root, image).unwrap();

    let doc = layout(tree, root);
    let t = doc.tree();
    // The image sits on the baseline, 30pt below the line top; the strut's
    // 4.8pt descent hangs below it.
    assert_close(t.frame(root).unwrap().used.height, 34.8);
    assert_close(t.frame(image).unwrap().position.unwrap().y, 36.0);
    assert_close(t.frame(words).unwrap().position.unwrap().y, 36.0 + 30.0 - 9.6);
    assert_close(t.frame(image).unwrap().position.unwrap().x, 36.0 + 18.0);
}

#[test]
fn test_wrapping_empty_inline_splits_its_ancestor() {
    let mut tree = FrameTree::new();
    let root = element(&mut tree, None, paragraph(100.0, TextAlign::Left));
    let span = tree.create_element("span", SpecifiedStyle::default());
    tree.append_child(root, span).unwrap();
    let _ = text(&mut tree, span, "aaaaaaaaaaaaaaa");
    let mut padded = SpecifiedStyle::default();
    padded.padding_left = Length::pt(30.0);
    let empty = tree.create_element("i", padded);
    tree.append_child(span, empty).unwrap();

    let doc = layout(tree, root);
    let t = doc.tree();
    assert_eq!(t.frame(root).unwrap().lines.len(), 2);

    let continuation = t.next_sibling(span).unwrap();
    assert_eq!(t.parent(empty), Some(continuation));
    assert!(t.frame(span).unwrap().fragment.continues_after);
    assert!(t.frame(continuation).unwrap().fragment.continues_before);

    let first = t.frame(span).unwrap().rects().border;
    assert_close(first.y, 36.0);
    assert_close(first.width, 90.0);
    let moved = t.frame(empty).unwrap().rects().border;
    assert_close(moved.x, 36.0);
    assert_close(moved.y, 36.0 + 14.4);
    let second = t.frame(continuation).unwrap().rects().border;
    assert_close(second.x, 36.0);
    assert!(second.width >= 30.0 - 0.01);
}
