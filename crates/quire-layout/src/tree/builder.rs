//! Building a frame tree from a styled box description.
//!
//! [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
//!
//! Styles are assumed to be already cascaded; the builder only adds the boxes
//! CSS generates on its own: list markers, `::before`/`::after` boxes, text
//! runs and the anonymous wrappers that complete a table structure.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{Behavior, FrameId, FrameKind, FrameTree};
use crate::error::Result;
use crate::style::{Display, SpecifiedStyle};

/// Intrinsic description of a replaced image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSource {
    /// Key handed back to the canvas when painting.
    pub src: String,
    /// Intrinsic width in points.
    pub width: f32,
    /// Intrinsic height in points.
    pub height: f32,
}

/// One styled box of input, as produced by an external cascade.
///
/// A node with `text` is a text run and inherits its style from the parent;
/// a node with `image` is a replaced element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxNode {
    /// Element name, for diagnostics.
    pub tag: Option<String>,
    /// Cascaded style.
    pub style: SpecifiedStyle,
    /// Character data of a text run.
    pub text: Option<String>,
    /// Replaced image content.
    pub image: Option<ImageSource>,
    /// Style of the `::before` pseudo-element, if it generates a box.
    pub before: Option<SpecifiedStyle>,
    /// Style of the `::after` pseudo-element, if it generates a box.
    pub after: Option<SpecifiedStyle>,
    /// Child boxes in document order.
    pub children: Vec<BoxNode>,
}

impl BoxNode {
    /// A text run.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// An element with the given style and children.
    #[must_use]
    pub fn element(tag: &str, style: SpecifiedStyle, children: Vec<Self>) -> Self {
        Self {
            tag: Some(tag.to_string()),
            style,
            children,
            ..Self::default()
        }
    }
}

impl FrameTree {
    /// Build the frames for `node` and its descendants. The returned root is
    /// detached.
    ///
    /// # Errors
    ///
    /// Propagates tree edit failures, which indicate a builder bug.
    pub fn build(&mut self, node: &BoxNode) -> Result<FrameId> {
        self.build_node(node, &SpecifiedStyle::block())
    }

    fn build_node(&mut self, node: &BoxNode, parent_style: &SpecifiedStyle) -> Result<FrameId> {
        if let Some(text) = &node.text {
            let style = SpecifiedStyle::inherit(parent_style, Display::Inline);
            return Ok(self.create_text(text, Rc::new(style)));
        }
        if let Some(image) = &node.image {
            return Ok(self.create(
                FrameKind::Image {
                    src: image.src.clone(),
                    width: image.width,
                    height: image.height,
                },
                Rc::new(node.style.clone()),
            ));
        }

        let id = self.create(
            FrameKind::Element {
                tag: node.tag.clone(),
            },
            Rc::new(node.style.clone()),
        );
        if node.style.display == Display::None {
            return Ok(id);
        }

        if node.style.display == Display::ListItem {
            let marker_style = SpecifiedStyle::inherit(&node.style, Display::Inline);
            let marker = self.create(FrameKind::ListMarker, Rc::new(marker_style));
            self.append_child(id, marker)?;
        }
        if let Some(before) = &node.before {
            let generated = self.generated_box(before);
            self.append_child(id, generated)?;
        }
        for child in &node.children {
            let child_id = self.build_node(child, &node.style)?;
            self.append_child(id, child_id)?;
        }
        if let Some(after) = &node.after {
            let generated = self.generated_box(after);
            self.append_child(id, generated)?;
        }

        self.fix_table_structure(id)?;
        Ok(id)
    }

    fn generated_box(&mut self, style: &SpecifiedStyle) -> FrameId {
        let id = self.create(FrameKind::Element { tag: None }, Rc::new(style.clone()));
        if let Ok(frame) = self.frame_mut(id) {
            frame.generated = true;
        }
        id
    }

    /// Wrap misparented table parts in anonymous boxes.
    fn fix_table_structure(&mut self, id: FrameId) -> Result<()> {
        let behavior = self.frame(id)?.behavior;
        match behavior {
            Behavior::TableRow => {
                self.drop_whitespace(id)?;
                self.wrap_runs(id, Display::TableCell, |b| b != Behavior::TableCell)?;
            }
            Behavior::TableRowGroup => {
                self.drop_whitespace(id)?;
                self.wrap_runs(id, Display::TableRow, |b| b != Behavior::TableRow)?;
            }
            Behavior::Table => {
                self.drop_whitespace(id)?;
                self.wrap_runs(id, Display::TableRowGroup, |b| {
                    b != Behavior::TableRowGroup
                })?;
            }
            _ => {
                self.wrap_runs(id, Display::Table, |b| {
                    matches!(
                        b,
                        Behavior::TableRowGroup | Behavior::TableRow | Behavior::TableCell
                    )
                })?;
            }
        }
        Ok(())
    }

    fn drop_whitespace(&mut self, id: FrameId) -> Result<()> {
        for child in self.child_ids(id) {
            if self.frame(child)?.is_collapsible_whitespace() {
                self.dispose(child)?;
            }
        }
        Ok(())
    }

    /// Move each run of consecutive children matching `needs_wrap` into one
    /// anonymous box with `display`, then complete that box's own structure.
    fn wrap_runs(
        &mut self,
        parent: FrameId,
        display: Display,
        needs_wrap: impl Fn(Behavior) -> bool,
    ) -> Result<()> {
        let parent_style = self.style(parent)?;
        let mut wrapper: Option<FrameId> = None;
        let mut wrappers = Vec::new();
        for child in self.child_ids(parent) {
            let frame = self.frame(child)?;
            let wraps = needs_wrap(frame.behavior) && frame.is_in_flow();
            if !wraps {
                wrapper = None;
                continue;
            }
            let target = match wrapper {
                Some(w) => w,
                None => {
                    let style = SpecifiedStyle::inherit(&parent_style, display);
                    let w = self.create(FrameKind::Element { tag: None }, Rc::new(style));
                    self.insert_before(parent, w, child)?;
                    wrappers.push(w);
                    wrapper = Some(w);
                    w
                }
            };
            self.append_child(target, child)?;
        }
        for w in wrappers {
            self.fix_table_structure(w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(display: Display) -> SpecifiedStyle {
        SpecifiedStyle::with_display(display)
    }

    #[test]
    fn test_list_item_gets_marker_first() {
        let mut tree = FrameTree::new();
        let li = BoxNode::element("li", styled(Display::ListItem), vec![BoxNode::text("a")]);
        let root = tree.build(&li).unwrap();
        let first = tree.first_child(root).unwrap();
        assert_eq!(tree.frame(first).unwrap().behavior, Behavior::ListMarker);
        assert_eq!(tree.child_ids(root).len(), 2);
    }

    #[test]
    fn test_cells_in_block_are_wrapped_in_table_group_row() {
        let mut tree = FrameTree::new();
        let div = BoxNode::element(
            "div",
            SpecifiedStyle::block(),
            vec![
                BoxNode::element("td", styled(Display::TableCell), vec![]),
                BoxNode::element("td", styled(Display::TableCell), vec![]),
            ],
        );
        let root = tree.build(&div).unwrap();
        let table = tree.first_child(root).unwrap();
        assert_eq!(tree.frame(table).unwrap().behavior, Behavior::Table);
        let group = tree.first_child(table).unwrap();
        assert_eq!(tree.frame(group).unwrap().behavior, Behavior::TableRowGroup);
        let row = tree.first_child(group).unwrap();
        assert_eq!(tree.frame(row).unwrap().behavior, Behavior::TableRow);
        assert_eq!(tree.child_ids(row).len(), 2);
    }

    #[test]
    fn test_generated_boxes_surround_children() {
        let mut tree = FrameTree::new();
        let mut p = BoxNode::element("p", SpecifiedStyle::block(), vec![BoxNode::text("x")]);
        p.before = Some(styled(Display::Inline));
        p.after = Some(styled(Display::Inline));
        let root = tree.build(&p).unwrap();
        let kids = tree.child_ids(root);
        assert_eq!(kids.len(), 3);
        assert!(tree.frame(kids[0]).unwrap().generated);
        assert!(tree.frame(kids[2]).unwrap().generated);
    }
}
