//! The frame tree.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Frames live in an arena indexed by [`FrameId`]. Parent, child and sibling
//! links are ids, so detaching and re-attaching subtrees during page splits
//! never leaves a dangling reference; a stale id simply reports
//! [`LayoutError::DetachedFrame`].

mod builder;
mod edit;

pub use builder::{BoxNode, ImageSource};
pub use edit::ResetSummary;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::cellmap::Cellmap;
use crate::error::{LayoutError, Result};
use crate::geometry::{BoxRects, Point};
use crate::line_box::LineBox;
use crate::style::{Display, ListStylePosition, SpecifiedStyle, UsedValues};

/// Stable handle of a frame, unique within its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId(pub usize);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What generated the frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameKind {
    /// An element (or anonymous) box.
    Element {
        /// Element name, for debugging output.
        tag: Option<String>,
    },
    /// A run of character data.
    Text {
        /// The characters; normalized in place on first reflow.
        text: String,
    },
    /// A replaced image.
    Image {
        /// Image source key handed back to the canvas.
        src: String,
        /// Intrinsic width in points.
        width: f32,
        /// Intrinsic height in points.
        height: f32,
    },
    /// The marker box of a list item.
    ListMarker,
    /// One page box.
    Page,
}

/// Layout and paint strategy of a frame.
///
/// Chosen once from `display` when the frame is created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Behavior {
    /// Block container (also inline-blocks, floats, absolutely positioned boxes).
    Block,
    /// Inline box.
    Inline,
    /// Text run.
    Text,
    /// Replaced image.
    Image,
    /// List item marker.
    ListMarker,
    /// Table wrapper.
    Table,
    /// Row group (`thead`, `tbody`, `tfoot`).
    TableRowGroup,
    /// Table row.
    TableRow,
    /// Table cell.
    TableCell,
    /// Page box.
    Page,
    /// `display: none`; generates nothing.
    Null,
}

impl Behavior {
    /// [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// "Otherwise, if 'position' has the value 'absolute' or 'fixed', the box
    /// is absolutely positioned, the computed value of 'float' is 'none', and
    /// display is set according to the table below."
    #[must_use]
    pub fn select(kind: &FrameKind, style: &SpecifiedStyle) -> Self {
        match kind {
            FrameKind::Page => return Self::Page,
            FrameKind::Text { .. } => return Self::Text,
            FrameKind::ListMarker => return Self::ListMarker,
            FrameKind::Image { .. } if style.display != Display::None => return Self::Image,
            _ => {}
        }
        match style.display {
            Display::None => Self::Null,
            Display::Inline if style.is_floating() || style.is_absolute() => Self::Block,
            Display::Inline => Self::Inline,
            Display::Block | Display::InlineBlock | Display::ListItem => Self::Block,
            Display::Table => Self::Table,
            Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup => {
                Self::TableRowGroup
            }
            Display::TableRow => Self::TableRow,
            Display::TableCell => Self::TableCell,
        }
    }
}

/// The containing block pushed down by the parent.
///
/// `height` is `None` while the parent's height depends on its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ContainingBlock {
    /// Left edge.
    pub x: f32,
    /// Top edge (where this frame starts).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height, when definite.
    pub height: Option<f32>,
}

/// Page-split state of a fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// An earlier fragment of the same element precedes this one.
    pub continues_before: bool,
    /// A later fragment of the same element follows this one.
    pub continues_after: bool,
}

/// One node of the layout tree.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Frame {
    /// This frame's id.
    pub id: FrameId,
    /// What generated it.
    pub kind: FrameKind,
    /// Layout/paint strategy.
    pub behavior: Behavior,
    /// Specified style, shared between fragments.
    pub style: Rc<SpecifiedStyle>,
    /// Used values written by reflow.
    pub used: UsedValues,
    /// Containing block set by the parent.
    pub containing_block: ContainingBlock,
    /// Margin-box top-left corner; `None` until laid out.
    pub position: Option<Point>,
    /// Opacity multiplied down from all ancestors.
    pub opacity: f32,
    /// Line boxes of a block container, rebuilt by every reflow.
    pub lines: Vec<LineBox>,
    /// Grid of a table frame.
    pub cellmap: Option<Box<Cellmap>>,
    /// Counters scoped to this frame.
    pub counters: BTreeMap<String, i32>,
    /// Page-split state.
    pub fragment: Fragment,
    /// A `::before`/`::after` box whose text comes from `content`.
    pub generated: bool,
    /// `content` has been turned into child frames.
    pub content_synthesized: bool,
    /// Created by content synthesis; discarded on reset.
    pub synthetic: bool,
    /// Whitespace and `text-transform` have been applied to a text frame.
    pub text_prepared: bool,
    /// A per-page copy of a fixed-position frame.
    pub repeated: bool,
    /// Cached min/max content widths.
    pub min_max: Option<(f32, f32)>,
    parent: Option<FrameId>,
    first_child: Option<FrameId>,
    last_child: Option<FrameId>,
    prev_sibling: Option<FrameId>,
    next_sibling: Option<FrameId>,
    live: bool,
}

impl Frame {
    fn new(id: FrameId, kind: FrameKind, style: Rc<SpecifiedStyle>) -> Self {
        let behavior = Behavior::select(&kind, &style);
        let opacity = style.opacity.clamp(0.0, 1.0);
        Self {
            id,
            kind,
            behavior,
            style,
            used: UsedValues::default(),
            containing_block: ContainingBlock::default(),
            position: None,
            opacity,
            lines: Vec::new(),
            cellmap: None,
            counters: BTreeMap::new(),
            fragment: Fragment::default(),
            generated: false,
            content_synthesized: false,
            synthetic: false,
            text_prepared: false,
            repeated: false,
            min_max: None,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            live: true,
        }
    }

    /// The four boxes derived from position, content size and used edges.
    #[must_use]
    pub fn rects(&self) -> BoxRects {
        BoxRects::from_parts(
            self.position.unwrap_or_default(),
            self.used.width,
            self.used.height,
            self.used.margin,
            self.used.border,
            self.used.padding,
        )
    }

    /// Width of the margin box.
    #[must_use]
    pub fn margin_width(&self) -> f32 {
        self.used.width
            + self.used.margin.horizontal()
            + self.used.border.horizontal()
            + self.used.padding.horizontal()
    }

    /// Height of the margin box.
    #[must_use]
    pub fn margin_height(&self) -> f32 {
        self.used.height
            + self.used.margin.vertical()
            + self.used.border.vertical()
            + self.used.padding.vertical()
    }

    /// Text of a text frame.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            FrameKind::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Floated boxes are taken out of the line and shifted to a side.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.behavior != Behavior::Text && self.style.is_floating()
    }

    /// Absolutely or fixed positioned.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.behavior != Behavior::Text && self.style.is_absolute()
    }

    /// Neither floated nor absolutely positioned.
    #[must_use]
    pub fn is_in_flow(&self) -> bool {
        !self.is_floating() && !self.is_absolute() && self.behavior != Behavior::Null
    }

    /// [§ 9.2.2 Inline-level elements](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// Participates in an inline formatting context.
    #[must_use]
    pub fn is_inline_level(&self) -> bool {
        if !self.is_in_flow() {
            return false;
        }
        match self.behavior {
            Behavior::Text | Behavior::Inline => true,
            Behavior::Image => matches!(self.style.display, Display::Inline | Display::InlineBlock),
            Behavior::Block => self.style.display == Display::InlineBlock,
            Behavior::ListMarker => self.style.list_style_position == ListStylePosition::Inside,
            _ => false,
        }
    }

    /// Participates in a block formatting context.
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        self.is_in_flow()
            && !self.is_inline_level()
            && matches!(
                self.behavior,
                Behavior::Block | Behavior::Table | Behavior::Image
            )
    }

    /// Atomic inline-level box: laid out as one unit on a line.
    #[must_use]
    pub fn is_atomic_inline(&self) -> bool {
        self.is_inline_level() && matches!(self.behavior, Behavior::Block | Behavior::Image)
    }

    /// Whitespace-only text that collapses away entirely.
    #[must_use]
    pub fn is_collapsible_whitespace(&self) -> bool {
        self.text().is_some_and(|t| {
            self.style.white_space.collapses_spaces()
                && !self.style.white_space.preserves_newlines()
                && t.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
        })
    }
}

/// Arena owning every frame of a document.
#[derive(Debug, Default)]
pub struct FrameTree {
    frames: Vec<Frame>,
}

impl FrameTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached frame.
    pub fn create(&mut self, kind: FrameKind, style: Rc<SpecifiedStyle>) -> FrameId {
        let id = FrameId(self.frames.len());
        self.frames.push(Frame::new(id, kind, style));
        id
    }

    /// Allocate a detached element frame.
    pub fn create_element(&mut self, tag: &str, style: SpecifiedStyle) -> FrameId {
        self.create(
            FrameKind::Element {
                tag: Some(tag.to_string()),
            },
            Rc::new(style),
        )
    }

    /// Allocate a detached text frame.
    pub fn create_text(&mut self, text: &str, style: Rc<SpecifiedStyle>) -> FrameId {
        self.create(
            FrameKind::Text {
                text: text.to_string(),
            },
            style,
        )
    }

    /// Number of slots ever allocated (live or disposed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if no frame was ever allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns true if `id` names a live frame.
    #[must_use]
    pub fn is_live(&self, id: FrameId) -> bool {
        self.frames.get(id.0).is_some_and(|f| f.live)
    }

    /// Borrow a live frame.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn frame(&self, id: FrameId) -> Result<&Frame> {
        self.frames
            .get(id.0)
            .filter(|f| f.live)
            .ok_or(LayoutError::DetachedFrame(id))
    }

    /// Mutably borrow a live frame.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn frame_mut(&mut self, id: FrameId) -> Result<&mut Frame> {
        self.frames
            .get_mut(id.0)
            .filter(|f| f.live)
            .ok_or(LayoutError::DetachedFrame(id))
    }

    /// Shared style of a frame.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn style(&self, id: FrameId) -> Result<Rc<SpecifiedStyle>> {
        Ok(Rc::clone(&self.frame(id)?.style))
    }

    /// Get the parent of a frame.
    #[must_use]
    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.frame(id).ok().and_then(|f| f.parent)
    }

    /// Get the first child of a frame.
    #[must_use]
    pub fn first_child(&self, id: FrameId) -> Option<FrameId> {
        self.frame(id).ok().and_then(|f| f.first_child)
    }

    /// Get the last child of a frame.
    #[must_use]
    pub fn last_child(&self, id: FrameId) -> Option<FrameId> {
        self.frame(id).ok().and_then(|f| f.last_child)
    }

    /// Get the next sibling of a frame.
    #[must_use]
    pub fn next_sibling(&self, id: FrameId) -> Option<FrameId> {
        self.frame(id).ok().and_then(|f| f.next_sibling)
    }

    /// Get the previous sibling of a frame.
    #[must_use]
    pub fn prev_sibling(&self, id: FrameId) -> Option<FrameId> {
        self.frame(id).ok().and_then(|f| f.prev_sibling)
    }

    /// Iterate over the children of a frame in document order.
    ///
    /// The iterator follows sibling links lazily; collect first when the loop
    /// body edits the tree.
    #[must_use]
    pub fn children(&self, id: FrameId) -> Children<'_> {
        Children {
            tree: self,
            current: self.first_child(id),
        }
    }

    /// Collect the children of a frame.
    #[must_use]
    pub fn child_ids(&self, id: FrameId) -> Vec<FrameId> {
        self.children(id).collect()
    }

    /// Iterate over all ancestors of a frame, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: FrameId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// `id` and every descendant, in document (pre-)order.
    #[must_use]
    pub fn descendants(&self, id: FrameId) -> Vec<FrameId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.is_live(current) {
                continue;
            }
            out.push(current);
            let mut children = self.child_ids(current);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Check if `descendant` is a strict descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: FrameId, ancestor: FrameId) -> bool {
        self.ancestors(descendant).any(|a| a == ancestor)
    }

    /// Nearest ancestor (or self) with the given behavior.
    #[must_use]
    pub fn closest(&self, id: FrameId, behavior: Behavior) -> Option<FrameId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|a| self.frame(*a).is_ok_and(|f| f.behavior == behavior))
    }

    /// Set the containing block pushed down by the parent.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn set_containing_block(&mut self, id: FrameId, cb: ContainingBlock) -> Result<()> {
        self.frame_mut(id)?.containing_block = cb;
        Ok(())
    }

    /// The four boxes of a frame.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn rects(&self, id: FrameId) -> Result<BoxRects> {
        Ok(self.frame(id)?.rects())
    }

    /// Shift a laid-out subtree, including its line boxes and cellmap.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn translate(&mut self, id: FrameId, dx: f32, dy: f32) -> Result<()> {
        if dx == 0.0 && dy == 0.0 {
            return Ok(());
        }
        for node in self.descendants(id) {
            let frame = self.frame_mut(node)?;
            if let Some(pos) = frame.position.as_mut() {
                pos.x += dx;
                pos.y += dy;
            }
            frame.containing_block.x += dx;
            frame.containing_block.y += dy;
            if let Some(sp) = frame.used.static_position.as_mut() {
                sp.x += dx;
                sp.y += dy;
            }
            for line in &mut frame.lines {
                line.y += dy;
            }
            if let Some(cellmap) = frame.cellmap.as_mut() {
                cellmap.translate(dx, dy);
            }
        }
        Ok(())
    }
}

/// Iterator over the children of a frame.
pub struct Children<'a> {
    tree: &'a FrameTree,
    current: Option<FrameId>,
}

impl Iterator for Children<'_> {
    type Item = FrameId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Iterator over the ancestors of a frame.
pub struct Ancestors<'a> {
    tree: &'a FrameTree,
    current: Option<FrameId>,
}

impl Iterator for Ancestors<'_> {
    type Item = FrameId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
