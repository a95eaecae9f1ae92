//! Reflow: turning styled frames into positioned, sized frames.
//!
//! [§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! Every frame has a [`Behavior`] chosen from its `display` value. [`reflow`]
//! dispatches on it; each behavior lays out its own frame, recursing into
//! children in document order. A child reads its containing block from the
//! frame record the parent filled in, and inline-level frames add themselves
//! to the current line of their block container.
//!
//! When content no longer fits on the page, reflow returns
//! [`Flow::Break`] naming the first frame that belongs on the next page.
//! Every frame on the way up finishes its own geometry with the content laid
//! out so far and passes the signal on.

pub mod absolute;
pub mod align;
pub mod block;
pub mod float;
pub mod generated;
pub mod image;
pub mod inline;
pub mod line;
pub mod list_marker;
pub mod margins;
pub mod page;
pub mod sizing;
pub mod table;
pub mod table_cell;
pub mod table_row;
pub mod table_row_group;
pub mod text;

use quire_common::Diagnostics;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::font::FontMetrics;
use crate::geometry::Point;
use crate::style::{PageBreak, Position, SpecifiedStyle};
use crate::tree::{Behavior, FrameId, FrameTree};

pub use float::{FloatRegistry, PlacedFloat};

/// Outcome of reflowing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    /// The frame and all its content fit.
    Complete,
    /// The page is full; the named frame and everything after it in
    /// document order belong on the next page.
    Break(FrameId),
}

impl Flow {
    /// Returns true for [`Flow::Break`].
    #[must_use]
    pub const fn is_break(self) -> bool {
        matches!(self, Self::Break(_))
    }
}

/// State shared by all frames reflowed on one page.
pub struct LayoutContext<'a> {
    /// Font metrics provider.
    pub metrics: &'a dyn FontMetrics,
    /// Options for this run.
    pub config: &'a LayoutConfig,
    /// Recoverable anomalies.
    pub diagnostics: &'a mut Diagnostics,
    /// Floats placed on this page.
    pub floats: FloatRegistry,
    /// Absolutely positioned frames waiting for their containing block to
    /// finish, one list per open positioned ancestor. Index 0 belongs to the
    /// page.
    pub positioned: Vec<Vec<FrameId>>,
    /// Fixed-position frames met on this page.
    pub fixed: Vec<FrameId>,
    /// The content root of the page; page breaks never move it.
    pub root: Option<FrameId>,
    /// Top edge of the page area.
    pub page_top: f32,
    /// Bottom edge of the page area.
    pub page_bottom: f32,
    /// Something with height has been placed on this page.
    pub has_content: bool,
    /// Current quote nesting depth.
    pub quote_depth: i32,
    /// Depth of subtrees (floats, absolutely positioned boxes, table cells)
    /// that may not cause a page break.
    pub unbreakable: u32,
    float_budget: u32,
}

impl<'a> LayoutContext<'a> {
    /// A context for one page.
    pub fn new(
        metrics: &'a dyn FontMetrics,
        config: &'a LayoutConfig,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        let area = config.page.content_rect();
        Self {
            metrics,
            config,
            diagnostics,
            floats: FloatRegistry::default(),
            positioned: vec![Vec::new()],
            fixed: Vec::new(),
            root: None,
            page_top: area.y,
            page_bottom: area.bottom(),
            has_content: false,
            quote_depth: 0,
            unbreakable: 0,
            float_budget: config.float_iteration_limit,
        }
    }

    /// Take one step from the float-placement budget. Returns false, after
    /// recording a diagnostic, once this pass has used it up.
    pub fn spend_float_step(&mut self) -> bool {
        if self.float_budget == 0 {
            self.diagnostics.warn_once(
                "float",
                "float placement iteration limit reached; placing at current position",
            );
            return false;
        }
        self.float_budget -= 1;
        true
    }

    /// Page breaks are allowed at the current position in the tree.
    #[must_use]
    pub fn breaks_allowed(&self) -> bool {
        self.config.paginate && self.unbreakable == 0
    }

    /// Queue an absolutely positioned frame on the nearest open scope, or a
    /// fixed one on the page.
    pub fn defer_positioned(&mut self, frame: FrameId, position: Position) {
        let scope = if position == Position::Fixed {
            self.fixed.push(frame);
            self.positioned.first_mut()
        } else {
            self.positioned.last_mut()
        };
        if let Some(list) = scope {
            list.push(frame);
        }
    }
}

/// Font family of a style, falling back to the configured default.
#[must_use]
pub fn font_name<'s>(style: &'s SpecifiedStyle, config: &'s LayoutConfig) -> &'s str {
    if style.font_family.is_empty() {
        &config.default_font
    } else {
        &style.font_family
    }
}

/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// Used `line-height` of a style in points.
#[must_use]
pub fn line_height(ctx: &LayoutContext<'_>, style: &SpecifiedStyle) -> f32 {
    let font = font_name(style, ctx.config);
    let natural = ctx.metrics.font_height(font, style.font_size);
    style.line_height.to_pt(natural, style.font_size).max(0.0)
}

/// Offset of the baseline below the top of a line-height tall box: half the
/// leading plus the font's ascent.
#[must_use]
pub fn text_baseline(ctx: &LayoutContext<'_>, style: &SpecifiedStyle, line_height: f32) -> f32 {
    let font = font_name(style, ctx.config);
    (line_height - ctx.metrics.font_height(font, style.font_size)) / 2.0
        + ctx.metrics.font_baseline(font, style.font_size)
}

/// Reflow one frame. `block` is the block container whose line boxes
/// receive inline-level content.
///
/// # Errors
///
/// Structural errors from the tree or a cellmap.
pub fn reflow(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    block: Option<FrameId>,
) -> Result<Flow> {
    generated::enter(tree, ctx, id)?;
    let behavior = tree.frame(id)?.behavior;
    #[cfg(feature = "layout-trace")]
    tracing::trace!(%id, %behavior, "reflow");
    let flow = match behavior {
        Behavior::Block => block::reflow(tree, ctx, id, block)?,
        Behavior::Inline => inline::reflow(tree, ctx, id, block)?,
        Behavior::Text => text::reflow(tree, ctx, id, block)?,
        Behavior::Image => image::reflow(tree, ctx, id, block)?,
        Behavior::ListMarker => list_marker::reflow(tree, ctx, id, block)?,
        Behavior::Table => table::reflow(tree, ctx, id, block)?,
        Behavior::TableRowGroup => table_row_group::reflow(tree, ctx, id)?,
        Behavior::TableRow => table_row::reflow(tree, ctx, id)?,
        Behavior::TableCell => table_cell::reflow(tree, ctx, id)?,
        Behavior::Page => page::reflow(tree, ctx, id)?,
        Behavior::Null => {
            tree.frame_mut(id)?.position = None;
            Flow::Complete
        }
    };
    #[cfg(feature = "layout-trace")]
    {
        if let Ok(frame) = tree.frame(id) {
            tracing::trace!(%id, border_box = ?frame.rects().border, "reflowed");
        }
    }
    Ok(flow)
}

/// Frames that never hold a page's first content: collapsible whitespace,
/// `display: none`, out-of-flow boxes and list markers.
fn is_filler(tree: &FrameTree, id: FrameId) -> bool {
    tree.frame(id).is_ok_and(|f| {
        f.behavior == Behavior::Null
            || f.behavior == Behavior::ListMarker
            || f.is_absolute()
            || f.is_collapsible_whitespace()
    })
}

/// Returns true if `id` has no previous sibling that holds content.
#[must_use]
pub fn is_first_content_child(tree: &FrameTree, id: FrameId) -> bool {
    let mut prev = tree.prev_sibling(id);
    while let Some(p) = prev {
        if !is_filler(tree, p) {
            return false;
        }
        prev = tree.prev_sibling(p);
    }
    true
}

/// [§ 13.3.3 Allowed page breaks](https://www.w3.org/TR/CSS2/page.html#allowed-page-breaks)
///
/// Move a break point up while it sits at the start of its parent, so the
/// parent moves to the next page whole instead of leaving an empty fragment
/// behind. The page's content root is never moved.
#[must_use]
pub fn normalize_break(tree: &FrameTree, ctx: &LayoutContext<'_>, mut at: FrameId) -> FrameId {
    while let Some(parent) = tree.parent(at) {
        if Some(parent) == ctx.root || !is_first_content_child(tree, at) {
            break;
        }
        if tree.frame(parent).is_ok_and(|f| f.behavior == Behavior::Page) {
            break;
        }
        at = parent;
    }
    at
}

/// A break before `at`, normalized, or `Complete` when breaking is not
/// allowed here.
#[must_use]
pub fn break_before(tree: &FrameTree, ctx: &LayoutContext<'_>, at: FrameId) -> Flow {
    if ctx.breaks_allowed() {
        Flow::Break(normalize_break(tree, ctx, at))
    } else {
        Flow::Complete
    }
}

/// [§ 13.3.4 Forced page breaks](https://www.w3.org/TR/CSS2/page.html#forced)
///
/// Check a block-level child after it was laid out: an overflowing child
/// moves to the next page unless it is the first content on this one.
/// `first_on_page` must be sampled before the child was reflowed.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn check_page_full(
    tree: &FrameTree,
    ctx: &mut LayoutContext<'_>,
    child: FrameId,
    first_on_page: bool,
) -> Result<Flow> {
    if !ctx.breaks_allowed() {
        return Ok(Flow::Complete);
    }
    let frame = tree.frame(child)?;
    if frame.style.page_break_before == PageBreak::Always && !first_on_page {
        return Ok(break_before(tree, ctx, child));
    }
    let bottom = frame.rects().border.bottom();
    if bottom > ctx.page_bottom + 0.01 {
        if first_on_page {
            ctx.diagnostics.warn_once(
                "page",
                &format!("frame {child} is taller than the page area and overflows it"),
            );
        } else {
            return Ok(break_before(tree, ctx, child));
        }
    }
    Ok(Flow::Complete)
}

/// `page-break-inside: avoid` turns a break inside `id` into a break before
/// it, unless `id` already starts the page.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn avoid_break_inside(
    tree: &FrameTree,
    ctx: &LayoutContext<'_>,
    id: FrameId,
    flow: Flow,
    first_on_page: bool,
) -> Result<Flow> {
    match flow {
        Flow::Break(at)
            if at != id
                && !first_on_page
                && tree.frame(id)?.style.page_break_inside == PageBreak::Avoid =>
        {
            Ok(break_before(tree, ctx, id))
        }
        other => Ok(other),
    }
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "Once a box has been laid out according to the normal flow or floated,
/// it may be shifted relative to this position."
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn apply_relative_offset(tree: &mut FrameTree, id: FrameId) -> Result<()> {
    let frame = tree.frame(id)?;
    if frame.style.position != Position::Relative {
        return Ok(());
    }
    let style = &frame.style;
    let cb = frame.containing_block;
    let fs = style.font_size;
    let dx = match (style.left.to_pt(cb.width, fs), style.right.to_pt(cb.width, fs)) {
        (Some(left), _) => left,
        (None, Some(right)) => -right,
        (None, None) => 0.0,
    };
    let dy = match (
        style.top.to_pt_opt(cb.height, fs),
        style.bottom.to_pt_opt(cb.height, fs),
    ) {
        (Some(top), _) => top,
        (None, Some(bottom)) => -bottom,
        (None, None) => 0.0,
    };
    tree.frame_mut(id)?.used.relative_offset = Point::new(dx, dy);
    tree.translate(id, dx, dy)
}
