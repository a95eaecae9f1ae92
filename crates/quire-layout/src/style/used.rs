//! Per-frame used values.
//!
//! [§ 6.1.3 Used values](https://www.w3.org/TR/CSS2/cascade.html#used-value)
//!
//! "Computed values are processed as far as possible without formatting the
//! document. Some values, however, can only be determined when the document is
//! being laid out."
//!
//! Everything a reflow pass writes lives here. `reset` drops it wholesale so a
//! second pass starts from the specified style alone.

use serde::Serialize;

use crate::geometry::{EdgeSizes, Point};
use crate::tree::FrameId;

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// A set of adjoining margins, tracked as the largest positive and the most
/// negative member.
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins."
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CollapsedMargin {
    /// Largest positive margin (`>= 0`).
    pub positive: f32,
    /// Most negative margin (`<= 0`).
    pub negative: f32,
}

impl CollapsedMargin {
    /// A set holding a single margin.
    #[must_use]
    pub fn new(margin: f32) -> Self {
        Self {
            positive: margin.max(0.0),
            negative: margin.min(0.0),
        }
    }

    /// Add a margin to the set.
    #[must_use]
    pub fn adjoin(self, margin: f32) -> Self {
        self.merge(Self::new(margin))
    }

    /// Union of two sets.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            positive: self.positive.max(other.positive),
            negative: self.negative.min(other.negative),
        }
    }

    /// The collapsed margin width.
    #[must_use]
    pub fn resolve(self) -> f32 {
        self.positive + self.negative
    }
}

/// Collapse two adjoining margins.
///
/// Both non-negative gives the larger, both negative gives the more negative,
/// mixed signs give their sum.
#[must_use]
pub fn collapse_margins(a: f32, b: f32) -> f32 {
    CollapsedMargin::new(a).adjoin(b).resolve()
}

/// A counter operation applied by a frame, kept so `reset` can undo it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CounterOp {
    /// `counter-reset` created or replaced a counter on `scope`.
    Reset {
        /// Frame holding the counter.
        scope: FrameId,
        /// Counter name.
        name: String,
        /// Value the scope held before, if any.
        previous: Option<i32>,
    },
    /// `counter-increment` added `delta` to the counter on `scope`.
    Increment {
        /// Frame holding the counter.
        scope: FrameId,
        /// Counter name.
        name: String,
        /// Amount added.
        delta: i32,
    },
}

/// Everything layout resolves for one frame.
#[derive(Debug, Clone, Default, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct UsedValues {
    /// Used margins (after collapsing).
    pub margin: EdgeSizes,
    /// Used border widths.
    pub border: EdgeSizes,
    /// Used padding.
    pub padding: EdgeSizes,
    /// Content box width.
    pub width: f32,
    /// Content box height.
    pub height: f32,
    /// Height of the laid-out content before `height`/cell stretching.
    pub content_height: f32,
    /// Resolved line height for inline content.
    pub line_height: f32,
    /// Offset of the text baseline below the top of the frame, for text and
    /// marker frames.
    pub baseline: f32,
    /// Extra space added to each inter-word gap by `text-align: justify`.
    pub justify_spacing: f32,
    /// Adjoining top margins, including any collapsed-through first child.
    pub top_margins: CollapsedMargin,
    /// Adjoining bottom margins, including any collapsed-through last child.
    pub bottom_margins: CollapsedMargin,
    /// The top margin was merged into the parent's.
    pub top_absorbed: bool,
    /// The top margin was already settled by the containing block.
    pub top_resolved: bool,
    /// Offset applied by `position: relative`.
    pub relative_offset: Point,
    /// Static position recorded for absolutely positioned frames.
    pub static_position: Option<Point>,
    /// Counter operations applied during reflow.
    pub counter_ops: Vec<CounterOp>,
    /// `counter-reset`/`counter-increment` have run for this pass.
    pub counters_applied: bool,
    /// Net change to the quote nesting depth.
    pub quote_delta: i32,
    /// The frame's content was laid out up to a page break.
    pub broken: bool,
    /// Rendered text of a list marker (empty for bullet shapes).
    pub marker_text: String,
}
