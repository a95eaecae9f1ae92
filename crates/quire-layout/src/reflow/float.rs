//! Floats and clearance.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."

use crate::error::Result;
use crate::geometry::Rect;
use crate::style::{Clear, Float};
use crate::tree::{ContainingBlock, FrameId, FrameTree};

use super::{Flow, LayoutContext, line};

/// A float that has been placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFloat {
    /// The floated frame.
    pub frame: FrameId,
    /// Which side it floats to.
    pub side: Float,
    /// Its margin box in page coordinates.
    pub margin_box: Rect,
}

/// Floats placed on the current page.
///
/// "Since a float is not in the flow, non-positioned block boxes created
/// before and after the float box flow vertically as if the float did not
/// exist. However, the current and subsequent line boxes created next to
/// the float are shortened as necessary to make room for the margin box
/// of the float."
#[derive(Debug, Clone, Default)]
pub struct FloatRegistry {
    floats: Vec<PlacedFloat>,
}

impl FloatRegistry {
    /// Returns true if nothing floats on this page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    /// Number of floats placed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.floats.len()
    }

    /// All placed floats.
    #[must_use]
    pub fn floats(&self) -> &[PlacedFloat] {
        &self.floats
    }

    /// Record a placed float.
    pub fn add(&mut self, float: PlacedFloat) {
        self.floats.push(float);
    }

    /// Widths taken by left and right floats from a content box spanning
    /// `left..right` horizontally, for the band `[top, bottom)`.
    ///
    /// A float is active in the band if its margin box vertically overlaps
    /// it. A zero-height band still meets the floats around its top edge.
    #[must_use]
    pub fn offsets(&self, top: f32, bottom: f32, left: f32, right: f32) -> (f32, f32) {
        let bottom = bottom.max(top + 0.01);
        let mut left_offset: f32 = 0.0;
        let mut right_offset: f32 = 0.0;
        for f in &self.floats {
            let b = &f.margin_box;
            if b.y >= bottom || b.bottom() <= top {
                continue;
            }
            if b.right() <= left || b.x >= right {
                continue;
            }
            match f.side {
                Float::Left => left_offset = left_offset.max(b.right() - left),
                Float::Right => right_offset = right_offset.max(right - b.x),
                Float::None => {}
            }
        }
        (left_offset.max(0.0), right_offset.max(0.0))
    }

    /// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// Lowest bottom edge of the floats on the cleared side(s), if any.
    #[must_use]
    pub fn clearance(&self, clear: Clear) -> Option<f32> {
        self.floats
            .iter()
            .filter(|f| match clear {
                Clear::None => false,
                Clear::Left => f.side == Float::Left,
                Clear::Right => f.side == Float::Right,
                Clear::Both => true,
            })
            .map(|f| f.margin_box.bottom())
            .reduce(f32::max)
    }

    /// The smallest float bottom strictly below `y`.
    #[must_use]
    pub fn next_bottom_after(&self, y: f32) -> Option<f32> {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .filter(|b| *b > y + 0.001)
            .reduce(f32::min)
    }

    /// Lowest bottom edge among the floats added since index `start`.
    #[must_use]
    pub fn lowest_since(&self, start: usize) -> Option<f32> {
        self.floats
            .get(start..)
            .and_then(|fs| fs.iter().map(|f| f.margin_box.bottom()).reduce(f32::max))
    }
}

/// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
///
/// Lay out a floated child of `block` and place it.
///
/// The float is laid out as a shrink-to-fit block at the current line's top,
/// then moved. It stays on the current line if the line still has room for
/// it; otherwise it goes below the line, further down past other floats
/// until it fits.
///
/// # Errors
///
/// Structural errors from the float's subtree.
pub fn place(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    block: FrameId,
) -> Result<()> {
    // STEP 1: Lay the float out against the block's content box.
    let content = tree.frame(block)?.rects().content;
    let cb_height = tree.frame(block)?.containing_block.height.map(|_| content.height);
    let line_y = line::current(tree, block)?.y;
    tree.set_containing_block(
        id,
        ContainingBlock {
            x: content.x,
            y: line_y,
            width: content.width,
            height: cb_height,
        },
    )?;
    ctx.unbreakable += 1;
    let flow = super::reflow(tree, ctx, id, None);
    ctx.unbreakable -= 1;
    let _: Flow = flow?;

    let frame = tree.frame(id)?;
    let side = frame.style.float;
    let clear = frame.style.clear;
    let width = frame.margin_width();
    let height = frame.margin_height();
    let start = frame.position.unwrap_or_default();

    // STEP 2: Pick the highest position where it fits.
    // "A floating box must be placed as high as possible."
    let (line_w, line_h, line_empty) = {
        let l = line::current(tree, block)?;
        (l.w, l.h, l.is_empty())
    };
    let mut y = line_y;
    if let Some(bottom) = ctx.floats.clearance(clear) {
        y = y.max(bottom);
    }
    let mut on_current_line = (y - line_y).abs() < 0.001;
    loop {
        let (left, right) = ctx
            .floats
            .offsets(y, y + height, content.x, content.right());
        let used = if on_current_line { line_w } else { 0.0 };
        if content.width - left - right - used >= width - 0.001 {
            let x = match side {
                Float::Right => content.right() - right - width,
                _ => content.x + left,
            };
            finish_placement(tree, ctx, id, block, x - start.x, y - start.y)?;
            if on_current_line && side == Float::Left && !line_empty {
                line::shift_line(tree, block, width)?;
            }
            if on_current_line {
                line::invalidate_floats(tree, block)?;
            }
            return Ok(());
        }
        if !ctx.spend_float_step() {
            break;
        }
        // STEP 3: Move below the current line, then past the next float.
        let next = if on_current_line && !line_empty {
            Some(line_y + line_h)
        } else {
            ctx.floats.next_bottom_after(y)
        };
        match next {
            Some(next) if next > y => {
                y = next;
                on_current_line = false;
            }
            _ => break,
        }
    }

    // Nothing fits: "The left outer edge of a left-floating box may not be
    // to the left of the left edge of its containing block."
    let (left, right) = ctx.floats.offsets(y, y + height, content.x, content.right());
    let x = match side {
        Float::Right => (content.right() - right - width).max(content.x),
        _ => content.x + left,
    };
    finish_placement(tree, ctx, id, block, x - start.x, y - start.y)
}

fn finish_placement(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    block: FrameId,
    dx: f32,
    dy: f32,
) -> Result<()> {
    tree.translate(id, dx, dy)?;
    super::apply_relative_offset(tree, id)?;
    let frame = tree.frame(id)?;
    let margin_box = frame.rects().margin;
    ctx.floats.add(PlacedFloat {
        frame: id,
        side: frame.style.float,
        margin_box,
    });
    tracing::trace!(float = %id, %block, ?margin_box, "placed float");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FloatRegistry {
        let mut r = FloatRegistry::default();
        r.add(PlacedFloat {
            frame: FrameId(1),
            side: Float::Left,
            margin_box: Rect::new(0.0, 0.0, 100.0, 50.0),
        });
        r.add(PlacedFloat {
            frame: FrameId(2),
            side: Float::Right,
            margin_box: Rect::new(350.0, 20.0, 50.0, 100.0),
        });
        r
    }

    #[test]
    fn test_offsets_follow_vertical_overlap() {
        let r = registry();
        assert_eq!(r.offsets(0.0, 10.0, 0.0, 400.0), (100.0, 0.0));
        assert_eq!(r.offsets(30.0, 40.0, 0.0, 400.0), (100.0, 50.0));
        assert_eq!(r.offsets(60.0, 70.0, 0.0, 400.0), (0.0, 50.0));
        assert_eq!(r.offsets(200.0, 210.0, 0.0, 400.0), (0.0, 0.0));
    }

    #[test]
    fn test_clearance_by_side() {
        let r = registry();
        assert_eq!(r.clearance(Clear::Left), Some(50.0));
        assert_eq!(r.clearance(Clear::Right), Some(120.0));
        assert_eq!(r.clearance(Clear::Both), Some(120.0));
        assert_eq!(r.clearance(Clear::None), None);
    }

    #[test]
    fn test_next_bottom_after() {
        let r = registry();
        assert_eq!(r.next_bottom_after(0.0), Some(50.0));
        assert_eq!(r.next_bottom_after(50.0), Some(120.0));
        assert_eq!(r.next_bottom_after(120.0), None);
    }
}
