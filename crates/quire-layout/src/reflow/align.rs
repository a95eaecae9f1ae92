//! Alignment of a finished line box.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "The height of the line box is the distance between the uppermost box
//! top and the lowermost box bottom."
//!
//! [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
//!
//! "This property describes how inline-level content of a block container
//! is aligned."

use crate::error::Result;
use crate::style::{TextAlign, VerticalAlign};
use crate::tree::{Behavior, FrameId, FrameTree};

use super::{LayoutContext, font_name, line};

/// Align the current line of `block` vertically, then horizontally.
///
/// `last` marks the final line of the block, which `justify` leaves alone
/// unless the block continues on the next page.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn finish_line(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    block: FrameId,
    last: bool,
) -> Result<()> {
    let current = line::current(tree, block)?;
    if !current.inline || current.is_empty() {
        return Ok(());
    }
    line::resolve_floats(tree, ctx, block)?;
    vertical_align(tree, ctx, block)?;
    text_align(tree, ctx, block, last)?;
    // Inline boxes get their offset once their bounds are known.
    for id in line::current(tree, block)?.frames.clone() {
        if tree.frame(id)?.behavior != Behavior::Inline {
            super::apply_relative_offset(tree, id)?;
        }
    }
    Ok(())
}

/// Vertical placement of one frame relative to the line's baseline.
struct Placement {
    frame: FrameId,
    align: VerticalAlign,
    /// Distance from the frame's top to its aligned baseline.
    ascent: f32,
    /// Margin-box height.
    height: f32,
    /// Downward shift of the baseline (`sub`, `super`, lengths).
    shift: f32,
}

/// The first `vertical-align` other than `baseline` on the frame or an
/// inline ancestor inside `block`, with the font size it came from.
fn effective_align(tree: &FrameTree, frame: FrameId, block: FrameId) -> (VerticalAlign, f32) {
    let mut size = tree.frame(frame).map_or(0.0, |f| f.style.font_size);
    for id in std::iter::once(frame).chain(tree.ancestors(frame)) {
        if id == block {
            break;
        }
        let Ok(f) = tree.frame(id) else { break };
        if f.style.vertical_align != VerticalAlign::Baseline {
            return (f.style.vertical_align, f.style.font_size);
        }
        size = f.style.font_size;
    }
    (VerticalAlign::Baseline, size)
}

/// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
fn vertical_align(tree: &mut FrameTree, ctx: &LayoutContext<'_>, block: FrameId) -> Result<()> {
    let (line_y, frames) = {
        let l = line::current(tree, block)?;
        (l.y, l.frames.clone())
    };

    // STEP 1: The strut of the block container.
    // "each line box starts with a zero-width inline box with the element's
    // font and line height properties."
    let block_style = tree.style(block)?;
    let block_font = font_name(&block_style, ctx.config);
    let block_size = block_style.font_size;
    let font_height = ctx.metrics.font_height(block_font, block_size);
    let font_baseline = ctx.metrics.font_baseline(block_font, block_size);
    let strut = super::line_height(ctx, &block_style);
    let strut_ascent = (strut - font_height) / 2.0 + font_baseline;
    let strut_descent = strut - strut_ascent;

    // STEP 2: Measure every frame on the line.
    let mut placements = Vec::with_capacity(frames.len());
    for id in frames {
        let frame = tree.frame(id)?;
        let height = frame.margin_height();
        let natural_ascent = match frame.behavior {
            Behavior::Text | Behavior::Inline | Behavior::ListMarker => {
                let font = font_name(&frame.style, ctx.config);
                let size = frame.style.font_size;
                let half_leading =
                    (frame.used.line_height - ctx.metrics.font_height(font, size)) / 2.0;
                frame.used.margin.top
                    + frame.used.border.top
                    + frame.used.padding.top
                    + half_leading
                    + ctx.metrics.font_baseline(font, size)
            }
            // "The baseline of an 'inline-block' is the baseline of its last
            // line box in the normal flow"; replaced content sits on its
            // bottom margin edge.
            _ => height,
        };
        let (align, size) = effective_align(tree, id, block);
        let (ascent, shift) = match align {
            VerticalAlign::Baseline | VerticalAlign::Top | VerticalAlign::Bottom => {
                (natural_ascent, 0.0)
            }
            VerticalAlign::Sub => (natural_ascent, 0.3 * size),
            VerticalAlign::Super => (natural_ascent, -0.5 * size),
            VerticalAlign::Length(len) => (
                natural_ascent,
                -len.to_pt(frame.used.line_height, frame.style.font_size),
            ),
            VerticalAlign::Middle => (height / 2.0 + 0.25 * block_size, 0.0),
            VerticalAlign::TextTop => (font_baseline, 0.0),
            VerticalAlign::TextBottom => (height - (font_height - font_baseline), 0.0),
        };
        placements.push(Placement {
            frame: id,
            align,
            ascent,
            height,
            shift,
        });
    }

    // STEP 3: The baseline sits low enough for every aligned box's top.
    let aligned = |p: &&Placement| !matches!(p.align, VerticalAlign::Top | VerticalAlign::Bottom);
    let baseline = placements
        .iter()
        .filter(aligned)
        .map(|p| p.ascent - p.shift)
        .fold(strut_ascent, f32::max);
    let mut line_height = baseline + strut_descent;
    for p in placements.iter().filter(aligned) {
        line_height = line_height.max(baseline + p.shift - p.ascent + p.height);
    }
    for p in placements.iter().filter(|p| !aligned(p)) {
        line_height = line_height.max(p.height);
    }

    // STEP 4: Move the frames.
    for p in &placements {
        let top = match p.align {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Bottom => line_height - p.height,
            _ => baseline + p.shift - p.ascent,
        };
        let old = tree.frame(p.frame)?.position.map_or(line_y, |pos| pos.y);
        tree.translate(p.frame, 0.0, line_y + top - old)?;
    }
    line::current_mut(tree, block)?.h = line_height;
    Ok(())
}

/// Width of the collapsible spaces ending the last frame of a line.
fn trailing_space_width(tree: &FrameTree, ctx: &LayoutContext<'_>, frame: FrameId) -> f32 {
    let Ok(f) = tree.frame(frame) else {
        return 0.0;
    };
    let Some(text) = f.text() else {
        return 0.0;
    };
    if !f.style.white_space.collapses_spaces() {
        return 0.0;
    }
    let trailing = text.len() - text.trim_end_matches(' ').len();
    if trailing == 0 {
        return 0.0;
    }
    ctx.metrics.text_width(
        &" ".repeat(trailing),
        font_name(&f.style, ctx.config),
        f.style.font_size,
        f.style.word_spacing + f.used.justify_spacing,
        f.style.letter_spacing,
    )
}

/// Spaces in a text frame that separate words on the line.
fn gap_count(tree: &FrameTree, frame: FrameId, ends_line: bool) -> usize {
    let Some(text) = tree.frame(frame).ok().and_then(|f| f.text()) else {
        return 0;
    };
    let text = if ends_line {
        text.trim_end_matches(' ')
    } else {
        text
    };
    text.chars().filter(|c| *c == ' ').count()
}

fn text_align(
    tree: &mut FrameTree,
    ctx: &LayoutContext<'_>,
    block: FrameId,
    last: bool,
) -> Result<()> {
    let content_width = line::content_box(tree, block)?.width;
    let (frames, used, available, br) = {
        let l = line::current(tree, block)?;
        (l.frames.clone(), l.w, l.content_width(content_width), l.br)
    };
    let Some(&last_frame) = frames.last() else {
        return Ok(());
    };
    let used = used - trailing_space_width(tree, ctx, last_frame);
    let slack = available - used;
    let block_frame = tree.frame(block)?;
    let align = block_frame.style.text_align;
    let broken = block_frame.used.broken;

    match align {
        TextAlign::Left => {}
        TextAlign::Right | TextAlign::Center => {
            let dx = if align == TextAlign::Right {
                slack.max(0.0)
            } else {
                slack.max(0.0) / 2.0
            };
            for f in frames {
                tree.translate(f, dx, 0.0)?;
            }
        }
        TextAlign::Justify => {
            // "If an element has a computed value for 'white-space' of 'pre'
            // or 'pre-wrap', then neither the glyphs of that element's text
            // content nor its white space may be altered by any justification
            // algorithm."
            if (last && !broken) || br || slack <= 0.0 {
                return Ok(());
            }
            let counts: Vec<usize> = frames
                .iter()
                .map(|f| {
                    let justifiable = tree
                        .frame(*f)
                        .is_ok_and(|fr| fr.style.white_space.collapses_spaces());
                    if justifiable {
                        gap_count(tree, *f, *f == last_frame)
                    } else {
                        0
                    }
                })
                .collect();
            let gaps: usize = counts.iter().sum();
            if gaps == 0 {
                return Ok(());
            }
            let spacing = slack / gaps as f32;
            let mut dx = 0.0;
            for (f, n) in frames.iter().zip(counts) {
                tree.translate(*f, dx, 0.0)?;
                if n > 0 {
                    let frame = tree.frame_mut(*f)?;
                    frame.used.justify_spacing = spacing;
                    frame.used.width += n as f32 * spacing;
                    dx += n as f32 * spacing;
                }
            }
            let l = line::current_mut(tree, block)?;
            l.wc = gaps + 1;
            l.w += dx;
        }
    }
    Ok(())
}
