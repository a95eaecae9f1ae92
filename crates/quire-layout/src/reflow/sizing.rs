//! Content-based sizing.
//!
//! [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
//!
//! "Calculate the preferred width by formatting the content without breaking
//! lines other than where explicit line breaks occur, and also calculate the
//! preferred minimum width, e.g., by trying all possible line breaks."
//!
//! Results are cached on the frame and dropped by any tree edit below it.

use crate::error::{LayoutError, Result};
use crate::style::{BoxSizing, Length, LengthOrAuto, ListStylePosition, SpecifiedStyle};
use crate::tree::{Behavior, FrameId, FrameTree};

use super::{LayoutContext, font_name, generated, image, list_marker, table, text};

/// "Then the shrink-to-fit width is: min(max(preferred minimum width,
/// available width), preferred width)."
#[must_use]
pub fn shrink_to_fit(min: f32, max: f32, available: f32) -> f32 {
    min.max(available).min(max)
}

/// Horizontal margins, borders and padding that do not depend on the
/// containing block; percentages and `auto` count as zero.
#[must_use]
pub fn fixed_edges(style: &SpecifiedStyle) -> f32 {
    let fs = style.font_size;
    let margin = |m: LengthOrAuto| match m {
        LengthOrAuto::Length(Length::Percent(_)) | LengthOrAuto::Auto => 0.0,
        LengthOrAuto::Length(l) => l.to_pt(0.0, fs),
    };
    let padding = |p: Length| match p {
        Length::Percent(_) => 0.0,
        l => l.to_pt(0.0, fs).max(0.0),
    };
    margin(style.margin_left)
        + margin(style.margin_right)
        + padding(style.padding_left)
        + padding(style.padding_right)
        + style.border_left.used_width()
        + style.border_right.used_width()
}

/// Border and padding on the horizontal axis, percentages as zero.
fn box_edges(style: &SpecifiedStyle) -> f32 {
    fixed_edges(style)
        - margin_pt(style.margin_left, style.font_size)
        - margin_pt(style.margin_right, style.font_size)
}

/// Specified absolute content width, if any.
fn fixed_width(style: &SpecifiedStyle) -> Option<f32> {
    match style.width {
        LengthOrAuto::Length(Length::Percent(_)) | LengthOrAuto::Auto => None,
        LengthOrAuto::Length(l) => {
            let w = l.to_pt(0.0, style.font_size);
            Some(match style.box_sizing {
                BoxSizing::ContentBox => w,
                BoxSizing::BorderBox => (w - box_edges(style)).max(0.0),
            })
        }
    }
}

fn margin_pt(m: LengthOrAuto, fs: f32) -> f32 {
    match m {
        LengthOrAuto::Length(Length::Percent(_)) | LengthOrAuto::Auto => 0.0,
        LengthOrAuto::Length(l) => l.to_pt(0.0, fs),
    }
}

/// Preferred minimum and preferred widths of a frame's margin box, as its
/// parent sees it.
///
/// # Errors
///
/// [`LayoutError::UnsupportedSizing`] for behaviors without a sizing rule
/// (rows, row groups, pages, `display: none`).
pub fn min_max(tree: &mut FrameTree, ctx: &LayoutContext<'_>, id: FrameId) -> Result<(f32, f32)> {
    if let Some(cached) = tree.frame(id)?.min_max {
        return Ok(cached);
    }
    let frame = tree.frame(id)?;
    let behavior = frame.behavior;
    let style = frame.style.clone();
    let result = match behavior {
        Behavior::Text => text_min_max(tree, ctx, id)?,
        Behavior::Image => {
            let (w, _) = image::used_size(tree, id)?;
            let outer = w + fixed_edges(&style);
            (outer, outer)
        }
        Behavior::ListMarker => {
            if style.list_style_position == ListStylePosition::Inside {
                let w = list_marker::marker_width(tree, ctx, id)?;
                (w, w)
            } else {
                (0.0, 0.0)
            }
        }
        Behavior::Inline => {
            let (min, max) = content_min_max(tree, ctx, id)?;
            let edges = fixed_edges(&style);
            (min + edges, max + edges)
        }
        Behavior::Block | Behavior::TableCell => {
            let edges = fixed_edges(&style);
            match fixed_width(&style) {
                Some(w) => (w + edges, w + edges),
                None => {
                    let (min, max) = content_min_max(tree, ctx, id)?;
                    (min + edges, max + edges)
                }
            }
        }
        Behavior::Table => {
            let (min, max) = table::measure(tree, ctx, id)?;
            let margins = margin_pt(style.margin_left, style.font_size)
                + margin_pt(style.margin_right, style.font_size);
            match fixed_width(&style) {
                Some(w) => {
                    let w = (w + box_edges(&style)).max(min) + margins;
                    (w, w)
                }
                None => (min + margins, max + margins),
            }
        }
        Behavior::TableRow | Behavior::TableRowGroup | Behavior::Page | Behavior::Null => {
            return Err(LayoutError::UnsupportedSizing {
                frame: id,
                behavior,
            });
        }
    };
    tree.frame_mut(id)?.min_max = Some(result);
    Ok(result)
}

/// Preferred minimum and preferred widths of a container's content box.
///
/// Inline-level children on one line add up; block-level children stack.
/// Floats sit beside the line they interrupt.
///
/// # Errors
///
/// [`LayoutError::UnsupportedSizing`] from a child without a sizing rule.
pub fn content_min_max(
    tree: &mut FrameTree,
    ctx: &LayoutContext<'_>,
    id: FrameId,
) -> Result<(f32, f32)> {
    let mut min: f32 = 0.0;
    let mut max: f32 = 0.0;
    let mut line: f32 = 0.0;

    let frame = tree.frame(id)?;
    if frame.generated && !frame.content_synthesized {
        let w = generated::static_width(ctx, &frame.style);
        return Ok((w, w));
    }

    for child in tree.child_ids(id) {
        let f = tree.frame(child)?;
        if f.behavior == Behavior::Null || f.is_absolute() {
            continue;
        }
        if f.is_floating() || f.is_inline_level() || f.behavior == Behavior::ListMarker {
            let (cmin, cmax) = min_max(tree, ctx, child)?;
            min = min.max(cmin);
            line += cmax;
        } else {
            max = max.max(line);
            line = 0.0;
            let (cmin, cmax) = min_max(tree, ctx, child)?;
            min = min.max(cmin);
            max = max.max(cmax);
        }
    }
    Ok((min, max.max(line)))
}

fn text_min_max(tree: &mut FrameTree, ctx: &LayoutContext<'_>, id: FrameId) -> Result<(f32, f32)> {
    text::prepare(tree, id)?;
    let frame = tree.frame(id)?;
    let style = &frame.style;
    let content = frame.text().unwrap_or_default();
    let measure = |s: &str| {
        ctx.metrics.text_width(
            s,
            font_name(style, ctx.config),
            style.font_size,
            style.word_spacing,
            style.letter_spacing,
        )
    };
    let lines: Vec<&str> = if style.white_space.preserves_newlines() {
        content.split('\n').collect()
    } else {
        vec![content]
    };
    let max = lines
        .iter()
        .map(|l| measure(l.trim_end_matches(' ')))
        .fold(0.0, f32::max);
    let min = if style.white_space.wraps() {
        lines
            .iter()
            .flat_map(|l| l.split_inclusive([' ', '-']))
            .map(|w| measure(w.trim_end_matches(' ')))
            .fold(0.0, f32::max)
    } else {
        max
    };
    Ok((min, max))
}
