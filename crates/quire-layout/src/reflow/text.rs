//! Text runs: whitespace processing and greedy line breaking.
//!
//! [§ 16.6 Whitespace: the 'white-space' property](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
//!
//! [§ 5.5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! "A soft wrap opportunity is a position in the text where the UA may
//! choose to break."

use crate::error::Result;
use crate::style::{TextTransform, WhiteSpace, WordWrap};
use crate::tree::{Behavior, FrameId, FrameKind, FrameTree};

use super::{Flow, LayoutContext, font_name, line};

/// Where a run of text has to be cut to fit the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// The whole run fits.
    Fits,
    /// Keep `..head_end` on this line; `tail_start..` continues on the next.
    At {
        /// End of the part that stays.
        head_end: usize,
        /// Start of the part that moves on.
        tail_start: usize,
        /// A preserved newline ends the line.
        forced: bool,
    },
    /// Not even the first word fits beside content already on the line.
    NothingFits,
}

/// [§ 16.6.1 The 'white-space' processing model](https://www.w3.org/TR/CSS2/text.html#white-space-model)
///
/// "If 'white-space' is set to 'normal', 'nowrap', or 'pre-line', ... every
/// tab is converted to a space ... any space immediately following another
/// collapsible space ... is removed." Under `normal` and `nowrap` newlines
/// collapse as spaces too; `pre-line` keeps them and drops the spaces
/// around them.
#[must_use]
pub fn collapse_whitespace(text: &str, mode: WhiteSpace) -> String {
    match mode {
        WhiteSpace::Pre | WhiteSpace::PreWrap => text.replace('\r', ""),
        WhiteSpace::Normal | WhiteSpace::Nowrap => {
            let mut out = String::with_capacity(text.len());
            let mut space = false;
            for c in text.chars() {
                if is_collapsible(c) {
                    if !space {
                        out.push(' ');
                    }
                    space = true;
                } else {
                    out.push(c);
                    space = false;
                }
            }
            out
        }
        WhiteSpace::PreLine => text
            .replace('\r', "")
            .split('\n')
            .map(|l| {
                collapse_whitespace(l, WhiteSpace::Normal)
                    .trim_matches(is_collapsible)
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Space, tab and the line-break characters. Other Unicode spaces, such as
/// U+00A0, are never collapsed.
const fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// [§ 16.5 Capitalization: the 'text-transform' property](https://www.w3.org/TR/CSS2/text.html#caps-prop)
#[must_use]
pub fn apply_transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        // "Puts the first character of each word in uppercase."
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut at_word_start = true;
            for c in text.chars() {
                if at_word_start && c.is_alphabetic() {
                    out.extend(c.to_uppercase());
                    at_word_start = false;
                } else {
                    out.push(c);
                    at_word_start = c.is_whitespace();
                }
            }
            out
        }
    }
}

/// Normalize the characters of a text frame once, before its first reflow.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn prepare(tree: &mut FrameTree, id: FrameId) -> Result<()> {
    let frame = tree.frame_mut(id)?;
    if frame.text_prepared {
        return Ok(());
    }
    let style = frame.style.clone();
    if let FrameKind::Text { text } = &mut frame.kind {
        let collapsed = collapse_whitespace(text, style.white_space);
        *text = apply_transform(&collapsed, style.text_transform);
    }
    frame.text_prepared = true;
    Ok(())
}

/// Break opportunities: after a space or a hyphen.
fn opportunities(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices()
        .filter(|(_, c)| *c == ' ' || *c == '-')
        .map(|(i, c)| i + c.len_utf8())
}

/// [§ 5.5.2 Breaking Rules](https://www.w3.org/TR/css-text-3/#word-breaking)
///
/// Find the longest prefix of `text` that fits in `available`.
///
/// Trailing spaces hang and are not measured. On an empty line the first
/// word is forced onto it even if it overflows, or cut between characters
/// when `break_word` is set.
#[must_use]
pub fn find_split(
    text: &str,
    available: f32,
    measure: impl Fn(&str) -> f32,
    mode: WhiteSpace,
    break_word: bool,
    line_empty: bool,
) -> Split {
    // STEP 1: A preserved newline ends the candidate run.
    let newline = if mode.preserves_newlines() {
        text.find('\n')
    } else {
        None
    };
    let run = newline.map_or(text, |n| &text[..n]);
    let fits = |end: usize| measure(text[..end].trim_end_matches(' ')) <= available + 0.01;

    if fits(run.len()) || !mode.wraps() {
        return match newline {
            Some(n) => Split::At {
                head_end: n,
                tail_start: n + 1,
                forced: true,
            },
            None => Split::Fits,
        };
    }

    // STEP 2: The last opportunity whose prefix fits.
    let candidates: Vec<usize> = opportunities(run).filter(|i| *i < run.len()).collect();
    if let Some(end) = candidates.iter().rev().copied().find(|end| fits(*end)) {
        return Split::At {
            head_end: end,
            tail_start: end,
            forced: false,
        };
    }
    if !line_empty {
        return Split::NothingFits;
    }

    // STEP 3: Nothing fits on an empty line.
    // "If the word is too long to fit on a line by itself, break at an
    // arbitrary point."
    let first_end = candidates.first().copied().unwrap_or(run.len());
    if break_word {
        let mut end = 0;
        for (i, c) in run[..first_end].char_indices() {
            let next = i + c.len_utf8();
            if end > 0 && !fits(next) {
                break;
            }
            end = next;
        }
        if end < run.len() {
            return Split::At {
                head_end: end,
                tail_start: end,
                forced: false,
            };
        }
    }
    if first_end < run.len() {
        Split::At {
            head_end: first_end,
            tail_start: first_end,
            forced: false,
        }
    } else {
        match newline {
            Some(n) => Split::At {
                head_end: n,
                tail_start: n + 1,
                forced: true,
            },
            None => Split::Fits,
        }
    }
}

/// Advance width of a string set in the frame's font.
fn measure(ctx: &LayoutContext<'_>, tree: &FrameTree, id: FrameId, text: &str) -> f32 {
    tree.frame(id).map_or(0.0, |f| {
        let s = &f.style;
        ctx.metrics.text_width(
            text,
            font_name(s, ctx.config),
            s.font_size,
            s.word_spacing,
            s.letter_spacing,
        )
    })
}

/// Lay out a text frame on the lines of `block`.
///
/// Text that does not fit is split into a following sibling; the inline
/// ancestors between the text and the block are split with it, the line is
/// closed, and the tail is laid out when the parent reaches it.
///
/// # Errors
///
/// Structural errors from the tree.
pub fn reflow(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    id: FrameId,
    block: Option<FrameId>,
) -> Result<Flow> {
    prepare(tree, id)?;
    let style = tree.style(id)?;
    let line_height = super::line_height(ctx, &style);
    let baseline = super::text_baseline(ctx, &style, line_height);
    {
        let f = tree.frame_mut(id)?;
        f.used.line_height = line_height;
        f.used.height = line_height;
        f.used.baseline = baseline;
    }
    let Some(block) = block else {
        let cb = tree.frame(id)?.containing_block;
        let width = measure(ctx, tree, id, tree.frame(id)?.text().unwrap_or_default());
        let f = tree.frame_mut(id)?;
        f.position = Some(crate::geometry::Point::new(cb.x, cb.y));
        f.used.width = width;
        return Ok(Flow::Complete);
    };

    loop {
        // STEP 1: "A sequence of collapsible spaces at the beginning of a line
        // is removed."
        let line_empty = line::current(tree, block)?.is_empty();
        if line_empty && style.white_space.collapses_spaces()
            && let FrameKind::Text { text } = &mut tree.frame_mut(id)?.kind
        {
            let trimmed = text.trim_start_matches(' ').len();
            let _ = text.drain(..text.len() - trimmed);
        }
        let text = tree.frame(id)?.text().unwrap_or_default().to_string();
        if text.is_empty() {
            let x = line::cursor_x(tree, ctx, block)?;
            let y = line::current(tree, block)?.y;
            let f = tree.frame_mut(id)?;
            f.position = Some(crate::geometry::Point::new(x, y));
            f.used.width = 0.0;
            f.used.height = 0.0;
            return Ok(Flow::Complete);
        }

        // STEP 2: Find what fits.
        let available = line::available_width(tree, ctx, block)?;
        let split = find_split(
            &text,
            available,
            |s| measure(ctx, tree, id, s),
            style.white_space,
            style.word_wrap == WordWrap::BreakWord,
            line_empty,
        );

        match split {
            Split::Fits => {
                tree.frame_mut(id)?.used.width = measure(ctx, tree, id, &text);
                line::add_frame(tree, ctx, block, id)?;
                return Ok(Flow::Complete);
            }
            Split::NothingFits => {
                if let Flow::Break(at) = line::add_line(tree, ctx, block, false)? {
                    return Ok(Flow::Break(at));
                }
            }
            Split::At {
                head_end,
                tail_start,
                forced,
            } => {
                // Beside floats, an unbreakable word moves the line below them.
                if line_empty
                    && !forced
                    && measure(ctx, tree, id, text[..head_end].trim_end_matches(' ')) > available
                    && move_below_floats(tree, ctx, block)?
                {
                    continue;
                }
                let tail = tree.split_text(id, head_end, tail_start)?;
                let head = text[..head_end].to_string();
                tree.frame_mut(id)?.used.width = measure(ctx, tree, id, &head);
                line::add_frame(tree, ctx, block, id)?;
                split_inline_ancestors(tree, tail, block)?;
                tracing::trace!(%id, %tail, forced, "split text");
                return line::add_line(tree, ctx, block, forced);
            }
        }
    }
}

/// Move an empty line down past the next float bottom. Returns false when
/// there is no float to clear or the placement budget is spent.
fn move_below_floats(
    tree: &mut FrameTree,
    ctx: &mut LayoutContext<'_>,
    block: FrameId,
) -> Result<bool> {
    let current = line::current(tree, block)?;
    if current.left + current.right <= 0.0 {
        return Ok(false);
    }
    let Some(next) = ctx.floats.next_bottom_after(current.y) else {
        return Ok(false);
    };
    if !ctx.spend_float_step() {
        return Ok(false);
    }
    line::current_mut(tree, block)?.move_to(next);
    Ok(true)
}

/// Split every inline box between `at` and `block` so that `at` and what
/// follows it start a new fragment of each.
///
/// # Errors
///
/// Structural errors from the tree.
pub fn split_inline_ancestors(tree: &mut FrameTree, mut at: FrameId, block: FrameId) -> Result<()> {
    while let Some(parent) = tree.parent(at) {
        if parent == block || tree.frame(parent)?.behavior != Behavior::Inline {
            break;
        }
        at = tree.split(parent, at)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(s: &str) -> f32 {
        s.chars().count() as f32 * 5.0
    }

    #[test]
    fn test_collapse_normal_and_pre_line() {
        assert_eq!(collapse_whitespace("a  \n\t b", WhiteSpace::Normal), "a b");
        assert_eq!(collapse_whitespace("a  \n  b  c", WhiteSpace::PreLine), "a\nb c");
        assert_eq!(collapse_whitespace("a  \n b", WhiteSpace::Pre), "a  \n b");
    }

    #[test]
    fn test_no_break_spaces_survive_collapsing() {
        assert_eq!(
            collapse_whitespace("a\u{a0}\u{a0}\u{a0}b", WhiteSpace::Normal),
            "a\u{a0}\u{a0}\u{a0}b"
        );
        assert_eq!(
            collapse_whitespace("\u{a0}x \u{202f}\n y", WhiteSpace::PreLine),
            "\u{a0}x \u{202f}\ny"
        );
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(
            apply_transform("hello wide world", TextTransform::Capitalize),
            "Hello Wide World"
        );
        assert_eq!(apply_transform("MiXed", TextTransform::Lowercase), "mixed");
    }

    #[test]
    fn test_split_at_last_fitting_space() {
        // "hello world again" with room for 12 glyphs.
        let split = find_split("hello world again", 60.0, width, WhiteSpace::Normal, false, true);
        assert_eq!(
            split,
            Split::At {
                head_end: 12,
                tail_start: 12,
                forced: false
            }
        );
    }

    #[test]
    fn test_split_after_hyphen() {
        let split = find_split("well-known", 30.0, width, WhiteSpace::Normal, false, true);
        assert_eq!(
            split,
            Split::At {
                head_end: 5,
                tail_start: 5,
                forced: false
            }
        );
    }

    #[test]
    fn test_first_word_forced_on_empty_line() {
        let split = find_split("extraordinary word", 20.0, width, WhiteSpace::Normal, false, true);
        assert_eq!(
            split,
            Split::At {
                head_end: 14,
                tail_start: 14,
                forced: false
            }
        );
        let split = find_split("extraordinary word", 20.0, width, WhiteSpace::Normal, false, false);
        assert_eq!(split, Split::NothingFits);
    }

    #[test]
    fn test_break_word_cuts_between_characters() {
        let split = find_split("abcdefgh", 20.0, width, WhiteSpace::Normal, true, true);
        assert_eq!(
            split,
            Split::At {
                head_end: 4,
                tail_start: 4,
                forced: false
            }
        );
    }

    #[test]
    fn test_nowrap_never_wraps_and_pre_breaks_at_newline() {
        assert_eq!(
            find_split("a b c d e f", 10.0, width, WhiteSpace::Nowrap, false, true),
            Split::Fits
        );
        assert_eq!(
            find_split("ab\ncd", 100.0, width, WhiteSpace::Pre, false, true),
            Split::At {
                head_end: 2,
                tail_start: 3,
                forced: true
            }
        );
    }
}
