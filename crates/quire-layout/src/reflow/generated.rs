//! Generated content, automatic counters and quotes.
//!
//! [§ 12 Generated content, automatic numbering, and lists](https://www.w3.org/TR/CSS2/generate.html)
//!
//! "In some cases, authors may want user agents to render content that does
//! not come from the document tree."
//!
//! Counter state lives on frames: a `counter-reset` creates the counter on
//! the resetting element's parent, so that the element's following siblings
//! and their descendants see it. Every change is recorded as a
//! [`CounterOp`] so a page-break reset can undo it.

use std::rc::Rc;

use crate::error::Result;
use crate::style::{ContentItem, CounterOp, Display, ListStyleType, SpecifiedStyle};
use crate::tree::{FrameId, FrameKind, FrameTree};

use super::{LayoutContext, font_name};

/// Name of the implicit counter incremented by every list item.
pub const LIST_ITEM: &str = "list-item";

/// Apply a frame's counter directives and, for a generated box, turn its
/// `content` into a text child. Runs once per layout pass.
///
/// # Errors
///
/// [`crate::LayoutError::DetachedFrame`] if the id is stale.
pub fn enter(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<()> {
    let frame = tree.frame(id)?;
    if !matches!(frame.kind, FrameKind::Element { .. }) {
        return Ok(());
    }
    if !frame.used.counters_applied {
        apply_counters(tree, id)?;
    }
    let frame = tree.frame(id)?;
    if frame.generated && !frame.content_synthesized {
        synthesize(tree, ctx, id)?;
    }
    Ok(())
}

/// [§ 12.4 Automatic counters and numbering](https://www.w3.org/TR/CSS2/generate.html#counters)
///
/// "If an element increments or uses a counter not in scope of any
/// 'counter-reset', it is assumed to have been reset to 0 by that element."
fn apply_counters(tree: &mut FrameTree, id: FrameId) -> Result<()> {
    let style = tree.style(id)?;
    let scope = tree.parent(id).unwrap_or(id);
    let mut ops = Vec::new();

    // "If an element both resets and increments a counter, the counter is
    // reset first and then incremented."
    for directive in &style.counter_reset {
        let previous = tree
            .frame_mut(scope)?
            .counters
            .insert(directive.name.clone(), directive.value);
        ops.push(CounterOp::Reset {
            scope,
            name: directive.name.clone(),
            previous,
        });
    }

    let mut increments: Vec<(String, i32)> = style
        .counter_increment
        .iter()
        .map(|d| (d.name.clone(), d.value))
        .collect();
    if style.display == Display::ListItem && !increments.iter().any(|(n, _)| n == LIST_ITEM) {
        increments.push((LIST_ITEM.to_string(), 1));
    }
    for (name, delta) in increments {
        // A list's items number themselves against their own parent, so a
        // nested list starts over.
        let holder = if name == LIST_ITEM {
            None
        } else {
            holder_of(tree, id, &name)
        };
        let holder = match holder {
            Some(h) => h,
            None if tree.frame(scope)?.counters.contains_key(&name) => scope,
            None => {
                let _ = tree.frame_mut(scope)?.counters.insert(name.clone(), 0);
                ops.push(CounterOp::Reset {
                    scope,
                    name: name.clone(),
                    previous: None,
                });
                scope
            }
        };
        if let Some(v) = tree.frame_mut(holder)?.counters.get_mut(&name) {
            *v += delta;
        }
        ops.push(CounterOp::Increment {
            scope: holder,
            name,
            delta,
        });
    }

    let frame = tree.frame_mut(id)?;
    frame.used.counter_ops = ops;
    frame.used.counters_applied = true;
    Ok(())
}

/// Nearest ancestor of `id` holding counter `name`.
fn holder_of(tree: &FrameTree, id: FrameId, name: &str) -> Option<FrameId> {
    tree.ancestors(id)
        .find(|a| tree.frame(*a).is_ok_and(|f| f.counters.contains_key(name)))
}

/// Innermost value of counter `name` in scope at `id`, or 0.
#[must_use]
pub fn counter_value(tree: &FrameTree, id: FrameId, name: &str) -> i32 {
    holder_of(tree, id, name)
        .and_then(|h| tree.frame(h).ok())
        .and_then(|f| f.counters.get(name).copied())
        .unwrap_or(0)
}

/// Every value of counter `name` in scope at `id`, outermost first.
#[must_use]
pub fn counter_values(tree: &FrameTree, id: FrameId, name: &str) -> Vec<i32> {
    let mut values: Vec<i32> = tree
        .ancestors(id)
        .filter_map(|a| tree.frame(a).ok().and_then(|f| f.counters.get(name).copied()))
        .collect();
    values.reverse();
    if values.is_empty() {
        values.push(0);
    }
    values
}

/// [§ 12.6.2 Lists: the 'list-style-type' property](https://www.w3.org/TR/CSS2/generate.html#lists)
///
/// "If a user agent does not support a numbering system, it should use
/// 'decimal'."
#[must_use]
pub fn format_counter(value: i32, style: ListStyleType) -> String {
    match style {
        ListStyleType::None => String::new(),
        ListStyleType::Disc => "\u{2022}".to_string(),
        ListStyleType::Circle => "\u{25e6}".to_string(),
        ListStyleType::Square => "\u{25aa}".to_string(),
        ListStyleType::Decimal => value.to_string(),
        ListStyleType::DecimalLeadingZero => {
            if value < 0 {
                format!("-{:02}", value.unsigned_abs())
            } else {
                format!("{value:02}")
            }
        }
        ListStyleType::LowerRoman => roman(value).map_or_else(|| value.to_string(), |r| r.to_lowercase()),
        ListStyleType::UpperRoman => roman(value).unwrap_or_else(|| value.to_string()),
        ListStyleType::LowerAlpha => alpha(value).map_or_else(|| value.to_string(), |a| a.to_lowercase()),
        ListStyleType::UpperAlpha => alpha(value).unwrap_or_else(|| value.to_string()),
    }
}

/// Upper-case Roman numeral for 1..=3999.
fn roman(value: i32) -> Option<String> {
    const NUMERALS: [(i32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if !(1..=3999).contains(&value) {
        return None;
    }
    let mut rest = value;
    let mut out = String::new();
    for (n, s) in NUMERALS {
        while rest >= n {
            out.push_str(s);
            rest -= n;
        }
    }
    Some(out)
}

/// "A", "B", ... "Z", "AA", "AB", ... for positive values.
fn alpha(value: i32) -> Option<String> {
    if value < 1 {
        return None;
    }
    let mut n = value as u32;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    Some(out.into_iter().rev().collect())
}

/// [§ 12.3 Quotation marks](https://www.w3.org/TR/CSS2/generate.html#quotes)
///
/// "The first (leftmost) pair represents the outermost level of quotation."
/// Deeper levels reuse the last pair.
fn quote_pair(style: &SpecifiedStyle, depth: i32) -> (&str, &str) {
    let Some(last) = style.quotes.len().checked_sub(1) else {
        return ("", "");
    };
    let level = usize::try_from(depth.max(0)).unwrap_or(0).min(last);
    let (open, close) = &style.quotes[level];
    (open, close)
}

/// The text of a `content` list at `id`, updating the quote depth.
fn content_text(tree: &FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId, style: &SpecifiedStyle) -> (String, i32) {
    let mut out = String::new();
    let mut delta = 0;
    for item in &style.content {
        match item {
            ContentItem::String(s) => out.push_str(s),
            ContentItem::Counter { name, style: kind } => {
                out.push_str(&format_counter(counter_value(tree, id, name), *kind));
            }
            ContentItem::Counters {
                name,
                separator,
                style: kind,
            } => {
                let parts: Vec<String> = counter_values(tree, id, name)
                    .into_iter()
                    .map(|v| format_counter(v, *kind))
                    .collect();
                out.push_str(&parts.join(separator));
            }
            ContentItem::OpenQuote => {
                out.push_str(quote_pair(style, ctx.quote_depth).0);
                ctx.quote_depth += 1;
                delta += 1;
            }
            ContentItem::NoOpenQuote => {
                ctx.quote_depth += 1;
                delta += 1;
            }
            // "A 'close-quote' or 'no-close-quote' that would make the depth
            // negative is in error and is ignored."
            ContentItem::CloseQuote => {
                if ctx.quote_depth > 0 {
                    ctx.quote_depth -= 1;
                    delta -= 1;
                    out.push_str(quote_pair(style, ctx.quote_depth).1);
                }
            }
            ContentItem::NoCloseQuote => {
                if ctx.quote_depth > 0 {
                    ctx.quote_depth -= 1;
                    delta -= 1;
                }
            }
        }
    }
    (out, delta)
}

/// Create the synthetic text child of a generated box.
fn synthesize(tree: &mut FrameTree, ctx: &mut LayoutContext<'_>, id: FrameId) -> Result<()> {
    let style = tree.style(id)?;
    let (text, delta) = content_text(tree, ctx, id, &style);
    if !text.is_empty() {
        let text_style = SpecifiedStyle::inherit(&style, Display::Inline);
        let child = tree.create_text(&text, Rc::new(text_style));
        tree.frame_mut(child)?.synthetic = true;
        tree.append_child(id, child)?;
    }
    let frame = tree.frame_mut(id)?;
    frame.content_synthesized = true;
    frame.used.quote_delta += delta;
    tracing::trace!(%id, %text, "synthesized generated content");
    Ok(())
}

/// Width of the literal strings in `content`, used to size a generated box
/// before its text exists.
#[must_use]
pub fn static_width(ctx: &LayoutContext<'_>, style: &SpecifiedStyle) -> f32 {
    let literal: String = style
        .content
        .iter()
        .filter_map(|item| match item {
            ContentItem::String(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    ctx.metrics.text_width(
        &literal,
        font_name(style, ctx.config),
        style.font_size,
        style.word_spacing,
        style.letter_spacing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::font::ApproximateFontMetrics;
    use crate::style::CounterDirective;
    use quire_common::Diagnostics;

    #[test]
    fn test_format_counter_styles() {
        assert_eq!(format_counter(4, ListStyleType::Decimal), "4");
        assert_eq!(format_counter(7, ListStyleType::DecimalLeadingZero), "07");
        assert_eq!(format_counter(1994, ListStyleType::UpperRoman), "MCMXCIV");
        assert_eq!(format_counter(14, ListStyleType::LowerRoman), "xiv");
        assert_eq!(format_counter(28, ListStyleType::LowerAlpha), "ab");
        assert_eq!(format_counter(26, ListStyleType::UpperAlpha), "Z");
        assert_eq!(format_counter(0, ListStyleType::UpperRoman), "0");
        assert_eq!(format_counter(3, ListStyleType::None), "");
    }

    #[test]
    fn test_reset_then_increment_on_siblings() {
        let metrics = ApproximateFontMetrics;
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        let mut tree = FrameTree::new();

        let root = tree.create_element("body", SpecifiedStyle::block());
        let mut h1 = SpecifiedStyle::block();
        h1.counter_reset = vec![CounterDirective::new("section", 0)];
        let h1 = tree.create_element("h1", h1);
        let mut h2 = SpecifiedStyle::block();
        h2.counter_increment = vec![CounterDirective::new("section", 1)];
        let a = tree.create_element("h2", h2.clone());
        let b = tree.create_element("h2", h2);
        for c in [h1, a, b] {
            tree.append_child(root, c).unwrap();
        }
        for c in [h1, a, b] {
            enter(&mut tree, &mut ctx, c).unwrap();
        }
        assert_eq!(tree.frame(root).unwrap().counters.get("section"), Some(&2));

        let summary = tree.reset(b).unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(tree.frame(root).unwrap().counters.get("section"), Some(&1));
    }

    #[test]
    fn test_generated_quotes_nest() {
        let metrics = ApproximateFontMetrics;
        let config = LayoutConfig::default();
        let mut diagnostics = Diagnostics::new();
        let mut ctx = LayoutContext::new(&metrics, &config, &mut diagnostics);
        let mut tree = FrameTree::new();

        let mut style = SpecifiedStyle::default();
        style.content = vec![ContentItem::OpenQuote, ContentItem::OpenQuote];
        let g = tree.create_element("q", style);
        tree.frame_mut(g).unwrap().generated = true;
        enter(&mut tree, &mut ctx, g).unwrap();

        let child = tree.first_child(g).unwrap();
        assert_eq!(tree.frame(child).unwrap().text(), Some("\u{201c}\u{2018}"));
        assert_eq!(ctx.quote_depth, 2);
        assert_eq!(tree.reset(g).unwrap().quote_delta, 2);
        assert!(tree.first_child(g).is_none());
    }
}
