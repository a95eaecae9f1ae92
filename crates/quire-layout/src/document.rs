//! Paged documents.
//!
//! [§ 13.3 Page breaks](https://www.w3.org/TR/CSS2/page.html#page-breaks)
//!
//! A [`Document`] owns the frame tree and drives pagination: each page frame
//! receives the content that is left, is reflowed, and on [`Flow::Break`]
//! the content is split at the break. Everything from the break onwards is
//! reset and becomes the next page's content. Fixed-position boxes met on a
//! page are copied onto every later page.

use std::rc::Rc;

use quire_common::{Diagnostic, Diagnostics};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::font::FontMetrics;
use crate::paint::{Canvas, Renderer};
use crate::reflow::{self, Flow, LayoutContext};
use crate::style::{Position, SpecifiedStyle};
use crate::tree::{FrameId, FrameKind, FrameTree};

/// Outcome of [`Document::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// Pages painted.
    pub page_count: usize,
    /// Recoverable anomalies met during layout, in the order first seen.
    pub warnings: Vec<Diagnostic>,
}

/// A styled frame tree and the options to lay it out with.
#[derive(Debug)]
pub struct Document {
    tree: FrameTree,
    root: FrameId,
    config: LayoutConfig,
    diagnostics: Diagnostics,
}

impl Document {
    /// Wrap a tree whose content root is `root`.
    #[must_use]
    pub fn new(tree: FrameTree, root: FrameId, config: LayoutConfig) -> Self {
        Self {
            tree,
            root,
            config,
            diagnostics: Diagnostics::new(),
        }
    }

    /// The frame tree, including page frames after [`Document::layout`].
    #[must_use]
    pub const fn tree(&self) -> &FrameTree {
        &self.tree
    }

    /// The content root.
    #[must_use]
    pub const fn root(&self) -> FrameId {
        self.root
    }

    /// The options in effect.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        self.diagnostics.warnings()
    }

    /// Lay the content out on as many pages as it needs and return the page
    /// frames in order.
    ///
    /// # Errors
    ///
    /// Structural errors from reflow or a page split.
    pub fn layout(&mut self, metrics: &dyn FontMetrics) -> Result<Vec<FrameId>> {
        let mut pages = Vec::new();
        let mut fixed: Vec<FrameId> = Vec::new();
        let mut quote_depth = 0;
        let mut content = Some(self.root);

        while let Some(root) = content.take() {
            let page = self
                .tree
                .create(FrameKind::Page, Rc::new(SpecifiedStyle::default()));
            self.tree.append_child(page, root)?;
            for &original in &fixed {
                let copy = self.tree.deep_copy(original)?;
                self.tree.frame_mut(copy)?.repeated = true;
                self.tree.append_child(page, copy)?;
            }

            let mut ctx = LayoutContext::new(metrics, &self.config, &mut self.diagnostics);
            ctx.quote_depth = quote_depth;
            let flow = reflow::reflow(&mut self.tree, &mut ctx, page, None)?;
            quote_depth = ctx.quote_depth;
            let met_fixed = std::mem::take(&mut ctx.fixed);
            drop(ctx);

            if let Flow::Break(at) = flow {
                if self.leaves_page_empty(root, at) {
                    let number = pages.len() + 1;
                    self.diagnostics.warn_once(
                        "page",
                        &format!("break before {at} would leave page {number} empty; content overflows"),
                    );
                } else {
                    let (tail, quote_delta) = self.split_at(page, root, at)?;
                    quote_depth -= quote_delta;
                    content = Some(tail);
                }
            }

            for frame in met_fixed {
                if self.tree.is_live(frame)
                    && !self.tree.frame(frame)?.repeated
                    && self.tree.is_descendant_of(frame, page)
                    && self.tree.frame(frame)?.style.position == Position::Fixed
                {
                    fixed.push(frame);
                }
            }
            tracing::debug!(page = pages.len() + 1, %page, more = content.is_some(), "page laid out");
            pages.push(page);
        }
        Ok(pages)
    }

    /// Returns true if breaking before `at` would move everything on the page.
    fn leaves_page_empty(&self, root: FrameId, at: FrameId) -> bool {
        if at == root {
            return true;
        }
        let mut node = at;
        loop {
            if !reflow::is_first_content_child(&self.tree, node) {
                return false;
            }
            match self.tree.parent(node) {
                Some(parent) if parent != root => node = parent,
                _ => return true,
            }
        }
    }

    /// Split the content root at `at` and detach the continuation.
    ///
    /// Frames from `at` onwards are reset first, so that counter values the
    /// split copies onto the continuation are those in force at the break.
    fn split_at(&mut self, page: FrameId, root: FrameId, at: FrameId) -> Result<(FrameId, i32)> {
        let mut quote_delta = 0;
        let mut frames = 0;
        // The ancestors of `at` keep their first fragment; only what follows
        // them at each level moves.
        let mut level = at;
        let mut cursor = Some(at);
        loop {
            while let Some(sibling) = cursor {
                let summary = self.tree.reset(sibling)?;
                quote_delta += summary.quote_delta;
                frames += summary.frames;
                cursor = self.tree.next_sibling(sibling);
            }
            match self.tree.parent(level) {
                Some(parent) if parent != root => {
                    level = parent;
                    cursor = self.tree.next_sibling(parent);
                }
                _ => break,
            }
        }

        let mut tail = at;
        while let Some(parent) = self.tree.parent(tail)
            && parent != page
        {
            tail = self.tree.split(parent, tail)?;
        }
        self.tree.remove_child(page, tail)?;
        tracing::debug!(%at, %tail, frames, "content split for next page");
        Ok((tail, quote_delta))
    }

    /// Lay out and paint every page, disposing of each page once painted.
    ///
    /// # Errors
    ///
    /// Structural errors from layout or painting.
    pub fn render(mut self, metrics: &dyn FontMetrics, canvas: &mut dyn Canvas) -> Result<RenderOutput> {
        let pages = self.layout(metrics)?;
        for &page in &pages {
            Renderer::paint_page(&self.tree, page, canvas)?;
            self.tree.dispose(page)?;
        }
        Ok(RenderOutput {
            page_count: pages.len(),
            warnings: self.diagnostics.into_warnings(),
        })
    }
}
