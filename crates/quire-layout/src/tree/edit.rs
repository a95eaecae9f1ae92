//! Tree edits: insertion, removal, page splits, copies and resets.
//!
//! Every edit keeps the parent/child/sibling links consistent, recomputes the
//! inherited opacity of moved subtrees, and drops cached content widths on
//! the new and old ancestors.

use crate::error::{LayoutError, Result};
use crate::style::CounterOp;

use super::{Frame, FrameId, FrameKind, FrameTree};

/// What `reset` undid that lives outside the reset subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSummary {
    /// Net quote nesting change to subtract from the document's depth.
    pub quote_delta: i32,
    /// Number of frames reset.
    pub frames: usize,
}

impl FrameTree {
    /// Append `child` as the last child of `parent`, detaching it first if it
    /// already has a parent.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if either id is stale.
    pub fn append_child(&mut self, parent: FrameId, child: FrameId) -> Result<()> {
        let last = self.frame(parent)?.last_child;
        self.link(parent, child, last, None)
    }

    /// Insert `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if either id is stale.
    pub fn prepend_child(&mut self, parent: FrameId, child: FrameId) -> Result<()> {
        let first = self.frame(parent)?.first_child;
        self.link(parent, child, None, first)
    }

    /// Insert `child` immediately before `reference`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] if `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: FrameId,
        child: FrameId,
        reference: FrameId,
    ) -> Result<()> {
        self.expect_child(parent, reference)?;
        let prev = self.frame(reference)?.prev_sibling;
        self.link(parent, child, prev, Some(reference))
    }

    /// Insert `child` immediately after `reference`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] if `reference` is not a child of `parent`.
    pub fn insert_after(
        &mut self,
        parent: FrameId,
        child: FrameId,
        reference: FrameId,
    ) -> Result<()> {
        self.expect_child(parent, reference)?;
        let next = self.frame(reference)?.next_sibling;
        self.link(parent, child, Some(reference), next)
    }

    /// Unlink `child` from `parent`. The child stays allocated and may be
    /// re-inserted elsewhere.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: FrameId, child: FrameId) -> Result<()> {
        self.expect_child(parent, child)?;
        self.unlink(child)
    }

    fn expect_child(&self, parent: FrameId, child: FrameId) -> Result<()> {
        if self.frame(child)?.parent == Some(parent) {
            Ok(())
        } else {
            Err(LayoutError::NotAChild { parent, child })
        }
    }

    fn unlink(&mut self, child: FrameId) -> Result<()> {
        let (parent, prev, next) = {
            let f = self.frame(child)?;
            (f.parent, f.prev_sibling, f.next_sibling)
        };
        let Some(parent) = parent else {
            return Ok(());
        };
        match prev {
            Some(p) => self.frame_mut(p)?.next_sibling = next,
            None => self.frame_mut(parent)?.first_child = next,
        }
        match next {
            Some(n) => self.frame_mut(n)?.prev_sibling = prev,
            None => self.frame_mut(parent)?.last_child = prev,
        }
        let f = self.frame_mut(child)?;
        f.parent = None;
        f.prev_sibling = None;
        f.next_sibling = None;
        self.invalidate(parent);
        Ok(())
    }

    fn link(
        &mut self,
        parent: FrameId,
        child: FrameId,
        prev: Option<FrameId>,
        next: Option<FrameId>,
    ) -> Result<()> {
        if child == parent || self.is_descendant_of(parent, child) {
            return Err(LayoutError::NotAChild { parent, child });
        }
        if prev == Some(child) || next == Some(child) {
            return Ok(());
        }
        self.unlink(child)?;
        {
            let f = self.frame_mut(child)?;
            f.parent = Some(parent);
            f.prev_sibling = prev;
            f.next_sibling = next;
        }
        match prev {
            Some(p) => self.frame_mut(p)?.next_sibling = Some(child),
            None => self.frame_mut(parent)?.first_child = Some(child),
        }
        match next {
            Some(n) => self.frame_mut(n)?.prev_sibling = Some(child),
            None => self.frame_mut(parent)?.last_child = Some(child),
        }
        self.invalidate(parent);
        self.inherit_opacity(child)
    }

    /// Drop cached content widths of `id` and its ancestors.
    fn invalidate(&mut self, id: FrameId) {
        let chain: Vec<FrameId> = std::iter::once(id).chain(self.ancestors(id)).collect();
        for a in chain {
            if let Ok(f) = self.frame_mut(a) {
                f.min_max = None;
            }
        }
    }

    /// Recompute `opacity` for a subtree from its new parent.
    fn inherit_opacity(&mut self, id: FrameId) -> Result<()> {
        for node in self.descendants(id) {
            let inherited = self
                .parent(node)
                .and_then(|p| self.frame(p).ok())
                .map_or(1.0, |p| p.opacity);
            let f = self.frame_mut(node)?;
            f.opacity = inherited * f.style.opacity.clamp(0.0, 1.0);
        }
        Ok(())
    }

    /// A fresh, detached frame with the same kind and style and no layout
    /// state or children.
    fn copy_shell(&mut self, id: FrameId) -> Result<FrameId> {
        let source = self.frame(id)?;
        let mut copy = Frame::new(FrameId(self.frames.len()), source.kind.clone(), source.style.clone());
        copy.generated = source.generated;
        copy.synthetic = source.synthetic;
        copy.text_prepared = source.text_prepared;
        let copy_id = copy.id;
        self.frames.push(copy);
        Ok(copy_id)
    }

    /// [§ 13.3.3 Allowed page breaks](https://www.w3.org/TR/CSS2/page.html#allowed-page-breaks)
    ///
    /// Split `id` before its child `at`: a copy of `id` is inserted after it
    /// and receives `at` and every following sibling. Counter scopes are
    /// carried over and a table copy keeps the original's column widths.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] if `at` is not a child of `id`.
    pub fn split(&mut self, id: FrameId, at: FrameId) -> Result<FrameId> {
        self.expect_child(id, at)?;
        let copy = self.copy_shell(id)?;
        {
            let source = self.frame(id)?;
            let counters = source.counters.clone();
            let continues_after = source.fragment.continues_after;
            let cellmap = source.cellmap.as_ref().map(|c| Box::new(c.locked_copy()));
            let c = self.frame_mut(copy)?;
            c.counters = counters;
            c.cellmap = cellmap;
            c.fragment.continues_before = true;
            c.fragment.continues_after = continues_after;
        }
        self.frame_mut(id)?.fragment.continues_after = true;

        let mut moving = Vec::new();
        let mut cursor = Some(at);
        while let Some(child) = cursor {
            moving.push(child);
            cursor = self.next_sibling(child);
        }
        for child in moving {
            self.append_child(copy, child)?;
        }
        if let Some(parent) = self.parent(id) {
            self.insert_after(parent, copy, id)?;
        }
        tracing::trace!(%id, %at, %copy, "split frame");
        Ok(copy)
    }

    /// Split a text frame's characters: the frame keeps `..head_end`, and a
    /// new sibling inserted after it receives `tail_start..`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn split_text(&mut self, id: FrameId, head_end: usize, tail_start: usize) -> Result<FrameId> {
        let tail = self.copy_shell(id)?;
        let rest = match &mut self.frame_mut(id)?.kind {
            FrameKind::Text { text } => {
                let rest = text.get(tail_start..).unwrap_or_default().to_string();
                text.truncate(head_end.min(text.len()));
                rest
            }
            _ => String::new(),
        };
        {
            let t = self.frame_mut(tail)?;
            t.kind = FrameKind::Text { text: rest };
            t.text_prepared = true;
        }
        if let Some(parent) = self.parent(id) {
            self.insert_after(parent, tail, id)?;
        }
        Ok(tail)
    }

    /// Copy a subtree into fresh, unlaid-out frames. The copy is detached.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn deep_copy(&mut self, id: FrameId) -> Result<FrameId> {
        let copy = self.copy_shell(id)?;
        for child in self.child_ids(id) {
            if self.frame(child)?.synthetic {
                continue;
            }
            let child_copy = self.deep_copy(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Restore a subtree to its pre-layout state.
    ///
    /// Used values, positions, line boxes and unlocked cellmaps are dropped;
    /// counter operations are undone on their scopes; generated boxes lose
    /// their synthesized children so the next reflow recreates them.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn reset(&mut self, id: FrameId) -> Result<ResetSummary> {
        let mut summary = ResetSummary::default();
        let mut nodes = self.descendants(id);
        nodes.reverse();
        for node in nodes {
            if !self.is_live(node) {
                continue;
            }
            let (ops, quote_delta, discard) = {
                let f = self.frame_mut(node)?;
                let ops = std::mem::take(&mut f.used.counter_ops);
                let quote_delta = f.used.quote_delta;
                (ops, quote_delta, f.synthetic)
            };
            self.undo_counter_ops(ops);
            summary.quote_delta += quote_delta;
            summary.frames += 1;
            if discard {
                self.dispose(node)?;
                continue;
            }
            let f = self.frame_mut(node)?;
            f.used = Default::default();
            f.position = None;
            f.lines.clear();
            f.min_max = None;
            f.containing_block = Default::default();
            if f.generated {
                f.content_synthesized = false;
            }
            f.cellmap = f
                .cellmap
                .take()
                .filter(|c| c.is_locked())
                .map(|c| Box::new(c.locked_copy()));
        }
        Ok(summary)
    }

    fn undo_counter_ops(&mut self, ops: Vec<CounterOp>) {
        for op in ops.into_iter().rev() {
            match op {
                CounterOp::Increment { scope, name, delta } => {
                    if let Ok(f) = self.frame_mut(scope)
                        && let Some(v) = f.counters.get_mut(&name)
                    {
                        *v -= delta;
                    }
                }
                CounterOp::Reset {
                    scope,
                    name,
                    previous,
                } => {
                    if let Ok(f) = self.frame_mut(scope) {
                        match previous {
                            Some(v) => {
                                let _ = f.counters.insert(name, v);
                            }
                            None => {
                                let _ = f.counters.remove(&name);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Detach a subtree and release its frames. Their ids become stale.
    ///
    /// # Errors
    ///
    /// [`LayoutError::DetachedFrame`] if the id is stale.
    pub fn dispose(&mut self, id: FrameId) -> Result<()> {
        self.unlink(id)?;
        for node in self.descendants(id) {
            let f = self.frame_mut(node)?;
            f.lines = Vec::new();
            f.cellmap = None;
            f.counters.clear();
            if let FrameKind::Text { text } = &mut f.kind {
                *text = String::new();
            }
            f.live = false;
        }
        Ok(())
    }
}
