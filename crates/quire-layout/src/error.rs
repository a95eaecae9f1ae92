//! Structural layout errors.
//!
//! These are invariant violations in the frame tree or a table's cellmap.
//! They abort the current render. Recoverable anomalies go to
//! [`quire_common::Diagnostics`] instead.

use thiserror::Error;

use crate::tree::{Behavior, FrameId};

/// A fatal layout-consistency error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The frame id does not refer to a live frame in the arena.
    #[error("frame {0} is detached or was disposed")]
    DetachedFrame(FrameId),

    /// A tree edit named a parent that does not own the child.
    #[error("frame {child} is not a child of frame {parent}")]
    NotAChild {
        /// The claimed parent.
        parent: FrameId,
        /// The frame that was expected to be its child.
        child: FrameId,
    },

    /// A cellmap query for a frame that was never registered in that table.
    #[error("frame {frame} is not registered in the cellmap of table {table}")]
    NotInCellmap {
        /// The table owning the cellmap.
        table: FrameId,
        /// The frame that was looked up.
        frame: FrameId,
    },

    /// A table part was laid out with no table ancestor.
    #[error("frame {0} is a table part without an enclosing table")]
    NoEnclosingTable(FrameId),

    /// Content-based sizing was requested from a behavior that has no rule for it.
    #[error("min/max content width is undefined for {behavior} frame {frame}")]
    UnsupportedSizing {
        /// The frame that was measured.
        frame: FrameId,
        /// Its behavior.
        behavior: Behavior,
    },
}

/// Result alias used throughout the layout core.
pub type Result<T> = std::result::Result<T, LayoutError>;
