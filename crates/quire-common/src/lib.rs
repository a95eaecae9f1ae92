//! Common utilities for the Quire layout engine.
//!
//! This crate provides shared infrastructure used by all Quire components:
//! - **Diagnostics** - render-scoped, deduplicated warnings for recoverable
//!   layout anomalies

pub mod diagnostics;

pub use diagnostics::{Diagnostic, Diagnostics};
