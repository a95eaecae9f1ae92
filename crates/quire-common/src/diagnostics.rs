//! Layout diagnostics with deduplication.
//!
//! A [`Diagnostics`] collector lives for exactly one render invocation. Layout
//! code records recoverable anomalies here (a missing cellmap row, a float that
//! never found room) and keeps going; the caller receives the collected list
//! once rendering completes.

use std::collections::HashSet;

use serde::Serialize;

/// A single recorded warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Subsystem that raised the warning (e.g. `"table"`, `"float"`).
    pub component: String,
    /// Human readable description.
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

/// Collector of recoverable anomalies for one render.
#[derive(Debug, Default)]
pub struct Diagnostics {
    seen: HashSet<(String, String)>,
    warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning (once per unique component/message pair).
    ///
    /// # Example
    /// ```
    /// let mut diagnostics = quire_common::Diagnostics::new();
    /// diagnostics.warn_once("table", "row 3 missing from cellmap");
    /// diagnostics.warn_once("table", "row 3 missing from cellmap");
    /// assert_eq!(diagnostics.len(), 1);
    /// ```
    pub fn warn_once(&mut self, component: &str, message: &str) {
        let key = (component.to_string(), message.to_string());
        if !self.seen.insert(key) {
            return;
        }
        tracing::warn!(component, "{message}");
        self.warnings.push(Diagnostic {
            component: component.to_string(),
            message: message.to_string(),
        });
    }

    /// Warnings recorded so far, in the order they were first raised.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Number of distinct warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consume the collector, yielding its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Diagnostic> {
        self.warnings
    }

    /// Forget everything recorded (call before reusing for a new document).
    pub fn clear(&mut self) {
        self.seen.clear();
        self.warnings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_warnings_recorded_once() {
        let mut d = Diagnostics::new();
        d.warn_once("float", "iteration limit reached");
        d.warn_once("float", "iteration limit reached");
        d.warn_once("table", "iteration limit reached");
        assert_eq!(d.len(), 2);
        assert_eq!(d.warnings()[1].component, "table");
    }

    #[test]
    fn test_clear_allows_warning_again() {
        let mut d = Diagnostics::new();
        d.warn_once("page", "frame taller than page");
        d.clear();
        assert!(d.is_empty());
        d.warn_once("page", "frame taller than page");
        assert_eq!(d.into_warnings().len(), 1);
    }
}
