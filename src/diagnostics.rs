//! Per-operation diagnostic collection.
//!
//! Every pipeline operation returns a [`Diagnostics`] collector alongside its
//! result instead of writing to shared state, so repeated or concurrent runs
//! stay observably independent. Each record is also mirrored to `tracing`.

use serde::Serialize;

/// Severity of a collected diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress information.
    Info,
    /// Something was skipped but processing continued.
    Warning,
    /// An item failed; the batch continued without it.
    Error,
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

/// Ordered collector of diagnostics for one operation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational message.
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{}", message);
        self.push(Severity::Info, message);
    }

    /// Record a warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.push(Severity::Warning, message);
    }

    /// Record an error.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.push(Severity::Error, message);
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.entries.push(Diagnostic { severity, message });
    }

    /// Append all entries from another collector.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// All entries in recording order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Entries at exactly the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    /// Whether any error was recorded.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
