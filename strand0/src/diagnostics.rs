//! The logging capability consumed by the engine.

use crate::value::Kind;

/// One malformed-input report.
///
/// Emitted once per structural, branch or adapted-external failure,
/// right before the corresponding fault is returned through the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The engine operation that produced the report (`call`, `cond`, `fork`, ...).
    pub operation: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Rendering of the offending input.
    pub input: String,
    /// Detected classification of the offending input, when it has one.
    pub kind: Option<Kind>,
}

impl Diagnostic {
    /// Create a report without an input classification.
    pub fn new(operation: &'static str, message: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            input: input.into(),
            kind: None,
        }
    }

    /// Attach the detected classification.
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Sink for [`Diagnostic`] reports.
///
/// Implementations must not call back into the engine; a report is
/// delivered while the engine is in the middle of failing a chain.
pub trait Diagnostics: Send + Sync {
    /// Record one report.
    fn report(&self, diagnostic: &Diagnostic);
}
