//! Concrete [`Diagnostics`] using the [`tracing`] crate.

use strand0::{Diagnostic, Diagnostics};

/// Emits every report as a `WARN` event named `strand.diagnostic`.
///
/// Wire to any `tracing`-compatible subscriber.
#[derive(Debug, Clone, Copy)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    /// Create a new `TracingDiagnostics`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::warn!(
            operation = diagnostic.operation,
            input = %diagnostic.input,
            kind = ?diagnostic.kind,
            "strand.diagnostic: {}",
            diagnostic.message
        );
    }
}
