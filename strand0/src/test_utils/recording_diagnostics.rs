//! RecordingDiagnostics: keeps every report for inspection.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::sync::lock;
use std::sync::Mutex;

/// A [`Diagnostics`] sink that records every report.
/// Use `.reports()` to inspect what was recorded.
#[derive(Default)]
pub struct RecordingDiagnostics {
    reports: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all recorded reports.
    pub fn reports(&self) -> Vec<Diagnostic> {
        lock(&self.reports).clone()
    }

    /// Number of reports recorded so far.
    pub fn count(&self) -> usize {
        lock(&self.reports).len()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        lock(&self.reports).push(diagnostic.clone());
    }
}
