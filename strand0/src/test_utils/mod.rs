//! In-memory capability implementations for testing.
//!
//! Available behind the `test-utils` feature flag.

mod manual_scheduler;
mod recording_diagnostics;

pub use manual_scheduler::ManualScheduler;
pub use recording_diagnostics::RecordingDiagnostics;
