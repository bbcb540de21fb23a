#![deny(missing_docs)]
//! # strand: umbrella crate
//!
//! Single import surface for the strand continuation engine. Re-exports
//! the value crate and the engine, plus a `prelude` for the happy path.

pub use strand_engine;
pub use strand0;

pub use strand_engine::step;

/// Happy-path imports for building chains.
pub mod prelude {
    pub use strand0::{BranchFailure, Fault, Kind, List, Map, Outcome, Value, copy};

    pub use strand_engine::{
        Arg, Branches, Callback, Context, Dispatch, Engine, EngineConfig, ForkJob, Key,
        OutputMode, Path, Step, cond_step, convert, convert_with, fork_step, log_step, stop_step,
    };

    #[cfg(feature = "test-utils")]
    pub use strand0::test_utils::{ManualScheduler, RecordingDiagnostics};
}
