//! Faults: the failure half of the result channel.

use crate::value::{Kind, Value};
use thiserror::Error;

/// What the last step of a chain produced.
///
/// Steps never raise. A failed step leaves `Err(fault)` as the context's
/// last result, and the chain keeps running; downstream steps branch on
/// it (usually through `cond`).
pub type Outcome = Result<Value, Fault>;

/// Why an operation failed.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Fault {
    /// Input had the wrong shape (a malformed path, step or fork source).
    #[error("{operation}: expected {expected}, found {found}")]
    Structural {
        /// The operation that rejected its input.
        operation: &'static str,
        /// What the operation accepts.
        expected: &'static str,
        /// What it actually got.
        found: Kind,
    },

    /// `cond` found neither a matching key nor a default.
    #[error("no branch for result {result} and no default")]
    NoBranch {
        /// Rendering of the unmatched result.
        result: String,
    },

    /// One or more fork branches failed. Successful slots are still
    /// present in `output`; failed slots hold `Null`.
    #[error("{} fork branch(es) failed", .failures.len())]
    Branches {
        /// The fork output container.
        output: Value,
        /// Failures in source order.
        failures: Vec<BranchFailure>,
    },

    /// An error reported by an adapted callback-style function.
    #[error("external error: {0}")]
    External(String),

    /// A step declared its own failure.
    #[error("failed: {0}")]
    Failed(String),

    /// A cyclic value cannot be represented in the requested format.
    #[error("value is cyclic")]
    Cyclic,

    /// A delayed task could not be scheduled.
    #[error("scheduler unavailable: {0}")]
    Scheduler(String),
}

impl Fault {
    /// Shorthand for [`Fault::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Fault::Failed(message.into())
    }
}

/// A failed fork branch.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchFailure {
    /// The source key of the branch (`Int` index or `Str` key).
    pub slot: Value,
    /// What the branch ended with.
    pub fault: Fault,
}
