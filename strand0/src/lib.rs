//! # strand0: values and capabilities for the strand continuation engine
//!
//! This crate holds everything the engine needs that does not depend on
//! the engine itself: the dynamic value model threaded through chains,
//! the structural copier that isolates fork branches, the fault taxonomy
//! that rides the single result channel, and the two capabilities an
//! engine consumes from its host.
//!
//! ## Contents
//!
//! | Module | Types | What it does |
//! |--------|-------|-------------|
//! | value | [`Value`], [`List`], [`Map`], [`Native`], [`Kind`] | Dynamic data, exact equality, classification |
//! | copy | [`Copier`], [`copy`] | Cycle-safe deep clone |
//! | error | [`Fault`], [`Outcome`], [`BranchFailure`] | Failures as ordinary results |
//! | diagnostics | [`Diagnostics`], [`Diagnostic`] | Sink for malformed-input reports |
//! | schedule | [`Scheduler`], [`Task`] | Delayed tasks for admission polling |
//! | duration | [`Millis`] | Stable millisecond duration for configuration |
//!
//! ## Design Principle
//!
//! Nothing here raises. Structural problems are classified with
//! [`Kind`], reported once through [`Diagnostics`] by the caller, and
//! turned into a [`Fault`] that flows through `Outcome` like any other
//! result. Composite values are shared handles so that self-reference
//! and externally grown fork sources can be expressed without unsafe
//! code or a garbage collector.

#![deny(missing_docs)]

pub mod copy;
pub mod diagnostics;
pub mod duration;
pub mod error;
pub mod schedule;
pub mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

#[doc(hidden)]
pub mod sync;

pub use copy::{Copier, copy};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use duration::Millis;
pub use error::{BranchFailure, Fault, Outcome};
pub use schedule::{Scheduler, Task};
pub use value::{Kind, List, Map, Native, Value};
