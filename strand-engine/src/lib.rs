#![deny(missing_docs)]
//! Continuation-passing chain engine.
//!
//! Sequences, branches and fans out callback-style operations using only
//! plain function values and explicit queues. A chain's "stack" lives in
//! its [`Context`] queue, so steps may hand control back synchronously or
//! from any later callback without the engine ever blocking.
//!
//! | Operation | Entry point |
//! |-----------|-------------|
//! | sequential call / return | [`Engine::call`], [`Engine::ret`], [`Engine::fail`] |
//! | branching | [`Engine::cond`], [`cond_step`] |
//! | fan-out / fan-in | [`Engine::fork`], [`fork_step`] |
//! | early exit | [`Engine::stop`], [`stop_step`] |
//! | callback adapter | [`convert`], [`convert_with`] |
//! | pass-through logging | [`log_step`] |
//!
//! ```
//! use strand_engine::{step, Engine};
//! use strand0::Value;
//!
//! fn inc(engine: &Engine, ctx: &strand_engine::Context, _: Vec<Value>) {
//!     let n = ctx.last().ok().and_then(|v| v.as_i64()).unwrap_or(0);
//!     engine.ret(ctx, n + 1);
//! }
//!
//! let engine = Engine::new();
//! let ctx = engine.run(vec![step!(inc), step!(inc), step!(inc)]);
//! assert_eq!(ctx.last(), Ok(Value::Int(3)));
//! ```

pub mod cond;
pub mod config;
pub mod context;
pub mod convert;
pub mod engine;
pub mod error;
pub mod fork;
pub mod log;
pub mod param;
pub mod path;
pub mod scheduler;
pub mod step;
pub mod stop;
pub mod tracing_diagnostics;
pub mod validate;

pub use cond::{Branches, Key, cond_step};
pub use config::{DEFAULT_BEAT, EngineConfig, ForkDefaults};
pub use context::Context;
pub use convert::{Callback, convert, convert_with};
pub use engine::{Dispatch, Engine, EngineBuilder};
pub use error::EngineError;
pub use fork::{ForkJob, Gate, Generator, OutputMode, fork_step};
pub use log::log_step;
pub use param::{Arg, ParamRef};
pub use path::Path;
pub use scheduler::TokioScheduler;
pub use step::{Action, Step};
pub use stop::stop_step;
pub use tracing_diagnostics::TracingDiagnostics;
