//! The trampoline executor.
//!
//! [`Engine::call`] prepends a path to the context's queue and dispatches
//! from the front until a step suspends or the queue drains. A step hands
//! control back through [`Engine::ret`] (or [`Engine::fail`]), which records
//! the result and re-enters the loop.
//!
//! Each context carries a `driving` flag. When `call` or `ret` arrives while
//! that context's loop is already on the stack, it only queues work and
//! marks the loop to continue, so a synchronous chain of any length runs
//! without growing the native stack. When it arrives from an asynchronous
//! callback the loop is idle and the caller becomes the new driver.

use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::EngineError;
use crate::path::Path;
use crate::scheduler::TokioScheduler;
use crate::step::Step;
use crate::tracing_diagnostics::TracingDiagnostics;
use crate::validate;
use std::fmt;
use std::sync::Arc;
use strand0::{Diagnostic, Diagnostics, Fault, Outcome, Scheduler, Value};

struct Inner {
    diagnostics: Arc<dyn Diagnostics>,
    scheduler: Arc<dyn Scheduler>,
    config: EngineConfig,
}

/// A chain executor.
///
/// Cheap to clone; clones share capabilities and configuration. There is
/// no global engine: construct one with [`Engine::new`] or
/// [`Engine::builder`].
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

/// What a [`Engine::call`] left behind when it returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A step is still outstanding; the chain resumes when it returns.
    Suspended,
    /// The queue drained during this call. Carries the last result.
    Finished(Outcome),
}

impl Dispatch {
    /// True when the chain ran to the end of its queue.
    pub fn is_finished(&self) -> bool {
        matches!(self, Dispatch::Finished(_))
    }

    /// The final result, if the chain finished.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Dispatch::Finished(outcome) => Some(outcome),
            Dispatch::Suspended => None,
        }
    }
}

impl Engine {
    /// An engine with default configuration, [`TracingDiagnostics`] and a
    /// [`TokioScheduler`] bound to the ambient runtime.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                diagnostics: Arc::new(TracingDiagnostics::new()),
                scheduler: Arc::new(TokioScheduler::new()),
                config: EngineConfig::default(),
            }),
        }
    }

    /// Start configuring an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub(crate) fn scheduler(&self) -> &dyn Scheduler {
        self.inner.scheduler.as_ref()
    }

    /// Run `path` on a fresh context and hand the context back.
    ///
    /// The chain may still be suspended when this returns; read
    /// [`Context::last`] after its final step has returned.
    pub fn run(&self, path: impl Into<Path>) -> Context {
        let ctx = Context::new();
        self.call(&ctx, path);
        ctx
    }

    /// Prepend `path` to the context's queue and advance the chain.
    ///
    /// An empty path just resumes whatever is already queued; if nothing
    /// is, the chain finishes with its current last result.
    pub fn call(&self, ctx: &Context, path: impl Into<Path>) -> Dispatch {
        self.enter(ctx, path.into().flatten(), None)
    }

    /// Like [`call`](Engine::call) for a dynamic path description.
    ///
    /// A malformed description is reported and the chain continues with a
    /// [`Fault::Structural`] result.
    pub fn call_value(&self, ctx: &Context, path: &Value) -> Dispatch {
        match validate::path(path) {
            Ok(path) => self.call(ctx, path),
            Err(fault) => self.reject(ctx, "call", path, fault),
        }
    }

    /// Finish the current step with `value`.
    pub fn ret(&self, ctx: &Context, value: impl Into<Value>) -> Dispatch {
        self.resume(ctx, Ok(value.into()))
    }

    /// Finish the current step with a failure.
    pub fn fail(&self, ctx: &Context, fault: Fault) -> Dispatch {
        self.resume(ctx, Err(fault))
    }

    /// Finish the current step with an outcome.
    pub fn resume(&self, ctx: &Context, outcome: Outcome) -> Dispatch {
        self.enter(ctx, Vec::new(), Some(outcome))
    }

    pub(crate) fn report(&self, diagnostic: &Diagnostic) {
        self.inner.diagnostics.report(diagnostic);
    }

    /// Report malformed `input` and fail the current step with `fault`.
    pub(crate) fn reject(
        &self,
        ctx: &Context,
        operation: &'static str,
        input: &Value,
        fault: Fault,
    ) -> Dispatch {
        let diagnostic =
            Diagnostic::new(operation, fault.to_string(), format!("{input:?}")).with_kind(input.kind());
        self.report(&diagnostic);
        self.fail(ctx, fault)
    }

    fn enter(&self, ctx: &Context, steps: Vec<Step>, outcome: Option<Outcome>) -> Dispatch {
        {
            let mut frame = ctx.frame();
            if let Some(outcome) = outcome {
                frame.last = outcome;
            }
            frame.prepend(steps);
            if frame.driving {
                frame.resumed = true;
                return Dispatch::Suspended;
            }
            frame.driving = true;
        }
        self.drive(ctx)
    }

    fn drive(&self, ctx: &Context) -> Dispatch {
        loop {
            let step = {
                let mut frame = ctx.frame();
                match frame.pending.pop_front() {
                    Some(step) => {
                        frame.resumed = false;
                        step
                    }
                    None => {
                        frame.driving = false;
                        frame.resumed = false;
                        return Dispatch::Finished(frame.last.clone());
                    }
                }
            };
            tracing::trace!(step = step.name().unwrap_or("anonymous"), "strand.dispatch");
            step.dispatch(self, ctx);

            let mut frame = ctx.frame();
            if !frame.resumed {
                frame.driving = false;
                return Dispatch::Suspended;
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    diagnostics: Option<Arc<dyn Diagnostics>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Where malformed-input reports go. Defaults to [`TracingDiagnostics`].
    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Timer used by `fork` for beats. Defaults to [`TokioScheduler`].
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Engine-wide defaults.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> Result<Engine, EngineError> {
        self.config.validate()?;
        Ok(Engine {
            inner: Arc::new(Inner {
                diagnostics: self
                    .diagnostics
                    .unwrap_or_else(|| Arc::new(TracingDiagnostics::new())),
                scheduler: self
                    .scheduler
                    .unwrap_or_else(|| Arc::new(TokioScheduler::new())),
                config: self.config,
            }),
        })
    }
}
