//! Steps: one dispatchable unit of work.

use crate::context::Context;
use crate::engine::Engine;
use crate::param::Arg;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use strand0::Value;

/// The function half of a step.
///
/// Receives the engine, the context of the chain it runs in, and its
/// resolved arguments. It must eventually hand control back with
/// [`Engine::ret`], [`Engine::fail`], [`Engine::resume`] or
/// [`Engine::call`], synchronously or from any later callback. A step
/// that never does so leaves its chain suspended forever.
pub type Action = Arc<dyn Fn(&Engine, &Context, Vec<Value>) + Send + Sync>;

/// An action plus its argument list.
#[derive(Clone)]
pub struct Step {
    action: Action,
    args: Vec<Arg>,
    name: Option<Cow<'static, str>>,
}

impl Step {
    /// Create a step from a closure or function.
    pub fn new<F>(action: F, args: Vec<Arg>) -> Self
    where
        F: Fn(&Engine, &Context, Vec<Value>) + Send + Sync + 'static,
    {
        Self::from_action(Arc::new(action), args)
    }

    /// Create a step that takes no arguments.
    pub fn bare<F>(action: F) -> Self
    where
        F: Fn(&Engine, &Context, Vec<Value>) + Send + Sync + 'static,
    {
        Self::new(action, Vec::new())
    }

    /// Create a step from an existing shared action.
    pub fn from_action(action: Action, args: Vec<Arg>) -> Self {
        Self {
            action,
            args,
            name: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Label the step for tracing and diagnostics.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The label, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The unresolved arguments.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// The shared action.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Resolve arguments against `ctx` and invoke the action.
    pub(crate) fn dispatch(&self, engine: &Engine, ctx: &Context) {
        let args = self.args.iter().map(|arg| arg.resolve(ctx)).collect();
        (self.action)(engine, ctx, args);
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name())
            .field("args", &self.args)
            .finish()
    }
}

/// A step stored inside a dynamic value, so lists of values can describe paths.
impl From<Step> for Value {
    fn from(step: Step) -> Self {
        Value::native(step)
    }
}

/// Build a [`Step`] from an action and any number of argument expressions.
///
/// Each argument goes through [`Arg::from`], so `"@x"` becomes a
/// reference to context field `x`.
///
/// ```
/// use strand_engine::{step, Engine};
///
/// let s = step!(|e: &Engine, ctx, args: Vec<_>| { e.ret(ctx, args[0].clone()); }, 1, "@x");
/// assert_eq!(s.args().len(), 2);
/// ```
#[macro_export]
macro_rules! step {
    ($action:expr $(, $arg:expr)* $(,)?) => {
        $crate::Step::new($action, vec![$($crate::Arg::from($arg)),*])
    };
}
