//! Adapting callback-style functions into step actions.
//!
//! The wrapped function receives the step's resolved arguments and a
//! callback it must invoke exactly once, from any thread and at any time.
//! Whatever the callback receives lands in the chain's last result.

use crate::context::Context;
use crate::engine::Engine;
use crate::step::Action;
use std::fmt;
use std::sync::Arc;
use strand0::{Diagnostic, Fault, Value};

/// The completion callback handed to an adapted function.
pub type Callback<E> = Box<dyn FnOnce(Result<Value, E>) + Send>;

/// Wrap `f` so that an error becomes a reported [`Fault::External`].
///
/// ```
/// use strand_engine::{convert, Engine, Step};
/// use strand0::Value;
///
/// let double = convert(|args: Vec<Value>, done: strand_engine::Callback<String>| {
///     match args[0].as_i64() {
///         Some(n) => done(Ok(Value::Int(n * 2))),
///         None => done(Err("not a number".to_owned())),
///     }
/// });
/// let engine = Engine::new();
/// let ctx = engine.run(Step::from_action(double, vec![21.into()]));
/// assert_eq!(ctx.last(), Ok(Value::Int(42)));
/// ```
pub fn convert<F, E>(f: F) -> Action
where
    F: Fn(Vec<Value>, Callback<E>) + Send + Sync + 'static,
    E: fmt::Display + Send + 'static,
{
    Arc::new(move |engine: &Engine, ctx: &Context, args: Vec<Value>| {
        let engine = engine.clone();
        let ctx = ctx.clone();
        let input = format!("{args:?}");
        f(
            args,
            Box::new(move |result: Result<Value, E>| match result {
                Ok(value) => {
                    engine.ret(&ctx, value);
                }
                Err(error) => {
                    let message = error.to_string();
                    engine.report(&Diagnostic::new("convert", message.clone(), input));
                    engine.fail(&ctx, Fault::External(message));
                }
            }),
        );
    })
}

/// Wrap `f` so that an error is turned into an ordinary result by
/// `on_error`. Nothing is reported.
pub fn convert_with<F, E, G>(f: F, on_error: G) -> Action
where
    F: Fn(Vec<Value>, Callback<E>) + Send + Sync + 'static,
    E: Send + 'static,
    G: Fn(E) -> Value + Send + Sync + 'static,
{
    let on_error = Arc::new(on_error);
    Arc::new(move |engine: &Engine, ctx: &Context, args: Vec<Value>| {
        let engine = engine.clone();
        let ctx = ctx.clone();
        let on_error = Arc::clone(&on_error);
        f(
            args,
            Box::new(move |result: Result<Value, E>| {
                let value = result.unwrap_or_else(|error| on_error(error));
                engine.ret(&ctx, value);
            }),
        );
    })
}
