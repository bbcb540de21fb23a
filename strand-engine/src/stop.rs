//! Early exit on a sentinel result.

use crate::cond::{Branches, Key};
use crate::context::Context;
use crate::engine::{Dispatch, Engine};
use crate::path::Path;
use crate::step::Step;
use std::sync::Arc;

impl Engine {
    /// Run `path` one step at a time, halting as soon as a step's result
    /// matches `sentinel`.
    ///
    /// On a halt the result is the sentinel (for [`Key::Fault`], the fault
    /// that matched) and the remaining steps are never dispatched. If no
    /// step matches, the chain continues with the last step's result.
    pub fn stop(&self, ctx: &Context, sentinel: impl Into<Key>, path: impl Into<Path>) -> Dispatch {
        let steps: Arc<[Step]> = path.into().flatten().into();
        self.stop_from(ctx, Arc::new(sentinel.into()), steps, 0)
    }

    fn stop_from(&self, ctx: &Context, sentinel: Arc<Key>, steps: Arc<[Step]>, next: usize) -> Dispatch {
        let Some(step) = steps.get(next).cloned() else {
            return self.call(ctx, Path::empty());
        };
        let halt = match sentinel.as_ref() {
            Key::Value(value) => {
                let value = value.clone();
                Step::bare(move |engine: &Engine, ctx: &Context, _| {
                    engine.ret(ctx, value.clone());
                })
            }
            Key::Fault => Step::bare(|engine: &Engine, ctx: &Context, _| {
                engine.call(ctx, Path::empty());
            }),
        }
        .named("stop.halt");
        let key = sentinel.as_ref().clone();
        let rest = Step::bare(move |engine: &Engine, ctx: &Context, _| {
            engine.stop_from(ctx, Arc::clone(&sentinel), Arc::clone(&steps), next + 1);
        })
        .named("stop.next");
        self.cond(ctx, step, Branches::new().arm(key, halt).otherwise(rest))
    }
}

/// A step that performs [`Engine::stop`], for use inside a larger path.
pub fn stop_step(sentinel: impl Into<Key>, path: impl Into<Path>) -> Step {
    let sentinel = sentinel.into();
    let path = path.into();
    Step::bare(move |engine: &Engine, ctx: &Context, _| {
        engine.stop(ctx, sentinel.clone(), path.clone());
    })
    .named("stop")
}
