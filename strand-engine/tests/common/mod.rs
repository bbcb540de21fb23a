#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use strand0::test_utils::{ManualScheduler, RecordingDiagnostics};
use strand0::{Outcome, Value};
use strand_engine::{Context, Engine, Path, Step};
use tokio::sync::oneshot;

/// Returns the previous result plus one (`Null` counts as zero).
pub fn inc() -> Step {
    Step::bare(|engine: &Engine, ctx: &Context, _| {
        let n = ctx.last().ok().and_then(|v| v.as_i64()).unwrap_or(0);
        engine.ret(ctx, n + 1);
    })
    .named("inc")
}

/// `n` increments appended one at a time with [`Path::then`].
pub fn chained(n: usize) -> Path {
    let mut path = Path::empty();
    for _ in 0..n {
        path = path.then(inc());
    }
    path
}

/// Returns its first argument.
pub fn echo(arg: impl Into<strand_engine::Arg>) -> Step {
    Step::new(
        |engine: &Engine, ctx: &Context, args: Vec<Value>| {
            let value = args.into_iter().next().unwrap_or_default();
            engine.ret(ctx, value);
        },
        vec![arg.into()],
    )
    .named("echo")
}

/// Returns its first argument after `ms` milliseconds of tokio time.
pub fn delayed(ms: u64, arg: impl Into<strand_engine::Arg>) -> Step {
    Step::new(
        move |engine: &Engine, ctx: &Context, args: Vec<Value>| {
            let engine = engine.clone();
            let ctx = ctx.clone();
            let value = args.into_iter().next().unwrap_or_default();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                engine.ret(&ctx, value);
            });
        },
        vec![arg.into()],
    )
    .named("delayed")
}

/// Fails with `message`.
pub fn failing(message: &'static str) -> Step {
    Step::bare(move |engine: &Engine, ctx: &Context, _| {
        engine.fail(ctx, strand0::Fault::failed(message));
    })
    .named("failing")
}

/// A step that records every outcome it observes and passes it through.
pub fn probe() -> (Step, Arc<Mutex<Vec<Outcome>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let step = Step::bare(move |engine: &Engine, ctx: &Context, _| {
        let outcome = ctx.last();
        log.lock().unwrap().push(outcome.clone());
        engine.resume(ctx, outcome);
    })
    .named("probe");
    (step, seen)
}

/// A final step that sends the chain's result through a oneshot.
pub fn notify() -> (Step, oneshot::Receiver<Outcome>) {
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    let step = Step::bare(move |engine: &Engine, ctx: &Context, _| {
        let outcome = ctx.last();
        if let Some(tx) = tx.lock().unwrap().take() {
            let _ = tx.send(outcome.clone());
        }
        engine.resume(ctx, outcome);
    })
    .named("notify");
    (step, rx)
}

/// Engine with recording diagnostics and a tokio scheduler.
pub fn recording_engine() -> (Engine, Arc<RecordingDiagnostics>) {
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let engine = Engine::builder()
        .diagnostics(diagnostics.clone())
        .build()
        .unwrap();
    (engine, diagnostics)
}

/// Engine driven by virtual time.
pub fn manual_engine() -> (Engine, Arc<ManualScheduler>, Arc<RecordingDiagnostics>) {
    let scheduler = Arc::new(ManualScheduler::new());
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let engine = Engine::builder()
        .scheduler(scheduler.clone())
        .diagnostics(diagnostics.clone())
        .build()
        .unwrap();
    (engine, scheduler, diagnostics)
}
