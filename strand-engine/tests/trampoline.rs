mod common;

use common::*;
use strand0::{Fault, Kind, Value};
use strand_engine::{Context, Dispatch, Engine, Path, Step};

#[test]
fn sequential_steps_accumulate() {
    let engine = Engine::new();
    let ctx = Context::new();
    let dispatch = engine.call(&ctx, vec![inc(), inc(), inc()]);
    assert_eq!(dispatch, Dispatch::Finished(Ok(Value::Int(3))));
    assert_eq!(ctx.last(), Ok(Value::Int(3)));
    assert_eq!(ctx.pending_len(), 0);
}

#[test]
fn empty_path_finishes_with_the_current_result() {
    let engine = Engine::new();
    let ctx = Context::new();
    assert_eq!(engine.call(&ctx, Path::empty()), Dispatch::Finished(Ok(Value::Null)));
    engine.call(&ctx, inc());
    assert_eq!(engine.call(&ctx, Path::empty()).outcome(), Some(Ok(Value::Int(1))));
}

#[test]
fn long_synchronous_chain_does_not_grow_the_stack() {
    let engine = Engine::new();
    let steps: Vec<Step> = (0..100_000).map(|_| inc()).collect();
    let ctx = engine.run(steps);
    assert_eq!(ctx.last(), Ok(Value::Int(100_000)));
}

#[test]
fn reentrant_calls_run_in_constant_stack() {
    // Each step queues the next one from inside its own action.
    fn countdown(engine: &Engine, ctx: &Context, _: Vec<Value>) {
        let left = ctx.get("left").and_then(|v| v.as_i64()).unwrap_or(0);
        if left == 0 {
            engine.ret(ctx, "done");
            return;
        }
        ctx.set("left", left - 1);
        engine.call(ctx, Step::bare(countdown));
    }

    let engine = Engine::new();
    let ctx = Context::with_fields([("left", 200_000)]);
    let dispatch = engine.call(&ctx, Step::bare(countdown));
    assert_eq!(dispatch, Dispatch::Finished(Ok(Value::from("done"))));
}

#[test]
fn queued_continuations_run_after_a_nested_call() {
    let engine = Engine::new();
    let (seen, log) = probe();
    let outer = Step::bare(|engine: &Engine, ctx: &Context, _| {
        engine.call(ctx, vec![inc(), inc()]);
    });
    let ctx = engine.run(vec![outer, seen, inc()]);
    assert_eq!(ctx.last(), Ok(Value::Int(3)));
    assert_eq!(*log.lock().unwrap(), vec![Ok(Value::Int(2))]);
}

#[test]
fn faults_flow_through_the_chain() {
    let engine = Engine::new();
    let (seen, log) = probe();
    let recover = Step::bare(|engine: &Engine, ctx: &Context, _| {
        let failed = ctx.last().is_err();
        engine.ret(ctx, if failed { "recovered" } else { "clean" });
    });
    let ctx = engine.run(vec![failing("boom"), seen, recover]);

    assert_eq!(*log.lock().unwrap(), vec![Err(Fault::failed("boom"))]);
    assert_eq!(ctx.last(), Ok(Value::from("recovered")));
}

#[test]
fn false_is_an_ordinary_result() {
    let engine = Engine::new();
    let ctx = engine.run(vec![echo(false), inc()]);
    // inc treats a non-integer as zero; the chain kept going.
    assert_eq!(ctx.last(), Ok(Value::Int(1)));
}

#[tokio::test]
async fn asynchronous_steps_resume_the_chain() {
    let engine = Engine::new();
    let (done, rx) = notify();
    let ctx = Context::new();
    let dispatch = engine.call(&ctx, vec![delayed(20, 41), inc(), done]);
    assert_eq!(dispatch, Dispatch::Suspended);

    assert_eq!(rx.await.unwrap(), Ok(Value::Int(42)));
    assert_eq!(ctx.last(), Ok(Value::Int(42)));
}

#[test]
fn call_value_runs_a_dynamic_path() {
    let engine = Engine::new();
    let ctx = Context::new();
    let path = Value::list([Value::from(inc()), Value::list([Value::from(inc())])]);
    assert_eq!(
        engine.call_value(&ctx, &path),
        Dispatch::Finished(Ok(Value::Int(2)))
    );
}

#[test]
fn call_value_rejects_malformed_paths() {
    let (engine, diagnostics) = recording_engine();
    let ctx = Context::new();

    let dispatch = engine.call_value(&ctx, &Value::list([Value::Int(5)]));
    assert_eq!(
        dispatch,
        Dispatch::Finished(Err(Fault::Structural {
            operation: "path",
            expected: "a step or a list of steps",
            found: Kind::Int,
        }))
    );

    let reports = diagnostics.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].operation, "call");
    assert_eq!(reports[0].kind, Some(Kind::List));
}

#[test]
fn call_value_rejects_cyclic_paths() {
    let (engine, diagnostics) = recording_engine();
    let ctx = Context::new();
    let list = strand0::List::new();
    list.push(Value::from(inc()));
    list.push(list.clone());

    let dispatch = engine.call_value(&ctx, &Value::List(list));
    assert_eq!(dispatch, Dispatch::Finished(Err(Fault::Cyclic)));
    assert_eq!(diagnostics.count(), 1);
}
