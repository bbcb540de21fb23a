mod common;

use common::*;
use std::time::Duration;
use strand0::{Fault, Value};
use strand_engine::{Callback, Context, Engine, Step, convert, convert_with};

/// An error-first reader over a fixed table, answering on a tokio task.
fn read(args: Vec<Value>, done: Callback<String>) {
    let name = args.first().and_then(|v| v.as_str()).unwrap_or("").to_owned();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        match name.as_str() {
            "count.txt" => done(Ok(Value::Int(7))),
            other => done(Err(format!("no such file: {other}"))),
        }
    });
}

#[tokio::test]
async fn success_lands_in_the_last_result() {
    let engine = Engine::new();
    let (done, rx) = notify();
    let step = Step::from_action(convert(read), vec!["count.txt".into()]);
    engine.call(&Context::new(), vec![step, inc(), done]);
    assert_eq!(rx.await.unwrap(), Ok(Value::Int(8)));
}

#[tokio::test]
async fn error_becomes_a_reported_external_fault() {
    let (engine, diagnostics) = recording_engine();
    let (done, rx) = notify();
    let step = Step::from_action(convert(read), vec!["missing.txt".into()]);
    engine.call(&Context::new(), vec![step, done]);

    assert_eq!(
        rx.await.unwrap(),
        Err(Fault::External("no such file: missing.txt".into()))
    );
    let reports = diagnostics.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].operation, "convert");
}

#[tokio::test]
async fn mapped_error_is_an_ordinary_result() {
    let (engine, diagnostics) = recording_engine();
    let (done, rx) = notify();
    let action = convert_with(read, |_: String| Value::Bool(false));
    let step = Step::from_action(action, vec!["@file".into()]);
    let ctx = Context::with_fields([("file", "missing.txt")]);
    engine.call(&ctx, vec![step, done]);

    assert_eq!(rx.await.unwrap(), Ok(Value::Bool(false)));
    assert_eq!(diagnostics.count(), 0);
}

#[test]
fn synchronous_callbacks_also_work() {
    let engine = Engine::new();
    let upper = convert(|args: Vec<Value>, done: Callback<&'static str>| {
        match args[0].as_str() {
            Some(text) => done(Ok(Value::from(text.to_uppercase()))),
            None => done(Err("not text")),
        }
    });
    let ctx = engine.run(Step::from_action(upper.clone(), vec!["abc".into()]));
    assert_eq!(ctx.last(), Ok(Value::from("ABC")));

    let ctx = engine.run(Step::from_action(upper, vec![3.into()]));
    assert_eq!(ctx.last(), Err(Fault::External("not text".into())));
}
