use std::sync::Arc;
use std::time::Duration;
use strand0::test_utils::ManualScheduler;
use strand0::{Millis, Value};
use strand_engine::{Context, Engine, EngineConfig, EngineError, ForkJob, OutputMode, Step};

fn echo_item(item: &Value, _: &Value) -> Step {
    let item = item.clone();
    Step::bare(move |engine: &Engine, ctx: &Context, _| {
        engine.ret(ctx, item.clone());
    })
}

#[test]
fn builder_rejects_invalid_config() {
    let mut config = EngineConfig::default();
    config.fork.beat = Millis::ZERO;
    let err = Engine::builder().config(config).build().unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
}

#[test]
fn config_max_applies_to_jobs_without_one() {
    let config = EngineConfig::from_json_str(r#"{"fork": {"max": 1, "output": "fresh"}}"#).unwrap();
    let engine = Engine::builder().config(config).build().unwrap();
    assert_eq!(engine.config().fork.max, Some(1));

    let source = strand0::Map::from_entries([("k", 1)]);
    let output = engine
        .fork(&Context::new(), ForkJob::new(source.clone()).generator(echo_item))
        .outcome()
        .unwrap()
        .unwrap();
    assert!(!output.as_map().unwrap().ptr_eq(&source));

    let output = engine
        .fork(
            &Context::new(),
            ForkJob::new(source.clone())
                .generator(echo_item)
                .output(OutputMode::InPlace),
        )
        .outcome()
        .unwrap()
        .unwrap();
    assert!(output.as_map().unwrap().ptr_eq(&source));
}

#[test]
fn config_beat_drives_gated_forks() {
    let scheduler = Arc::new(ManualScheduler::new());
    let config = EngineConfig::from_json_str(r#"{"fork": {"beat": 40}}"#).unwrap();
    let engine = Engine::builder()
        .config(config)
        .scheduler(scheduler.clone())
        .build()
        .unwrap();

    let ctx = Context::new();
    let job = ForkJob::new(Value::list([1])).generator(echo_item).test(|| true);
    engine.fork(&ctx, job);

    scheduler.advance(Duration::from_millis(39));
    assert_eq!(ctx.last(), Ok(Value::Null));
    scheduler.advance(Duration::from_millis(1));
    assert!(ctx.last().unwrap().as_list().is_some());
}
