//! A pass-through step that logs the previous result.

use crate::context::Context;
use crate::engine::Engine;
use crate::step::Step;
use std::borrow::Cow;

/// A step that emits the previous result with `message` and hands the same
/// outcome, success or fault, to the next step.
///
/// ```
/// use strand_engine::{Engine, log_step};
/// use strand0::Value;
///
/// let engine = Engine::new();
/// let ctx = engine.run(vec![log_step("starting"), log_step("still null")]);
/// assert_eq!(ctx.last(), Ok(Value::Null));
/// ```
pub fn log_step(message: impl Into<Cow<'static, str>>) -> Step {
    let message = message.into();
    Step::bare(move |engine: &Engine, ctx: &Context, _| {
        let last = ctx.last();
        match &last {
            Ok(value) => tracing::info!(last = ?value, "{message}"),
            Err(fault) => tracing::info!(error = %fault, "{message}"),
        }
        engine.resume(ctx, last);
    })
    .named("log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use strand0::{Fault, Value};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn captured<R>(run: impl FnOnce() -> R) -> (R, String) {
        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, run);
        (result, sink.text())
    }

    fn seven(engine: &Engine, ctx: &Context, _: Vec<Value>) {
        engine.ret(ctx, 7);
    }

    #[test]
    fn passes_the_value_through_and_logs_it() {
        let engine = Engine::new();
        let (ctx, output) = captured(|| {
            engine.run(vec![Step::bare(seven), log_step("was returned by the previous call")])
        });
        assert_eq!(ctx.last(), Ok(Value::Int(7)));
        assert!(output.contains("was returned by the previous call"));
        assert!(output.contains("last=7"));
    }

    #[test]
    fn passes_a_fault_through_unchanged() {
        let engine = Engine::new();
        let fail = Step::bare(|engine: &Engine, ctx: &Context, _| {
            engine.fail(ctx, Fault::failed("disk full"));
        });
        let (ctx, output) = captured(|| engine.run(vec![fail, log_step("after write")]));
        assert_eq!(ctx.last(), Err(Fault::failed("disk full")));
        assert!(output.contains("after write"));
        assert!(output.contains("failed: disk full"));
    }
}
