//! Fan-out/fan-in.
//!
//! A fork runs one branch per source item, each on a private copy of the
//! parent context, and writes every branch's result at that item's
//! position in the output: same index for a list source, same key for a
//! map source. Completion order never affects the output layout.
//!
//! Admission is re-evaluated whenever a branch finishes and, when a gate
//! is set, on every beat. With a gate or a beat configured the fork waits
//! one extra beat after it drains before finishing, so a source grown
//! externally or a gate about to open is still picked up.

use crate::context::Context;
use crate::engine::{Dispatch, Engine};
use crate::path::Path;
use crate::step::Step;
use crate::validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strand0::{BranchFailure, Diagnostic, Fault, Kind, List, Map, Outcome, Value};
use strand0::sync::lock;

/// Builds the branch path for one source item from `(item, key)`.
pub type Generator = Arc<dyn Fn(&Value, &Value) -> Path + Send + Sync>;

/// Admission predicate. New branches start only while it returns `true`.
pub type Gate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Where results land when the source is a map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Overwrite each source entry with its branch result. The fork's
    /// output is the source map itself.
    #[default]
    InPlace,
    /// Write results into a new map with the source's keys, leaving the
    /// source untouched.
    Fresh,
}

/// A fan-out request.
///
/// ```
/// use std::time::Duration;
/// use strand_engine::{ForkJob, OutputMode};
/// use strand0::Value;
///
/// let job = ForkJob::new(Value::list([1, 2, 3]))
///     .max(2)
///     .beat(Duration::from_millis(20))
///     .output(OutputMode::Fresh);
/// assert_eq!(job.source().kind(), strand0::Kind::List);
/// ```
#[derive(Clone)]
pub struct ForkJob {
    source: Value,
    generator: Option<Generator>,
    max: Option<usize>,
    beat: Option<Duration>,
    test: Option<Gate>,
    output: Option<OutputMode>,
}

impl ForkJob {
    /// Fork over `source`, a list or a map. Without a generator every item
    /// must itself be a step or a list of steps.
    pub fn new(source: impl Into<Value>) -> Self {
        Self {
            source: source.into(),
            generator: None,
            max: None,
            beat: None,
            test: None,
            output: None,
        }
    }

    /// Build each branch from its item and key.
    pub fn generator<F, P>(mut self, generator: F) -> Self
    where
        F: Fn(&Value, &Value) -> P + Send + Sync + 'static,
        P: Into<Path>,
    {
        self.generator = Some(Arc::new(move |item: &Value, key: &Value| {
            generator(item, key).into()
        }));
        self
    }

    /// At most `max` branches in flight at once.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Gate re-evaluation interval and settling delay.
    pub fn beat(mut self, beat: Duration) -> Self {
        self.beat = Some(beat);
        self
    }

    /// Only start branches while `test` returns `true`.
    pub fn test<F>(mut self, test: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.test = Some(Arc::new(test));
        self
    }

    /// Choose where map results land.
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = Some(mode);
        self
    }

    /// The data source.
    pub fn source(&self) -> &Value {
        &self.source
    }
}

impl fmt::Debug for ForkJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkJob")
            .field("source", &self.source)
            .field("generator", &self.generator.is_some())
            .field("max", &self.max)
            .field("beat", &self.beat)
            .field("test", &self.test.is_some())
            .field("output", &self.output)
            .finish()
    }
}

impl Engine {
    /// Fan out over `job` and continue with the output container once every
    /// branch has finished.
    ///
    /// If any branch failed, the chain continues with [`Fault::Branches`],
    /// which still carries the output.
    pub fn fork(&self, ctx: &Context, job: ForkJob) -> Dispatch {
        self.call(ctx, fork_step(job))
    }

    fn start_fork(&self, ctx: &Context, job: ForkJob) {
        let defaults = &self.config().fork;
        let max = job.max.or(defaults.max);
        if max == Some(0) {
            let fault = Fault::Structural {
                operation: "fork",
                expected: "a max of at least one",
                found: Kind::Int,
            };
            self.reject(ctx, "fork", &Value::Int(0), fault);
            return;
        }
        let settle = job.test.is_some() || job.beat.is_some();
        let beat = job.beat.unwrap_or_else(|| defaults.beat.to_std());
        if settle && beat.is_zero() {
            let fault = Fault::Structural {
                operation: "fork",
                expected: "a non-zero beat",
                found: Kind::Int,
            };
            self.reject(ctx, "fork", &Value::Int(0), fault);
            return;
        }

        let mode = job.output.unwrap_or(defaults.output);
        let (output, known) = match &job.source {
            Value::List(list) => (Value::List(List::new()), list.len()),
            Value::Map(map) if mode == OutputMode::InPlace => (Value::Map(map.clone()), map.len()),
            Value::Map(map) => (Value::Map(Map::new()), map.len()),
            other => {
                let fault = Fault::Structural {
                    operation: "fork",
                    expected: "a list or a map",
                    found: other.kind(),
                };
                self.reject(ctx, "fork", other, fault);
                return;
            }
        };

        if known == 0 && job.test.is_none() {
            self.ret(ctx, output);
            return;
        }

        tracing::debug!(items = known, max = ?max, settle, "strand.fork.start");
        let run = Arc::new(ForkRun {
            engine: self.clone(),
            parent: ctx.clone(),
            source: job.source,
            generator: job.generator,
            ticker: job.test.is_some(),
            test: job.test,
            max,
            beat,
            settle,
            output,
            state: Mutex::new(ForkState::default()),
        });
        if run.ticker {
            run.tick_later();
        }
        run.pump();
    }
}

/// A step that performs [`Engine::fork`], for use inside a larger path.
pub fn fork_step(job: ForkJob) -> Step {
    Step::bare(move |engine: &Engine, ctx: &Context, _| {
        engine.start_fork(ctx, job.clone());
    })
    .named("fork")
}

/// Position of one branch in the output.
#[derive(Debug, Clone)]
enum Slot {
    Index(usize),
    Key(String),
}

impl Slot {
    fn to_value(&self) -> Value {
        match self {
            Slot::Index(index) => Value::from(*index),
            Slot::Key(key) => Value::from(key.as_str()),
        }
    }
}

enum Plan {
    Launch(usize),
    Settle(u64),
    Finish,
    Idle,
}

#[derive(Default)]
struct ForkState {
    dispatched: usize,
    active: usize,
    /// Bumped on every launch; a settle timer only finishes its own epoch.
    epoch: u64,
    settling: bool,
    pumping: bool,
    repump: bool,
    finished: bool,
    failures: Vec<(usize, BranchFailure)>,
}

// Lock order: `state` before any source or output lock. Nothing is
// called on the engine or user code while `state` is held.
struct ForkRun {
    engine: Engine,
    parent: Context,
    source: Value,
    generator: Option<Generator>,
    test: Option<Gate>,
    ticker: bool,
    max: Option<usize>,
    beat: Duration,
    settle: bool,
    output: Value,
    state: Mutex<ForkState>,
}

impl ForkRun {
    fn known(&self) -> usize {
        match &self.source {
            Value::List(list) => list.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    fn item(&self, index: usize) -> Option<(Slot, Value)> {
        match &self.source {
            Value::List(list) => list.get(index).map(|item| (Slot::Index(index), item)),
            Value::Map(map) => map.entry_at(index).map(|(key, item)| (Slot::Key(key), item)),
            _ => None,
        }
    }

    /// Start every branch that admission allows, or finish.
    fn pump(self: &Arc<Self>) {
        {
            let mut state = lock(&self.state);
            if state.pumping {
                state.repump = true;
                return;
            }
            state.pumping = true;
        }
        loop {
            let open = self.test.as_ref().is_none_or(|test| test());
            let plan = {
                let mut state = lock(&self.state);
                self.plan(&mut state, open)
            };
            match plan {
                Plan::Launch(index) => self.launch(index),
                Plan::Settle(epoch) => self.settle_later(epoch),
                Plan::Finish => {
                    self.finish();
                    return;
                }
                Plan::Idle => {
                    let mut state = lock(&self.state);
                    if state.repump && !state.finished {
                        continue;
                    }
                    state.pumping = false;
                    return;
                }
            }
        }
    }

    fn plan(&self, state: &mut ForkState, open: bool) -> Plan {
        if state.finished {
            return Plan::Idle;
        }
        state.repump = false;
        let known = self.known();
        let below_max = self.max.is_none_or(|max| state.active < max);
        if state.dispatched < known && open && below_max {
            let index = state.dispatched;
            state.dispatched += 1;
            state.active += 1;
            state.epoch += 1;
            state.settling = false;
            return Plan::Launch(index);
        }
        if state.active == 0 && state.dispatched >= known {
            if !self.settle {
                state.finished = true;
                return Plan::Finish;
            }
            if !state.settling {
                state.settling = true;
                return Plan::Settle(state.epoch);
            }
        }
        Plan::Idle
    }

    fn launch(self: &Arc<Self>, index: usize) {
        let Some((slot, item)) = self.item(index) else {
            let fault = Fault::failed("source item removed before dispatch");
            self.complete(index, Slot::Index(index), Err(fault));
            return;
        };
        if let (Value::Map(output), Slot::Key(key)) = (&self.output, &slot) {
            if !output.contains_key(key) {
                output.insert(key.clone(), Value::Null);
            }
        }
        let path = match &self.generator {
            Some(generator) => generator(&item, &slot.to_value()),
            None => match validate::path(&item) {
                Ok(path) => path,
                Err(fault) => {
                    let diagnostic =
                        Diagnostic::new("fork", fault.to_string(), format!("{item:?}")).with_kind(item.kind());
                    self.engine.report(&diagnostic);
                    self.complete(index, slot, Err(fault));
                    return;
                }
            },
        };

        let branch = self.parent.isolate();
        let run = Arc::clone(self);
        let collect = Step::bare(move |_: &Engine, branch: &Context, _| {
            run.collect(index, slot.clone(), branch);
        })
        .named("fork.collect");
        self.engine.call(&branch, path.then(collect));
    }

    fn collect(self: &Arc<Self>, index: usize, slot: Slot, branch: &Context) {
        let outcome = branch.last();
        self.parent.absorb(branch);
        self.complete(index, slot, outcome);
    }

    fn complete(self: &Arc<Self>, index: usize, slot: Slot, outcome: Outcome) {
        let value = match outcome {
            Ok(value) => value,
            Err(fault) => {
                let failure = BranchFailure {
                    slot: slot.to_value(),
                    fault,
                };
                lock(&self.state).failures.push((index, failure));
                Value::Null
            }
        };
        self.store(&slot, value);
        {
            let mut state = lock(&self.state);
            state.active = state.active.saturating_sub(1);
        }
        self.pump();
    }

    fn store(&self, slot: &Slot, value: Value) {
        match (&self.output, slot) {
            (Value::List(list), Slot::Index(index)) => list.set(*index, value),
            (Value::Map(map), Slot::Key(key)) => {
                map.insert(key.clone(), value);
            }
            _ => {}
        }
    }

    fn settle_later(self: &Arc<Self>, epoch: u64) {
        let run = Arc::clone(self);
        let scheduled = self
            .engine
            .scheduler()
            .schedule(self.beat, Box::new(move || run.settled(epoch)));
        if let Err(fault) = scheduled {
            self.abort(fault);
        }
    }

    fn settled(self: &Arc<Self>, epoch: u64) {
        let done = {
            let mut state = lock(&self.state);
            if state.finished || state.epoch != epoch {
                return;
            }
            let drained = state.active == 0 && state.dispatched >= self.known();
            state.finished = drained && state.settling;
            state.settling = false;
            state.finished
        };
        if done {
            self.finish();
        } else {
            self.pump();
        }
    }

    fn tick_later(self: &Arc<Self>) {
        let run = Arc::clone(self);
        let scheduled = self
            .engine
            .scheduler()
            .schedule(self.beat, Box::new(move || run.tick()));
        if let Err(fault) = scheduled {
            self.abort(fault);
        }
    }

    fn tick(self: &Arc<Self>) {
        if lock(&self.state).finished {
            return;
        }
        self.pump();
        if !lock(&self.state).finished {
            self.tick_later();
        }
    }

    fn finish(&self) {
        let mut failures = std::mem::take(&mut lock(&self.state).failures);
        failures.sort_by_key(|(index, _)| *index);
        tracing::debug!(failures = failures.len(), "strand.fork.finish");
        if failures.is_empty() {
            self.engine.ret(&self.parent, self.output.clone());
        } else {
            let failures = failures.into_iter().map(|(_, failure)| failure).collect();
            self.engine.fail(
                &self.parent,
                Fault::Branches {
                    output: self.output.clone(),
                    failures,
                },
            );
        }
    }

    fn abort(&self, fault: Fault) {
        {
            let mut state = lock(&self.state);
            if state.finished {
                return;
            }
            state.finished = true;
        }
        tracing::warn!(error = %fault, "strand.fork.abort");
        self.engine.fail(&self.parent, fault);
    }
}
