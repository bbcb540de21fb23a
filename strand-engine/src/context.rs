//! The execution context threaded through a chain.

use crate::step::Step;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use strand0::{Copier, Map, Outcome, Value};
use strand0::sync::lock;

/// Mutable state of one chain.
///
/// The pending queue and the last result are reserved members kept apart
/// from the caller's fields, so a fork merge never touches them.
pub(crate) struct Frame {
    pub(crate) pending: VecDeque<Step>,
    pub(crate) last: Outcome,
    pub(crate) fields: IndexMap<String, Value>,
    /// A dispatch loop is currently advancing this context.
    pub(crate) driving: bool,
    /// The step most recently dispatched has handed control back.
    pub(crate) resumed: bool,
}

impl Frame {
    /// Put `steps` in front of whatever is already queued, keeping their order.
    pub(crate) fn prepend(&mut self, steps: Vec<Step>) {
        for step in steps.into_iter().rev() {
            self.pending.push_front(step);
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            last: Ok(Value::Null),
            fields: IndexMap::new(),
            driving: false,
            resumed: false,
        }
    }
}

/// Handle to the execution context of a chain.
///
/// Cloning the handle does not clone the context: both handles see the
/// same queue, result and fields. A context belongs to one chain at a
/// time; fork branches get private copies of their parent.
#[derive(Clone, Default)]
pub struct Context {
    frame: Arc<Mutex<Frame>>,
}

impl Context {
    /// A fresh context with no fields and a `Null` last result.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh context pre-populated with caller fields.
    pub fn with_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let ctx = Self::new();
        {
            let mut frame = ctx.frame();
            frame
                .fields
                .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        ctx
    }

    /// Read a caller field.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.frame().fields.get(key).cloned()
    }

    /// Write a caller field, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.frame().fields.insert(key.into(), value.into())
    }

    /// Remove a caller field.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.frame().fields.shift_remove(key)
    }

    /// Snapshot of every caller field, in insertion order.
    pub fn fields(&self) -> Map {
        let entries: Vec<(String, Value)> = self
            .frame()
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Map::from_entries(entries)
    }

    /// The result of the most recent step.
    pub fn last(&self) -> Outcome {
        self.frame().last.clone()
    }

    /// Number of steps still queued.
    pub fn pending_len(&self) -> usize {
        self.frame().pending.len()
    }

    /// True when both handles refer to the same context.
    pub fn same(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.frame, &other.frame)
    }

    pub(crate) fn frame(&self) -> MutexGuard<'_, Frame> {
        lock(&self.frame)
    }

    /// A private copy for a fork branch: fields and last result deep-copied
    /// in one pass, empty queue.
    pub(crate) fn isolate(&self) -> Context {
        let (fields, last) = {
            let frame = self.frame();
            (frame.fields.clone(), frame.last.clone())
        };
        let mut copier = Copier::new();
        let fields = fields
            .iter()
            .map(|(k, v)| (k.clone(), copier.copy(v)))
            .collect();
        let last = last.map(|value| copier.copy(&value));
        Context {
            frame: Arc::new(Mutex::new(Frame {
                last,
                fields,
                ..Frame::default()
            })),
        }
    }

    /// Merge every caller field of `branch` into this context. Existing
    /// fields are overwritten.
    pub(crate) fn absorb(&self, branch: &Context) {
        let fields = branch.frame().fields.clone();
        self.frame().fields.extend(fields);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fields, last, pending) = {
            let frame = self.frame();
            (frame.fields.clone(), frame.last.clone(), frame.pending.len())
        };
        f.debug_struct("Context")
            .field("fields", &fields)
            .field("last", &last)
            .field("pending", &pending)
            .finish()
    }
}
