//! Result-keyed branching.

use crate::context::Context;
use crate::engine::{Dispatch, Engine};
use crate::path::Path;
use crate::step::Step;
use std::sync::Arc;
use strand0::{Diagnostic, Fault, Outcome, Value};

/// What a branch arm matches against the last result.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    /// A successful result exactly equal to this value.
    Value(Value),
    /// Any failed result.
    Fault,
}

impl Key {
    /// A value key.
    pub fn value(value: impl Into<Value>) -> Self {
        Key::Value(value.into())
    }

    /// Whether `outcome` selects this key. Matching is exact: `Int(1)`
    /// does not match `Float(1.0)` or `Str("1")`.
    pub fn matches(&self, outcome: &Outcome) -> bool {
        match (self, outcome) {
            (Key::Value(expected), Ok(value)) => expected == value,
            (Key::Fault, Err(_)) => true,
            _ => false,
        }
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Key::Value(value)
    }
}

macro_rules! value_key {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Value(Value::from(value))
                }
            }
        )*
    };
}

value_key!(bool, i32, i64, &str, String);

/// Arms of a [`Engine::cond`].
///
/// ```
/// use strand_engine::{Branches, Path};
///
/// let branches = Branches::new()
///     .on(true, Path::empty())
///     .on_fault(Path::empty())
///     .otherwise(Path::empty());
/// assert_eq!(branches.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Branches {
    arms: Vec<(Key, Path)>,
    otherwise: Option<Path>,
}

impl Branches {
    /// No arms and no default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue with `path` when the result equals `value`.
    pub fn on(self, value: impl Into<Value>, path: impl Into<Path>) -> Self {
        self.arm(Key::Value(value.into()), path)
    }

    /// Continue with `path` when the result is a fault.
    pub fn on_fault(self, path: impl Into<Path>) -> Self {
        self.arm(Key::Fault, path)
    }

    /// Add an arm. An arm with an equal key is replaced.
    pub fn arm(mut self, key: Key, path: impl Into<Path>) -> Self {
        let path = path.into();
        match self.arms.iter_mut().find(|(existing, _)| *existing == key) {
            Some(arm) => arm.1 = path,
            None => self.arms.push((key, path)),
        }
        self
    }

    /// Continue with `path` when no arm matches.
    pub fn otherwise(mut self, path: impl Into<Path>) -> Self {
        self.otherwise = Some(path.into());
        self
    }

    /// Number of keyed arms, not counting the default.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// True when there are no keyed arms.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// The path that `outcome` routes to.
    pub fn select(&self, outcome: &Outcome) -> Option<&Path> {
        self.arms
            .iter()
            .find(|(key, _)| key.matches(outcome))
            .map(|(_, path)| path)
            .or(self.otherwise.as_ref())
    }
}

impl Engine {
    /// Run `cond`, then continue with the arm its result selects.
    ///
    /// With no matching arm and no default the chain continues with
    /// [`Fault::NoBranch`] and one diagnostic is reported.
    pub fn cond(&self, ctx: &Context, cond: impl Into<Path>, branches: Branches) -> Dispatch {
        let branches = Arc::new(branches);
        let pick = Step::bare(move |engine: &Engine, ctx: &Context, _| {
            engine.pick(ctx, &branches);
        })
        .named("cond.pick");
        self.call(ctx, cond.into().then(pick))
    }

    fn pick(&self, ctx: &Context, branches: &Branches) -> Dispatch {
        let outcome = ctx.last();
        if let Some(path) = branches.select(&outcome) {
            return self.call(ctx, path.clone());
        }
        let result = match &outcome {
            Ok(value) => format!("{value:?}"),
            Err(fault) => fault.to_string(),
        };
        let mut diagnostic = Diagnostic::new("cond", "no branch matches and no default", result.clone());
        if let Ok(value) = &outcome {
            diagnostic = diagnostic.with_kind(value.kind());
        }
        self.report(&diagnostic);
        self.fail(ctx, Fault::NoBranch { result })
    }
}

/// A step that performs [`Engine::cond`], for use inside a larger path.
pub fn cond_step(cond: impl Into<Path>, branches: Branches) -> Step {
    let cond = cond.into();
    Step::bare(move |engine: &Engine, ctx: &Context, _| {
        engine.cond(ctx, cond.clone(), branches.clone());
    })
    .named("cond")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_exactly() {
        assert!(Key::value(1).matches(&Ok(Value::Int(1))));
        assert!(!Key::value(1).matches(&Ok(Value::Float(1.0))));
        assert!(!Key::value(false).matches(&Err(Fault::failed("x"))));
        assert!(Key::Fault.matches(&Err(Fault::failed("x"))));
    }

    #[test]
    fn rebinding_a_key_replaces_the_arm() {
        let branches = Branches::new()
            .on("a", Path::empty())
            .on("a", Path::empty())
            .on("b", Path::empty());
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn unmatched_without_default_selects_nothing() {
        let branches = Branches::new().on(true, Path::empty());
        assert!(branches.select(&Ok(Value::Bool(false))).is_none());
        assert!(branches.select(&Ok(Value::Bool(true))).is_some());
    }
}
