//! Step arguments and parameter references.
//!
//! A string argument starting with [`MARKER`] is a reference: `"@a.b"`
//! reads field `a` of the context, then member `b` of that value, at the
//! moment the step is dispatched. `"@@a"` is the literal string `"@a"`.

use crate::context::Context;
use strand0::Value;

/// Prefix that marks a string argument as a reference.
pub const MARKER: char = '@';

/// Reference root that reads the context's last result instead of a field.
pub const LAST: &str = "last";

/// A dotted lookup path into a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef {
    segments: Vec<String>,
}

impl ParamRef {
    /// Parse a marked string. Returns `None` for anything that is not a
    /// reference (no marker, an escaped marker, or nothing after it).
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix(MARKER)?;
        if body.is_empty() || body.starts_with(MARKER) {
            return None;
        }
        Some(Self {
            segments: body.split('.').map(str::to_owned).collect(),
        })
    }

    /// Build from explicit segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The lookup segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve against `ctx`. Anything missing along the way is `Null`.
    pub fn resolve(&self, ctx: &Context) -> Value {
        let mut segments = self.segments.iter();
        let Some(root) = segments.next() else {
            return Value::Null;
        };
        let start = if root == LAST {
            ctx.last().unwrap_or(Value::Null)
        } else {
            ctx.get(root).unwrap_or(Value::Null)
        };
        segments
            .try_fold(start, |value, segment| value.lookup(segment))
            .unwrap_or(Value::Null)
    }
}

/// One argument of a step: a literal or a reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Passed to the action as-is.
    Value(Value),
    /// Resolved against the context at dispatch time.
    Ref(ParamRef),
}

impl Arg {
    /// A literal that is never parsed as a reference.
    pub fn literal(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    /// Produce the value the action receives.
    pub fn resolve(&self, ctx: &Context) -> Value {
        match self {
            Arg::Value(value) => value.clone(),
            Arg::Ref(reference) => reference.resolve(ctx),
        }
    }
}

fn parse_marked(text: String) -> Arg {
    if let Some(reference) = ParamRef::parse(&text) {
        return Arg::Ref(reference);
    }
    match text.strip_prefix(MARKER) {
        Some(rest) if rest.starts_with(MARKER) => Arg::Value(Value::Str(rest.to_owned())),
        _ => Arg::Value(Value::Str(text)),
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        parse_marked(text.to_owned())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        parse_marked(text)
    }
}

impl From<ParamRef> for Arg {
    fn from(reference: ParamRef) -> Self {
        Arg::Ref(reference)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

macro_rules! literal_arg {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Value(Value::from(value))
                }
            }
        )*
    };
}

literal_arg!(bool, i32, i64, u32, usize, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marked_strings_become_references() {
        assert_eq!(
            Arg::from("@a.b"),
            Arg::Ref(ParamRef::from_segments(["a", "b"]))
        );
        assert_eq!(Arg::from("plain"), Arg::Value(Value::from("plain")));
    }

    #[test]
    fn escaped_and_bare_markers_stay_literal() {
        assert_eq!(Arg::from("@@a"), Arg::Value(Value::from("@a")));
        assert_eq!(Arg::from("@"), Arg::Value(Value::from("@")));
        assert_eq!(Arg::literal("@a"), Arg::Value(Value::from("@a")));
    }
}
