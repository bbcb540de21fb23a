//! Paths and the normalizer.
//!
//! A path is a tree of steps whose nesting is purely syntactic: flattening
//! concatenates the leaves in order and never reorders them.
//!
//! The constructors splice any sequence they are given into the one they
//! build, so a path assembled through them is never more than one level
//! deep no matter how it was grouped. Cloning and dropping such a path
//! costs no stack beyond a single level.

use crate::step::Step;
use strand0::{Fault, Value};

/// An ordered, possibly nested, sequence of steps.
#[derive(Debug, Clone)]
pub enum Path {
    /// A single step.
    Step(Step),
    /// A group of sub-paths, run in order.
    Seq(Vec<Path>),
}

impl Path {
    /// The empty path. Calling it resumes the chain without dispatching.
    pub fn empty() -> Self {
        Path::Seq(Vec::new())
    }

    /// Group several parts into one path.
    pub fn seq<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Path>,
    {
        let mut group = Vec::new();
        for part in parts {
            splice(&mut group, part.into());
        }
        Path::Seq(group)
    }

    /// This path followed by `next`.
    pub fn then(self, next: impl Into<Path>) -> Self {
        let mut group = match self {
            Path::Seq(parts) => parts,
            step => vec![step],
        };
        splice(&mut group, next.into());
        Path::Seq(group)
    }

    /// Number of steps after flattening.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Path::Step(_) => count += 1,
                Path::Seq(parts) => pending.extend(parts),
            }
        }
        count
    }

    /// True when flattening yields no steps.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize into one flat ordered queue of steps.
    pub fn flatten(self) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Path::Step(step) => steps.push(step),
                Path::Seq(parts) => pending.extend(parts.into_iter().rev()),
            }
        }
        steps
    }
}

/// Append `part` to `group`, lifting the parts of a sequence into it.
fn splice(group: &mut Vec<Path>, part: Path) {
    match part {
        Path::Seq(parts) if group.is_empty() => *group = parts,
        Path::Seq(parts) => group.extend(parts),
        step => group.push(step),
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Step> for Path {
    fn from(step: Step) -> Self {
        Path::Step(step)
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Path::Seq(steps.into_iter().map(Path::Step).collect())
    }
}

impl From<Vec<Path>> for Path {
    fn from(parts: Vec<Path>) -> Self {
        Path::seq(parts)
    }
}

/// Read a dynamic path description: a step value, or a list of them nested
/// to any depth. See [`crate::validate::path`].
impl TryFrom<&Value> for Path {
    type Error = Fault;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        crate::validate::path(value)
    }
}
