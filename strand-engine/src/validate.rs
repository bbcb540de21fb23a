//! Validators for dynamic step and path descriptions.
//!
//! A dynamic description is a [`Value`]: a step stored as a native (see
//! `impl From<Step> for Value`), or a list whose items are themselves
//! descriptions. Anything else is rejected with the detected [`Kind`].

use crate::path::Path;
use crate::step::Step;
use strand0::{Fault, Kind, Value};

const EXPECTED: &str = "a step or a list of steps";

/// Accept exactly one step.
pub fn step(value: &Value) -> Result<Step, Fault> {
    value
        .as_native()
        .and_then(|native| native.downcast_ref::<Step>())
        .cloned()
        .ok_or_else(|| Fault::Structural {
            operation: "step",
            expected: "a step",
            found: value.kind(),
        })
}

/// Accept a step or an arbitrarily nested list of steps.
///
/// A list that contains itself is rejected with [`Fault::Cyclic`].
pub fn path(value: &Value) -> Result<Path, Fault> {
    path_within(value, &mut Vec::new())
}

fn path_within(value: &Value, ancestors: &mut Vec<usize>) -> Result<Path, Fault> {
    match value {
        Value::List(list) => {
            if ancestors.contains(&list.id()) {
                return Err(Fault::Cyclic);
            }
            ancestors.push(list.id());
            let parts = list
                .snapshot()
                .iter()
                .map(|item| path_within(item, ancestors))
                .collect::<Result<Vec<_>, _>>()?;
            ancestors.pop();
            Ok(Path::seq(parts))
        }
        Value::Native(native) => native
            .downcast_ref::<Step>()
            .cloned()
            .map(Path::Step)
            .ok_or(Fault::Structural {
                operation: "path",
                expected: EXPECTED,
                found: Kind::Native,
            }),
        other => Err(Fault::Structural {
            operation: "path",
            expected: EXPECTED,
            found: other.kind(),
        }),
    }
}
