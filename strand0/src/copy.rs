//! Structural Copier: cycle-safe deep clone.
//!
//! A copy pass keeps a map from the identity of every composite it has
//! started cloning to the fresh clone. The map is consulted before
//! recursing, so a back edge resolves to the new allocation and shared
//! substructure stays shared within the pass.

use crate::value::{List, Map, Value};
use std::collections::HashMap;

/// Deep-copy `value` in a single pass.
///
/// ```
/// use strand0::{copy, Map, Value};
///
/// let x = Map::new();
/// x.insert("self", x.clone());
/// let y = copy(&Value::Map(x.clone()));
///
/// let y = y.as_map().unwrap();
/// assert!(!y.ptr_eq(&x));
/// assert!(y.get("self").unwrap().as_map().unwrap().ptr_eq(y));
/// ```
pub fn copy(value: &Value) -> Value {
    Copier::new().copy(value)
}

/// A copy pass that can span several values.
///
/// Values copied through the same `Copier` share clones of whatever
/// composites they had in common.
#[derive(Default)]
pub struct Copier {
    seen: HashMap<usize, Value>,
}

impl Copier {
    /// Start a new pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy one value within this pass.
    pub fn copy(&mut self, value: &Value) -> Value {
        match value {
            Value::List(list) => {
                if let Some(clone) = self.seen.get(&list.id()) {
                    return clone.clone();
                }
                let fresh = List::new();
                self.seen.insert(list.id(), Value::List(fresh.clone()));
                let items = list.snapshot().iter().map(|item| self.copy(item)).collect();
                fresh.replace(items);
                Value::List(fresh)
            }
            Value::Map(map) => {
                if let Some(clone) = self.seen.get(&map.id()) {
                    return clone.clone();
                }
                let fresh = Map::new();
                self.seen.insert(map.id(), Value::Map(fresh.clone()));
                let entries = map
                    .snapshot()
                    .into_iter()
                    .map(|(key, item)| {
                        let item = self.copy(&item);
                        (key, item)
                    })
                    .collect();
                fresh.replace(entries);
                Value::Map(fresh)
            }
            scalar => scalar.clone(),
        }
    }
}
