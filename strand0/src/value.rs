//! Dynamic values threaded through chains.
//!
//! Scalars are stored inline. Sequences and mappings are shared handles
//! ([`List`], [`Map`]) so that a value can contain itself and so that a
//! fork source can keep growing after the fork was started. Cloning a
//! handle never copies its contents; use [`crate::copy`] for that.

use crate::error::Fault;
use crate::sync::lock;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A dynamically typed value.
///
/// Equality is exact and never coerces: `Int(1)`, `Float(1.0)` and
/// `Str("1")` are three different values, `NaN` equals nothing, and
/// composites ([`List`], [`Map`], [`Native`]) compare by identity.
#[derive(Clone, Default)]
pub enum Value {
    /// The explicit "no value".
    #[default]
    Null,
    /// A boolean. `false` is data, never a failure marker.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A float, possibly NaN.
    Float(f64),
    /// A string.
    Str(String),
    /// A shared, ordered sequence.
    List(List),
    /// A shared, insertion-ordered mapping.
    Map(Map),
    /// An opaque host value (the engine keeps Steps here).
    Native(Native),
}

/// Classification of a [`Value`], used where input shape must be checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// [`Value::Null`].
    Null,
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Int`].
    Int,
    /// A [`Value::Float`] that is a number.
    Float,
    /// A [`Value::Float`] holding NaN.
    NaN,
    /// [`Value::Str`].
    Str,
    /// [`Value::List`].
    List,
    /// [`Value::Map`].
    Map,
    /// [`Value::Native`].
    Native,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::NaN => "nan",
            Kind::Str => "str",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Native => "native",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Build a fresh list from anything convertible to values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(List::from_vec(items.into_iter().map(Into::into).collect()))
    }

    /// Build a fresh mapping; later duplicate keys overwrite earlier ones.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(Map::from_entries(entries))
    }

    /// Wrap an arbitrary host value.
    pub fn native<T: Any + Send + Sync>(value: T) -> Self {
        Value::Native(Native::new(value))
    }

    /// Classify this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(x) if x.is_nan() => Kind::NaN,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Native(_) => Kind::Native,
        }
    }

    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// A numeric reading of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The list handle, if this is a list.
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// The map handle, if this is a map.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The native handle, if this is one.
    pub fn as_native(&self) -> Option<&Native> {
        match self {
            Value::Native(native) => Some(native),
            _ => None,
        }
    }

    /// Member access by one path segment.
    ///
    /// Maps are indexed by key, lists by a decimal index. Everything else,
    /// and every miss, yields `None`.
    pub fn lookup(&self, segment: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(segment),
            Value::List(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        }
    }

    /// Convert to JSON.
    ///
    /// Fails with [`Fault::Cyclic`] if the value contains itself and with
    /// [`Fault::Structural`] if it contains a native. NaN becomes `null`.
    pub fn to_json(&self) -> Result<serde_json::Value, Fault> {
        to_json(self, &mut Vec::new())
    }
}

fn to_json(value: &Value, ancestors: &mut Vec<usize>) -> Result<serde_json::Value, Fault> {
    use serde_json::Value as Json;
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(x) => serde_json::Number::from_f64(*x).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
        Value::Native(_) => {
            return Err(Fault::Structural {
                operation: "to_json",
                expected: "a data value",
                found: Kind::Native,
            });
        }
        Value::List(list) => {
            if ancestors.contains(&list.id()) {
                return Err(Fault::Cyclic);
            }
            ancestors.push(list.id());
            let items = list
                .snapshot()
                .iter()
                .map(|item| to_json(item, ancestors))
                .collect::<Result<Vec<_>, _>>()?;
            ancestors.pop();
            Json::Array(items)
        }
        Value::Map(map) => {
            if ancestors.contains(&map.id()) {
                return Err(Fault::Cyclic);
            }
            ancestors.push(map.id());
            let mut object = serde_json::Map::new();
            for (key, item) in map.snapshot() {
                object.insert(key, to_json(&item, ancestors)?);
            }
            ancestors.pop();
            Json::Object(object)
        }
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_debug(self, f, &mut Vec::new())
    }
}

fn write_debug(value: &Value, f: &mut fmt::Formatter<'_>, ancestors: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(i) => write!(f, "{i}"),
        Value::Float(x) => write!(f, "{x:?}"),
        Value::Str(s) => write!(f, "{s:?}"),
        Value::Native(_) => f.write_str("<native>"),
        Value::List(list) => {
            if ancestors.contains(&list.id()) {
                return f.write_str("<cycle>");
            }
            ancestors.push(list.id());
            f.write_str("[")?;
            for (i, item) in list.snapshot().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_debug(item, f, ancestors)?;
            }
            ancestors.pop();
            f.write_str("]")
        }
        Value::Map(map) => {
            if ancestors.contains(&map.id()) {
                return f.write_str("<cycle>");
            }
            ancestors.push(map.id());
            f.write_str("{")?;
            for (i, (key, item)) in map.snapshot().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key:?}: ")?;
                write_debug(item, f, ancestors)?;
            }
            ancestors.pop();
            f.write_str("}")
        }
    }
}

/// A shared, mutable, ordered sequence.
#[derive(Clone, Default)]
pub struct List(Arc<Mutex<Vec<Value>>>);

impl List {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list owning `items`.
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Arc::new(Mutex::new(items)))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        lock(&self.0).len()
    }

    /// True when the list has no items.
    pub fn is_empty(&self) -> bool {
        lock(&self.0).is_empty()
    }

    /// Item at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Value> {
        lock(&self.0).get(index).cloned()
    }

    /// Append an item.
    pub fn push(&self, value: impl Into<Value>) {
        lock(&self.0).push(value.into());
    }

    /// Store at `index`, padding with `Null` if the list is shorter.
    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let mut items = lock(&self.0);
        if items.len() <= index {
            items.resize(index + 1, Value::Null);
        }
        items[index] = value.into();
    }

    /// A point-in-time copy of the items (handles inside are shared).
    pub fn snapshot(&self) -> Vec<Value> {
        lock(&self.0).clone()
    }

    pub(crate) fn replace(&self, items: Vec<Value>) {
        *lock(&self.0) = items;
    }

    /// True when both handles refer to the same list.
    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the underlying allocation.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

/// A shared, mutable mapping that remembers insertion order.
#[derive(Clone, Default)]
pub struct Map(Arc<Mutex<IndexMap<String, Value>>>);

impl Map {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map from entries, keeping first-insertion order.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<IndexMap<_, _>>();
        Self(Arc::new(Mutex::new(entries)))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        lock(&self.0).len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        lock(&self.0).is_empty()
    }

    /// Value under `key`, if present.
    pub fn get(&self, key: &str) -> Option<Value> {
        lock(&self.0).get(key).cloned()
    }

    /// True when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        lock(&self.0).contains_key(key)
    }

    /// Insert or overwrite. An existing key keeps its position.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        lock(&self.0).insert(key.into(), value.into())
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&self, key: &str) -> Option<Value> {
        lock(&self.0).shift_remove(key)
    }

    /// Entry at insertion position `index`.
    pub fn entry_at(&self, index: usize) -> Option<(String, Value)> {
        lock(&self.0)
            .get_index(index)
            .map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        lock(&self.0).keys().cloned().collect()
    }

    /// A point-in-time copy of the entries (handles inside are shared).
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        lock(&self.0)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub(crate) fn replace(&self, entries: Vec<(String, Value)>) {
        *lock(&self.0) = entries.into_iter().collect();
    }

    /// True when both handles refer to the same map.
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the underlying allocation.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

/// An opaque, shared host value compared by identity.
#[derive(Clone)]
pub struct Native(Arc<dyn Any + Send + Sync>);

impl Native {
    /// Wrap `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value as `T`, if it is one.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True when both handles refer to the same allocation.
    pub fn ptr_eq(&self, other: &Native) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Native(..)")
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<List> for Value {
    fn from(list: List) -> Self {
        Value::List(list)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Native> for Value {
    fn from(native: Native) -> Self {
        Value::Native(native)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(List::from_vec(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(List::from_vec(
                items.into_iter().map(Value::from).collect(),
            )),
            Json::Object(object) => Value::Map(Map::from_entries(
                object.into_iter().map(|(k, v)| (k, Value::from(v))),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_does_not_coerce() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::from("1"));
        assert_ne!(Value::Bool(false), Value::Null);
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn composites_compare_by_identity() {
        let a = Value::list([1, 2]);
        let b = Value::list([1, 2]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn debug_marks_back_edges() {
        let map = Map::new();
        map.insert("n", 1);
        map.insert("self", map.clone());
        assert_eq!(format!("{:?}", Value::Map(map)), r#"{"n": 1, "self": <cycle>}"#);
    }
}
