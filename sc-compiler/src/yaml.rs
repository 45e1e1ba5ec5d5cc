//! An insertion-ordered YAML value model.
//!
//! The agent does not care about key order, but humans diffing two compiled documents do, and the
//! document must be byte-identical across runs. Every mapping in a compiled document is a
//! [`MapSlice`], serialized in exactly the order its keys were pushed.
use std::collections::BTreeMap;

use serde::ser::{
    SerializeMap,
    SerializeSeq,
};
use serde::{
    Serialize,
    Serializer,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(u64),
    Str(String),
    Seq(Vec<Value>),
    Map(MapSlice),
}

/// A mapping that remembers insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapSlice(Vec<(String, Value)>);

impl MapSlice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<Value>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn push_opt<V: Into<Value>>(&mut self, key: &str, value: Option<V>) {
        if let Some(v) = value {
            self.push(key, v);
        }
    }

    /// Builder-style [`MapSlice::push`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for MapSlice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_u64(*i),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            },
            Self::Map(m) => m.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::Seq(value.into_iter().map(Into::into).collect())
    }
}

impl From<MapSlice> for Value {
    fn from(value: MapSlice) -> Self {
        Self::Map(value)
    }
}

/// Sorted by key, courtesy of the `BTreeMap`.
impl From<&BTreeMap<String, String>> for Value {
    fn from(value: &BTreeMap<String, String>) -> Self {
        Self::Map(MapSlice(value.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect()))
    }
}

impl From<&BTreeMap<String, Vec<String>>> for Value {
    fn from(value: &BTreeMap<String, Vec<String>>) -> Self {
        Self::Map(MapSlice(value.iter().map(|(k, v)| (k.clone(), Value::from(v.clone()))).collect()))
    }
}
