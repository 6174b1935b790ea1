//! Tree nodes and the scalar/sub-tree value union.
//!
//! A [`Node`] maps keys to [`Value`]s and keeps its entries in insertion
//! order, so enumeration, flattening and serialization are deterministic.
//! Nodes serialize as JSON-style maps whose values are either strings
//! (scalars) or nested maps (sub-trees).

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value bound to a key: either an opaque scalar or a nested node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A leaf parameter value.
    Scalar(String),
    /// A nested level of parameters.
    SubTree(Node),
}

impl Value {
    /// Returns the scalar string, or `None` for a sub-tree.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::SubTree(_) => None,
        }
    }

    /// Returns the nested node, or `None` for a scalar.
    pub fn as_subtree(&self) -> Option<&Node> {
        match self {
            Value::Scalar(_) => None,
            Value::SubTree(node) => Some(node),
        }
    }

    /// Returns `true` if this is a scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Returns `true` if this is a sub-tree.
    pub fn is_subtree(&self) -> bool {
        matches!(self, Value::SubTree(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::SubTree(node)
    }
}

/// One level of the parameter tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    entries: Vec<(String, Value)>,
}

impl Node {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style bind of `key` to `value`, replacing any previous binding
    /// in place.
    ///
    /// Unlike store insertion this does not guard against scalar/sub-tree
    /// replacement; it is meant for assembling an initial tree.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(key.into(), value.into());
        self
    }

    /// Number of keys bound at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is bound at this level.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key at this level.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a key at this level, returning it only if it is a scalar.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_scalar)
    }

    /// Look up a key at this level, returning it only if it is a sub-tree.
    pub fn subtree(&self, key: &str) -> Option<&Node> {
        self.get(key).and_then(Value::as_subtree)
    }

    /// Returns `true` if `key` is bound at this level.
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub(crate) fn value_at_mut(&mut self, idx: usize) -> &mut Value {
        &mut self.entries[idx].1
    }

    /// Append a new binding and return its index. The key must be unbound.
    pub(crate) fn push(&mut self, key: String, value: Value) -> usize {
        debug_assert!(!self.contains_key(&key));
        self.entries.push((key, value));
        self.entries.len() - 1
    }

    fn bind(&mut self, key: String, value: Value) {
        match self.position(&key) {
            Some(idx) => self.entries[idx].1 = value,
            None => {
                self.push(key, value);
            }
        }
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(s) => serializer.serialize_str(s),
            Value::SubTree(node) => node.serialize(serializer),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of parameter names to strings or nested maps")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
        let mut node = Node::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            if node.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate parameter {key:?}")));
            }
            node.push(key, value);
        }
        Ok(node)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a map of parameters")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::Scalar(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::Scalar(s))
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Value, A::Error> {
        NodeVisitor.visit_map(access).map(Value::SubTree)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NodeVisitor)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}
