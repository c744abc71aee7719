use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed configuration file: the ordered sequence of its top-level blocks.
///
/// Each block is an object with a single key naming the block kind
/// (`provider`, `resource`, ...) whose value is the kind-specific content,
/// with block labels nested as objects:
///
/// ```text
/// resource "aws_instance" "web" { ... }
///   => {"resource": {"aws_instance": {"web": { ... }}}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Value>,
}

impl Document {
    pub fn new(blocks: Vec<Value>) -> Self {
        Self { blocks }
    }

    /// Content objects of every top-level block of the given kind, in order.
    ///
    /// Blocks whose content is not an object are skipped.
    pub fn blocks_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
        self.blocks
            .iter()
            .filter_map(move |block| block.as_object()?.get(kind))
            .filter_map(move |content| match content.as_object() {
                Some(object) => Some(object),
                None => {
                    tracing::trace!("skipping {} block with non-object content", kind);
                    None
                }
            })
    }
}

/// A value that was declared either once or several times.
///
/// Configuration documents represent a repeated declaration as a sequence
/// and a single one as a bare value. Callers iterate both the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> OneOrMany<&'a Map<String, Value>> {
    /// Resolves a value that is an object or a sequence of objects.
    ///
    /// Sequence members that are not objects are dropped; any other shape
    /// resolves to an empty sequence.
    pub fn objects(value: &'a Value) -> Self {
        match value {
            Value::Object(object) => OneOrMany::One(object),
            Value::Array(items) => OneOrMany::Many(items.iter().filter_map(Value::as_object).collect()),
            _ => OneOrMany::Many(Vec::new()),
        }
    }
}

impl<T> IntoIterator for OneOrMany<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            OneOrMany::One(item) => vec![item].into_iter(),
            OneOrMany::Many(items) => items.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Truthiness of a configuration value: null, `false`, zero, and empty
/// strings, sequences and mappings are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(object) => !object.is_empty(),
    }
}
