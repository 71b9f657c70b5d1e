//! Structured document model.
//!
//! Exported resources are parsed into a [`Document`] tree. Mapping order is
//! preserved, scalars keep their type, and custom type tags are kept as
//! [`Document::Tagged`] nodes that path traversal looks through.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value;

use crate::error::{KeywordError, KeywordResult};
use crate::path::{locate_array_element, Path, PathSegment};
use crate::tags;

/// A scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Null or absent.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer or float.
    Number(serde_yaml::Number),
    /// String.
    String(String),
}

/// A parsed YAML or JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Leaf value.
    Scalar(Scalar),
    /// Ordered list.
    Sequence(Vec<Document>),
    /// String-keyed mapping in source order.
    Mapping(IndexMap<String, Document>),
    /// Value carrying an explicit type tag (`!!org.wso2...`).
    Tagged {
        /// Tag as written, including its handle.
        tag: String,
        /// Tagged value.
        value: Box<Document>,
    },
}

impl Document {
    /// Creates a string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    /// Parses YAML text. JSON is accepted as well.
    pub fn from_yaml(text: &str) -> KeywordResult<Self> {
        let (text, secondary) = tags::demote_secondary_tags(text);
        let value: Value = serde_yaml::from_str(&text).map_err(KeywordError::Parse)?;
        Ok(Self::from_value(value, &secondary))
    }

    /// Writes the document as YAML.
    pub fn to_yaml(&self) -> KeywordResult<String> {
        let text = serde_yaml::to_string(&self.to_value()).map_err(KeywordError::Yaml)?;
        let mut secondary = BTreeSet::new();
        self.collect_secondary_tags(&mut secondary);
        Ok(tags::promote_secondary_tags(&text, &secondary))
    }

    /// Writes the document as pretty-printed JSON. Tags are dropped.
    pub fn to_json(&self) -> KeywordResult<String> {
        let mut text = serde_json::to_string_pretty(&self.to_json_value())?;
        text.push('\n');
        Ok(text)
    }

    /// Returns the node under any tags.
    #[must_use]
    pub fn untagged(&self) -> &Self {
        let mut node = self;
        while let Self::Tagged { value, .. } = node {
            node = value;
        }
        node
    }

    fn untagged_mut(&mut self) -> &mut Self {
        match self {
            Self::Tagged { value, .. } => value.untagged_mut(),
            other => other,
        }
    }

    /// Returns whether this is a mapping (possibly tagged).
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self.untagged(), Self::Mapping(_))
    }

    /// Returns whether this is a scalar (possibly tagged).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self.untagged(), Self::Scalar(_))
    }

    /// Returns the node at `path`, or `None` when it does not resolve.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Self> {
        let mut node = self;
        for segment in path.segments() {
            node = match (segment, node.untagged()) {
                (PathSegment::Key(key), Self::Mapping(map)) => map.get(key)?,
                (segment @ PathSegment::Element { .. }, Self::Sequence(items)) => {
                    &items[locate_array_element(items, segment)?]
                }
                _ => return None,
            };
        }
        Some(node)
    }

    /// Mutable variant of [`Document::get`].
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Self> {
        let mut node = self;
        for segment in path.segments() {
            node = match (segment, node.untagged_mut()) {
                (PathSegment::Key(key), Self::Mapping(map)) => map.get_mut(key)?,
                (segment @ PathSegment::Element { .. }, Self::Sequence(items)) => {
                    let index = locate_array_element(items, segment)?;
                    &mut items[index]
                }
                _ => return None,
            };
        }
        Some(node)
    }

    /// Replaces the node at `path`. Returns `false` when the path does not
    /// resolve, leaving the document untouched.
    pub fn set(&mut self, path: &Path, value: Self) -> bool {
        match self.get_mut(path) {
            Some(node) => {
                *node = value;
                true
            }
            None => false,
        }
    }

    /// Text form used for comparisons.
    ///
    /// Null renders empty, scalars render their value, sequences of scalars
    /// render comma joined, anything else renders empty.
    #[must_use]
    pub fn render(&self) -> String {
        match self.untagged() {
            Self::Scalar(Scalar::Null) => String::new(),
            Self::Scalar(Scalar::Bool(b)) => b.to_string(),
            Self::Scalar(Scalar::Number(n)) => n.to_string(),
            Self::Scalar(Scalar::String(s)) => s.clone(),
            Self::Sequence(items) if items.iter().all(Self::is_scalar) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(","),
            _ => String::new(),
        }
    }

    /// Replaces every string scalar equal to `from` with `to`. Returns the
    /// number of replaced values.
    pub fn replace_string_values(&mut self, from: &str, to: &str) -> usize {
        match self {
            Self::Scalar(Scalar::String(s)) if s == from => {
                *s = to.to_string();
                1
            }
            Self::Scalar(_) => 0,
            Self::Tagged { value, .. } => value.replace_string_values(from, to),
            Self::Sequence(items) => items
                .iter_mut()
                .map(|item| item.replace_string_values(from, to))
                .sum(),
            Self::Mapping(map) => map
                .values_mut()
                .map(|value| value.replace_string_values(from, to))
                .sum(),
        }
    }

    fn from_value(value: Value, secondary: &BTreeSet<String>) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Sequence(items) => Self::Sequence(
                items
                    .into_iter()
                    .map(|item| Self::from_value(item, secondary))
                    .collect(),
            ),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key_to_string(key), Self::from_value(value, secondary)))
                    .collect(),
            ),
            Value::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                let name = tag.to_string().trim_start_matches('!').to_string();
                let tag = if secondary.contains(&name) {
                    format!("!!{name}")
                } else {
                    format!("!{name}")
                };
                Self::Tagged {
                    tag,
                    value: Box::new(Self::from_value(value, secondary)),
                }
            }
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Scalar(Scalar::Null) => Value::Null,
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            Self::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            Self::Sequence(items) => Value::Sequence(items.iter().map(Self::to_value).collect()),
            Self::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(key, value)| (Value::String(key.clone()), value.to_value()))
                    .collect(),
            ),
            Self::Tagged { tag, value } => {
                let name = tag.trim_start_matches('!');
                if name.is_empty() {
                    return value.to_value();
                }
                Value::Tagged(Box::new(TaggedValue {
                    tag: Tag::new(name),
                    value: value.to_value(),
                }))
            }
        }
    }

    fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Scalar(Scalar::Null) => serde_json::Value::Null,
            Self::Scalar(Scalar::Bool(b)) => serde_json::Value::Bool(*b),
            Self::Scalar(Scalar::Number(n)) => number_to_json(n),
            Self::Scalar(Scalar::String(s)) => serde_json::Value::String(s.clone()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json_value).collect())
            }
            Self::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json_value()))
                    .collect(),
            ),
            Self::Tagged { value, .. } => value.to_json_value(),
        }
    }

    fn collect_secondary_tags(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Scalar(_) => {}
            Self::Sequence(items) => items.iter().for_each(|i| i.collect_secondary_tags(names)),
            Self::Mapping(map) => map.values().for_each(|v| v.collect_secondary_tags(names)),
            Self::Tagged { tag, value } => {
                if let Some(name) = tag.strip_prefix("!!") {
                    names.insert(name.to_string());
                }
                value.collect_secondary_tags(names);
            }
        }
    }
}

fn key_to_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn number_to_json(n: &serde_yaml::Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        serde_json::Value::from(i)
    } else if let Some(u) = n.as_u64() {
        serde_json::Value::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}
