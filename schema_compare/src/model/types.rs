//! Type definitions for model objects

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::text::normalize_key;

/// Ordered attribute payload of a model object
pub type Attributes = IndexMap<String, AttributeValue>;

/// Stable identifier assigned by the system a model snapshot came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of a model object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Model,
    SubjectArea,
    Entity,
    Attribute,
    Relationship,
    Key,
    Index,
    Trigger,
    View,
    Procedure,
    Function,
    Constraint,
    Domain,
    Annotation,
    Diagram,
    Sequence,
    Synonym,
    Package,
    Type,
    Schema,
}

impl ObjectKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Model => "model",
            ObjectKind::SubjectArea => "subject-area",
            ObjectKind::Entity => "entity",
            ObjectKind::Attribute => "attribute",
            ObjectKind::Relationship => "relationship",
            ObjectKind::Key => "key",
            ObjectKind::Index => "index",
            ObjectKind::Trigger => "trigger",
            ObjectKind::View => "view",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Function => "function",
            ObjectKind::Constraint => "constraint",
            ObjectKind::Domain => "domain",
            ObjectKind::Annotation => "annotation",
            ObjectKind::Diagram => "diagram",
            ObjectKind::Sequence => "sequence",
            ObjectKind::Synonym => "synonym",
            ObjectKind::Package => "package",
            ObjectKind::Type => "type",
            ObjectKind::Schema => "schema",
        }
    }

    /// Whether objects of this kind may contain child objects
    pub fn supports_children(&self) -> bool {
        match self {
            ObjectKind::Model
            | ObjectKind::Schema
            | ObjectKind::SubjectArea
            | ObjectKind::Entity
            | ObjectKind::Package => true,
            ObjectKind::Attribute
            | ObjectKind::Relationship
            | ObjectKind::Key
            | ObjectKind::Index
            | ObjectKind::Trigger
            | ObjectKind::View
            | ObjectKind::Procedure
            | ObjectKind::Function
            | ObjectKind::Constraint
            | ObjectKind::Domain
            | ObjectKind::Annotation
            | ObjectKind::Diagram
            | ObjectKind::Sequence
            | ObjectKind::Synonym
            | ObjectKind::Type => false,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar or nested attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AttributeValue>),
    Map(IndexMap<String, AttributeValue>),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        AttributeValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// A node of a model tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SchemaObject>,
}

impl SchemaObject {
    /// Create a new object without attributes or children
    pub fn new(id: impl Into<ObjectId>, name: &str, kind: ObjectKind) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            kind,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute value
    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Append a child object
    pub fn with_child(mut self, child: SchemaObject) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child object in place
    pub fn add_child(&mut self, child: SchemaObject) {
        self.children.push(child);
    }

    /// Look up an attribute by key, ignoring case and `_`/`-` separators
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        let wanted = normalize_key(key);
        self.attributes
            .iter()
            .find(|(name, _)| normalize_key(name) == wanted)
            .map(|(_, value)| value)
    }

    /// Text value of the first present attribute among `keys`, lowercased
    pub fn text_attribute(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.attribute(key))
            .find_map(|value| value.as_str().map(|text| text.trim().to_lowercase()))
    }
}
