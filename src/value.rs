use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed attribute value exchanged through the reflection facade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value. Used to remove style sheet entries.
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vector3([f32; 3]),
    Color([f32; 4]),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "<empty>"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{:.3}", value),
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Vector3([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
            Value::Color([r, g, b, a]) => write!(f, "rgba({}, {}, {}, {})", r, g, b, a),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Reflection facade: named attribute access on a document object.
pub trait Reflect {
    /// Name of the object's type, used in diagnostics
    fn type_name(&self) -> &str;

    /// Current value of the attribute, or `None` if the object has no such attribute
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Set an attribute. Returns false when the object rejects the name or value type.
    fn set_attribute(&mut self, name: &str, value: Value) -> bool;

    /// Names of all attributes currently exposed by the object
    fn attribute_names(&self) -> Vec<String>;

    /// Called after a batch of `set_attribute` calls
    fn apply_attributes(&mut self) {}
}

/// Store a free-form attribute; [`Value::Empty`] removes it
pub(crate) fn store_attribute(
    attributes: &mut std::collections::BTreeMap<String, Value>,
    name: &str,
    value: Value,
) {
    if value.is_empty() {
        attributes.remove(name);
    } else {
        attributes.insert(name.to_owned(), value);
    }
}
