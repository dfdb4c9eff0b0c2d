//! Feature attributes and label/value field resolution

use indexmap::IndexMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single attribute value attached to a feature
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Real(f64),
    Integer(i64),
}

/// Ordered attribute table of a feature (insertion order is the column order)
pub type Attributes = IndexMap<String, AttributeValue>;

impl AttributeValue {
    /// Numeric view of the value; integers are widened to `f64`, text is not parsed
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Real(v) => Some(*v),
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::Text(_) => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Infer a value from a raw text cell: integers, then reals, then text
    pub fn infer(cell: &str) -> Self {
        let trimmed = cell.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            AttributeValue::Integer(v)
        } else if let Ok(v) = trimmed.parse::<f64>() {
            AttributeValue::Real(v)
        } else {
            AttributeValue::Text(cell.to_string())
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Real(v) => write!(f, "{v}"),
            AttributeValue::Integer(v) => write!(f, "{v}"),
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

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Real(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(i64::from(value))
    }
}

/// How to find one attribute of a feature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSelector<'a> {
    /// 1-based column position; position 0 is the geometry column of the source schema
    ByPosition(usize),
    /// Attribute name
    ByName(&'a str),
}

impl FieldSelector<'_> {
    /// Find the selected attribute, if present
    pub fn lookup<'r>(&self, attributes: &'r Attributes) -> Option<&'r AttributeValue> {
        match *self {
            FieldSelector::ByPosition(position) => attributes
                .get_index(position.checked_sub(1)?)
                .map(|(_, value)| value),
            FieldSelector::ByName(name) => attributes.get(name),
        }
    }

    /// Resolve the attribute as a label; numbers are formatted
    pub fn resolve_label(&self, attributes: &Attributes) -> Option<String> {
        self.lookup(attributes).map(|value| value.to_string())
    }

    /// Resolve the attribute as a number
    ///
    /// A present but non-numeric value is reported and resolves to `None`.
    pub fn resolve_value(&self, attributes: &Attributes) -> Option<f64> {
        let value = self.lookup(attributes)?;
        let number = value.as_f64();
        if number.is_none() {
            tracing::warn!("Attribute {self:?} is not numeric: {value:?}");
        }
        number
    }
}

/// Configured location of a label or value field
///
/// A position greater than zero overrides the name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldSelection {
    /// 1-based column position (0 = use the name)
    pub position: usize,
    /// Attribute name used when no position is set
    pub name: String,
}

impl FieldSelection {
    /// Select by name
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            position: 0,
            name: name.into(),
        }
    }

    /// The default label field (`"name"`)
    pub fn label() -> Self {
        Self::by_name("name")
    }

    /// The default value field (`"value"`)
    pub fn value() -> Self {
        Self::by_name("value")
    }

    /// Set the position override, keeping the name as documentation
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// The selector this configuration resolves to
    #[inline]
    pub fn selector(&self) -> FieldSelector<'_> {
        if self.position > 0 {
            FieldSelector::ByPosition(self.position)
        } else {
            FieldSelector::ByName(&self.name)
        }
    }
}
