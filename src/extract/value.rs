/// Extracted field values
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value produced by evaluating one schema node
///
/// Serialized untagged, so records read as plain JSON: strings, integers,
/// lists, nested objects and `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The node resolved to nothing, or one of its transforms failed
    #[default]
    Null,

    /// An integer produced by a numeric transform
    Integer(i64),

    /// Text content or a captured substring
    Text(String),

    /// One value per element for `list` nodes, or a split/flattened value
    List(Vec<FieldValue>),

    /// Nested fields of a node with sub-fields
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Returns true if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the items, if this is a list value
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested fields, if this is a map value
    pub fn as_map(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Short name of the variant, used in transform error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "<{}>", self.kind()),
        }
    }
}
