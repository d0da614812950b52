//! Declarative value transforms
//!
//! A schema node may end with an ordered pipeline of transforms. Every
//! transform except `Text` and `Attribute` is a pure function from one
//! `FieldValue` to the next; those two read from the element handle and are
//! resolved by the interpreter before the value pipeline runs.

use crate::extract::FieldValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use thiserror::Error;

/// Compiled `RegexCapture` patterns, shared by every schema in the process
static PATTERNS: LazyLock<Mutex<HashMap<String, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Errors raised by a single transform
///
/// A transform error never escapes its field: the interpreter turns it into a
/// null value for that field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("{op} expects {expected}, got {found}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Pattern '{pattern}' did not match {input:?}")]
    NoMatch { pattern: String, input: String },

    #[error("Cannot parse {0:?} as an integer")]
    ParseInt(String),

    #[error("Range needs at least two numbers, found {0}")]
    IncompleteRange(usize),

    #[error("Range {first}-{last} is too large")]
    RangeOverflow { first: i64, last: i64 },

    #[error("Field '{0}' is missing")]
    MissingField(String),

    #[error("Element read failed: {0}")]
    Element(String),
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;

/// One step of a field's post-processing pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transform {
    /// Reads the text content of the element
    Text,

    /// Reads an attribute (or DOM property) of the element
    Attribute { name: String },

    /// Keeps one capture group of the first regex match
    RegexCapture {
        pattern: String,
        #[serde(default = "default_group")]
        group: usize,
    },

    /// Splits text on a separator, or on whitespace when none is given
    Split {
        #[serde(default)]
        separator: Option<String>,
    },

    /// Trims the given characters, or whitespace when none are given
    Strip {
        #[serde(default)]
        chars: Option<String>,
    },

    /// Parses text as a signed integer
    ParseInt,

    /// Computes `last - first + 1` from the numbers of a range such as "100-105"
    RangeLength,

    /// Takes one field out of a map
    Pluck { field: String },

    /// Flattens nested lists and splits every text item on a separator
    FlattenSplit { separator: String },

    /// Joins list items into one text value
    Join { separator: String },
}

fn default_group() -> usize {
    1
}

impl Transform {
    /// Returns the operation name as it appears in schema files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Attribute { .. } => "attribute",
            Self::RegexCapture { .. } => "regex_capture",
            Self::Split { .. } => "split",
            Self::Strip { .. } => "strip",
            Self::ParseInt => "parse_int",
            Self::RangeLength => "range_length",
            Self::Pluck { .. } => "pluck",
            Self::FlattenSplit { .. } => "flatten_split",
            Self::Join { .. } => "join",
        }
    }

    /// Checks the transform's static parameters and compiles its pattern
    pub fn validate(&self) -> TransformResult<()> {
        if let Self::RegexCapture { pattern, .. } = self {
            compile(pattern)?;
        }
        Ok(())
    }

    /// Applies the transform to an already-materialized value
    ///
    /// # Arguments
    ///
    /// * `value` - The output of the previous pipeline step
    ///
    /// # Returns
    ///
    /// * `Ok(FieldValue)` - The transformed value
    /// * `Err(TransformError)` - The value had the wrong shape or content
    pub fn apply(&self, value: FieldValue) -> TransformResult<FieldValue> {
        match self {
            Self::Text => match value {
                FieldValue::Text(_) => Ok(value),
                FieldValue::Integer(n) => Ok(FieldValue::Text(n.to_string())),
                other => Err(self.mismatch("an element or text", &other)),
            },

            Self::Attribute { .. } => Err(self.mismatch("an element", &value)),

            Self::RegexCapture { pattern, group } => {
                let text = self.expect_text(value)?;
                let regex = compile(pattern)?;
                let captured = regex
                    .captures(&text)
                    .and_then(|captures| captures.get(*group))
                    .map(|capture| capture.as_str().to_string());
                match captured {
                    Some(captured) => Ok(FieldValue::Text(captured)),
                    None => Err(TransformError::NoMatch {
                        pattern: pattern.clone(),
                        input: text,
                    }),
                }
            }

            Self::Split { separator } => {
                let text = self.expect_text(value)?;
                let parts: Vec<FieldValue> = match separator {
                    Some(separator) => text.split(separator.as_str()).map(FieldValue::from).collect(),
                    None => text.split_whitespace().map(FieldValue::from).collect(),
                };
                Ok(FieldValue::List(parts))
            }

            Self::Strip { chars } => {
                let text = self.expect_text(value)?;
                let stripped = match chars {
                    Some(chars) => text.trim_matches(|c: char| chars.contains(c)),
                    None => text.trim(),
                };
                Ok(FieldValue::Text(stripped.to_string()))
            }

            Self::ParseInt => match value {
                FieldValue::Integer(_) => Ok(value),
                FieldValue::Text(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(FieldValue::Integer)
                    .map_err(|_| TransformError::ParseInt(text)),
                other => Err(self.mismatch("text", &other)),
            },

            Self::RangeLength => {
                let mut numbers = Vec::new();
                collect_numbers(&value, &mut numbers)?;
                match (numbers.first(), numbers.last()) {
                    (Some(&first), Some(&last)) if numbers.len() >= 2 => last
                        .checked_sub(first)
                        .and_then(|span| span.checked_add(1))
                        .map(FieldValue::Integer)
                        .ok_or(TransformError::RangeOverflow { first, last }),
                    _ => Err(TransformError::IncompleteRange(numbers.len())),
                }
            }

            Self::Pluck { field } => match value {
                FieldValue::Map(mut fields) => fields
                    .shift_remove(field)
                    .ok_or_else(|| TransformError::MissingField(field.clone())),
                other => Err(self.mismatch("a map", &other)),
            },

            Self::FlattenSplit { separator } => {
                let mut items = Vec::new();
                flatten_split(value, separator, &mut items)?;
                Ok(FieldValue::List(items))
            }

            Self::Join { separator } => match value {
                FieldValue::List(items) => {
                    let mut parts = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            FieldValue::Text(text) => parts.push(text),
                            FieldValue::Integer(n) => parts.push(n.to_string()),
                            FieldValue::Null => {}
                            other => return Err(self.mismatch("a list of scalars", &other)),
                        }
                    }
                    Ok(FieldValue::Text(parts.join(separator)))
                }
                FieldValue::Text(_) => Ok(value),
                other => Err(self.mismatch("a list", &other)),
            },
        }
    }

    fn expect_text(&self, value: FieldValue) -> TransformResult<String> {
        match value {
            FieldValue::Text(text) => Ok(text),
            other => Err(self.mismatch("text", &other)),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &FieldValue) -> TransformError {
        TransformError::TypeMismatch {
            op: self.name(),
            expected,
            found: found.kind(),
        }
    }
}

/// Applies a whole pipeline of value transforms in order
///
/// Stops at the first failing transform.
pub fn apply_all(transforms: &[Transform], value: FieldValue) -> TransformResult<FieldValue> {
    transforms
        .iter()
        .try_fold(value, |current, transform| transform.apply(current))
}

/// Returns the compiled pattern, compiling it on first use
fn compile(pattern: &str) -> TransformResult<Regex> {
    let mut patterns = PATTERNS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(regex) = patterns.get(pattern) {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern).map_err(|e| TransformError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    patterns.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Collects every integer of a value: digit runs of text, integers as-is
fn collect_numbers(value: &FieldValue, numbers: &mut Vec<i64>) -> TransformResult<()> {
    match value {
        FieldValue::Integer(n) => numbers.push(*n),
        FieldValue::Text(text) => {
            for run in text
                .split(|c: char| !c.is_ascii_digit())
                .filter(|run| !run.is_empty())
            {
                let number = run
                    .parse::<i64>()
                    .map_err(|_| TransformError::ParseInt(run.to_string()))?;
                numbers.push(number);
            }
        }
        FieldValue::List(items) => {
            for item in items {
                collect_numbers(item, numbers)?;
            }
        }
        FieldValue::Null => {}
        FieldValue::Map(_) => {
            return Err(TransformError::TypeMismatch {
                op: "range_length",
                expected: "text or a list",
                found: "map",
            })
        }
    }
    Ok(())
}

fn flatten_split(
    value: FieldValue,
    separator: &str,
    items: &mut Vec<FieldValue>,
) -> TransformResult<()> {
    match value {
        FieldValue::Text(text) => {
            items.extend(text.split(separator).map(FieldValue::from));
        }
        FieldValue::List(nested) => {
            for item in nested {
                flatten_split(item, separator, items)?;
            }
        }
        FieldValue::Integer(_) => items.push(value),
        FieldValue::Null => {}
        FieldValue::Map(_) => {
            return Err(TransformError::TypeMismatch {
                op: "flatten_split",
                expected: "text or a list",
                found: "map",
            })
        }
    }
    Ok(())
}
