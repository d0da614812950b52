//! Extraction schema data model
//!
//! A schema is an ordered tree of named `ExtractionNode`s. It is plain data:
//! it can be built in code with the builder methods below or loaded from a
//! JSON file, and it is validated once before a crawl starts.

use crate::browser::{BrowserError, Selector};
use crate::extract::Transform;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort the evaluation of a whole record
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("session failed while evaluating '{field}': {source}")]
    Session {
        field: String,
        #[source]
        source: BrowserError,
    },

    #[error("invalid schema: {0}")]
    Invalid(String),
}

/// How many matches a node keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    /// Keep the first match
    #[default]
    Single,

    /// Keep every match, in document order
    List,
}

/// Page interaction run before a node's selector is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PreHook {
    /// Click the first element matching `selector`
    Click { selector: Selector },

    /// Click `trigger` unless `revealed` is already present
    Expand { trigger: Selector, revealed: Selector },
}

impl PreHook {
    fn selectors(&self) -> Vec<&Selector> {
        match self {
            Self::Click { selector } => vec![selector],
            Self::Expand { trigger, revealed } => vec![trigger, revealed],
        }
    }
}

/// One node of the extraction tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_hooks: Vec<PreHook>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, ExtractionNode>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Transform>,

    #[serde(default)]
    pub multiplicity: Multiplicity,
}

impl ExtractionNode {
    /// A single-match node with the given selector
    pub fn select(selector: Selector) -> Self {
        Self {
            selector: Some(selector),
            ..Self::default()
        }
    }

    /// A node that reuses its context instead of selecting
    pub fn context() -> Self {
        Self::default()
    }

    pub fn list(mut self) -> Self {
        self.multiplicity = Multiplicity::List;
        self
    }

    pub fn hook(mut self, hook: PreHook) -> Self {
        self.pre_hooks.push(hook);
        self
    }

    pub fn field(mut self, name: impl Into<String>, node: ExtractionNode) -> Self {
        self.fields
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), node);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    fn validate(&self, path: &str) -> Result<(), SchemaError> {
        if let Some(selector) = &self.selector {
            if selector.is_blank() {
                return Err(SchemaError::Invalid(format!("{}: empty selector", path)));
            }
        }

        for hook in &self.pre_hooks {
            if hook.selectors().iter().any(|selector| selector.is_blank()) {
                return Err(SchemaError::Invalid(format!(
                    "{}: empty selector in pre-hook",
                    path
                )));
            }
        }

        for transform in &self.transforms {
            transform
                .validate()
                .map_err(|e| SchemaError::Invalid(format!("{}: {}", path, e)))?;
        }

        if let Some(fields) = &self.fields {
            for (name, child) in fields {
                child.validate(&format!("{}.{}", path, name))?;
            }
        }

        Ok(())
    }
}

/// The root of an extraction tree: named top-level fields, in output order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub fields: IndexMap<String, ExtractionNode>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, node: ExtractionNode) -> Self {
        self.fields.insert(name.into(), node);
        self
    }

    /// Checks selectors and transform parameters of every node
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::Invalid("schema has no fields".to_string()));
        }
        for (name, node) in &self.fields {
            node.validate(name)?;
        }
        Ok(())
    }
}
