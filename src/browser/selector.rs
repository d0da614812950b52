/// Element selectors understood by browser sessions
use serde::{Deserialize, Serialize};
use std::fmt;

/// Locates zero or more elements relative to a context
///
/// Serialized externally tagged, e.g. `{"css": ".document-title"}` or
/// `{"xpath": "//*[@id='authors']"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    /// A CSS selector
    Css(String),

    /// An XPath expression
    #[serde(rename = "xpath")]
    XPath(String),

    /// A tag name, matched as a CSS type selector
    Tag(String),
}

impl Selector {
    /// Creates a CSS selector
    pub fn css(expression: impl Into<String>) -> Self {
        Self::Css(expression.into())
    }

    /// Creates an XPath selector
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Creates a tag-name selector
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Returns the raw expression
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(expression) | Self::XPath(expression) | Self::Tag(expression) => expression,
        }
    }

    /// Returns the CSS form of this selector, if it has one
    pub fn as_css(&self) -> Option<&str> {
        match self {
            Self::Css(expression) | Self::Tag(expression) => Some(expression),
            Self::XPath(_) => None,
        }
    }

    /// Returns true if the expression is blank
    pub fn is_blank(&self) -> bool {
        self.expression().trim().is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(expression) => write!(f, "css:{}", expression),
            Self::XPath(expression) => write!(f, "xpath:{}", expression),
            Self::Tag(expression) => write!(f, "tag:{}", expression),
        }
    }
}
