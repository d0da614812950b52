//! Schema interpreter
//!
//! Walks an extraction tree against a live browser session. Per node:
//! pre-hooks run first, the selector is resolved against the context, the
//! matches are narrowed by multiplicity, nested fields recurse per match and
//! transforms run per match. A transform failure nulls only its own field; a
//! session failure outside a transform aborts the whole record.

use crate::browser::{BrowserSession, Selector};
use crate::extract::{
    ExtractionNode, FieldValue, Multiplicity, PreHook, Schema, SchemaError, Transform,
    TransformError,
};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::time::Duration;

/// Timeouts applied while interpreting a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long a document-rooted query waits for a first match
    pub query: Duration,

    /// How long to wait for the document to become interactive
    pub ready: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            query: Duration::from_secs(1),
            ready: Duration::from_secs(30),
        }
    }
}

/// What a selector is resolved against
enum Scope<E> {
    Document,
    Elements(Vec<E>),
}

/// A value in the middle of a transform pipeline
enum Datum<E> {
    Element(E),
    Value(FieldValue),
}

/// Evaluates schemas against one session
pub struct Interpreter<'s, S: BrowserSession> {
    session: &'s S,
    timeouts: Timeouts,
}

impl<'s, S: BrowserSession> Interpreter<'s, S> {
    pub fn new(session: &'s S, timeouts: Timeouts) -> Self {
        Self { session, timeouts }
    }

    /// Evaluates every top-level field of `schema` against the current document
    ///
    /// # Returns
    ///
    /// * `Ok(IndexMap)` - Field values in schema order; failed fields are null
    /// * `Err(SchemaError)` - The session failed and the record is unusable
    pub async fn extract(&self, schema: &Schema) -> Result<IndexMap<String, FieldValue>, SchemaError> {
        self.evaluate_fields(&schema.fields, &Scope::Document).await
    }

    async fn evaluate_fields(
        &self,
        fields: &IndexMap<String, ExtractionNode>,
        scope: &Scope<S::Element>,
    ) -> Result<IndexMap<String, FieldValue>, SchemaError> {
        let mut values = IndexMap::with_capacity(fields.len());
        for (name, node) in fields {
            let value = self.evaluate_node(name, node, scope).await?;
            values.insert(name.clone(), value);
        }
        Ok(values)
    }

    fn evaluate_node<'a>(
        &'a self,
        name: &'a str,
        node: &'a ExtractionNode,
        scope: &'a Scope<S::Element>,
    ) -> BoxFuture<'a, Result<FieldValue, SchemaError>> {
        Box::pin(async move {
            for hook in &node.pre_hooks {
                self.run_hook(name, hook).await;
            }

            let matches = match (&node.selector, scope) {
                (Some(selector), _) => self.resolve(name, selector, scope).await?,
                (None, Scope::Elements(elements)) => elements.clone(),
                (None, Scope::Document) => {
                    // Nothing to read from the document itself, only from its fields
                    let Some(fields) = &node.fields else {
                        return Ok(FieldValue::Null);
                    };
                    let map = self.evaluate_fields(fields, scope).await?;
                    let value = self
                        .finish(name, Datum::Value(FieldValue::Map(map)), &node.transforms)
                        .await?;
                    return Ok(value.unwrap_or_default());
                }
            };

            if matches.is_empty() {
                tracing::debug!("Field '{}' matched nothing", name);
                return Ok(FieldValue::Null);
            }

            let matches = match node.multiplicity {
                Multiplicity::Single => matches.into_iter().take(1).collect::<Vec<_>>(),
                Multiplicity::List => matches,
            };

            let mut values = Vec::with_capacity(matches.len());
            for element in matches {
                let datum = match &node.fields {
                    Some(fields) => {
                        let scope = Scope::Elements(vec![element]);
                        Datum::Value(FieldValue::Map(self.evaluate_fields(fields, &scope).await?))
                    }
                    None => Datum::Element(element),
                };

                match self.finish(name, datum, &node.transforms).await? {
                    Some(value) => values.push(value),
                    None => return Ok(FieldValue::Null),
                }
            }

            Ok(match node.multiplicity {
                Multiplicity::Single => values.into_iter().next().unwrap_or_default(),
                Multiplicity::List => FieldValue::List(values),
            })
        })
    }

    /// Runs the transform pipeline on one unit and settles it to a value
    ///
    /// Returns `None` when a transform failed, which nulls the whole field.
    async fn finish(
        &self,
        name: &str,
        datum: Datum<S::Element>,
        transforms: &[Transform],
    ) -> Result<Option<FieldValue>, SchemaError> {
        let datum = match self.apply_transforms(datum, transforms).await {
            Ok(datum) => datum,
            Err(e) => {
                tracing::debug!("Field '{}' set to null: {}", name, e);
                return Ok(None);
            }
        };

        match datum {
            Datum::Value(value) => Ok(Some(value)),
            Datum::Element(element) => self
                .session
                .text(&element)
                .await
                .map(|text| Some(FieldValue::Text(text)))
                .map_err(|source| SchemaError::Session {
                    field: name.to_string(),
                    source,
                }),
        }
    }

    async fn apply_transforms(
        &self,
        mut datum: Datum<S::Element>,
        transforms: &[Transform],
    ) -> Result<Datum<S::Element>, TransformError> {
        for transform in transforms {
            datum = match (datum, transform) {
                (Datum::Element(element), Transform::Attribute { name }) => {
                    let value = self
                        .session
                        .attribute(&element, name)
                        .await
                        .map_err(|e| TransformError::Element(e.to_string()))?;
                    Datum::Value(value.map(FieldValue::Text).unwrap_or_default())
                }
                (Datum::Element(element), transform) => {
                    let text = self
                        .session
                        .text(&element)
                        .await
                        .map_err(|e| TransformError::Element(e.to_string()))?;
                    Datum::Value(transform.apply(FieldValue::Text(text))?)
                }
                (Datum::Value(value), transform) => Datum::Value(transform.apply(value)?),
            };
        }
        Ok(datum)
    }

    async fn resolve(
        &self,
        name: &str,
        selector: &Selector,
        scope: &Scope<S::Element>,
    ) -> Result<Vec<S::Element>, SchemaError> {
        match scope {
            Scope::Document => {
                let ready = self
                    .session
                    .wait_for_ready(self.timeouts.ready)
                    .await
                    .map_err(|source| SchemaError::Session {
                        field: name.to_string(),
                        source,
                    })?;
                if !ready {
                    tracing::debug!("Document not ready before resolving '{}'", name);
                }
                Ok(self
                    .session
                    .query_selector(None, selector, self.timeouts.query)
                    .await)
            }
            Scope::Elements(elements) => {
                let mut found = Vec::new();
                for element in elements {
                    found.extend(
                        self.session
                            .query_selector(Some(element), selector, self.timeouts.query)
                            .await,
                    );
                }
                Ok(found)
            }
        }
    }

    async fn run_hook(&self, name: &str, hook: &PreHook) {
        let trigger = match hook {
            PreHook::Click { selector } => selector,
            PreHook::Expand { trigger, revealed } => {
                let already = self
                    .session
                    .query_selector(None, revealed, Duration::ZERO)
                    .await;
                if !already.is_empty() {
                    return;
                }
                trigger
            }
        };

        let targets = self
            .session
            .query_selector(None, trigger, self.timeouts.query)
            .await;
        let Some(target) = targets.first() else {
            tracing::debug!("Pre-hook for '{}' found no {}", name, trigger);
            return;
        };

        if let Err(e) = self.session.dispatch_click(target).await {
            tracing::warn!("Pre-hook click for '{}' failed: {}", name, e);
        }
    }
}
