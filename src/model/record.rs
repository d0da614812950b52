/// Extracted output records
use crate::extract::FieldValue;
use crate::model::Rank;
use indexmap::IndexMap;
use serde::Serialize;

/// The structured record extracted from one detail page
///
/// Serializes as a flat JSON object: the schema fields in schema order,
/// followed by `url` and `rank`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    /// Extracted fields keyed by schema field name
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldValue>,

    /// Source URL of the detail page
    pub url: String,

    /// Rank of the originating work item
    pub rank: Rank,
}

impl ResultRecord {
    /// Creates a record for the given rank and URL
    pub fn new(rank: Rank, url: impl Into<String>, fields: IndexMap<String, FieldValue>) -> Self {
        Self {
            fields,
            url: url.into(),
            rank,
        }
    }

    /// Returns the value of a field, if the schema produced it
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Sorts records into final output order (page ascending, then position)
pub fn sort_by_rank(records: &mut [ResultRecord]) {
    records.sort_by_key(|record| record.rank);
}
