pub mod loader;
pub mod normalize;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use loader::{FetchError, TemplateLoader, TemplateSource};
pub use normalize::{normalize, normalize_with, to_camel_case};

/// A template column as fetched, before any key normalization.
pub type RawColumn = Map<String, Value>;
/// A template task as fetched, before any key normalization.
pub type RawTask = Map<String, Value>;

/// Response of a template lookup by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateResponse {
    #[serde(default, alias = "data")]
    pub records: Vec<TemplateRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Vec<RawColumn>>,
}

impl TemplateResponse {
    /// Structure of the first record, if it has a non-empty one.
    pub fn into_structure(self) -> Option<Vec<RawColumn>> {
        self.records
            .into_iter()
            .next()
            .and_then(|record| record.structure)
            .filter(|structure| !structure.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error(transparent)]
    Fetch(FetchError),

    #[error("Malformed template: {0}")]
    MalformedTemplate(#[from] serde_json::Error),
}
