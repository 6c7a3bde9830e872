use async_trait::async_trait;

use super::normalize::normalize_with;
use super::{TemplateError, TemplateResponse};
use crate::config::TemplateDefaults;
use crate::store::BoardStore;
use crate::types::Column;

/// Any error raised by a template source. Passed through to the caller as-is.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Where templates come from (typically an HTTP client owned by the caller).
/// Timeouts and retries are the source's business.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch_template(&self, template_id: &str) -> Result<TemplateResponse, FetchError>;
}

/// Fetches templates and applies them to a board in one step.
pub struct TemplateLoader<S> {
    source: S,
    defaults: TemplateDefaults,
}

impl<S: TemplateSource> TemplateLoader<S> {
    pub fn new(source: S) -> Self {
        Self::with_defaults(source, TemplateDefaults::default())
    }

    pub fn with_defaults(source: S, defaults: TemplateDefaults) -> Self {
        Self { source, defaults }
    }

    /// Fetch and normalize a template without touching any board.
    pub async fn fetch(&self, template_id: &str) -> Result<Vec<Column>, TemplateError> {
        let response = self
            .source
            .fetch_template(template_id)
            .await
            .map_err(TemplateError::Fetch)?;
        let structure = response
            .into_structure()
            .ok_or_else(|| TemplateError::TemplateNotFound(template_id.to_string()))?;
        normalize_with(structure, &self.defaults)
    }

    /// Replace the board's columns with a template. On any error the board
    /// is left exactly as it was.
    pub async fn load(&self, template_id: &str, store: &mut BoardStore) -> Result<(), TemplateError> {
        let columns = match self.fetch(template_id).await {
            Ok(columns) => columns,
            Err(e) => {
                log::warn!(
                    "[taskboard.template.load] Template {} not applied: {}",
                    template_id,
                    e
                );
                return Err(e);
            }
        };
        log::info!(
            "[taskboard.template.load] Applying template {} ({} columns)",
            template_id,
            columns.len()
        );
        store.replace_all(columns);
        Ok(())
    }
}
