//! Repository interfaces for template persistence

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::template::Template;

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Loads every template; a store that does not exist yet is empty
    async fn load_all(&self) -> Result<Vec<Template>>;

    /// Replaces the persisted list with `templates`
    async fn save_all(&self, templates: &[Template]) -> Result<()>;
}
