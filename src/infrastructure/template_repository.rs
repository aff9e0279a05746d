//! JSON file repository for templates
//!
//! The whole list is one pretty-printed JSON array (4-space indent) and is
//! rewritten on every save. A missing file reads as an empty list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::domain::repositories::TemplateRepository;
use crate::domain::template::Template;

/// Serializes `value` as JSON indented with four spaces
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize templates")?;
    Ok(buffer)
}

#[derive(Debug, Clone)]
pub struct JsonTemplateRepository {
    path: PathBuf,
}

impl JsonTemplateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TemplateRepository for JsonTemplateRepository {
    async fn load_all(&self) -> Result<Vec<Template>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No template file at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };

        let templates: Vec<Template> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid template file {:?}", self.path))?;
        debug!("Read {} template(s) from {:?}", templates.len(), self.path);
        Ok(templates)
    }

    async fn save_all(&self, templates: &[Template]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let content = to_pretty_json(templates)?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        debug!("Wrote {} template(s) to {:?}", templates.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Tac;

    #[test]
    fn pretty_json_uses_four_spaces() {
        let template = Template::new("Samsung", "Galaxy S10", Tac::parse("35191210").unwrap());
        let json = String::from_utf8(to_pretty_json(&[template]).unwrap()).unwrap();
        assert!(json.starts_with("[\n    {\n        \"brand\": \"Samsung\""));
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = JsonTemplateRepository::new(dir.path().join("a").join("b").join("models.json"));
        repo.save_all(&[]).await.unwrap();
        assert_eq!(repo.load_all().await.unwrap(), Vec::new());
    }
}
