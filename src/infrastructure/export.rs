//! Template exports: a JSON dump and a flat text list

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::domain::template::Template;
use crate::infrastructure::template_repository::to_pretty_json;

/// Export format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Text,
}

/// Same layout as the persisted template file
pub async fn export_json(templates: &[Template], path: &Path) -> Result<()> {
    let content = to_pretty_json(templates)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write JSON export {:?}", path))?;
    info!("📤 Exported {} template(s) as JSON to {:?}", templates.len(), path);
    Ok(())
}

/// One `brand - model_name - tac - generated_imei` line per template
pub async fn export_text(templates: &[Template], path: &Path) -> Result<()> {
    fs::write(path, render_text(templates))
        .await
        .with_context(|| format!("Failed to write text export {:?}", path))?;
    info!("📤 Exported {} template(s) as text to {:?}", templates.len(), path);
    Ok(())
}

pub async fn export(format: ExportFormat, templates: &[Template], path: &Path) -> Result<()> {
    match format {
        ExportFormat::Json => export_json(templates, path).await,
        ExportFormat::Text => export_text(templates, path).await,
    }
}

#[must_use]
pub fn render_text(templates: &[Template]) -> String {
    templates
        .iter()
        .map(|t| format!("{}\n", t.text_line()))
        .collect()
}
