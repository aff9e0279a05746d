//! Application use cases for IMEI generation and validation
//!
//! Owns the template store and keeps it in sync with the repository. Every
//! mutation is persisted right away; validation jobs run on their own task
//! and their events are folded back into the store here.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::batch_validator::{
    BatchJobHandle, BatchReport, BatchValidator, ValidationRequest,
};
use crate::application::store::{StoreError, TemplateStore};
use crate::domain::events::{SlotRef, ValidationEvent};
use crate::domain::generator::ImeiGenerator;
use crate::domain::repositories::TemplateRepository;
use crate::domain::template::Template;
use crate::domain::value_objects::Imei;
use crate::infrastructure::export;

/// IMEIs generated for one template row, ready to be validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub slot: SlotRef,
    pub imeis: Vec<Imei>,
}

impl GenerationPlan {
    #[must_use]
    pub fn requests(&self) -> Vec<ValidationRequest> {
        self.imeis
            .iter()
            .map(|imei| ValidationRequest::new(self.slot, imei.clone()))
            .collect()
    }
}

pub struct ImeiUseCases {
    store: TemplateStore,
    repository: Arc<dyn TemplateRepository>,
    validator: BatchValidator,
    generator: ImeiGenerator,
    max_batch_size: usize,
}

impl ImeiUseCases {
    /// Loads the persisted templates and wires the collaborators
    pub async fn load(
        repository: Arc<dyn TemplateRepository>,
        validator: BatchValidator,
        max_batch_size: usize,
    ) -> Result<Self> {
        let templates = repository
            .load_all()
            .await
            .context("Failed to load templates")?;
        info!("📋 Loaded {} template(s)", templates.len());

        Ok(Self {
            store: TemplateStore::from_templates(templates),
            repository,
            validator,
            generator: ImeiGenerator::new(),
            max_batch_size,
        })
    }

    #[must_use]
    pub fn with_generator(mut self, generator: ImeiGenerator) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &TemplateStore {
        &self.store
    }

    #[must_use]
    pub fn templates(&self) -> &[Template] {
        self.store.templates()
    }

    /// Adds a template and persists the list
    pub async fn add_template(&mut self, brand: &str, model_name: &str, tac: &str) -> Result<SlotRef> {
        let slot = self.store.add(brand, model_name, tac)?;
        self.persist().await?;
        info!("➕ Added template '{}' at slot {}", model_name.trim(), slot);
        Ok(slot)
    }

    /// Generates one IMEI for the row and stores it
    pub async fn generate_for_slot(&mut self, slot: SlotRef) -> Result<GenerationPlan> {
        let template = self.store.get(slot).ok_or(StoreError::UnknownSlot(slot))?;
        let imei = self.generator.generate(&template.tac);
        self.store.record_generated(slot, &imei)?;
        self.persist().await?;

        Ok(GenerationPlan {
            slot,
            imeis: vec![imei],
        })
    }

    /// Generates `count` IMEIs for the first row named `model_name`.
    ///
    /// The row stores the last one generated. Every IMEI targets the same
    /// row, so once validated the row shows the last one checked.
    pub async fn generate_for_model(&mut self, model_name: &str, count: usize) -> Result<GenerationPlan> {
        if count == 0 || count > self.max_batch_size {
            return Err(StoreError::InvalidCount {
                count,
                max: self.max_batch_size,
            }
            .into());
        }
        let slot = self
            .store
            .find_by_model_name(model_name)
            .ok_or_else(|| StoreError::UnknownModel(model_name.to_string()))?;
        let tac = self
            .store
            .get(slot)
            .map(|t| t.tac.clone())
            .ok_or(StoreError::UnknownSlot(slot))?;

        let imeis = self.generator.generate_many(&tac, count);
        if let Some(last) = imeis.last() {
            self.store.record_generated(slot, last)?;
        }
        self.persist().await?;
        info!("🎲 Generated {} IMEI(s) for '{}' (slot {})", count, model_name, slot);

        Ok(GenerationPlan { slot, imeis })
    }

    /// Marks the plan's row pending, persists it and starts validating on a
    /// background task
    pub async fn start_validation(&mut self, plan: &GenerationPlan) -> Result<BatchJobHandle> {
        self.store.mark_pending(plan.slot)?;
        self.persist().await?;
        Ok(self.validator.spawn(plan.requests()))
    }

    /// Applies the job's events to the store until it finishes.
    ///
    /// The list is persisted after every status event. `observer` sees each
    /// event after it was applied.
    pub async fn drive<F>(&mut self, mut handle: BatchJobHandle, mut observer: F) -> Result<BatchReport>
    where
        F: FnMut(&ValidationEvent, &TemplateStore),
    {
        while let Some(event) = handle.next_event().await {
            match self.store.apply(&event) {
                Ok(true) => {
                    if let Err(e) = self.persist().await {
                        warn!("⚠️ Failed to persist status update: {:#}", e);
                    }
                }
                Ok(false) => {}
                Err(e) => warn!("⚠️ Ignoring event for job {}: {}", event.job_id(), e),
            }
            observer(&event, &self.store);
        }

        let report = handle.join().await?;
        self.persist().await?;
        Ok(report)
    }

    pub async fn export_json(&self, path: &Path) -> Result<()> {
        export::export_json(self.store.templates(), path).await
    }

    pub async fn export_text(&self, path: &Path) -> Result<()> {
        export::export_text(self.store.templates(), path).await
    }

    async fn persist(&self) -> Result<()> {
        self.repository
            .save_all(self.store.templates())
            .await
            .context("Failed to persist templates")
    }
}
