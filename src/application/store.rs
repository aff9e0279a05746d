//! Caller-owned template store
//!
//! Holds the template list keyed by row slot. Batch jobs never write here;
//! the owner applies the events a job emits. Persistence happens at the
//! boundary through a [`TemplateRepository`](crate::domain::TemplateRepository).

use thiserror::Error;
use tracing::debug;

use crate::domain::events::{SlotRef, ValidationEvent};
use crate::domain::template::{Template, ValidationStatus};
use crate::domain::value_objects::{IdentifierError, Imei, Tac};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidTac(#[from] IdentifierError),

    #[error("no template at slot {0}")]
    UnknownSlot(SlotRef),

    #[error("no template with model name '{0}'")]
    UnknownModel(String),

    #[error("count must be between 1 and {max}, got {count}")]
    InvalidCount { count: usize, max: usize },
}

/// In-memory list of templates, indexed by slot
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    #[must_use]
    pub const fn from_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    #[must_use]
    pub fn get(&self, slot: SlotRef) -> Option<&Template> {
        self.templates.get(slot)
    }

    /// Adds a template after trimming and validating the inputs
    pub fn add(&mut self, brand: &str, model_name: &str, tac: &str) -> Result<SlotRef, StoreError> {
        let brand = brand.trim();
        let model_name = model_name.trim();
        if model_name.is_empty() {
            return Err(StoreError::MissingField("model name"));
        }
        if brand.is_empty() {
            return Err(StoreError::MissingField("brand"));
        }
        let tac = Tac::parse(tac)?;

        self.templates.push(Template::new(brand, model_name, tac));
        Ok(self.templates.len() - 1)
    }

    /// First slot whose model name matches exactly
    #[must_use]
    pub fn find_by_model_name(&self, model_name: &str) -> Option<SlotRef> {
        self.templates
            .iter()
            .position(|t| t.model_name == model_name)
    }

    /// Stores a freshly generated IMEI on the row and marks it pending
    /// Stores the IMEI on the row. The status is left to validation.
    pub fn record_generated(&mut self, slot: SlotRef, imei: &Imei) -> Result<(), StoreError> {
        self.slot_mut(slot)?.generated_imei = imei.to_string();
        Ok(())
    }

    pub fn mark_pending(&mut self, slot: SlotRef) -> Result<(), StoreError> {
        self.slot_mut(slot)?.status = ValidationStatus::Pending;
        Ok(())
    }

    /// Applies a job event. Returns true when a template changed.
    pub fn apply(&mut self, event: &ValidationEvent) -> Result<bool, StoreError> {
        match event {
            ValidationEvent::SlotStatus {
                slot, imei, status, ..
            } => {
                let template = self.slot_mut(*slot)?;
                template.generated_imei = imei.to_string();
                template.status = *status;
                debug!("slot {} -> {} ({})", slot, status, imei);
                Ok(true)
            }
            ValidationEvent::Progress { .. } | ValidationEvent::Finished { .. } => Ok(false),
        }
    }

    fn slot_mut(&mut self, slot: SlotRef) -> Result<&mut Template, StoreError> {
        self.templates
            .get_mut(slot)
            .ok_or(StoreError::UnknownSlot(slot))
    }
}
