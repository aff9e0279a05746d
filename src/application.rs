//! Application layer module
//!
//! Orchestrates the domain: the caller-owned template store, the sequential
//! batch validator and the use cases the command layer calls into.

pub mod batch_validator;
pub mod progress;
pub mod store;
pub mod use_cases;

pub use batch_validator::{
    BatchError, BatchJob, BatchJobHandle, BatchReport, BatchValidator, ValidationRequest,
    ValidationSummary,
};
pub use progress::{CompactProgress, ProgressReducer};
pub use store::{StoreError, TemplateStore};
pub use use_cases::{GenerationPlan, ImeiUseCases};
