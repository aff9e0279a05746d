//! Domain module - Core business logic and entities
//!
//! This module contains the identifier value objects, the check digit
//! engine, the generator, the template entity and the service/repository
//! interfaces the outer layers implement.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod checksum;
pub mod events;
pub mod generator;
pub mod repositories;
pub mod services;
pub mod template;
pub mod value_objects;

// Re-export commonly used items for convenience
pub use checksum::compute_check_digit;
pub use events::{JobState, SlotRef, ValidationEvent};
pub use generator::ImeiGenerator;
pub use repositories::TemplateRepository;
pub use services::{ValidationOutcome, ValidationProvider};
pub use template::{Template, ValidationStatus};
pub use value_objects::{IdentifierError, Imei, Tac};
