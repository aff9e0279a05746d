//! Infrastructure layer for configuration, logging, HTTP lookups and files
//!
//! Implements the domain's provider and repository traits and hosts the
//! ambient pieces (config, logging) the front end wires together.

pub mod config; // Layered configuration and defaults
pub mod export; // JSON and text exports
pub mod html_markers; // Lookup page classification
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod parsing_error;
pub mod swappa_provider;
pub mod template_repository;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, ConfigManager, LoadedConfig};
pub use export::ExportFormat;
pub use html_markers::MarkerClassifier;
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing_error::ParsingError;
pub use swappa_provider::SwappaProvider;
pub use template_repository::JsonTemplateRepository;
