//! Domain services - external collaborators the core depends on
//!
//! The validation provider answers "is this IMEI accepted?" for one
//! identifier at a time. Implementations absorb every transport problem and
//! turn it into an outcome; nothing crosses this boundary as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::template::ValidationStatus;
use super::value_objects::Imei;

/// Answer of a validation provider for one IMEI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Valid,
    Invalid,
    /// No usable verdict. `transport_failure` tells a network problem apart
    /// from a response that matched neither marker.
    Indeterminate { transport_failure: bool },
}

impl ValidationOutcome {
    #[must_use]
    pub const fn ambiguous() -> Self {
        Self::Indeterminate {
            transport_failure: false,
        }
    }

    #[must_use]
    pub const fn transport_failure() -> Self {
        Self::Indeterminate {
            transport_failure: true,
        }
    }

    /// Status recorded on the template for this outcome
    #[must_use]
    pub const fn to_status(self) -> ValidationStatus {
        match self {
            Self::Valid => ValidationStatus::Valid,
            Self::Invalid => ValidationStatus::Invalid,
            Self::Indeterminate {
                transport_failure: false,
            } => ValidationStatus::UnknownError,
            Self::Indeterminate {
                transport_failure: true,
            } => ValidationStatus::NetworkError,
        }
    }
}

impl From<ValidationOutcome> for ValidationStatus {
    fn from(outcome: ValidationOutcome) -> Self {
        outcome.to_status()
    }
}

/// Online IMEI lookup
#[async_trait]
pub trait ValidationProvider: Send + Sync {
    /// Exactly one outcome per call, no retries
    async fn check_identifier(&self, imei: &Imei) -> ValidationOutcome;

    /// Short name for logs
    fn name(&self) -> &str {
        "provider"
    }
}
