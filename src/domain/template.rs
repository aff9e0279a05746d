//! Template entity: a device model with its TAC and the latest generation result.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value_objects::Tac;

/// Per-template status of the latest generated IMEI
///
/// Serialized as its label. The aliases accept the labels written by the
/// 1.x desktop releases so old `models_data.json` files keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValidationStatus {
    #[default]
    #[serde(alias = "Not generated")]
    NotGenerated,
    Pending,
    #[serde(alias = "✅ Validé")]
    Valid,
    #[serde(alias = "❌ Invalide")]
    Invalid,
    #[serde(alias = "⚠️ Erreur inconnue")]
    UnknownError,
    #[serde(alias = "⚠️ Erreur réseau")]
    NetworkError,
}

impl ValidationStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotGenerated => "NotGenerated",
            Self::Pending => "Pending",
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::UnknownError => "UnknownError",
            Self::NetworkError => "NetworkError",
        }
    }

    /// True once the provider has answered (or failed to answer) for the IMEI
    #[must_use]
    pub const fn is_final(self) -> bool {
        !matches!(self, Self::NotGenerated | Self::Pending)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A device model the user generates IMEIs for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub brand: String,
    pub model_name: String,
    pub tac: Tac,
    /// Last generated IMEI, empty until the first generation
    #[serde(default)]
    pub generated_imei: String,
    #[serde(default)]
    pub status: ValidationStatus,
}

impl Template {
    #[must_use]
    pub fn new(brand: impl Into<String>, model_name: impl Into<String>, tac: Tac) -> Self {
        Self {
            brand: brand.into(),
            model_name: model_name.into(),
            tac,
            generated_imei: String::new(),
            status: ValidationStatus::NotGenerated,
        }
    }

    /// Flat export line: `brand - model_name - tac - generated_imei`
    #[must_use]
    pub fn text_line(&self) -> String {
        format!(
            "{} - {} - {} - {}",
            self.brand, self.model_name, self.tac, self.generated_imei
        )
    }
}
