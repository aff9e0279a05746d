//! Errors raised while preparing page inspection

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed { url: String, reason: String },
}

impl ParsingError {
    pub fn url_resolution(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::UrlResolutionFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
