//! Classifies a lookup page by its alert markers
//!
//! The invalid marker is checked first, then the success marker. Only the
//! first element matching each selector is inspected.
//!
//! Markers are CSS compound selectors, so a `div` carrying extra classes
//! besides the configured ones still matches. An exact `class` attribute
//! match would need an attribute selector such as
//! `div[class="alert alert-success text-center"]`.

use scraper::{Html, Selector};
use tracing::debug;

use crate::domain::services::ValidationOutcome;
use crate::infrastructure::config::MarkerConfig;
use crate::infrastructure::parsing_error::ParsingError;

#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    invalid_selector: Selector,
    invalid_phrase: String,
    valid_selector: Selector,
    valid_phrase: String,
}

impl MarkerClassifier {
    pub fn new(config: &MarkerConfig) -> Result<Self, ParsingError> {
        Ok(Self {
            invalid_selector: Self::compile_selector(&config.invalid_selector)?,
            invalid_phrase: config.invalid_phrase.clone(),
            valid_selector: Self::compile_selector(&config.valid_selector)?,
            valid_phrase: config.valid_phrase.clone(),
        })
    }

    fn compile_selector(selector: &str) -> Result<Selector, ParsingError> {
        Selector::parse(selector).map_err(|e| ParsingError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })
    }

    /// Outcome for a received page. Never reports a transport failure.
    #[must_use]
    pub fn classify(&self, body: &str) -> ValidationOutcome {
        let document = Html::parse_document(body);

        if first_text(&document, &self.invalid_selector)
            .is_some_and(|text| text.contains(&self.invalid_phrase))
        {
            return ValidationOutcome::Invalid;
        }

        if first_text(&document, &self.valid_selector)
            .is_some_and(|text| text.contains(&self.valid_phrase))
        {
            return ValidationOutcome::Valid;
        }

        debug!("No marker matched ({} bytes)", body.len());
        ValidationOutcome::ambiguous()
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const INVALID_PAGE: &str = r#"<html><body>
        <div class="alert alert-error alert-dismissible fade show alert-danger">
            Invalid IMEI or TAC number <button>x</button>
        </div></body></html>"#;

    const VALID_PAGE: &str = r#"<html><body>
        <div class="alert alert-success text-center"><strong>Allowed.</strong> This device is clean.</div>
        </body></html>"#;

    fn classifier() -> MarkerClassifier {
        MarkerClassifier::new(&MarkerConfig::default()).unwrap()
    }

    #[rstest]
    #[case::invalid(INVALID_PAGE, ValidationOutcome::Invalid)]
    #[case::valid(VALID_PAGE, ValidationOutcome::Valid)]
    #[case::empty("", ValidationOutcome::ambiguous())]
    #[case::unrelated("<p>Service unavailable</p>", ValidationOutcome::ambiguous())]
    #[case::marker_without_phrase(
        r#"<div class="alert alert-success text-center">Blocked.</div>"#,
        ValidationOutcome::ambiguous()
    )]
    fn classifies_pages(#[case] body: &str, #[case] expected: ValidationOutcome) {
        assert_eq!(classifier().classify(body), expected);
    }

    #[test]
    fn invalid_marker_wins_over_success_marker() {
        let body = format!("{INVALID_PAGE}{VALID_PAGE}");
        assert_eq!(classifier().classify(&body), ValidationOutcome::Invalid);
    }

    #[test]
    fn only_first_matching_element_counts() {
        let body = r#"
            <div class="alert alert-success text-center">Checking...</div>
            <div class="alert alert-success text-center">Allowed.</div>"#;
        assert_eq!(classifier().classify(body), ValidationOutcome::ambiguous());
    }

    #[test]
    fn extra_classes_still_match() {
        let body = r#"<div class="alert alert-success text-center mt-3">Allowed.</div>"#;
        assert_eq!(classifier().classify(body), ValidationOutcome::Valid);

        let exact = MarkerClassifier::new(&MarkerConfig {
            valid_selector: r#"div[class="alert alert-success text-center"]"#.to_string(),
            ..MarkerConfig::default()
        })
        .unwrap();
        assert_eq!(exact.classify(body), ValidationOutcome::ambiguous());
        assert_eq!(exact.classify(VALID_PAGE), ValidationOutcome::Valid);
    }

    #[test]
    fn bad_selector_fails_construction() {
        let config = MarkerConfig {
            valid_selector: "div[".to_string(),
            ..MarkerConfig::default()
        };
        assert!(matches!(
            MarkerClassifier::new(&config),
            Err(ParsingError::InvalidSelector { .. })
        ));
    }
}
