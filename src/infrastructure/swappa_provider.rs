//! Validation provider backed by the swappa.com IMEI lookup page
//!
//! One GET per identifier against `{base_url}/imei/info/{imei}`. Transport
//! failures become [`ValidationOutcome::transport_failure`]; any response
//! that arrives is classified by its HTML markers regardless of status code.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::domain::services::{ValidationOutcome, ValidationProvider};
use crate::domain::value_objects::Imei;
use crate::infrastructure::config::ProviderConfig;
use crate::infrastructure::html_markers::MarkerClassifier;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};
use crate::infrastructure::parsing_error::ParsingError;

const LOOKUP_PATH: &str = "imei/info/";

pub struct SwappaProvider {
    client: HttpClient,
    lookup_base: Url,
    classifier: MarkerClassifier,
}

impl SwappaProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = HttpClient::new(HttpClientConfig::from(config))?;
        let lookup_base = lookup_base(&config.base_url)?;
        let classifier = MarkerClassifier::new(&config.markers)
            .context("Failed to compile provider markers")?;

        Ok(Self {
            client,
            lookup_base,
            classifier,
        })
    }

    /// Lookup URL for one identifier
    pub fn lookup_url(&self, imei: &Imei) -> Result<Url, ParsingError> {
        self.lookup_base
            .join(imei.as_str())
            .map_err(|e| ParsingError::url_resolution(imei.as_str(), e))
    }
}

fn lookup_base(base_url: &str) -> Result<Url, ParsingError> {
    let mut base = Url::parse(base_url).map_err(|e| ParsingError::url_resolution(base_url, e))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(LOOKUP_PATH)
        .map_err(|e| ParsingError::url_resolution(base_url, e))
}

#[async_trait]
impl ValidationProvider for SwappaProvider {
    async fn check_identifier(&self, imei: &Imei) -> ValidationOutcome {
        let url = match self.lookup_url(imei) {
            Ok(url) => url,
            Err(e) => {
                warn!("⚠️ Cannot build lookup URL for {}: {}", imei, e);
                return ValidationOutcome::transport_failure();
            }
        };

        let page = match self.client.fetch_page(url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                warn!("⚠️ Network error while checking {}: {:#}", imei, e);
                return ValidationOutcome::transport_failure();
            }
        };

        debug!("Lookup for {} answered {}", imei, page.status);
        let outcome = self.classifier.classify(&page.body);
        if outcome == ValidationOutcome::ambiguous() {
            debug!("Lookup page for {} matched no marker (HTTP {})", imei, page.status);
        }
        outcome
    }

    fn name(&self) -> &str {
        "swappa"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> SwappaProvider {
        SwappaProvider::new(&ProviderConfig {
            base_url: base_url.to_string(),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn lookup_url_for_default_base() {
        let imei = Imei::parse("351912101234561").unwrap();
        assert_eq!(
            provider("https://swappa.com").lookup_url(&imei).unwrap().as_str(),
            "https://swappa.com/imei/info/351912101234561"
        );
    }

    #[test]
    fn lookup_url_keeps_base_path() {
        let imei = Imei::parse("351912101234561").unwrap();
        assert_eq!(
            provider("http://127.0.0.1:9000/mirror").lookup_url(&imei).unwrap().as_str(),
            "http://127.0.0.1:9000/mirror/imei/info/351912101234561"
        );
    }

    #[test]
    fn invalid_base_url_fails_construction() {
        let config = ProviderConfig {
            base_url: "::nope".to_string(),
            ..ProviderConfig::default()
        };
        assert!(SwappaProvider::new(&config).is_err());
    }
}
