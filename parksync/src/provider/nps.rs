//! National Park Service developer API provider.

use super::http::HttpRequest;
use super::router::ServiceProvider;
use super::types::{DataKind, ProviderError, Service};

const BASE_URL: &str = "https://developer.nps.gov/api/v1";

/// Builds park detail and alert requests keyed by park code.
pub struct NpsProvider {
    api_key: Option<String>,
}

impl NpsProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl ServiceProvider for NpsProvider {
    fn service(&self) -> Service {
        Service::Nps
    }

    fn build_request(
        &self,
        entity_code: &str,
        kind: DataKind,
    ) -> Result<HttpRequest, ProviderError> {
        let endpoint = match kind {
            DataKind::Details => "parks",
            DataKind::Alerts => "alerts",
            other => {
                return Err(ProviderError::UnsupportedKind {
                    service: Service::Nps,
                    kind: other,
                })
            }
        };
        let key = self
            .api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey(Service::Nps))?;

        // NPS park codes are lowercase.
        HttpRequest::get(
            &format!("{}/{}", BASE_URL, endpoint),
            &[
                ("parkCode", entity_code.to_ascii_lowercase()),
                ("api_key", key),
            ],
        )
    }
}
