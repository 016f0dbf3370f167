//! Unsplash photo search provider.

use std::sync::Arc;

use super::http::HttpRequest;
use super::router::ServiceProvider;
use super::types::{DataKind, ProviderError, Service};
use crate::catalog::EntityCatalog;

const SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

/// Number of photos requested per search.
pub const PHOTOS_PER_PAGE: u32 = 10;

/// Builds landscape photo searches for an entity.
///
/// The search query is derived from the entity's catalog name; entities
/// missing from the catalog fall back to their code.
pub struct UnsplashProvider {
    access_key: Option<String>,
    catalog: Arc<EntityCatalog>,
}

impl UnsplashProvider {
    pub fn new(access_key: Option<String>, catalog: Arc<EntityCatalog>) -> Self {
        Self {
            access_key,
            catalog,
        }
    }

    fn query_for(&self, entity_code: &str) -> String {
        let name = self
            .catalog
            .get(entity_code)
            .map(|e| e.name.as_str())
            .unwrap_or(entity_code);
        format!("{} National Park landscape", name)
    }
}

impl ServiceProvider for UnsplashProvider {
    fn service(&self) -> Service {
        Service::Unsplash
    }

    fn build_request(
        &self,
        entity_code: &str,
        kind: DataKind,
    ) -> Result<HttpRequest, ProviderError> {
        if kind != DataKind::Images {
            return Err(ProviderError::UnsupportedKind {
                service: Service::Unsplash,
                kind,
            });
        }
        let key = self
            .access_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(Service::Unsplash))?;

        let request = HttpRequest::get(
            SEARCH_URL,
            &[
                ("query", self.query_for(entity_code)),
                ("per_page", PHOTOS_PER_PAGE.to_string()),
                ("orientation", "landscape".to_string()),
            ],
        )?;
        Ok(request.with_header("Authorization", format!("Client-ID {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Entity;

    fn catalog() -> Arc<EntityCatalog> {
        Arc::new(
            EntityCatalog::new(vec![Entity {
                code: "YELL".to_string(),
                name: "Yellowstone".to_string(),
                latitude: 44.6,
                longitude: -110.5,
            }])
            .unwrap(),
        )
    }

    #[test]
    fn test_builds_search_from_catalog_name() {
        let provider = UnsplashProvider::new(Some("key".to_string()), catalog());
        let request = provider.build_request("YELL", DataKind::Images).unwrap();

        assert!(request.url.starts_with(SEARCH_URL));
        assert!(request.url.contains("query=Yellowstone+National+Park+landscape"));
        assert!(request.url.contains("per_page=10"));
        assert_eq!(
            request.headers,
            vec![("Authorization".to_string(), "Client-ID key".to_string())]
        );
    }

    #[test]
    fn test_unknown_entity_falls_back_to_code() {
        let provider = UnsplashProvider::new(Some("key".to_string()), catalog());
        let request = provider.build_request("ZION", DataKind::Images).unwrap();
        assert!(request.url.contains("query=ZION+National+Park"));
    }

    #[test]
    fn test_requires_access_key() {
        let provider = UnsplashProvider::new(None, catalog());
        let err = provider.build_request("YELL", DataKind::Images).unwrap_err();
        assert_eq!(err, ProviderError::MissingApiKey(Service::Unsplash));
    }

    #[test]
    fn test_rejects_other_kinds() {
        let provider = UnsplashProvider::new(Some("key".to_string()), catalog());
        let err = provider.build_request("YELL", DataKind::Details).unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedKind { .. }));
    }
}
