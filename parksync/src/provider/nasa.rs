//! NASA Earth imagery provider.
//!
//! Requests are located by the entity's catalog coordinates, so only
//! catalogued entities can be fetched.

use std::sync::Arc;

use super::http::HttpRequest;
use super::router::ServiceProvider;
use super::types::{DataKind, ProviderError, Service};
use crate::catalog::EntityCatalog;

const BASE_URL: &str = "https://api.nasa.gov/planetary/earth";

/// Width and height of the requested scene, in degrees.
pub const SCENE_DIM_DEGREES: f64 = 0.3;

pub struct NasaProvider {
    api_key: Option<String>,
    catalog: Arc<EntityCatalog>,
}

impl NasaProvider {
    pub fn new(api_key: Option<String>, catalog: Arc<EntityCatalog>) -> Self {
        Self { api_key, catalog }
    }
}

impl ServiceProvider for NasaProvider {
    fn service(&self) -> Service {
        Service::Nasa
    }

    fn build_request(
        &self,
        entity_code: &str,
        kind: DataKind,
    ) -> Result<HttpRequest, ProviderError> {
        let endpoint = match kind {
            DataKind::Satellite => "imagery",
            DataKind::Terrain => "assets",
            other => {
                return Err(ProviderError::UnsupportedKind {
                    service: Service::Nasa,
                    kind: other,
                })
            }
        };
        let key = self
            .api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey(Service::Nasa))?;
        let entity = self
            .catalog
            .get(entity_code)
            .ok_or_else(|| ProviderError::UnknownEntity(entity_code.to_string()))?;

        HttpRequest::get(
            &format!("{}/{}", BASE_URL, endpoint),
            &[
                ("lat", entity.latitude.to_string()),
                ("lon", entity.longitude.to_string()),
                ("dim", SCENE_DIM_DEGREES.to_string()),
                ("api_key", key),
            ],
        )
    }
}
