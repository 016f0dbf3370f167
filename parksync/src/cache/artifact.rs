//! Typed artifact storage over the byte-level cache.
//!
//! An [`Artifact`] is the latest payload fetched for one
//! `(entity_code, data_kind)` pair. Artifacts are stored under the key
//! `ENTITY/kind` and encoded with bincode; a `put` always overwrites and
//! nothing here ever deletes.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::traits::{Cache, ServiceCacheError};
use crate::provider::{DataKind, Service};

/// The cached result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub entity_code: String,
    pub data_kind: DataKind,
    pub service: Service,
    pub fetched_at: DateTime<Utc>,
    pub payload: Bytes,
}

impl Artifact {
    /// Create an artifact stamped with the current time.
    pub fn new(entity_code: impl Into<String>, data_kind: DataKind, payload: Bytes) -> Self {
        Self {
            entity_code: entity_code.into(),
            data_kind,
            service: data_kind.service(),
            fetched_at: Utc::now(),
            payload,
        }
    }
}

/// Errors returned by [`ArtifactCache`].
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("No artifact cached for {entity_code}/{data_kind}")]
    NotFound {
        entity_code: String,
        data_kind: DataKind,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] ServiceCacheError),

    #[error("Corrupt artifact for {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Stores and retrieves artifacts keyed by `(entity_code, data_kind)`.
#[derive(Clone)]
pub struct ArtifactCache {
    backend: Arc<dyn Cache>,
}

impl ArtifactCache {
    pub fn new(backend: Arc<dyn Cache>) -> Self {
        Self { backend }
    }

    /// Cache key for a pair.
    pub fn key(entity_code: &str, data_kind: DataKind) -> String {
        format!("{}/{}", entity_code, data_kind)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Store an artifact, replacing any previous one for the same pair.
    pub async fn put(&self, artifact: &Artifact) -> Result<(), ServiceCacheError> {
        let key = Self::key(&artifact.entity_code, artifact.data_kind);
        let encoded = bincode::serialize(artifact)
            .map_err(|e| ServiceCacheError::Provider(format!("encode {}: {}", key, e)))?;

        self.backend.set(&key, encoded).await?;
        debug!(
            key = %key,
            bytes = artifact.payload.len(),
            backend = self.backend.name(),
            "Artifact stored"
        );
        Ok(())
    }

    /// Fetch the latest artifact for a pair.
    pub async fn get(
        &self,
        entity_code: &str,
        data_kind: DataKind,
    ) -> Result<Artifact, ArtifactError> {
        let key = Self::key(entity_code, data_kind);
        let data = self
            .backend
            .get(&key)
            .await?
            .ok_or_else(|| ArtifactError::NotFound {
                entity_code: entity_code.to_string(),
                data_kind,
            })?;

        bincode::deserialize(&data).map_err(|e| ArtifactError::Corrupt {
            key,
            reason: e.to_string(),
        })
    }

    /// Whether an artifact exists for a pair.
    pub async fn contains(
        &self,
        entity_code: &str,
        data_kind: DataKind,
    ) -> Result<bool, ServiceCacheError> {
        self.backend
            .contains(&Self::key(entity_code, data_kind))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheProvider;

    fn cache() -> ArtifactCache {
        ArtifactCache::new(Arc::new(MemoryCacheProvider::default()))
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = cache();
        let artifact = Artifact::new("YELL", DataKind::Details, Bytes::from_static(b"{}"));

        cache.put(&artifact).await.unwrap();

        let stored = cache.get("YELL", DataKind::Details).await.unwrap();
        assert_eq!(stored, artifact);
        assert_eq!(stored.service, Service::Nps);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let err = cache().get("YELL", DataKind::Images).await.unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::NotFound { ref entity_code, data_kind: DataKind::Images }
                if entity_code == "YELL"
        ));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = cache();
        cache
            .put(&Artifact::new("ZION", DataKind::Alerts, Bytes::from_static(b"v1")))
            .await
            .unwrap();
        cache
            .put(&Artifact::new("ZION", DataKind::Alerts, Bytes::from_static(b"v2")))
            .await
            .unwrap();

        let stored = cache.get("ZION", DataKind::Alerts).await.unwrap();
        assert_eq!(&stored.payload[..], b"v2");
    }

    #[tokio::test]
    async fn test_kinds_are_separate_keys() {
        let cache = cache();
        cache
            .put(&Artifact::new("ZION", DataKind::Satellite, Bytes::from_static(b"img")))
            .await
            .unwrap();

        assert!(cache.contains("ZION", DataKind::Satellite).await.unwrap());
        assert!(!cache.contains("ZION", DataKind::Terrain).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_entry() {
        let backend = Arc::new(MemoryCacheProvider::default());
        backend.set("ZION/images", vec![0xff]).await.unwrap();
        let cache = ArtifactCache::new(backend);

        let err = cache.get("ZION", DataKind::Images).await.unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }));
    }

    #[test]
    fn test_key_format() {
        assert_eq!(ArtifactCache::key("YELL", DataKind::Terrain), "YELL/terrain");
    }
}
