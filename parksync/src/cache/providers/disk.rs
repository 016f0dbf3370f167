//! On-disk cache provider.
//!
//! Each key maps to one file under the cache root; `/`-separated key
//! segments become directories, so `YELL/images` is stored at
//! `<root>/YELL/images.bin`. Parent directories are created on every write
//! (idempotent), so callers never pre-create a namespace.
//!
//! Writes go to a uniquely named temporary file in the target directory and
//! are then renamed over the destination. Readers therefore see either the
//! previous or the new value, and concurrent writers to one key resolve to
//! whichever rename lands last.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;
use tracing::trace;

use crate::cache::traits::{BoxFuture, Cache, ServiceCacheError};

const FILE_EXTENSION: &str = "bin";

/// On-disk cache provider rooted at a directory.
pub struct DiskCacheProvider {
    root: PathBuf,
    write_seq: AtomicU64,
}

impl DiskCacheProvider {
    /// Create a provider rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its file path, rejecting keys that would escape the root.
    fn path_for(&self, key: &str) -> Result<PathBuf, ServiceCacheError> {
        let relative = Path::new(key);
        let well_formed = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(ServiceCacheError::InvalidKey(key.to_string()));
        }
        Ok(self
            .root
            .join(relative)
            .with_extension(FILE_EXTENSION))
    }

    fn temp_path_for(&self, path: &Path) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.{}.tmp", std::process::id(), seq));
        path.with_file_name(name)
    }
}

impl Cache for DiskCacheProvider {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            let path = path?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }

            let temp = self.temp_path_for(&path);
            if let Err(e) = fs::write(&temp, &value).await {
                let _ = fs::remove_file(&temp).await;
                return Err(e.into());
            }
            if let Err(e) = fs::rename(&temp, &path).await {
                let _ = fs::remove_file(&temp).await;
                return Err(e.into());
            }

            trace!(path = %path.display(), bytes = value.len(), "Disk cache write");
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match fs::read(path?).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>> {
        let path = self.path_for(key);
        Box::pin(async move { Ok(fs::try_exists(path?).await?) })
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disk_provider_creates_namespace_on_write() {
        let dir = TempDir::new().unwrap();
        let provider = DiskCacheProvider::new(dir.path().join("artifacts"));

        provider.set("YELL/images", vec![1, 2, 3]).await.unwrap();

        assert!(dir.path().join("artifacts/YELL/images.bin").is_file());
        assert_eq!(
            provider.get("YELL/images").await.unwrap(),
            Some(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn test_disk_provider_overwrites() {
        let dir = TempDir::new().unwrap();
        let provider = DiskCacheProvider::new(dir.path());

        provider.set("ZION/details", b"old".to_vec()).await.unwrap();
        provider.set("ZION/details", b"new".to_vec()).await.unwrap();

        assert_eq!(
            provider.get("ZION/details").await.unwrap(),
            Some(b"new".to_vec())
        );
        // No temp files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("ZION"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_disk_provider_missing_key() {
        let dir = TempDir::new().unwrap();
        let provider = DiskCacheProvider::new(dir.path());

        assert_eq!(provider.get("NONE/images").await.unwrap(), None);
        assert!(!provider.contains("NONE/images").await.unwrap());
    }

    #[tokio::test]
    async fn test_disk_provider_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let provider = DiskCacheProvider::new(dir.path());

        for key in ["../escape", "/abs/path", "", "a/../b"] {
            let err = provider.set(key, vec![0]).await.unwrap_err();
            assert!(matches!(err, ServiceCacheError::InvalidKey(_)), "{key}");
        }
    }

    #[tokio::test]
    async fn test_disk_provider_concurrent_disjoint_writes() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(DiskCacheProvider::new(dir.path()));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move {
                    provider
                        .set(&format!("P{}/images", i % 4), vec![i as u8])
                        .await
                        .unwrap();
                    provider
                        .set(&format!("Q{}/details", i), vec![i as u8])
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        for i in 0..16u8 {
            assert_eq!(
                provider.get(&format!("Q{}/details", i)).await.unwrap(),
                Some(vec![i])
            );
        }
        for i in 0..4 {
            let value = provider.get(&format!("P{}/images", i)).await.unwrap();
            assert_eq!(value.map(|v| v.len()), Some(1));
        }
    }
}
