//! Directory-backed storage tier for local deployments.
//!
//! One file per key. Keys are hex-encoded into file names so that keys such
//! as `blocks/block-3.json` never create nested directories. Put options are
//! kept in a `.meta.json` sidecar. Writes go to a temp file and are renamed
//! into place.

use crate::domain::errors::TierError;
use crate::domain::tier::TierKind;
use crate::ports::outbound::{PutOptions, StorageTier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sidecar metadata persisted next to an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub custom_metadata: BTreeMap<String, String>,
}

impl From<&PutOptions> for ObjectMetadata {
    fn from(options: &PutOptions) -> Self {
        Self {
            content_type: options.content_type.clone(),
            custom_metadata: options.custom_metadata.clone(),
        }
    }
}

/// File-backed storage tier.
pub struct FileTier {
    kind: TierKind,
    root: PathBuf,
}

impl FileTier {
    /// Create a tier rooted at `root`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(kind: TierKind, root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        info!(tier = kind.as_str(), root = %root.display(), "file tier opened");
        Self { kind, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.blob", hex::encode(key.as_bytes())))
    }

    fn metadata_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.meta.json", hex::encode(key.as_bytes())))
    }

    fn io_error(&self, e: std::io::Error) -> TierError {
        TierError::backend(self.kind, e.to_string())
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), TierError> {
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, bytes)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| self.io_error(e))
    }

    /// Sidecar metadata for a stored object, if any was written.
    pub async fn metadata(&self, key: &str) -> Result<Option<ObjectMetadata>, TierError> {
        match tokio::fs::read(self.metadata_path(key)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| TierError::parse(self.kind, e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[async_trait]
impl StorageTier for FileTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        match tokio::fs::read(self.object_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn put(&self, key: &str, value: &[u8], options: &PutOptions) -> Result<(), TierError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| self.io_error(e))?;

        if options.content_type.is_some() || !options.custom_metadata.is_empty() {
            let metadata = serde_json::to_vec(&ObjectMetadata::from(options))
                .map_err(|e| TierError::parse(self.kind, e.to_string()))?;
            self.write_atomic(&self.metadata_path(key), &metadata)
                .await?;
        } else {
            // Metadata describes one write; a bare overwrite drops it.
            match tokio::fs::remove_file(self.metadata_path(key)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(self.io_error(e)),
            }
        }

        self.write_atomic(&self.object_path(key), value).await
    }

    async fn probe(&self, key: &str) -> Result<bool, TierError> {
        tokio::fs::try_exists(self.object_path(key))
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_tier_put_get_probe() {
        let dir = tempdir().unwrap();
        let tier = FileTier::new(TierKind::Kv, dir.path().join("kv"));

        assert_eq!(tier.get("block:0").await.unwrap(), None);
        assert!(!tier.probe("block:0").await.unwrap());

        tier.put("block:0", b"{\"hash\":\"a\"}", &PutOptions::default())
            .await
            .unwrap();
        assert!(tier.probe("block:0").await.unwrap());
        assert_eq!(
            tier.get("block:0").await.unwrap(),
            Some(b"{\"hash\":\"a\"}".to_vec())
        );
        assert_eq!(tier.metadata("block:0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_tier_nested_keys_and_metadata() {
        let dir = tempdir().unwrap();
        let tier = FileTier::new(TierKind::R2, dir.path());
        let options = PutOptions::with_content_type("application/json")
            .tag("blockNumber", "5")
            .tag("hash", "h5");

        tier.put("blocks/block-5.json", b"{}", &options).await.unwrap();
        assert!(tier.probe("blocks/block-5.json").await.unwrap());

        let metadata = tier.metadata("blocks/block-5.json").await.unwrap().unwrap();
        assert_eq!(metadata.content_type.as_deref(), Some("application/json"));
        assert_eq!(metadata.custom_metadata["blockNumber"], "5");
    }

    #[tokio::test]
    async fn test_file_tier_bare_overwrite_drops_metadata() {
        let dir = tempdir().unwrap();
        let tier = FileTier::new(TierKind::R2, dir.path());
        let options = PutOptions::with_content_type("application/json").tag("hash", "old");

        tier.put("blocks/block-1.json", b"{}", &options).await.unwrap();
        assert!(tier.metadata("blocks/block-1.json").await.unwrap().is_some());

        tier.put("blocks/block-1.json", b"{\"hash\":\"new\"}", &PutOptions::default())
            .await
            .unwrap();
        assert_eq!(tier.metadata("blocks/block-1.json").await.unwrap(), None);
        assert!(tier.probe("blocks/block-1.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_tier_overwrite_is_idempotent() {
        let dir = tempdir().unwrap();
        let tier = FileTier::new(TierKind::Kv, dir.path());

        tier.put("k", b"one", &PutOptions::default()).await.unwrap();
        tier.put("k", b"two", &PutOptions::default()).await.unwrap();
        tier.put("k", b"two", &PutOptions::default()).await.unwrap();
        assert_eq!(tier.get("k").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_file_tier_persists_across_instances() {
        let dir = tempdir().unwrap();
        FileTier::new(TierKind::Kv, dir.path())
            .put("block:7", b"seven", &PutOptions::default())
            .await
            .unwrap();

        let reopened = FileTier::new(TierKind::Kv, dir.path());
        assert_eq!(reopened.get("block:7").await.unwrap(), Some(b"seven".to_vec()));
    }
}
