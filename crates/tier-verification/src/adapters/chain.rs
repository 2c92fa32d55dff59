//! Chain metadata sources.

use crate::domain::errors::TierError;
use crate::ports::outbound::{ChainMetadataSource, StorageTier};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ChainMetadata;
use std::sync::Arc;

/// Key under which the ledger stores its metadata in the key-value tier.
pub const CHAIN_METADATA_KEY: &str = "chain:metadata";

/// Settable in-memory metadata.
#[derive(Default)]
pub struct StaticChainMetadata {
    metadata: RwLock<ChainMetadata>,
}

impl StaticChainMetadata {
    pub fn new(metadata: ChainMetadata) -> Self {
        Self {
            metadata: RwLock::new(metadata),
        }
    }

    /// An initialized chain whose highest block is `latest_block`.
    pub fn initialized(latest_block: u64) -> Self {
        Self::new(ChainMetadata {
            initialized: true,
            latest_block,
        })
    }

    pub fn set(&self, metadata: ChainMetadata) {
        *self.metadata.write() = metadata;
    }
}

#[async_trait]
impl ChainMetadataSource for StaticChainMetadata {
    async fn chain_metadata(&self) -> Result<ChainMetadata, TierError> {
        Ok(*self.metadata.read())
    }
}

/// Metadata read from the key-value tier.
///
/// A missing key means the chain has not been initialized.
pub struct KvChainMetadata {
    kv: Arc<dyn StorageTier>,
    key: String,
}

impl KvChainMetadata {
    pub fn new(kv: Arc<dyn StorageTier>) -> Self {
        Self {
            kv,
            key: CHAIN_METADATA_KEY.to_string(),
        }
    }
}

#[async_trait]
impl ChainMetadataSource for KvChainMetadata {
    async fn chain_metadata(&self) -> Result<ChainMetadata, TierError> {
        match self.kv.get(&self.key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| TierError::parse(self.kv.kind(), e.to_string())),
            None => Ok(ChainMetadata::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTier;
    use crate::domain::tier::TierKind;

    #[tokio::test]
    async fn test_kv_metadata_missing_means_uninitialized() {
        let kv = Arc::new(InMemoryTier::new(TierKind::Kv));
        let source = KvChainMetadata::new(kv);
        let metadata = source.chain_metadata().await.unwrap();
        assert!(!metadata.initialized);
    }

    #[tokio::test]
    async fn test_kv_metadata_reads_json() {
        let kv = Arc::new(InMemoryTier::new(TierKind::Kv));
        kv.insert(CHAIN_METADATA_KEY, br#"{"initialized":true,"latestBlock":12}"#.to_vec());
        let source = KvChainMetadata::new(kv);

        let metadata = source.chain_metadata().await.unwrap();
        assert!(metadata.initialized);
        assert_eq!(metadata.total_blocks(), Some(13));
    }

    #[tokio::test]
    async fn test_kv_metadata_rejects_garbage() {
        let kv = Arc::new(InMemoryTier::new(TierKind::Kv));
        kv.insert(CHAIN_METADATA_KEY, b"not json".to_vec());
        let source = KvChainMetadata::new(kv);
        assert!(matches!(
            source.chain_metadata().await,
            Err(TierError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_static_metadata_is_settable() {
        let source = StaticChainMetadata::initialized(2);
        assert_eq!(source.chain_metadata().await.unwrap().latest_block, 2);
        source.set(ChainMetadata::default());
        assert!(!source.chain_metadata().await.unwrap().initialized);
    }
}
