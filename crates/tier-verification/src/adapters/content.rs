//! Directory-backed content-addressed store for local deployments.
//!
//! Payloads are kept in one [`FileTier`] keyed by content identifier, and
//! the block number index in a second one keyed `block:{n}`. Both survive
//! restarts, so identifiers recorded in the key-value copies keep resolving.

use crate::adapters::file::FileTier;
use crate::domain::errors::TierError;
use crate::domain::tier::TierKind;
use crate::ports::outbound::{BlockWriteThrough, ContentIndex, PutOptions, StorageTier};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shared_types::{Block, WriteThroughOutcome};
use std::path::Path;
use tracing::debug;

/// Identifier minted for a payload: `bafkrei` followed by the hex SHA-256.
pub fn mint_content_id(bytes: &[u8]) -> String {
    format!("bafkrei{}", hex::encode(Sha256::digest(bytes)))
}

/// File-backed content store, write-through and index in one.
pub struct FileContentStore {
    objects: FileTier,
    index: FileTier,
}

impl FileContentStore {
    /// Payloads live under `objects_dir`, index entries under `index_dir`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(objects_dir: P, index_dir: Q) -> Self {
        Self {
            objects: FileTier::new(TierKind::Ipfs, objects_dir),
            index: FileTier::new(TierKind::Ipfs, index_dir),
        }
    }

    fn index_key(block_number: u64) -> String {
        format!("block:{}", block_number)
    }
}

#[async_trait]
impl StorageTier for FileContentStore {
    fn kind(&self) -> TierKind {
        TierKind::Ipfs
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        self.objects.get(key).await
    }

    async fn put(&self, _key: &str, _value: &[u8], _options: &PutOptions) -> Result<(), TierError> {
        Err(TierError::Unsupported {
            tier: TierKind::Ipfs,
            operation: "direct put",
        })
    }

    async fn probe(&self, key: &str) -> Result<bool, TierError> {
        self.objects.probe(key).await
    }
}

#[async_trait]
impl BlockWriteThrough for FileContentStore {
    async fn write_through(
        &self,
        block_number: u64,
        block: &Block,
    ) -> Result<WriteThroughOutcome, TierError> {
        let bytes = block
            .to_json()
            .map_err(|e| TierError::parse(TierKind::Ipfs, e.to_string()))?;
        let cid = mint_content_id(&bytes);

        // Payload first, so an index entry never points at nothing
        self.objects.put(&cid, &bytes, &PutOptions::default()).await?;
        self.index
            .put(
                &Self::index_key(block_number),
                cid.as_bytes(),
                &PutOptions::default(),
            )
            .await?;
        debug!(block_number, cid = %cid, "block pinned to local content store");

        Ok(WriteThroughOutcome {
            success: true,
            ipfs_hash: Some(cid),
            ipfs_gateway_url: None,
            error: None,
        })
    }
}

#[async_trait]
impl ContentIndex for FileContentStore {
    async fn content_id(&self, block_number: u64) -> Result<Option<String>, TierError> {
        match self.index.get(&Self::index_key(block_number)).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(|cid| Some(cid.trim().to_string()))
                .map_err(|e| TierError::parse(TierKind::Ipfs, e.to_string())),
            None => Ok(None),
        }
    }
}
