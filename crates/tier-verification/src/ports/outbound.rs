//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the verification service. The host application
//! supplies concrete tiers; tests use the in-memory adapters.

use crate::domain::errors::TierError;
use crate::domain::tier::TierKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{Block, ChainMetadata, WriteThroughOutcome};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Options attached to a tier write.
///
/// Key-value tiers ignore these; blob tiers store them as object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// MIME type of the payload.
    pub content_type: Option<String>,
    /// Custom metadata tags.
    pub custom_metadata: BTreeMap<String, String>,
}

impl PutOptions {
    /// Options with only a content type.
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            custom_metadata: BTreeMap::new(),
        }
    }

    /// Add a custom metadata tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_metadata.insert(key.into(), value.into());
        self
    }
}

/// Capability interface shared by every storage tier.
///
/// A tier is addressed by string keys; for the content-addressed tier the
/// key is the content identifier. Absence is `Ok(None)` / `Ok(false)`, never
/// an error.
#[async_trait]
pub trait StorageTier: Send + Sync {
    /// Which tier this is.
    fn kind(&self) -> TierKind;

    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TierError>;

    /// Write a value, replacing any previous one.
    async fn put(&self, key: &str, value: &[u8], options: &PutOptions) -> Result<(), TierError>;

    /// Existence check without fetching the body.
    async fn probe(&self, key: &str) -> Result<bool, TierError>;
}

/// The unified write-through path used at block creation.
///
/// At minimum it writes and pins the block in the content-addressed tier.
#[async_trait]
pub trait BlockWriteThrough: Send + Sync {
    /// Write a block through the creation path.
    async fn write_through(
        &self,
        block_number: u64,
        block: &Block,
    ) -> Result<WriteThroughOutcome, TierError>;
}

/// Chain metadata accessor.
#[async_trait]
pub trait ChainMetadataSource: Send + Sync {
    /// Current chain metadata.
    async fn chain_metadata(&self) -> Result<ChainMetadata, TierError>;
}

/// Block number to content identifier lookup maintained by the write path.
///
/// Consulted only when neither the key-value nor the blob copy records an
/// identifier, so a block surviving only in the content-addressed tier can
/// still be located.
#[async_trait]
pub trait ContentIndex: Send + Sync {
    /// Identifier last minted for a block, if known.
    async fn content_id(&self, block_number: u64) -> Result<Option<String>, TierError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Explicit bundle of the handles the service operates on.
#[derive(Clone)]
pub struct VerificationDependencies {
    /// Key-value tier.
    pub kv: Arc<dyn StorageTier>,
    /// Blob tier; `None` when the deployment has no blob store.
    pub blob: Option<Arc<dyn StorageTier>>,
    /// Content-addressed tier, keyed by content identifier.
    pub content: Arc<dyn StorageTier>,
    /// Unified write-through path.
    pub write_through: Arc<dyn BlockWriteThrough>,
    /// Fallback identifier lookup, when the deployment keeps one.
    pub content_index: Option<Arc<dyn ContentIndex>>,
    /// Chain metadata accessor.
    pub chain: Arc<dyn ChainMetadataSource>,
    /// Clock for repair timestamps.
    pub time: Arc<dyn TimeSource>,
}

impl VerificationDependencies {
    /// Tiers configured for this deployment, in priority order.
    pub fn configured_tiers(&self) -> Vec<TierKind> {
        TierKind::ALL
            .into_iter()
            .filter(|tier| *tier != TierKind::R2 || self.blob.is_some())
            .collect()
    }
}
