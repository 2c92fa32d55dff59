//! In-memory tiers for unit and integration tests.

use crate::adapters::content::mint_content_id;
use crate::domain::errors::TierError;
use crate::domain::tier::TierKind;
use crate::ports::outbound::{BlockWriteThrough, ContentIndex, PutOptions, StorageTier};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Block, WriteThroughOutcome};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// An object stored in an [`InMemoryTier`], with the options it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub options: PutOptions,
}

/// Access counters shared by the in-memory adapters.
#[derive(Debug, Default)]
struct AccessCounters {
    reads: AtomicU64,
    writes: AtomicU64,
    probes: AtomicU64,
}

impl AccessCounters {
    fn total(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
            + self.writes.load(Ordering::Relaxed)
            + self.probes.load(Ordering::Relaxed)
    }
}

/// HashMap-backed storage tier.
///
/// Seeding helpers (`insert`, `remove`, `object`) bypass the access
/// counters so tests can assert on exactly what the engine touched.
pub struct InMemoryTier {
    kind: TierKind,
    data: RwLock<HashMap<String, StoredObject>>,
    counters: AccessCounters,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryTier {
    pub fn new(kind: TierKind) -> Self {
        Self {
            kind,
            data: RwLock::new(HashMap::new()),
            counters: AccessCounters::default(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seed a value without counting it as an engine write.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.data.write().insert(
            key.into(),
            StoredObject {
                bytes: bytes.into(),
                options: PutOptions::default(),
            },
        );
    }

    /// Drop a value, simulating external loss.
    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.data.write().remove(key).map(|o| o.bytes)
    }

    /// Inspect a stored object.
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.data.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Make every `get` and `probe` fail with a backend error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every `put` fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn reads(&self) -> u64 {
        self.counters.reads.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.counters.writes.load(Ordering::Relaxed)
    }

    pub fn probes(&self) -> u64 {
        self.counters.probes.load(Ordering::Relaxed)
    }

    /// Reads, writes and probes combined.
    pub fn accesses(&self) -> u64 {
        self.counters.total()
    }
}

#[async_trait]
impl StorageTier for InMemoryTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        self.counters.reads.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(TierError::backend(self.kind, "injected read failure"));
        }
        Ok(self.data.read().get(key).map(|o| o.bytes.clone()))
    }

    async fn put(&self, key: &str, value: &[u8], options: &PutOptions) -> Result<(), TierError> {
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(TierError::backend(self.kind, "injected write failure"));
        }
        self.data.write().insert(
            key.to_string(),
            StoredObject {
                bytes: value.to_vec(),
                options: options.clone(),
            },
        );
        Ok(())
    }

    async fn probe(&self, key: &str) -> Result<bool, TierError> {
        self.counters.probes.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(TierError::backend(self.kind, "injected probe failure"));
        }
        Ok(self.data.read().contains_key(key))
    }
}

/// Content-addressed store keyed by identifier.
///
/// Direct `put` is unsupported; content only enters through
/// [`BlockWriteThrough::write_through`], which mints a `bafkrei…` identifier
/// from the SHA-256 of the compact block JSON and records it in the
/// block number index.
pub struct InMemoryContentStore {
    data: RwLock<HashMap<String, Vec<u8>>>,
    index: RwLock<HashMap<u64, String>>,
    gateway_base: String,
    counters: AccessCounters,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new("https://gateway.local")
    }
}

impl InMemoryContentStore {
    pub fn new(gateway_base: impl Into<String>) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            index: RwLock::new(HashMap::new()),
            gateway_base: gateway_base.into().trim_end_matches('/').to_string(),
            counters: AccessCounters::default(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Identifier for a payload.
    pub fn content_id_for(bytes: &[u8]) -> String {
        mint_content_id(bytes)
    }

    /// Gateway URL for an identifier.
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_base, cid)
    }

    /// Seed a payload under an explicit identifier.
    pub fn insert(&self, cid: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.data.write().insert(cid.into(), bytes.into());
    }

    /// Pin a block as the write path would, without counting a write.
    pub fn pin_block(&self, block_number: u64, block: &Block) -> Result<String, TierError> {
        let bytes = block
            .to_json()
            .map_err(|e| TierError::parse(TierKind::Ipfs, e.to_string()))?;
        let cid = Self::content_id_for(&bytes);
        self.data.write().insert(cid.clone(), bytes);
        self.index.write().insert(block_number, cid.clone());
        Ok(cid)
    }

    /// Forget the index entry for a block.
    pub fn forget(&self, block_number: u64) -> Option<String> {
        self.index.write().remove(&block_number)
    }

    /// Drop a payload, simulating an unpinned identifier.
    pub fn remove(&self, cid: &str) -> Option<Vec<u8>> {
        self.data.write().remove(cid)
    }

    pub fn contains(&self, cid: &str) -> bool {
        self.data.read().contains_key(cid)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make write-through report failure.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn reads(&self) -> u64 {
        self.counters.reads.load(Ordering::Relaxed)
    }

    /// Number of write-through calls.
    pub fn writes(&self) -> u64 {
        self.counters.writes.load(Ordering::Relaxed)
    }

    pub fn accesses(&self) -> u64 {
        self.counters.total()
    }
}

#[async_trait]
impl StorageTier for InMemoryContentStore {
    fn kind(&self) -> TierKind {
        TierKind::Ipfs
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        self.counters.reads.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(TierError::backend(TierKind::Ipfs, "gateway unavailable"));
        }
        Ok(self.data.read().get(key).cloned())
    }

    async fn put(&self, _key: &str, _value: &[u8], _options: &PutOptions) -> Result<(), TierError> {
        Err(TierError::Unsupported {
            tier: TierKind::Ipfs,
            operation: "direct put",
        })
    }

    async fn probe(&self, key: &str) -> Result<bool, TierError> {
        self.counters.probes.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(TierError::backend(TierKind::Ipfs, "gateway unavailable"));
        }
        Ok(self.data.read().contains_key(key))
    }
}

#[async_trait]
impl BlockWriteThrough for InMemoryContentStore {
    async fn write_through(
        &self,
        block_number: u64,
        block: &Block,
    ) -> Result<WriteThroughOutcome, TierError> {
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Ok(WriteThroughOutcome {
                success: false,
                error: Some(format!("pinning failed for block {}", block_number)),
                ..WriteThroughOutcome::default()
            });
        }

        let bytes = block
            .to_json()
            .map_err(|e| TierError::parse(TierKind::Ipfs, e.to_string()))?;
        let cid = Self::content_id_for(&bytes);
        self.data.write().insert(cid.clone(), bytes);
        self.index.write().insert(block_number, cid.clone());

        Ok(WriteThroughOutcome {
            success: true,
            ipfs_gateway_url: Some(self.gateway_url(&cid)),
            ipfs_hash: Some(cid),
            error: None,
        })
    }
}

#[async_trait]
impl ContentIndex for InMemoryContentStore {
    async fn content_id(&self, block_number: u64) -> Result<Option<String>, TierError> {
        Ok(self.index.read().get(&block_number).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_tier_counts_engine_access_only() {
        let tier = InMemoryTier::new(TierKind::Kv);
        tier.insert("block:0", b"seed".to_vec());
        assert_eq!(tier.accesses(), 0);

        assert_eq!(tier.get("block:0").await.unwrap(), Some(b"seed".to_vec()));
        assert_eq!(tier.get("block:1").await.unwrap(), None);
        assert!(tier.probe("block:0").await.unwrap());
        tier.put("block:1", b"x", &PutOptions::default()).await.unwrap();

        assert_eq!((tier.reads(), tier.probes(), tier.writes()), (2, 1, 1));
        assert_eq!(tier.len(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_tier_failure_injection() {
        let tier = InMemoryTier::new(TierKind::R2);
        tier.set_fail_writes(true);
        let err = tier
            .put("k", b"v", &PutOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TierError::Backend { tier: TierKind::R2, .. }));
        assert!(!tier.contains("k"));

        tier.set_fail_reads(true);
        assert!(tier.get("k").await.is_err());
        assert!(tier.probe("k").await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_tier_keeps_put_options() {
        let tier = InMemoryTier::new(TierKind::R2);
        let options = PutOptions::with_content_type("application/json").tag("blockNumber", "9");
        tier.put("blocks/block-9.json", b"{}", &options).await.unwrap();

        let object = tier.object("blocks/block-9.json").unwrap();
        assert_eq!(object.options, options);
    }

    #[tokio::test]
    async fn test_content_store_write_through_mints_identifier() {
        let store = InMemoryContentStore::new("https://gw.example/");
        let block = Block {
            block_number: 2,
            hash: "h2".into(),
            ..Block::default()
        };

        let outcome = store.write_through(2, &block).await.unwrap();
        assert!(outcome.success);
        let cid = outcome.ipfs_hash.unwrap();
        assert!(cid.starts_with("bafkrei"));
        assert_eq!(
            outcome.ipfs_gateway_url.as_deref(),
            Some(format!("https://gw.example/ipfs/{}", cid).as_str())
        );

        let stored = store.get(&cid).await.unwrap().unwrap();
        assert_eq!(Block::from_json(&stored).unwrap().hash, "h2");
        assert_eq!(store.content_id(2).await.unwrap(), Some(cid));
    }

    #[tokio::test]
    async fn test_pin_block_is_not_counted() {
        let store = InMemoryContentStore::default();
        let cid = store.pin_block(1, &Block::default()).unwrap();
        assert!(store.contains(&cid));
        assert_eq!(store.accesses(), 0);

        store.forget(1);
        assert_eq!(store.content_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_content_store_rejects_direct_put() {
        let store = InMemoryContentStore::default();
        let err = store
            .put("QmAbc", b"x", &PutOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TierError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_content_store_reports_pin_failure() {
        let store = InMemoryContentStore::default();
        store.set_fail_writes(true);
        let outcome = store.write_through(0, &Block::default()).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
        assert!(store.is_empty());
    }
}
