//! # Verification Service Tests

use super::*;
use crate::adapters::{
    FixedTimeSource, InMemoryContentStore, InMemoryTier, KvChainMetadata, StaticChainMetadata,
    CHAIN_METADATA_KEY,
};
use crate::domain::results::{RehydratedTiers, TierCheck, VerificationStatus};
use crate::domain::status::ContentIdState;
use crate::domain::tier::TierKind;
use crate::domain::errors::TierError;
use crate::ports::outbound::{ContentIndex, PutOptions, StorageTier};
use chrono::{DateTime, TimeZone, Utc};
use shared_types::{Block, ChainMetadata, ChainTransaction};
use std::sync::Arc;
use tokio::sync::Notify;

const QM_CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn make_block(n: u64) -> Block {
    Block {
        block_number: n,
        previous_hash: if n == 0 {
            "0".repeat(64)
        } else {
            format!("hash-{}", n - 1)
        },
        hash: format!("hash-{}", n),
        timestamp: 1_700_000_000_000 + n as i64,
        transactions: vec![ChainTransaction {
            id: format!("tx-{}", n),
            kind: "asset_created".to_string(),
            timestamp: 1_700_000_000_000,
            extra: Default::default(),
        }],
        signature: format!("sig-{}", n),
        ..Block::default()
    }
}

fn kv_key(n: u64) -> String {
    format!("block:{}", n)
}

fn blob_key(n: u64) -> String {
    format!("blocks/block-{}.json", n)
}

/// Write a block through all three tiers the way block creation does.
fn seed_all(
    kv: &InMemoryTier,
    blob: Option<&InMemoryTier>,
    content: &InMemoryContentStore,
    n: u64,
) -> Block {
    let mut block = make_block(n);
    let cid = content.pin_block(n, &block).unwrap();
    block.set_content_location(cid.clone(), Some(content.gateway_url(&cid)));
    kv.insert(kv_key(n), block.to_json().unwrap());
    if let Some(blob) = blob {
        blob.insert(blob_key(n), block.to_json_pretty().unwrap());
    }
    block
}

fn stored_block(tier: &InMemoryTier, key: &str) -> Block {
    Block::from_json(&tier.object(key).unwrap().bytes).unwrap()
}

struct Harness {
    kv: Arc<InMemoryTier>,
    blob: Arc<InMemoryTier>,
    content: Arc<InMemoryContentStore>,
    chain: Arc<StaticChainMetadata>,
    service: VerificationService,
}

impl Harness {
    fn new(latest_block: Option<u64>) -> Self {
        Self::build(latest_block, true)
    }

    fn without_blob(latest_block: Option<u64>) -> Self {
        Self::build(latest_block, false)
    }

    fn build(latest_block: Option<u64>, with_blob: bool) -> Self {
        let kv = Arc::new(InMemoryTier::new(TierKind::Kv));
        let blob = Arc::new(InMemoryTier::new(TierKind::R2));
        let content = Arc::new(InMemoryContentStore::new("https://gw.test"));
        let chain = Arc::new(match latest_block {
            Some(latest) => StaticChainMetadata::initialized(latest),
            None => StaticChainMetadata::default(),
        });

        let deps = VerificationDependencies {
            kv: kv.clone(),
            blob: if with_blob {
                Some(blob.clone() as Arc<dyn StorageTier>)
            } else {
                None
            },
            content: content.clone(),
            write_through: content.clone(),
            content_index: Some(content.clone() as Arc<dyn ContentIndex>),
            chain: chain.clone(),
            time: Arc::new(FixedTimeSource(fixed_time())),
        };
        let service = VerificationService::new(deps, VerificationConfig::default());

        Self {
            kv,
            blob,
            content,
            chain,
            service,
        }
    }

    fn seed_all(&self, n: u64) -> Block {
        seed_all(&self.kv, Some(&*self.blob), &self.content, n)
    }

    /// Block copies in KV and R2 with no content identifier recorded anywhere.
    fn seed_without_content(&self, n: u64) -> Block {
        let block = make_block(n);
        self.kv.insert(kv_key(n), block.to_json().unwrap());
        self.blob.insert(blob_key(n), block.to_json_pretty().unwrap());
        block
    }

    fn total_writes(&self) -> u64 {
        self.kv.writes() + self.blob.writes() + self.content.writes()
    }

    fn total_accesses(&self) -> u64 {
        self.kv.accesses() + self.blob.accesses() + self.content.accesses()
    }
}

/// Tier that parks on one key until released.
struct GatedTier {
    inner: InMemoryTier,
    gate_key: String,
    reached: Notify,
    release: Notify,
}

impl GatedTier {
    fn new(kind: TierKind, gate_key: impl Into<String>) -> Self {
        Self {
            inner: InMemoryTier::new(kind),
            gate_key: gate_key.into(),
            reached: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl StorageTier for GatedTier {
    fn kind(&self) -> TierKind {
        self.inner.kind()
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TierError> {
        if key == self.gate_key {
            self.reached.notify_one();
            self.release.notified().await;
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &[u8], options: &PutOptions) -> Result<(), TierError> {
        self.inner.put(key, value, options).await
    }

    async fn probe(&self, key: &str) -> Result<bool, TierError> {
        self.inner.probe(key).await
    }
}

// =============================================================================
// BLOCK VERIFIER
// =============================================================================

#[tokio::test]
async fn test_block_in_every_tier_is_ok() {
    let h = Harness::new(Some(0));
    let block = h.seed_all(0);

    let result = h.service.verify_block(0).await;

    assert_eq!(result.status, VerificationStatus::Ok);
    assert_eq!(result.message.as_deref(), Some(verifier::MSG_ALL_PRESENT));
    assert_eq!(result.kv, TierCheck::present(block.hash.clone()));
    assert_eq!(result.r2, TierCheck::present(block.hash.clone()));
    assert_eq!(result.ipfs, TierCheck::present(block.hash));
    assert!(result.rehydrated.is_empty());
    assert!(!result.hash_mismatch);
    assert_eq!(h.total_writes(), 0);
}

#[tokio::test]
async fn test_missing_blob_copy_is_rehydrated_from_kv() {
    let h = Harness::new(Some(0));
    let mut block = make_block(0);
    block.hash = "abc123".to_string();
    block.set_content_location(QM_CID.to_string(), None);
    h.kv.insert(kv_key(0), block.to_json().unwrap());
    h.content.insert(QM_CID, block.to_json().unwrap());

    let result = h.service.verify_block(0).await;

    assert_eq!(result.kv, TierCheck::present("abc123"));
    assert_eq!(result.r2, TierCheck::absent());
    assert_eq!(result.ipfs, TierCheck::present("abc123"));
    assert_eq!(
        result.rehydrated,
        RehydratedTiers {
            r2: Some(true),
            ..RehydratedTiers::default()
        }
    );
    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(result.message.as_deref(), Some("Rehydrated: R2"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["rehydrated"], serde_json::json!({"r2": true}));
    assert_eq!(json["r2"], serde_json::json!({"present": false}));

    let object = h.blob.object(&blob_key(0)).unwrap();
    assert_eq!(object.options.content_type.as_deref(), Some("application/json"));
    assert_eq!(object.options.custom_metadata["blockNumber"], "0");
    assert_eq!(object.options.custom_metadata["hash"], "abc123");
    assert_eq!(
        object.options.custom_metadata["rehydratedAt"],
        fixed_time().to_rfc3339()
    );
    assert_eq!(stored_block(&h.blob, &blob_key(0)), block);

    // Existing copies are never rewritten for a blob repair.
    assert_eq!(h.kv.writes(), 0);
    assert_eq!(h.content.writes(), 0);
}

#[tokio::test]
async fn test_block_only_in_content_tier_restores_kv_and_blob() {
    let h = Harness::new(Some(0));
    let block = make_block(0);
    let cid = h.content.pin_block(0, &block).unwrap();

    let result = h.service.verify_block(0).await;

    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(
        result.rehydrated,
        RehydratedTiers {
            kv: Some(true),
            r2: Some(true),
            ipfs: None,
        }
    );
    assert_eq!(result.message.as_deref(), Some("Rehydrated: KV, R2"));

    let restored = stored_block(&h.kv, &kv_key(0));
    assert_eq!(restored.hash, block.hash);
    assert_eq!(restored.content_id(), Some(cid.as_str()));
    assert_eq!(stored_block(&h.blob, &blob_key(0)).hash, block.hash);
    assert_eq!(h.content.writes(), 0);
}

#[tokio::test]
async fn test_total_absence_fails_without_writes() {
    let h = Harness::new(Some(3));

    let result = h.service.verify_block(3).await;

    assert_eq!(result.status, VerificationStatus::Failed);
    assert_eq!(result.message.as_deref(), Some(verifier::MSG_NOT_FOUND));
    assert!(result.rehydrated.is_empty());
    assert_eq!(h.total_writes(), 0);
    assert!(h.kv.is_empty());
    assert!(h.blob.is_empty());
}

#[tokio::test]
async fn test_failed_repair_leaves_block_partial() {
    let h = Harness::new(Some(0));
    h.seed_all(0);
    h.blob.remove(&blob_key(0));
    h.blob.set_fail_writes(true);

    let result = h.service.verify_block(0).await;

    assert_eq!(result.status, VerificationStatus::Partial);
    assert_eq!(result.rehydrated.r2, Some(false));
    assert_eq!(
        result.message.as_deref(),
        Some("Block missing from R2; rehydration did not succeed")
    );

    // A later pass retries.
    h.blob.set_fail_writes(false);
    let result = h.service.verify_block(0).await;
    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert!(h.blob.contains(&blob_key(0)));
}

#[tokio::test]
async fn test_tier_repairs_are_isolated() {
    let h = Harness::new(Some(0));
    h.content.pin_block(0, &make_block(0)).unwrap();
    h.kv.set_fail_writes(true);

    let result = h.service.verify_block(0).await;

    assert_eq!(result.rehydrated.kv, Some(false));
    assert_eq!(result.rehydrated.r2, Some(true));
    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(result.message.as_deref(), Some("Rehydrated: R2"));
    assert!(h.blob.contains(&blob_key(0)));
}

#[tokio::test]
async fn test_content_repair_uses_write_through_and_refreshes_kv() {
    let h = Harness::new(Some(0));
    h.seed_without_content(0);

    let result = h.service.verify_block(0).await;

    assert_eq!(result.ipfs, TierCheck::absent());
    assert_eq!(
        result.rehydrated,
        RehydratedTiers {
            ipfs: Some(true),
            ..RehydratedTiers::default()
        }
    );
    assert_eq!(result.message.as_deref(), Some("Rehydrated: IPFS"));
    assert_eq!(h.content.writes(), 1);

    // The present KV copy now records the minted identifier.
    assert_eq!(h.kv.writes(), 1);
    let refreshed = stored_block(&h.kv, &kv_key(0));
    let cid = refreshed.content_id().unwrap().to_string();
    assert!(h.content.contains(&cid));
    assert_eq!(
        refreshed.storage.unwrap().ipfs_gateway_url,
        Some(format!("https://gw.test/ipfs/{}", cid))
    );
    assert_eq!(h.blob.writes(), 0);

    let again = h.service.verify_block(0).await;
    assert_eq!(again.status, VerificationStatus::Ok);
    assert_eq!(h.content.writes(), 1);
    assert_eq!(h.kv.writes(), 1);
}

#[tokio::test]
async fn test_write_through_failure_is_partial() {
    let h = Harness::new(Some(0));
    h.seed_without_content(0);
    h.content.set_fail_writes(true);

    let result = h.service.verify_block(0).await;

    assert_eq!(result.status, VerificationStatus::Partial);
    assert_eq!(result.rehydrated.ipfs, Some(false));
    assert_eq!(
        result.message.as_deref(),
        Some("Block missing from IPFS; rehydration did not succeed")
    );
    assert_eq!(h.kv.writes(), 0);
}

#[tokio::test]
async fn test_unreadable_kv_copy_is_replaced() {
    let h = Harness::new(Some(0));
    let block = h.seed_all(0);
    h.kv.insert(kv_key(0), b"{not json".to_vec());

    let result = h.service.verify_block(0).await;

    assert!(!result.kv.present);
    assert!(result.kv.error.as_deref().unwrap().contains("unreadable"));
    assert_eq!(result.rehydrated.kv, Some(true));
    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(stored_block(&h.kv, &kv_key(0)), block);
}

#[tokio::test]
async fn test_tier_read_error_is_recorded_not_raised() {
    let h = Harness::new(Some(0));
    h.seed_all(0);
    h.blob.set_fail_reads(true);

    let result = h.service.verify_block(0).await;

    assert!(!result.r2.present);
    assert!(result.r2.error.as_deref().unwrap().contains("injected read failure"));
    assert!(result.kv.present);
    assert!(result.ipfs.present);
    assert_eq!(result.status, VerificationStatus::Rehydrated);
}

#[tokio::test]
async fn test_hash_divergence_is_flagged() {
    let h = Harness::new(Some(0));
    let mut block = h.seed_all(0);
    block.hash = "forged".to_string();
    h.blob.insert(blob_key(0), block.to_json_pretty().unwrap());

    let result = h.service.verify_block(0).await;

    assert_eq!(result.status, VerificationStatus::Ok);
    assert!(result.hash_mismatch);
    assert_eq!(result.r2.hash.as_deref(), Some("forged"));
    assert_eq!(h.total_writes(), 0);
}

#[tokio::test]
async fn test_recorded_identifier_is_fetched_by_prefix() {
    let h = Harness::new(Some(0));
    let mut block = make_block(0);
    block.hash = "abc123".to_string();
    block.set_content_location("Qm...xyz".to_string(), None);
    h.kv.insert(kv_key(0), block.to_json().unwrap());
    h.content.insert("Qm...xyz", block.to_json().unwrap());

    let result = h.service.verify_block(0).await;

    assert_eq!(result.kv, TierCheck::present("abc123"));
    assert_eq!(result.r2, TierCheck::absent());
    assert_eq!(result.ipfs, TierCheck::present("abc123"));
    assert_eq!(
        result.rehydrated,
        RehydratedTiers {
            r2: Some(true),
            ..RehydratedTiers::default()
        }
    );
    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(h.content.writes(), 0);
    assert_eq!(h.kv.writes(), 0);
    assert_eq!(stored_block(&h.kv, &kv_key(0)).content_id(), Some("Qm...xyz"));
}

#[tokio::test]
async fn test_unknown_prefix_is_not_fetched() {
    let h = Harness::new(Some(0));
    let mut block = make_block(0);
    block.set_content_location("zdj7Wh".to_string(), None);
    h.kv.insert(kv_key(0), block.to_json().unwrap());
    h.blob.insert(blob_key(0), block.to_json_pretty().unwrap());

    let result = h.service.verify_block(0).await;

    assert_eq!(h.content.reads(), 0);
    assert_eq!(result.ipfs, TierCheck::absent());
    assert_eq!(result.rehydrated.ipfs, Some(true));
}

#[tokio::test]
async fn test_indexed_identifier_is_recorded_in_kv_copy() {
    let h = Harness::new(Some(0));
    let block = h.seed_without_content(0);
    let cid = h.content.pin_block(0, &block).unwrap();

    let result = h.service.verify_block(0).await;

    assert_eq!(result.status, VerificationStatus::Ok);
    assert!(result.ipfs.present);
    assert!(result.rehydrated.is_empty());
    assert_eq!(h.content.writes(), 0);
    assert_eq!(h.blob.writes(), 0);
    assert_eq!(h.kv.writes(), 1);
    assert_eq!(stored_block(&h.kv, &kv_key(0)).content_id(), Some(cid.as_str()));
}

#[tokio::test]
async fn test_indexed_identifier_is_recorded_alongside_repair() {
    let h = Harness::new(Some(0));
    let block = h.seed_without_content(0);
    let cid = h.content.pin_block(0, &block).unwrap();
    h.blob.remove(&blob_key(0));

    let result = h.service.verify_block(0).await;

    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(
        result.rehydrated,
        RehydratedTiers {
            r2: Some(true),
            ..RehydratedTiers::default()
        }
    );
    assert_eq!(stored_block(&h.kv, &kv_key(0)).content_id(), Some(cid.as_str()));
    assert_eq!(stored_block(&h.blob, &blob_key(0)).content_id(), Some(cid.as_str()));
    assert_eq!(h.content.writes(), 0);
}

#[tokio::test]
async fn test_unconfigured_blob_tier_is_skipped() {
    let h = Harness::without_blob(Some(0));
    seed_all(&h.kv, None, &h.content, 0);

    let result = h.service.verify_block(0).await;
    assert_eq!(result.status, VerificationStatus::Ok);
    assert!(!result.r2.present);
    assert_eq!(result.r2.error.as_deref(), Some("R2 tier not configured"));

    h.kv.remove(&kv_key(0));
    let result = h.service.verify_block(0).await;
    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(
        result.rehydrated,
        RehydratedTiers {
            kv: Some(true),
            ..RehydratedTiers::default()
        }
    );

    let report = h.service.status_all().await.unwrap();
    assert_eq!(report.summary.complete, 1);
    assert!(!report.blocks[0].r2);
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

#[tokio::test]
async fn test_verify_all_rejects_uninitialized_chain_without_tier_access() {
    let h = Harness::new(None);

    let err = h.service.verify_all().await.unwrap_err();

    assert_eq!(err, VerificationError::ChainNotInitialized);
    assert_eq!(h.total_accesses(), 0);
}

#[tokio::test]
async fn test_verify_all_reports_metadata_failure() {
    let kv = Arc::new(InMemoryTier::new(TierKind::Kv));
    kv.insert(CHAIN_METADATA_KEY, b"garbage".to_vec());
    let content = Arc::new(InMemoryContentStore::default());
    let deps = VerificationDependencies {
        kv: kv.clone(),
        blob: None,
        content: content.clone(),
        write_through: content.clone(),
        content_index: None,
        chain: Arc::new(KvChainMetadata::new(kv.clone())),
        time: Arc::new(FixedTimeSource(fixed_time())),
    };
    let service = VerificationService::new(deps, VerificationConfig::default());

    let err = service.verify_all().await.unwrap_err();
    assert!(matches!(err, VerificationError::ChainMetadata(_)));
}

#[tokio::test]
async fn test_verify_all_heals_every_block_then_is_idempotent() {
    let h = Harness::new(Some(4));
    for n in 0..5 {
        if n == 3 {
            h.seed_without_content(n);
        } else {
            h.seed_all(n);
        }
    }
    h.blob.remove(&blob_key(1));
    h.kv.remove(&kv_key(2));

    let summary = h.service.verify_all().await.unwrap();

    assert_eq!(summary.total_blocks, 5);
    assert_eq!(summary.verified, 2);
    assert_eq!(summary.rehydrated, 3);
    assert_eq!(summary.partial, 0);
    assert_eq!(summary.failed, 0);
    assert!(!summary.cancelled);
    let order: Vec<u64> = summary.results.iter().map(|r| r.block_number).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);

    let report = h.service.status_all().await.unwrap();
    assert!(report.blocks.iter().all(|entry| entry.complete));
    assert_eq!(report.summary.complete, 5);

    let writes = h.total_writes();
    let second = h.service.verify_all().await.unwrap();
    assert_eq!(second.verified, 5);
    assert_eq!(second.rehydrated, 0);
    assert!(second.results.iter().all(|r| r.rehydrated.is_empty()));
    assert_eq!(h.total_writes(), writes);
}

#[tokio::test]
async fn test_verify_all_counts_partial_and_failed() {
    let h = Harness::new(Some(2));
    h.seed_all(0);
    h.seed_all(1);
    h.blob.remove(&blob_key(1));
    h.blob.set_fail_writes(true);

    let summary = h.service.verify_all().await.unwrap();

    assert_eq!(
        (summary.verified, summary.rehydrated, summary.partial, summary.failed),
        (1, 0, 1, 1)
    );
    assert_eq!(summary.results[2].status, VerificationStatus::Failed);
}

#[tokio::test]
async fn test_verify_all_picks_up_chain_growth() {
    let h = Harness::new(Some(0));
    h.seed_all(0);
    assert_eq!(h.service.verify_all().await.unwrap().total_blocks, 1);

    h.seed_all(1);
    h.chain.set(ChainMetadata {
        initialized: true,
        latest_block: 1,
    });
    assert_eq!(h.service.verify_all().await.unwrap().verified, 2);
}

#[tokio::test]
async fn test_verify_single_runs_one_block() {
    let h = Harness::new(Some(9));
    h.seed_all(4);
    h.blob.remove(&blob_key(4));

    let result = h.service.verify_single(4).await.unwrap();

    assert_eq!(result.block_number, 4);
    assert_eq!(result.status, VerificationStatus::Rehydrated);
    assert_eq!(h.kv.reads(), 1);
}

#[tokio::test]
async fn test_shutdown_cancels_at_block_boundary() {
    let kv = Arc::new(GatedTier::new(TierKind::Kv, kv_key(1)));
    let blob = Arc::new(InMemoryTier::new(TierKind::R2));
    let content = Arc::new(InMemoryContentStore::default());
    for n in 0..4 {
        seed_all(&kv.inner, Some(&*blob), &content, n);
    }
    let deps = VerificationDependencies {
        kv: kv.clone(),
        blob: Some(blob.clone() as Arc<dyn StorageTier>),
        content: content.clone(),
        write_through: content.clone(),
        content_index: Some(content.clone() as Arc<dyn ContentIndex>),
        chain: Arc::new(StaticChainMetadata::initialized(3)),
        time: Arc::new(FixedTimeSource(fixed_time())),
    };
    let service = Arc::new(VerificationService::new(deps, VerificationConfig::default()));

    let run = tokio::spawn({
        let service = service.clone();
        async move { service.verify_all().await }
    });

    kv.reached.notified().await;
    service.shutdown();
    assert!(service.is_shutting_down());
    kv.release.notify_one();

    let summary = run.await.unwrap().unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.total_blocks, 4);
    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.verified, 2);

    // Once shut down, later runs stop before the first block.
    let summary = service.verify_all().await.unwrap();
    assert!(summary.cancelled);
    assert!(summary.results.is_empty());
}

#[tokio::test]
async fn test_run_guard_rejects_overlapping_runs() {
    let kv = Arc::new(InMemoryTier::new(TierKind::Kv));
    let blob = Arc::new(GatedTier::new(TierKind::R2, blob_key(0)));
    let content = Arc::new(InMemoryContentStore::default());
    seed_all(&kv, Some(&blob.inner), &content, 0);
    let deps = VerificationDependencies {
        kv: kv.clone(),
        blob: Some(blob.clone() as Arc<dyn StorageTier>),
        content: content.clone(),
        write_through: content.clone(),
        content_index: Some(content.clone() as Arc<dyn ContentIndex>),
        chain: Arc::new(StaticChainMetadata::initialized(0)),
        time: Arc::new(FixedTimeSource(fixed_time())),
    };
    let service = Arc::new(VerificationService::new(deps, VerificationConfig::default()));

    let run = tokio::spawn({
        let service = service.clone();
        async move { service.verify_all().await }
    });
    blob.reached.notified().await;

    assert_eq!(
        service.verify_all().await.unwrap_err(),
        VerificationError::RunInProgress
    );
    assert_eq!(
        service.verify_single(0).await.unwrap_err(),
        VerificationError::RunInProgress
    );
    // Status scans are read-only and not guarded.
    assert_eq!(service.status_all().await.unwrap().summary.complete, 1);

    blob.release.notify_one();
    let summary = run.await.unwrap().unwrap();
    assert_eq!(summary.verified, 1);

    // The guard is released with the run.
    blob.release.notify_one();
    assert!(service.verify_single(0).await.is_ok());
}

#[tokio::test]
async fn test_verify_all_completes_blocks_located_through_index() {
    let h = Harness::new(Some(1));
    h.seed_all(0);
    let block = h.seed_without_content(1);
    let cid = h.content.pin_block(1, &block).unwrap();

    let summary = h.service.verify_all().await.unwrap();
    assert_eq!(summary.verified, 2);

    let report = h.service.status_all().await.unwrap();
    assert_eq!(report.summary.complete, 2);
    assert_eq!(report.blocks[1].ipfs, ContentIdState::Present(cid));

    let writes = h.total_writes();
    let second = h.service.verify_all().await.unwrap();
    assert_eq!(second.verified, 2);
    assert_eq!(h.total_writes(), writes);
}

#[tokio::test]
async fn test_unrepresentable_chain_length_is_a_metadata_error() {
    let h = Harness::new(Some(u64::MAX));

    let err = h.service.verify_all().await.unwrap_err();
    assert!(matches!(err, VerificationError::ChainMetadata(_)));

    let err = h.service.status_all().await.unwrap_err();
    assert!(matches!(err, VerificationError::ChainMetadata(_)));
    assert_eq!(h.total_accesses(), 0);
}

// =============================================================================
// STATUS REPORTER
// =============================================================================

#[tokio::test]
async fn test_status_five_block_chain_with_one_gap() {
    let h = Harness::new(Some(4));
    for n in 0..5 {
        if n == 3 {
            h.kv.insert(kv_key(n), make_block(n).to_json().unwrap());
        } else {
            h.seed_all(n);
        }
    }

    let report = h.service.status_all().await.unwrap();

    assert_eq!(report.total_blocks, 5);
    assert_eq!(report.summary.complete, 4);
    assert_eq!(report.summary.incomplete, 1);
    let entry = &report.blocks[3];
    assert!(entry.kv);
    assert!(!entry.r2);
    assert_eq!(entry.ipfs, ContentIdState::Absent);
    assert!(!entry.complete);

    assert_eq!(h.total_writes(), 0);
    assert_eq!(h.content.accesses(), 0);
    assert_eq!(h.blob.reads(), 0);
}

#[tokio::test]
async fn test_status_content_state_is_unknown_without_kv_copy() {
    let h = Harness::new(Some(1));
    let block = h.seed_all(0);
    h.seed_all(1);
    h.kv.remove(&kv_key(1));

    let report = h.service.status_all().await.unwrap();

    assert_eq!(
        report.blocks[0].ipfs,
        ContentIdState::Present(block.content_id().unwrap().to_string())
    );
    assert_eq!(report.blocks[1].ipfs, ContentIdState::UnknownPendingCheck);
    assert!(!report.blocks[1].kv);
    assert!(report.blocks[1].r2);
    assert!(!report.blocks[1].complete);
}

#[tokio::test]
async fn test_status_on_uninitialized_chain_is_empty() {
    let h = Harness::new(None);

    let report = h.service.status_all().await.unwrap();

    assert_eq!(report.total_blocks, 0);
    assert!(report.blocks.is_empty());
    assert_eq!(h.total_accesses(), 0);
}
