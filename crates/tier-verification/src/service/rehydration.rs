//! # Rehydration Engine
//!
//! Write-repair policy for tiers missing a block. Each tier is repaired in
//! isolation: a failure is logged and recorded, and never stops the repair
//! of the remaining tiers.
//!
//! | Tier | Repair |
//! |------|--------|
//! | KV   | overwrite the canonical key with the compact source JSON |
//! | R2   | write pretty JSON with content type and `blockNumber`/`hash`/`rehydratedAt` tags |
//! | IPFS | run the unified write-through, then refresh the KV copy with the new identifier |

use crate::domain::config::VerificationConfig;
use crate::domain::errors::TierError;
use crate::domain::results::RehydratedTiers;
use crate::domain::tier::TierKind;
use crate::ports::outbound::{PutOptions, VerificationDependencies};
use shared_types::Block;
use tracing::{info, warn};

/// Repairs missing tier copies from a source block.
pub struct RehydrationEngine<'a> {
    deps: &'a VerificationDependencies,
    config: &'a VerificationConfig,
}

impl<'a> RehydrationEngine<'a> {
    pub fn new(deps: &'a VerificationDependencies, config: &'a VerificationConfig) -> Self {
        Self { deps, config }
    }

    /// Repair every tier in `missing`, in priority order.
    ///
    /// `source` is updated in place when the content-addressed repair mints
    /// a new identifier.
    pub async fn heal(
        &self,
        block_number: u64,
        source: &mut Block,
        missing: &[TierKind],
    ) -> RehydratedTiers {
        let mut outcome = RehydratedTiers::default();

        for tier in TierKind::ALL {
            if !missing.contains(&tier) {
                continue;
            }

            let repaired = match tier {
                TierKind::Kv => self.repair_kv(block_number, source).await,
                TierKind::R2 => self.repair_blob(block_number, source).await,
                TierKind::Ipfs => self.repair_content(block_number, source).await,
            };

            match repaired {
                Ok(()) => {
                    info!(block_number, tier = tier.as_str(), "tier rehydrated");
                    outcome.mark(tier, true);
                }
                Err(e) => {
                    warn!(block_number, tier = tier.as_str(), error = %e, "tier rehydration failed");
                    outcome.mark(tier, false);
                }
            }
        }

        outcome
    }

    /// Persist `block`'s content location into the KV copy.
    pub async fn record_content_location(
        &self,
        block_number: u64,
        block: &Block,
    ) -> Result<(), TierError> {
        self.repair_kv(block_number, block).await
    }

    async fn repair_kv(&self, block_number: u64, block: &Block) -> Result<(), TierError> {
        let bytes = block
            .to_json()
            .map_err(|e| TierError::parse(TierKind::Kv, e.to_string()))?;
        self.deps
            .kv
            .put(
                &self.config.keys.kv_key(block_number),
                &bytes,
                &PutOptions::default(),
            )
            .await
    }

    async fn repair_blob(&self, block_number: u64, block: &Block) -> Result<(), TierError> {
        let blob = self
            .deps
            .blob
            .as_ref()
            .ok_or(TierError::NotConfigured(TierKind::R2))?;

        let bytes = block
            .to_json_pretty()
            .map_err(|e| TierError::parse(TierKind::R2, e.to_string()))?;
        let options = PutOptions::with_content_type(self.config.blob_content_type.clone())
            .tag("blockNumber", block_number.to_string())
            .tag("hash", block.hash.clone())
            .tag("rehydratedAt", self.deps.time.now().to_rfc3339());

        blob.put(&self.config.keys.blob_key(block_number), &bytes, &options)
            .await
    }

    /// Content-addressed repair goes through the write-through path, never a
    /// direct put.
    async fn repair_content(&self, block_number: u64, block: &mut Block) -> Result<(), TierError> {
        let outcome = self
            .deps
            .write_through
            .write_through(block_number, block)
            .await?;

        if !outcome.success {
            return Err(TierError::backend(
                TierKind::Ipfs,
                outcome
                    .error
                    .unwrap_or_else(|| "write-through reported failure".to_string()),
            ));
        }

        let cid = outcome.ipfs_hash.ok_or_else(|| {
            TierError::backend(TierKind::Ipfs, "write-through returned no content identifier")
        })?;
        block.set_content_location(cid, outcome.ipfs_gateway_url);

        // The KV copy is refreshed even when it was already present.
        if let Err(e) = self.record_content_location(block_number, block).await {
            warn!(
                block_number,
                error = %e,
                "content identifier minted but KV metadata refresh failed"
            );
        }

        Ok(())
    }
}
