//! # Verification Results
//!
//! Per-block outcomes of a verification pass and the aggregated run summary.

use crate::domain::tier::TierKind;
use serde::{Deserialize, Serialize};

/// Outcome of reading one tier's copy of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TierCheck {
    /// Whether a readable copy was found.
    pub present: bool,
    /// Hash recorded in the tier's copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Isolated read or parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TierCheck {
    /// A tier holding a copy with the given hash.
    pub fn present(hash: impl Into<String>) -> Self {
        Self {
            present: true,
            hash: Some(hash.into()),
            error: None,
        }
    }

    /// A tier with no copy.
    pub fn absent() -> Self {
        Self::default()
    }

    /// A tier whose read failed.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            present: false,
            hash: None,
            error: Some(error.into()),
        }
    }
}

/// Which tiers a pass attempted to repair, and whether each repair succeeded.
///
/// A tier is `None` when no repair was attempted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RehydratedTiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kv: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs: Option<bool>,
}

impl RehydratedTiers {
    /// Record a repair attempt.
    pub fn mark(&mut self, tier: TierKind, success: bool) {
        match tier {
            TierKind::Kv => self.kv = Some(success),
            TierKind::R2 => self.r2 = Some(success),
            TierKind::Ipfs => self.ipfs = Some(success),
        }
    }

    /// Repair outcome for a tier, if attempted.
    pub fn get(&self, tier: TierKind) -> Option<bool> {
        match tier {
            TierKind::Kv => self.kv,
            TierKind::R2 => self.r2,
            TierKind::Ipfs => self.ipfs,
        }
    }

    /// Tiers repaired successfully, in priority order.
    pub fn healed(&self) -> Vec<TierKind> {
        TierKind::ALL
            .into_iter()
            .filter(|tier| self.get(*tier) == Some(true))
            .collect()
    }

    /// Whether no repair was attempted at all.
    pub fn is_empty(&self) -> bool {
        self.kv.is_none() && self.r2.is_none() && self.ipfs.is_none()
    }
}

/// Overall classification of a block after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Present in every configured tier.
    Ok,
    /// Missing somewhere and no repair succeeded this pass.
    Partial,
    /// At least one missing tier was repaired this pass.
    Rehydrated,
    /// Not recoverable from any tier.
    Failed,
}

impl VerificationStatus {
    /// Lowercase label used in metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Ok => "ok",
            VerificationStatus::Partial => "partial",
            VerificationStatus::Rehydrated => "rehydrated",
            VerificationStatus::Failed => "failed",
        }
    }
}

/// Per-block verification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockVerificationResult {
    pub block_number: u64,
    pub kv: TierCheck,
    pub r2: TierCheck,
    pub ipfs: TierCheck,
    pub rehydrated: RehydratedTiers,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Two or more present copies carry different hashes.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hash_mismatch: bool,
}

impl BlockVerificationResult {
    /// Fresh result with every tier absent.
    pub fn new(block_number: u64) -> Self {
        Self {
            block_number,
            kv: TierCheck::absent(),
            r2: TierCheck::absent(),
            ipfs: TierCheck::absent(),
            rehydrated: RehydratedTiers::default(),
            status: VerificationStatus::Failed,
            message: None,
            hash_mismatch: false,
        }
    }

    /// The check recorded for a tier.
    pub fn check(&self, tier: TierKind) -> &TierCheck {
        match tier {
            TierKind::Kv => &self.kv,
            TierKind::R2 => &self.r2,
            TierKind::Ipfs => &self.ipfs,
        }
    }

    /// Mutable access to a tier's check.
    pub fn check_mut(&mut self, tier: TierKind) -> &mut TierCheck {
        match tier {
            TierKind::Kv => &mut self.kv,
            TierKind::R2 => &mut self.r2,
            TierKind::Ipfs => &mut self.ipfs,
        }
    }

    /// Number of tiers holding a readable copy.
    pub fn presence_count(&self) -> usize {
        TierKind::ALL
            .into_iter()
            .filter(|tier| self.check(*tier).present)
            .count()
    }

    /// Whether the present copies disagree on the block hash.
    pub fn hashes_diverge(&self) -> bool {
        let mut hashes = TierKind::ALL
            .into_iter()
            .filter_map(|tier| self.check(tier).hash.as_deref());
        match hashes.next() {
            Some(first) => hashes.any(|h| h != first),
            None => false,
        }
    }
}

/// Aggregated outcome of a full verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    /// Blocks in the chain at the start of the run (`latestBlock + 1`).
    pub total_blocks: u64,
    /// Blocks with status `ok`.
    pub verified: u64,
    /// Blocks with status `rehydrated`.
    pub rehydrated: u64,
    /// Blocks with status `partial`.
    pub partial: u64,
    /// Blocks with status `failed`.
    pub failed: u64,
    /// Per-block results in block order.
    pub results: Vec<BlockVerificationResult>,
    /// Wall-clock duration of the run in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// The run stopped early on a shutdown signal.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl VerificationSummary {
    /// Empty summary for a chain of `total_blocks`.
    pub fn new(total_blocks: u64) -> Self {
        Self {
            total_blocks,
            ..Self::default()
        }
    }

    /// Tally a block result.
    pub fn record(&mut self, result: BlockVerificationResult) {
        match result.status {
            VerificationStatus::Ok => self.verified += 1,
            VerificationStatus::Rehydrated => self.rehydrated += 1,
            VerificationStatus::Partial => self.partial += 1,
            VerificationStatus::Failed => self.failed += 1,
        }
        self.results.push(result);
    }
}
