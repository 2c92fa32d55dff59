//! # Storage Tiers
//!
//! Every block is replicated across three heterogeneous tiers. The order of
//! [`TierKind::ALL`] is the source priority used when picking a repair source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the storage backends holding block copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    /// Fast authoritative key-value store.
    Kv,
    /// Durable blob store.
    R2,
    /// Content-addressed decentralized store.
    Ipfs,
}

impl TierKind {
    /// All tiers in source priority order (key-value > blob > content-addressed).
    pub const ALL: [TierKind; 3] = [TierKind::Kv, TierKind::R2, TierKind::Ipfs];

    /// Short label used in log fields and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Kv => "kv",
            TierKind::R2 => "r2",
            TierKind::Ipfs => "ipfs",
        }
    }

    /// Label used in human-readable result messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TierKind::Kv => "KV",
            TierKind::R2 => "R2",
            TierKind::Ipfs => "IPFS",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
