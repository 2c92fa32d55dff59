//! # Ledger Entities
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `ChainTransaction`, `ChainMetadata`
//! - **Storage**: `BlockStorage`, `WriteThroughOutcome`
//!
//! All records serialize as camelCase JSON, matching the persisted layout:
//!
//! ```text
//! { blockNumber, previousHash, hash, timestamp, transactions: [...],
//!   signature, ipfsHash?, storage?: { ipfsHash, ipfsGatewayUrl } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A transaction recorded inside a block.
///
/// Transaction bodies are opaque to storage verification; only the
/// identifying fields are typed and everything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransaction {
    /// Transaction identifier.
    #[serde(default)]
    pub id: String,
    /// Transaction kind (e.g. `asset_created`).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Creation time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Remaining fields, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Location of a block inside the content-addressed tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockStorage {
    /// Content identifier of the pinned block payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
    /// Public gateway URL for the pinned payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_gateway_url: Option<String>,
}

/// A signed block of the append-only ledger.
///
/// Block numbers are contiguous from 0 (genesis). Hash, signature and
/// transactions never change after creation; `storage` may be refreshed
/// when a new content identifier is minted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain.
    pub block_number: u64,
    /// Hash of the preceding block.
    #[serde(default)]
    pub previous_hash: String,
    /// Hash of this block.
    pub hash: String,
    /// Creation time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Ordered transactions.
    #[serde(default)]
    pub transactions: Vec<ChainTransaction>,
    /// Chain signature over the block.
    #[serde(default)]
    pub signature: String,
    /// Legacy top-level content identifier written by older blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
    /// Content-addressed storage metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<BlockStorage>,
    /// Remaining fields, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    /// Decode a block from its JSON representation.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Compact JSON, as stored in the key-value tier.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Human-readable JSON, as stored in the blob tier.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// The recorded content identifier, if any.
    ///
    /// `storage.ipfsHash` wins over the legacy top-level `ipfsHash`.
    pub fn content_id(&self) -> Option<&str> {
        self.storage
            .as_ref()
            .and_then(|s| s.ipfs_hash.as_deref())
            .or(self.ipfs_hash.as_deref())
            .filter(|cid| !cid.is_empty())
    }

    /// Record a newly minted content location.
    pub fn set_content_location(&mut self, ipfs_hash: String, gateway_url: Option<String>) {
        let storage = self.storage.get_or_insert_with(BlockStorage::default);
        storage.ipfs_hash = Some(ipfs_hash);
        if gateway_url.is_some() {
            storage.ipfs_gateway_url = gateway_url;
        }
    }
}

/// Chain-level metadata reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    /// Whether the genesis block has been written.
    pub initialized: bool,
    /// Highest block number in the chain.
    #[serde(default)]
    pub latest_block: u64,
}

impl ChainMetadata {
    /// Number of blocks including genesis, or 0 for an uninitialized chain.
    ///
    /// `None` when `latest_block` is `u64::MAX` and the count does not fit.
    pub fn total_blocks(&self) -> Option<u64> {
        if self.initialized {
            self.latest_block.checked_add(1)
        } else {
            Some(0)
        }
    }
}

// =============================================================================
// CLUSTER B: STORAGE
// =============================================================================

/// Result of the unified block write-through path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WriteThroughOutcome {
    /// Whether the content-addressed write (and pin) succeeded.
    pub success: bool,
    /// Content identifier minted for the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
    /// Gateway URL for the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_gateway_url: Option<String>,
    /// Failure description reported by the write-through path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
