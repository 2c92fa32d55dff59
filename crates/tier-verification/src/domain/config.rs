//! # Value Objects
//!
//! Configuration and immutable value types for the verification engine:
//! the deterministic key layout per tier and the content identifier policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deterministic storage keys, derived from the block number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLayout {
    /// Key-value key prefix (default: `block:`).
    pub kv_prefix: String,
    /// Blob object key prefix (default: `blocks/block-`).
    pub blob_prefix: String,
    /// Blob object key suffix (default: `.json`).
    pub blob_suffix: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            kv_prefix: "block:".to_string(),
            blob_prefix: "blocks/block-".to_string(),
            blob_suffix: ".json".to_string(),
        }
    }
}

impl KeyLayout {
    /// Key-value key for a block.
    pub fn kv_key(&self, block_number: u64) -> String {
        format!("{}{}", self.kv_prefix, block_number)
    }

    /// Blob object key for a block.
    pub fn blob_key(&self, block_number: u64) -> String {
        format!("{}{}{}", self.blob_prefix, block_number, self.blob_suffix)
    }
}

/// Accepted shape of content identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CidPolicy {
    /// Accepted prefixes (CIDv0 `Qm`, CIDv1 base32 `bafy`/`bafk`).
    pub prefixes: Vec<String>,
}

impl Default for CidPolicy {
    fn default() -> Self {
        Self {
            prefixes: vec!["Qm".to_string(), "bafy".to_string(), "bafk".to_string()],
        }
    }
}

impl CidPolicy {
    /// Whether `cid` looks like a content identifier this deployment mints.
    pub fn is_plausible(&self, cid: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| cid.len() > prefix.len() && cid.starts_with(prefix.as_str()))
    }
}

/// Configuration for the verification engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Storage key layout.
    pub keys: KeyLayout,
    /// Content identifier policy.
    pub cids: CidPolicy,
    /// Content type written with repaired blob objects.
    pub blob_content_type: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            keys: KeyLayout::default(),
            cids: CidPolicy::default(),
            blob_content_type: "application/json".to_string(),
        }
    }
}

impl VerificationConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keys.kv_prefix.is_empty() {
            return Err(ConfigError::InvalidKeyLayout("kv_prefix cannot be empty".into()));
        }
        if self.keys.blob_prefix.is_empty() {
            return Err(ConfigError::InvalidKeyLayout(
                "blob_prefix cannot be empty".into(),
            ));
        }
        if self.cids.prefixes.is_empty() || self.cids.prefixes.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidCidPolicy(
                "at least one non-empty prefix is required".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unusable key layout.
    #[error("invalid key layout: {0}")]
    InvalidKeyLayout(String),
    /// Unusable content identifier policy.
    #[error("invalid content identifier policy: {0}")]
    InvalidCidPolicy(String),
}
