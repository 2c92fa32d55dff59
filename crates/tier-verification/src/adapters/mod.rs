//! # Adapters Module
//!
//! Concrete implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `memory`: in-memory tiers with access counters and failure injection
//! - `file`: directory-backed tier for local deployments
//! - `content`: directory-backed content store, write-through and index
//! - `http`: IPFS gateway reads and the write-through client (feature `http`)
//! - `chain`: chain metadata sources
//! - `infra`: clocks

pub mod chain;
pub mod content;
pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod infra;
pub mod memory;

pub use chain::{KvChainMetadata, StaticChainMetadata, CHAIN_METADATA_KEY};
pub use content::{mint_content_id, FileContentStore};
pub use file::{FileTier, ObjectMetadata};
#[cfg(feature = "http")]
pub use http::{HttpGatewayTier, HttpWriteThrough};
pub use infra::{FixedTimeSource, SystemTimeSource};
pub use memory::{InMemoryContentStore, InMemoryTier, StoredObject};
