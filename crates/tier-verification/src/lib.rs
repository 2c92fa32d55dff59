//! # Tier Verification Engine
//!
//! Every ledger block is replicated across three heterogeneous storage tiers.
//! Tiers drift apart over time (quota eviction, pinning failures, partial
//! writes); this crate detects the drift and repairs it.
//!
//! ```text
//!                    ┌──────────────┐
//!   verify_all ────→ │ Orchestrator │──── per block, sequential ────┐
//!                    └──────────────┘                               ↓
//!                                                        ┌──────────────────┐
//!   status_all ──→ StatusReporter (read-only)            │  BlockVerifier   │
//!                                                        │ KV → R2 → IPFS   │
//!                                                        └────────┬─────────┘
//!                                                                 ↓ partial presence
//!                                                        ┌──────────────────┐
//!                                                        │ RehydrationEngine│
//!                                                        └──────────────────┘
//! ```
//!
//! ## Tiers
//!
//! | Tier | Role | Key |
//! |------|------|-----|
//! | KV   | fast authoritative key-value store | `block:{n}` |
//! | R2   | durable blob store (optional)       | `blocks/block-{n}.json` |
//! | IPFS | content-addressed store             | content identifier |
//!
//! ## Guarantees
//!
//! - A block absent from every tier is reported `failed` and nothing is written.
//! - Repair only fills absence; the one exception is refreshing the KV copy's
//!   `storage` metadata when it does not record the identifier the content
//!   copy lives under (a freshly minted one, or one found through the index).
//! - Tier failures are recorded per tier and never abort a block check.
//! - One verification run at a time per service; status scans are unguarded.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Tier kinds, results, status report, configuration, errors
//! - `ports/` - Inbound API and outbound tier/collaborator traits
//! - `adapters/` - In-memory and file-backed tiers, the local content store, HTTP tiers
//! - `service/` - Verifier, rehydration engine, orchestrator, status reporter
//!
//! ## Usage
//!
//! ```ignore
//! use tier_verification::{BlockVerificationApi, VerificationConfig, VerificationService};
//!
//! let service = VerificationService::new(deps, VerificationConfig::default());
//! let summary = service.verify_all().await?;
//! println!("{} rehydrated", summary.rehydrated);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::config::{CidPolicy, ConfigError, KeyLayout, VerificationConfig};
pub use domain::errors::{TierError, VerificationError};
pub use domain::results::{
    BlockVerificationResult, RehydratedTiers, TierCheck, VerificationStatus, VerificationSummary,
};
pub use domain::status::{BlockStatusEntry, ContentIdState, StatusReport, StatusSummary};
pub use domain::tier::TierKind;
pub use ports::inbound::BlockVerificationApi;
pub use ports::outbound::{
    BlockWriteThrough, ChainMetadataSource, ContentIndex, PutOptions, StorageTier, TimeSource,
    VerificationDependencies,
};
pub use service::{parse_block_number, VerificationService};
