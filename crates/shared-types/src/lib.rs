//! # Shared Types Crate
//!
//! The persisted ledger record and the collaborator payloads that cross the
//! boundary between the verification engine and the rest of the system.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: The block record is defined once, here.
//! - **Lossless Round-Trips**: Fields this crate does not model are kept in
//!   `extra` maps so a repaired copy is byte-for-byte equivalent JSON.
//! - **Immutable Content**: Only `storage` metadata may change after creation.

pub mod entities;

pub use entities::*;
