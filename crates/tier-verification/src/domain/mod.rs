//! # Domain Layer
//!
//! Pure domain logic for tier verification. No I/O happens here.
//!
//! ## Modules
//!
//! - `tier` - The storage tiers and their repair priority
//! - `config` - Key layout, content identifier policy, engine configuration
//! - `results` - Per-block verification results and run summaries
//! - `status` - Read-only status report types
//! - `errors` - Domain error types

pub mod config;
pub mod errors;
pub mod results;
pub mod status;
pub mod tier;
