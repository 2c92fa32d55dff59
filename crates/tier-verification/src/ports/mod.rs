//! # Ports Layer
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (API exposed to the admin gateway)
//! - `outbound.rs` - Driven ports (tiers and collaborators the service needs)

pub mod inbound;
pub mod outbound;
