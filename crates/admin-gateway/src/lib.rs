//! # Admin Gateway
//!
//! HTTP surface of the ledger rehydrator: an admin-gated API over the tier
//! verification engine.
//!
//! ```text
//!   request ─→ Trace → Timeout ─→ AdminAuthorized ─→ handler ─→ BlockVerificationApi
//!                                   │ 401 / 500 (unconfigured)
//!                                   └─ no tier access on rejection
//! ```
//!
//! # Status Codes
//!
//! | Condition | Status |
//! |-----------|--------|
//! | success (including per-block failures) | 200 |
//! | malformed block number, chain not initialized | 400 |
//! | missing or wrong secret | 401 |
//! | a verification run is already active | 409 |
//! | admin secret not configured, unexpected failure | 500 |
//!
//! # Usage
//!
//! ```ignore
//! use admin_gateway::{AdminGatewayService, GatewayConfig};
//!
//! let config = GatewayConfig::from_env()?;
//! let service = AdminGatewayService::new(config, api)?;
//! service.run(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod service;
pub mod wiring;

pub use domain::{ApiEnvelope, ApiError, ConfigError, GatewayConfig, GatewayError};
pub use middleware::{AdminGate, ADMIN_SECRET_HEADER};
pub use service::{build_router, AdminGatewayService, AppState};
pub use wiring::build_dependencies;
