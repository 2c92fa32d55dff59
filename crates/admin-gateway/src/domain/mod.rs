//! Domain layer for the admin gateway.

pub mod config;
pub mod envelope;
pub mod error;

pub use config::{AdminConfig, ConfigError, GatewayConfig, HttpConfig, LimitsConfig, StorageConfig};
pub use envelope::ApiEnvelope;
pub use error::{ApiError, GatewayError};
