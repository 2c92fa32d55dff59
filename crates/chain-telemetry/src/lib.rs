//! # Chain Telemetry
//!
//! Logging and metrics for the ledger rehydrator.
//!
//! ## Components
//!
//! - **Logs**: `tracing` subscriber with an `EnvFilter` and a pretty or JSON layer
//! - **Metrics**: Prometheus registry scraped through the gateway's `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chain_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::from_env())?;
//! chain_telemetry::record_block_verification("ok");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LEDGER_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `LEDGER_JSON_LOGS` | `false` (`true` in containers) | JSON log output |
//! | `LEDGER_CONSOLE_OUTPUT` | `true` | Console output |
//! | `LEDGER_SERVICE_NAME` | `ledger-rehydrator` | Service name |

mod config;
mod metrics;
mod tracing_setup;

pub use config::{parse_flag, TelemetryConfig};
pub use metrics::{
    encode_metrics, observe_run_duration, record_block_verification, record_rehydration,
    record_run, register_metrics, BLOCK_VERIFICATIONS, REGISTRY, TIER_REHYDRATIONS,
    VERIFICATION_RUNS, VERIFICATION_RUN_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics and the global tracing subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    // Metrics first so nothing recorded during startup is lost
    register_metrics()?;
    tracing_setup::init_tracing(config)
}
