//! Ledger rehydrator binary.
//!
//! Loads configuration from the environment, wires the storage tiers and
//! serves the admin API until Ctrl+C.

use admin_gateway::{build_dependencies, AdminGatewayService, GatewayConfig};
use anyhow::Context;
use chain_telemetry::{init_telemetry, TelemetryConfig};
use std::sync::Arc;
use tier_verification::VerificationService;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let config = GatewayConfig::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    info!(
        addr = %config.http_addr(),
        data_dir = %config.storage.data_dir.display(),
        blob_enabled = config.storage.blob_enabled,
        "Starting ledger rehydrator"
    );

    let deps = build_dependencies(&config.storage).context("failed to wire storage tiers")?;
    let engine = Arc::new(VerificationService::new(deps, config.verification.clone()));

    let service = AdminGatewayService::new(config, engine)?;
    service.run(shutdown_signal()).await?;

    info!("Ledger rehydrator stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
