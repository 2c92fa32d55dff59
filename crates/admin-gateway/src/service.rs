//! Admin gateway service - routes, handlers and server lifecycle.
//!
//! | Method | Path | Auth | Handler |
//! |--------|------|------|---------|
//! | POST | `/verify-all` | admin | full verification run |
//! | POST | `/verify/:block_number` | admin | single-block run |
//! | GET | `/status` | admin | read-only coverage scan |
//! | GET | `/health` | none | liveness |
//! | GET | `/metrics` | none | Prometheus exposition |

use crate::domain::config::GatewayConfig;
use crate::domain::envelope::ApiEnvelope;
use crate::domain::error::{ApiError, GatewayError};
use crate::middleware::auth::{AdminAuthorized, AdminGate};
use axum::{
    extract::{FromRef, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tier_verification::{
    parse_block_number, BlockVerificationApi, BlockVerificationResult, StatusReport, TierKind,
    VerificationError, VerificationSummary,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared handler state
#[derive(Clone, FromRef)]
pub struct AppState {
    /// Verification engine
    pub api: Arc<dyn BlockVerificationApi>,
    /// Admin secret gate
    pub gate: Arc<AdminGate>,
}

/// Admin gateway service
pub struct AdminGatewayService {
    config: GatewayConfig,
    api: Arc<dyn BlockVerificationApi>,
}

impl AdminGatewayService {
    /// Create the service. Fails on invalid configuration.
    pub fn new(
        config: GatewayConfig,
        api: Arc<dyn BlockVerificationApi>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        if config.admin.secret.is_none() {
            // Not fatal: privileged requests fail closed with a configuration error
            tracing::warn!("admin secret not configured; privileged endpoints will reject requests");
        }

        Ok(Self { config, api })
    }

    /// Configuration in use
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Router with middleware applied
    pub fn router(&self) -> Router {
        let state = AppState {
            api: Arc::clone(&self.api),
            gate: Arc::new(AdminGate::new(
                self.config.admin.secret.clone(),
                self.config.limits.max_body_bytes,
            )),
        };

        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.limits.request_timeout()));

        build_router(state).layer(middleware)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// On shutdown the engine is signalled first so an in-flight full run
    /// stops at the next block boundary, then open connections drain.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let api = Arc::clone(&self.api);
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        info!(addr = %addr, "Starting admin gateway");

        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Received shutdown signal");
                api.shutdown();
            })
            .await;

        if let Err(e) = result {
            error!(error = %e, "HTTP server error");
            return Err(GatewayError::Serve(e.to_string()));
        }

        info!("Admin gateway stopped");
        Ok(())
    }
}

/// Build the route table over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/verify-all", post(verify_all))
        .route("/verify/:block_number", post(verify_block))
        .route("/status", get(status))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn verify_all(
    State(api): State<Arc<dyn BlockVerificationApi>>,
    _auth: AdminAuthorized,
) -> Result<Json<ApiEnvelope<VerificationSummary>>, ApiError> {
    match api.verify_all().await {
        Ok(summary) => {
            summary.results.iter().for_each(record_result);
            let outcome = if summary.cancelled {
                "cancelled"
            } else {
                "completed"
            };
            chain_telemetry::record_run(outcome);
            chain_telemetry::observe_run_duration(summary.duration_ms as f64 / 1000.0);
            Ok(Json(ApiEnvelope::ok(summary)))
        }
        Err(e) => {
            if e == VerificationError::RunInProgress {
                chain_telemetry::record_run("rejected");
            }
            Err(e.into())
        }
    }
}

async fn verify_block(
    State(api): State<Arc<dyn BlockVerificationApi>>,
    Path(raw): Path<String>,
    _auth: AdminAuthorized,
) -> Result<Json<ApiEnvelope<BlockVerificationResult>>, ApiError> {
    let block_number = parse_block_number(&raw)?;
    let result = api.verify_single(block_number).await?;
    record_result(&result);
    Ok(Json(ApiEnvelope::ok(result)))
}

async fn status(
    State(api): State<Arc<dyn BlockVerificationApi>>,
    _auth: AdminAuthorized,
) -> Result<Json<ApiEnvelope<StatusReport>>, ApiError> {
    let report = api.status_all().await?;
    Ok(Json(ApiEnvelope::ok(report)))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(ApiEnvelope::ok(serde_json::json!({
        "status": "ok",
        "service": "ledger-rehydrator",
        "version": env!("CARGO_PKG_VERSION")
    })))
}

async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let body =
        chain_telemetry::encode_metrics().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

fn record_result(result: &BlockVerificationResult) {
    chain_telemetry::record_block_verification(result.status.as_str());
    for tier in TierKind::ALL {
        if let Some(success) = result.rehydrated.get(tier) {
            chain_telemetry::record_rehydration(tier.as_str(), success);
        }
    }
}
