//! Prometheus metrics for tier verification.
//!
//! All metrics follow the naming convention: `ledger_<metric>_<unit>`
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `ledger_block_verifications_total` | counter | `status` (ok/partial/rehydrated/failed) |
//! | `ledger_tier_rehydrations_total` | counter | `tier` (kv/r2/ipfs), `outcome` (success/failure) |
//! | `ledger_verification_runs_total` | counter | `outcome` (completed/cancelled/rejected) |
//! | `ledger_verification_run_duration_seconds` | histogram | |

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Per-block verification outcomes
    pub static ref BLOCK_VERIFICATIONS: CounterVec = CounterVec::new(
        Opts::new(
            "ledger_block_verifications_total",
            "Blocks verified, by resulting status"
        ),
        &["status"]
    ).expect("metric creation failed");

    /// Tier repair attempts
    pub static ref TIER_REHYDRATIONS: CounterVec = CounterVec::new(
        Opts::new(
            "ledger_tier_rehydrations_total",
            "Tier repair attempts, by tier and outcome"
        ),
        &["tier", "outcome"]
    ).expect("metric creation failed");

    /// Full verification runs
    pub static ref VERIFICATION_RUNS: CounterVec = CounterVec::new(
        Opts::new(
            "ledger_verification_runs_total",
            "Full verification runs, by outcome"
        ),
        &["outcome"]
    ).expect("metric creation failed");

    /// Full run duration
    pub static ref VERIFICATION_RUN_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ledger_verification_run_duration_seconds",
            "Wall-clock duration of full verification runs"
        ).buckets(exponential_buckets(0.01, 2.0, 16).expect("bucket creation failed"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BLOCK_VERIFICATIONS.clone()),
        Box::new(TIER_REHYDRATIONS.clone()),
        Box::new(VERIFICATION_RUNS.clone()),
        Box::new(VERIFICATION_RUN_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Count one verified block.
pub fn record_block_verification(status: &str) {
    BLOCK_VERIFICATIONS.with_label_values(&[status]).inc();
}

/// Count one tier repair attempt.
pub fn record_rehydration(tier: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    TIER_REHYDRATIONS.with_label_values(&[tier, outcome]).inc();
}

/// Count one full run.
pub fn record_run(outcome: &str) {
    VERIFICATION_RUNS.with_label_values(&[outcome]).inc();
}

/// Observe the duration of a full run.
pub fn observe_run_duration(seconds: f64) {
    VERIFICATION_RUN_DURATION.observe(seconds);
}

/// Encode the registry in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
