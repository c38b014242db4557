//! Metrics for the claims bridge.
//!
//! All metrics follow Prometheus naming conventions:
//! - `bridge_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `status`: accepted/rejected/error or success/error
//! - `reason`: one of the fixed rejection / failure codes, or `none`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder.
///
/// Can only succeed once per process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Issuance is a local sign, sub-millisecond in the common case
        .set_buckets_for_metric(
            Matcher::Prefix("bridge_token_issuance".to_string()),
            &[0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record token issuance duration and outcome
///
/// Metric: `bridge_token_issuance_duration_seconds`, `bridge_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str, duration: Duration) {
    histogram!("bridge_token_issuance_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("bridge_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record a claim validation outcome
///
/// Metric: `bridge_token_validations_total`
/// Labels: `status`, `reason`
pub fn record_token_validation(status: &str, reason: Option<&str>) {
    let reason = reason.unwrap_or("none");
    counter!("bridge_token_validations_total", "status" => status.to_string(), "reason" => reason.to_string())
        .increment(1);
}

/// Record a principal resolution outcome
///
/// Metric: `bridge_principal_resolutions_total`
/// Labels: `status`
pub fn record_principal_resolution(status: &str) {
    counter!("bridge_principal_resolutions_total", "status" => status.to_string()).increment(1);
}
