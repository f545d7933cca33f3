//! Prometheus metrics exporter.
//!
//! Installs the global `metrics` recorder and describes the counters the
//! workflow and the repository emit. The rendered text is served at
//! `GET /metrics`.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the Prometheus recorder and return a handle for rendering.
///
/// # Errors
///
/// Returns error if the exporter cannot be built or a recorder is already
/// installed.
pub fn install() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "reservations_submitted_total",
        "Reservation forms received"
    );
    describe_counter!(
        "reservations_rejected_total",
        "Submissions that failed field validation"
    );
    describe_counter!(
        "reservations_persisted_total",
        "Reservations stored and staged for the summary"
    );
    describe_counter!(
        "reservations_failed_total",
        "Submissions that were malformed or could not be stored, by reason"
    );
    describe_counter!(
        "reservation_summaries_shown_total",
        "Reservation summaries shown"
    );
    describe_counter!(
        "reservations_insert_errors_total",
        "Database insert failures, by kind"
    );
    describe_histogram!(
        "reservations_insert_duration_seconds",
        "Time taken to insert a reservation"
    );
}
