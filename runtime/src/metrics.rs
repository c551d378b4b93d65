//! Prometheus metrics for the event aggregate store.
//!
//! Counters and histograms cover the mutation executor (commits, write
//! conflicts, exhausted retries, rejected transforms) and guest code
//! generation. Recording is a no-op until a recorder is installed, so library
//! code records unconditionally.
//!
//! # Example
//!
//! ```rust,no_run
//! use rsvp_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
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

/// Prometheus recorder for the store's metrics.
///
/// Installs the global recorder and renders the exposition text; serving it
/// for scraping belongs to whatever hosts the store.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// A recorder that is not installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., by another test), this logs
    /// a warning and succeeds without a handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this recorder was not the one installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "rsvp_mutations_committed_total",
        "Total number of event mutations committed"
    );
    describe_counter!(
        "rsvp_mutation_conflicts_total",
        "Total number of write conflicts seen by the mutation executor"
    );
    describe_counter!(
        "rsvp_mutation_retries_exhausted_total",
        "Total number of mutations abandoned after exhausting conflict retries"
    );
    describe_counter!(
        "rsvp_mutation_failures_total",
        "Total number of mutations rejected by their transform or the store"
    );
    describe_histogram!(
        "rsvp_mutation_duration_seconds",
        "Time from first read to commit, retries included"
    );
    describe_counter!(
        "rsvp_guest_codes_generated_total",
        "Total number of guest codes assigned to new guests"
    );
}

/// Mutation executor metrics recorder.
pub struct MutationMetrics;

impl MutationMetrics {
    /// Record a committed mutation.
    pub fn record_commit(duration: Duration) {
        counter!("rsvp_mutations_committed_total").increment(1);
        histogram!("rsvp_mutation_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record one write conflict.
    pub fn record_conflict() {
        counter!("rsvp_mutation_conflicts_total").increment(1);
    }

    /// Record a mutation that ran out of retries.
    pub fn record_exhausted() {
        counter!("rsvp_mutation_retries_exhausted_total").increment(1);
    }

    /// Record a mutation that failed for a non-conflict reason.
    pub fn record_failure() {
        counter!("rsvp_mutation_failures_total").increment(1);
    }
}

/// Guest code metrics recorder.
pub struct GuestCodeMetrics;

impl GuestCodeMetrics {
    /// Record a code assigned to a committed guest.
    pub fn record_generated() {
        counter!("rsvp_guest_codes_generated_total").increment(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recorder_creation() {
        let recorder = MetricsRecorder::new();
        assert!(recorder.handle().is_none());
        assert!(recorder.render().is_none());
    }

    #[test]
    fn test_metrics_recorder_render() {
        let mut recorder = MetricsRecorder::new();
        recorder.install().unwrap();

        MutationMetrics::record_commit(Duration::from_millis(3));
        MutationMetrics::record_conflict();
        MutationMetrics::record_exhausted();
        MutationMetrics::record_failure();
        GuestCodeMetrics::record_generated();

        // If another test installed the recorder first, this one has no
        // handle. Metrics are still recorded globally.
        if let Some(rendered) = recorder.render() {
            assert!(rendered.contains("rsvp_mutations_committed_total"));
            assert!(rendered.contains("rsvp_mutation_conflicts_total"));
            assert!(rendered.contains("rsvp_guest_codes_generated_total"));
        }
    }
}
