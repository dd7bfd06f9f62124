// Prometheus counters for the pipeline, exposed at GET /metrics.

use lazy_static::lazy_static;
use prometheus::{register_int_counter, IntCounter};

lazy_static! {
    pub static ref GENERATION_REQUESTS: IntCounter = register_int_counter!(
        "taas_generation_requests_total",
        "Pipeline runs started"
    )
    .unwrap();
    pub static ref GENERATION_FAILURES: IntCounter = register_int_counter!(
        "taas_generation_failures_total",
        "Pipeline runs that failed before a file was usable"
    )
    .unwrap();
    pub static ref EXECUTIONS: IntCounter = register_int_counter!(
        "taas_executions_total",
        "Test files handed to the external runner"
    )
    .unwrap();
    pub static ref CLEANUP_DELETIONS: IntCounter = register_int_counter!(
        "taas_cleanup_deleted_files_total",
        "Test files removed by the age-based sweeper"
    )
    .unwrap();
}

/// Render all registered metrics in the Prometheus text format.
pub fn render() -> String {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buf) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_register_and_render() {
        GENERATION_REQUESTS.inc();
        let body = render();
        assert!(body.contains("taas_generation_requests_total"));
    }
}
