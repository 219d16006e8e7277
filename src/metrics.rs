use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use crate::error::AppError;

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed for this process.
pub fn init_metrics() -> Result<PrometheusHandle, AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Metrics(e.to_string()))?;

    init_metric_descriptions();

    Ok(handle)
}

fn init_metric_descriptions() {
    describe_counter!(
        "catalog_requests_total",
        "Total number of HTTP requests handled"
    );
    describe_histogram!(
        "catalog_request_duration_seconds",
        "Request duration in seconds"
    );
    describe_counter!(
        "catalog_courses_added_total",
        "Courses successfully added to the catalog"
    );
    describe_counter!(
        "catalog_errors_total",
        "Handler failures by route and kind"
    );
    describe_gauge!("catalog_service_info", "Service version information");

    gauge!("catalog_service_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a finished request
pub fn record_request(method: &str, route: &str, status: u16, duration: Duration) {
    counter!(
        "catalog_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        "catalog_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string(),
    )
    .record(duration.as_secs_f64());
}

pub fn record_course_added() {
    counter!("catalog_courses_added_total").increment(1);
}

/// Record a handler failure, e.g. `("/catalog", "storage_corrupt")`
pub fn record_error(route: &str, kind: &str) {
    counter!(
        "catalog_errors_total",
        "route" => route.to_string(),
        "kind" => kind.to_string(),
    )
    .increment(1);
}
