pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod observability;
pub mod server;
pub mod signals;
pub mod storage;
pub mod tracker;
pub mod views;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize the process-wide log subscriber
///
/// `RUST_LOG` overrides `log_level`. In JSON mode event fields are flattened,
/// so correlated log lines carry `trace_id` and `span_id` at the top level.
///
/// Can only be called once per process.
pub fn init_tracing(cfg: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cfg.log_format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_target(true),
            )
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
