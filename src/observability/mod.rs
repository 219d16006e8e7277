//! Request observability for the catalog service
//!
//! - **Spans**: every request gets a server span, handlers add child spans.
//!   Spans are closed by an RAII guard and handed to the telemetry sinks.
//! - **Logs**: structured [`LogEvent`]s carrying the active span's ids,
//!   written through `tracing` and mirrored to the sinks.
//! - **Export**: a background batch processor ships closed spans to the
//!   console and/or an OTLP/HTTP collector.
//!
//! ```text
//! handler ──SpanGuard drop──▶ ObservabilityContext ──▶ TelemetrySink(s)
//!                                                         │
//!                                         BatchSpanProcessor (tokio task)
//!                                                         │
//!                                          ConsoleExporter / OtlpHttpExporter
//! ```

pub mod context;
pub mod exporter;
pub mod log;
pub mod otlp;
pub mod processor;
pub mod sink;
pub mod span;

use std::sync::Arc;
use std::time::Duration;

pub use context::{ObservabilityContext, SpanGuard};
pub use exporter::{ConsoleExporter, SpanExporter};
pub use log::{LogEvent, LogLevel};
pub use otlp::OtlpHttpExporter;
pub use processor::BatchSpanProcessor;
pub use sink::TelemetrySink;
pub use span::{SpanContext, SpanKind, SpanRecord, SpanStatus};

use crate::config::ObservabilityConfig;
use crate::error::AppError;

/// Build the process-wide context from configuration
///
/// Must be called inside a tokio runtime: when any exporter is configured a
/// batch processor task is spawned.
pub fn build_context(cfg: &ObservabilityConfig) -> Result<ObservabilityContext, AppError> {
    let mut exporters: Vec<Arc<dyn SpanExporter>> = Vec::new();

    if cfg.console_exporter {
        exporters.push(Arc::new(ConsoleExporter));
    }

    if let Some(endpoint) = &cfg.trace_endpoint {
        let exporter = OtlpHttpExporter::new(
            endpoint,
            cfg.service_name.clone(),
            Duration::from_millis(cfg.export_timeout_ms),
        )?;
        tracing::info!(endpoint = %exporter.traces_url(), "OTLP trace export enabled");
        exporters.push(Arc::new(exporter));
    }

    let mut builder = ObservabilityContext::builder(cfg.service_name.clone());

    if exporters.is_empty() {
        tracing::info!("No span exporters configured, spans are not exported");
    } else {
        let processor = BatchSpanProcessor::spawn(
            exporters,
            cfg.batch_size,
            Duration::from_millis(cfg.flush_interval_ms),
        );
        builder = builder.sink(Arc::new(processor));
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_context_exports_to_collector_on_flush() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/traces");
                then.status(200);
            })
            .await;

        let cfg = ObservabilityConfig {
            trace_endpoint: Some(server.base_url()),
            flush_interval_ms: 60_000,
            ..ObservabilityConfig::default()
        };
        let ctx = build_context(&cfg).unwrap();

        {
            let root = ctx.root_span("request-tracker");
            let _child = ctx.child_span(&root, "render-home");
        }
        ctx.flush().await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_collector_does_not_fail() {
        let cfg = ObservabilityConfig {
            // Nothing listens on the discard port
            trace_endpoint: Some("http://127.0.0.1:9".to_string()),
            export_timeout_ms: 200,
            ..ObservabilityConfig::default()
        };
        let ctx = build_context(&cfg).unwrap();

        drop(ctx.root_span("request-tracker"));
        ctx.flush().await;
    }

    #[tokio::test]
    async fn test_no_exporters() {
        let ctx = build_context(&ObservabilityConfig::default()).unwrap();
        assert_eq!(ctx.service_name(), "course-catalog-service");

        drop(ctx.root_span("render-home"));
        ctx.flush().await;
    }
}
