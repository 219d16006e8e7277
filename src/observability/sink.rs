//! Telemetry sink abstraction
//!
//! The [`ObservabilityContext`](super::ObservabilityContext) fans span and log
//! notifications out to every registered sink. Implementations must not block:
//! they are called inline on the request path.

use async_trait::async_trait;

use super::log::LogEvent;
use super::span::{SpanContext, SpanRecord};

#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Called when a span scope opens
    fn on_span_start(&self, _span: &SpanContext) {}

    /// Called exactly once when a span scope closes
    fn on_span_end(&self, span: SpanRecord);

    /// Called for every structured log event emitted through the context
    fn on_log(&self, _event: &LogEvent) {}

    /// Push any buffered data to its destination
    async fn force_flush(&self) {}
}
