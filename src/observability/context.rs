//! Per-process observability context
//!
//! Built once at startup and carried in the router state. Every span opened
//! through it is wrapped in a [`SpanGuard`] which closes the span when dropped,
//! so a span can never outlive its scope, whichever way the scope exits.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::log::LogEvent;
use super::sink::TelemetrySink;
use super::span::{SpanContext, SpanRecord, SpanStatus};

#[derive(Clone)]
pub struct ObservabilityContext {
    inner: Arc<Inner>,
}

struct Inner {
    service_name: String,
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl ObservabilityContext {
    pub fn builder(service_name: impl Into<String>) -> ObservabilityContextBuilder {
        ObservabilityContextBuilder {
            service_name: service_name.into(),
            sinks: Vec::new(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    /// Open a root (server) span
    pub fn root_span(&self, name: impl Into<String>) -> SpanGuard {
        self.open(SpanContext::new_root(name))
    }

    /// Open a span nested under `parent`
    pub fn child_span(&self, parent: &SpanContext, name: impl Into<String>) -> SpanGuard {
        self.open(parent.child(name))
    }

    /// Take ownership of an already-built span and start tracking it
    pub fn open(&self, span: SpanContext) -> SpanGuard {
        for sink in &self.inner.sinks {
            sink.on_span_start(&span);
        }
        SpanGuard {
            span: Some(span),
            ctx: self.clone(),
        }
    }

    /// Emit a structured log event to the log stream and every sink
    pub fn log(&self, event: LogEvent) {
        event.write();
        for sink in &self.inner.sinks {
            sink.on_log(&event);
        }
    }

    /// Flush every sink, waiting for buffered spans to be exported
    pub async fn flush(&self) {
        for sink in &self.inner.sinks {
            sink.force_flush().await;
        }
    }

    fn close(&self, span: SpanContext) {
        let record = SpanRecord::from_context(span);
        if let Some((last, rest)) = self.inner.sinks.split_last() {
            for sink in rest {
                sink.on_span_end(record.clone());
            }
            last.on_span_end(record);
        }
    }
}

pub struct ObservabilityContextBuilder {
    service_name: String,
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl ObservabilityContextBuilder {
    pub fn sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> ObservabilityContext {
        ObservabilityContext {
            inner: Arc::new(Inner {
                service_name: self.service_name,
                sinks: self.sinks,
            }),
        }
    }
}

/// An open span. Closed and handed to the sinks on drop.
pub struct SpanGuard {
    span: Option<SpanContext>,
    ctx: ObservabilityContext,
}

impl SpanGuard {
    /// Mark the span failed: records an `exception` event and sets error status
    pub fn fail<E>(&mut self, error: &E)
    where
        E: std::error::Error + ?Sized,
    {
        self.record_error(error);
        self.set_status(SpanStatus::Error(error.to_string()));
    }

    /// Close the span now instead of at end of scope
    pub fn end(self) {}
}

impl Deref for SpanGuard {
    type Target = SpanContext;

    fn deref(&self) -> &SpanContext {
        self.span.as_ref().expect("span is open until the guard is dropped")
    }
}

impl DerefMut for SpanGuard {
    fn deref_mut(&mut self) -> &mut SpanContext {
        self.span.as_mut().expect("span is open until the guard is dropped")
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            self.ctx.close(span);
        }
    }
}
