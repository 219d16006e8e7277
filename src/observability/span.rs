//! Span data model for request tracing
//!
//! A [`SpanContext`] is the live, mutable state of a span while its scope is
//! open. When the scope ends it is frozen into a [`SpanRecord`] and handed to
//! the telemetry sinks.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Span kind (subset of the OpenTelemetry kinds used by this service)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Server-side request handling
    Server,
    /// Internal operation inside a request
    Internal,
}

/// Final status of a span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "message", rename_all = "lowercase")]
pub enum SpanStatus {
    Unset,
    Ok,
    Error(String),
}

impl SpanStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, SpanStatus::Error(_))
    }
}

/// A timestamped annotation on a span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanEvent {
    pub name: String,
    pub timestamp: u64,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Live span state
///
/// Each HTTP request creates a root span with a fresh `trace_id`.
/// Handler spans are created with [`SpanContext::child`] and share it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpanContext {
    /// 32 hex chars, shared by every span of a request
    pub trace_id: String,

    /// 16 hex chars
    pub span_id: String,

    /// Parent span ID (None for root spans)
    pub parent_span_id: Option<String>,

    /// Span name (e.g., "request-tracker", "add-course")
    pub name: String,

    pub kind: SpanKind,

    /// Start time (Unix nanoseconds)
    pub start_time: u64,

    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub events: Vec<SpanEvent>,

    pub status: SpanStatus,
}

impl SpanContext {
    /// Create a new root span (typically in the request tracker)
    ///
    /// # Example
    ///
    /// ```ignore
    /// let span = SpanContext::new_root("request-tracker");
    /// tracing::info!(trace_id = %span.trace_id, span_id = %span.span_id, "Request started");
    /// ```
    pub fn new_root(name: impl Into<String>) -> Self {
        Self {
            trace_id: new_trace_id(),
            span_id: new_span_id(),
            parent_span_id: None,
            name: name.into(),
            kind: SpanKind::Server,
            start_time: current_nanos(),
            attributes: serde_json::Map::new(),
            events: Vec::new(),
            status: SpanStatus::Unset,
        }
    }

    /// Create a child span inheriting `trace_id` from this span
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: new_span_id(),
            parent_span_id: Some(self.span_id.clone()),
            name: name.into(),
            kind: SpanKind::Internal,
            start_time: current_nanos(),
            attributes: serde_json::Map::new(),
            events: Vec::new(),
            status: SpanStatus::Unset,
        }
    }

    /// Add an attribute to the span, replacing any previous value for `key`
    ///
    /// ```ignore
    /// span.set_attribute("http.method", "GET");
    /// span.set_attribute("course.count", 3);
    /// ```
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn add_event(&mut self, name: impl Into<String>) {
        self.add_event_with_attributes(name, serde_json::Map::new());
    }

    pub fn add_event_with_attributes(
        &mut self,
        name: impl Into<String>,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) {
        self.events.push(SpanEvent {
            name: name.into(),
            timestamp: current_nanos(),
            attributes,
        });
    }

    /// Record a failure as an `exception` event, following the OpenTelemetry
    /// semantic conventions for exception events.
    pub fn record_error<E>(&mut self, error: &E)
    where
        E: std::error::Error + ?Sized,
    {
        let mut attributes = serde_json::Map::new();
        attributes.insert(
            "exception.type".to_string(),
            short_type_name::<E>().into(),
        );
        attributes.insert("exception.message".to_string(), error.to_string().into());
        self.add_event_with_attributes("exception", attributes);
    }

    pub fn set_status(&mut self, status: SpanStatus) {
        self.status = status;
    }

    /// Calculate elapsed time since span start (in milliseconds)
    pub fn elapsed_ms(&self) -> u64 {
        current_nanos().saturating_sub(self.start_time) / 1_000_000
    }
}

/// A closed span, ready for export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanRecord {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub name: String,
    pub kind: SpanKind,
    pub start_time: u64,
    pub end_time: u64,
    pub duration_ms: u64,
    pub status: SpanStatus,
    pub attributes: serde_json::Map<String, serde_json::Value>,
    pub events: Vec<SpanEvent>,
}

impl SpanRecord {
    /// Close the span now
    pub fn from_context(ctx: SpanContext) -> Self {
        let end_time = current_nanos().max(ctx.start_time);
        let duration_ms = (end_time - ctx.start_time) / 1_000_000;

        Self {
            trace_id: ctx.trace_id,
            span_id: ctx.span_id,
            parent_span_id: ctx.parent_span_id,
            name: ctx.name,
            kind: ctx.kind,
            start_time: ctx.start_time,
            end_time,
            duration_ms,
            status: ctx.status,
            attributes: ctx.attributes,
            events: ctx.events,
        }
    }
}

/// Get current time as Unix nanoseconds
pub fn current_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn new_span_id() -> String {
    // all-zero span ids are invalid in OTLP
    let id = rand::random::<u64>().max(1);
    format!("{:016x}", id)
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_span_creation() {
        let span = SpanContext::new_root("request-tracker");

        assert_eq!(span.name, "request-tracker");
        assert_eq!(span.kind, SpanKind::Server);
        assert!(span.parent_span_id.is_none());
        assert_eq!(span.trace_id.len(), 32);
        assert_eq!(span.span_id.len(), 16);
        assert_eq!(span.status, SpanStatus::Unset);
    }

    #[test]
    fn test_child_span_inherits_trace_id() {
        let root = SpanContext::new_root("root");
        let child = root.child("child");

        assert_eq!(child.trace_id, root.trace_id);
        assert_eq!(child.parent_span_id, Some(root.span_id.clone()));
        assert_eq!(child.kind, SpanKind::Internal);
        assert_ne!(child.span_id, root.span_id);
    }

    #[test]
    fn test_span_attributes_overwrite() {
        let mut span = SpanContext::new_root("test");
        span.set_attribute("course.exists", false);
        span.set_attribute("course.count", 42);
        span.set_attribute("course.exists", true);

        assert_eq!(span.attribute("course.exists"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(span.attribute("course.count").and_then(|v| v.as_i64()), Some(42));
        assert_eq!(span.attributes.len(), 2);
    }

    #[test]
    fn test_record_error_adds_exception_event() {
        let mut span = SpanContext::new_root("test");
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        span.record_error(&err);

        assert_eq!(span.events.len(), 1);
        assert_eq!(span.events[0].name, "exception");
        assert_eq!(
            span.events[0].attributes.get("exception.message").and_then(|v| v.as_str()),
            Some("missing file")
        );
        assert_eq!(
            span.events[0].attributes.get("exception.type").and_then(|v| v.as_str()),
            Some("Error")
        );
    }

    #[test]
    fn test_span_record_creation() {
        let mut span = SpanContext::new_root("test");
        span.set_attribute("http.method", "GET");
        span.add_event("New request tracked");
        span.set_status(SpanStatus::Error("boom".to_string()));
        let span_id = span.span_id.clone();

        let record = SpanRecord::from_context(span);

        assert_eq!(record.span_id, span_id);
        assert!(record.end_time >= record.start_time);
        assert!(record.status.is_error());
        assert_eq!(record.events.len(), 1);
    }

    #[test]
    fn test_elapsed_ms() {
        let span = SpanContext::new_root("test");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(span.elapsed_ms() >= 10);
    }
}
