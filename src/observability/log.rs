//! Structured log events correlated with spans
//!
//! A [`LogEvent`] is written to the `tracing` log stream (JSON in production)
//! with the ids of the span that was active when it was emitted, so log lines
//! can be joined with exported traces on `trace_id`/`span_id`. The common
//! context fields become top-level keys; `course` and any other field are
//! written as JSON-encoded strings.

use serde::Serialize;
use serde_json::{Map, Value};

use super::span::SpanContext;

// Event levels must be constants at the callsite, so each arm expands its own.
macro_rules! emit {
    ($level:expr, $message:expr, $f:expr) => {
        tracing::event!(
            $level,
            trace_id = $f.trace_id,
            span_id = $f.span_id,
            client_ip = $f.client_ip,
            course_code = $f.course_code,
            error = $f.error,
            total_courses = $f.total_courses,
            course = $f.course.as_deref(),
            extra = $f.extra.as_deref(),
            "{}",
            $message
        )
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub fields: Map<String, Value>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            trace_id: None,
            span_id: None,
            fields: Map::new(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// Attach an extra context field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Correlate with the given span
    pub fn in_span(mut self, span: &SpanContext) -> Self {
        self.trace_id = Some(span.trace_id.clone());
        self.span_id = Some(span.span_id.clone());
        self
    }

    /// Write the event to the `tracing` log stream
    pub(crate) fn write(&self) {
        let f = self.tracing_fields();

        match self.level {
            LogLevel::Debug => emit!(tracing::Level::DEBUG, self.message, f),
            LogLevel::Info => emit!(tracing::Level::INFO, self.message, f),
            LogLevel::Warn => emit!(tracing::Level::WARN, self.message, f),
            LogLevel::Error => emit!(tracing::Level::ERROR, self.message, f),
        }
    }

    /// Split the context fields into the typed keys the log stream knows
    /// and a JSON-encoded `extra` string for anything else
    fn tracing_fields(&self) -> TracingFields<'_> {
        let mut fields = TracingFields {
            trace_id: self.trace_id.as_deref().unwrap_or(""),
            span_id: self.span_id.as_deref().unwrap_or(""),
            ..TracingFields::default()
        };
        let mut extra = Map::new();

        for (key, value) in &self.fields {
            match (key.as_str(), value) {
                ("client_ip", Value::String(s)) => fields.client_ip = Some(s.as_str()),
                ("course_code", Value::String(s)) => fields.course_code = Some(s.as_str()),
                ("error", Value::String(s)) => fields.error = Some(s.as_str()),
                ("total_courses", Value::Number(n)) if n.is_u64() => {
                    fields.total_courses = n.as_u64()
                }
                ("course", Value::Object(_)) => fields.course = Some(value.to_string()),
                _ => {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }

        if !extra.is_empty() {
            fields.extra = Some(Value::Object(extra).to_string());
        }
        fields
    }
}

#[derive(Debug, Default)]
struct TracingFields<'a> {
    trace_id: &'a str,
    span_id: &'a str,
    client_ip: Option<&'a str>,
    course_code: Option<&'a str>,
    error: Option<&'a str>,
    total_courses: Option<u64>,
    course: Option<String>,
    extra: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_fields() {
        let event = LogEvent::info("Course catalog accessed.")
            .field("total_courses", 3)
            .field("client_ip", "127.0.0.1");

        assert_eq!(event.level, LogLevel::Info);
        assert_eq!(event.fields.get("total_courses").and_then(|v| v.as_u64()), Some(3));
        assert!(event.trace_id.is_none());
    }

    #[test]
    fn test_in_span_copies_ids() {
        let span = SpanContext::new_root("request-tracker");
        let event = LogEvent::warn("Course not found.").in_span(&span);

        assert_eq!(event.trace_id.as_deref(), Some(span.trace_id.as_str()));
        assert_eq!(event.span_id.as_deref(), Some(span.span_id.as_str()));
    }

    #[test]
    fn test_level_serializes_uppercase() {
        let json = serde_json::to_value(LogEvent::error("x")).unwrap();
        assert_eq!(json["level"], "ERROR");
    }

    #[test]
    fn test_known_fields_become_typed_keys() {
        let event = LogEvent::info("Course catalog accessed.")
            .field("total_courses", 2)
            .field("client_ip", "10.0.0.1")
            .field("course", serde_json::json!({"code": "CS101"}))
            .field("referrer", "home");

        let f = event.tracing_fields();

        assert_eq!(f.total_courses, Some(2));
        assert_eq!(f.client_ip, Some("10.0.0.1"));
        assert_eq!(f.course.as_deref(), Some(r#"{"code":"CS101"}"#));
        assert_eq!(f.extra.as_deref(), Some(r#"{"referrer":"home"}"#));
        assert!(f.error.is_none());
    }

    #[test]
    fn test_no_extra_when_all_fields_known() {
        let event = LogEvent::error("Error adding course.").field("error", "boom");

        let f = event.tracing_fields();

        assert_eq!(f.error, Some("boom"));
        assert!(f.extra.is_none());
        assert_eq!(f.trace_id, "");
    }
}
