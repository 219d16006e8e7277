//! OTLP/HTTP JSON trace exporter
//!
//! Batches are encoded as an OTLP `ExportTraceServiceRequest` in its JSON
//! mapping and POSTed to `{endpoint}/v1/traces`. Jaeger, Tempo and the
//! OpenTelemetry Collector all accept this format on port 4318.
//!
//! ```json
//! {
//!   "resourceSpans": [{
//!     "resource": {
//!       "attributes": [{"key": "service.name", "value": {"stringValue": "course-catalog-service"}}]
//!     },
//!     "scopeSpans": [{
//!       "scope": {"name": "course-catalog"},
//!       "spans": [...]
//!     }]
//!   }]
//! }
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::exporter::SpanExporter;
use super::span::{SpanEvent, SpanKind, SpanRecord, SpanStatus};
use crate::error::{AppError, ExportError};

const SCOPE_NAME: &str = "course-catalog";

pub struct OtlpHttpExporter {
    client: reqwest::Client,
    traces_url: String,
    service_name: String,
}

impl OtlpHttpExporter {
    /// `endpoint` is the collector base URL, e.g. `http://localhost:4318`
    pub fn new(
        endpoint: &str,
        service_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Exporter(e.to_string()))?;

        Ok(Self {
            client,
            traces_url: traces_url(endpoint),
            service_name: service_name.into(),
        })
    }

    pub fn traces_url(&self) -> &str {
        &self.traces_url
    }
}

#[async_trait]
impl SpanExporter for OtlpHttpExporter {
    fn name(&self) -> &'static str {
        "otlp-http"
    }

    async fn export(&self, batch: &[SpanRecord]) -> Result<(), ExportError> {
        let body = format_batch(&self.service_name, batch);

        let response = self
            .client
            .post(&self.traces_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

fn traces_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with("/v1/traces") {
        base.to_string()
    } else {
        format!("{}/v1/traces", base)
    }
}

/// Encode a batch as an OTLP JSON document
pub fn format_batch(service_name: &str, batch: &[SpanRecord]) -> Value {
    let spans: Vec<Value> = batch.iter().map(format_span).collect();

    json!({
        "resourceSpans": [{
            "resource": {
                "attributes": [
                    { "key": "service.name", "value": { "stringValue": service_name } }
                ]
            },
            "scopeSpans": [{
                "scope": {
                    "name": SCOPE_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
                "spans": spans
            }]
        }]
    })
}

fn format_span(span: &SpanRecord) -> Value {
    let (status_code, status_message) = match &span.status {
        SpanStatus::Unset => (0, String::new()),
        SpanStatus::Ok => (1, String::new()),
        SpanStatus::Error(message) => (2, message.clone()),
    };

    json!({
        "traceId": span.trace_id,
        "spanId": span.span_id,
        "parentSpanId": span.parent_span_id.clone().unwrap_or_default(),
        "name": span.name,
        "kind": span_kind_to_int(span.kind),
        "startTimeUnixNano": span.start_time.to_string(),
        "endTimeUnixNano": span.end_time.to_string(),
        "attributes": format_attributes(&span.attributes),
        "events": span.events.iter().map(format_event).collect::<Vec<_>>(),
        "status": {
            "code": status_code,
            "message": status_message,
        },
    })
}

/// Internal: 1, Server: 2
fn span_kind_to_int(kind: SpanKind) -> u8 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
    }
}

fn format_event(event: &SpanEvent) -> Value {
    json!({
        "timeUnixNano": event.timestamp.to_string(),
        "name": event.name,
        "attributes": format_attributes(&event.attributes),
    })
}

fn format_attributes(attributes: &serde_json::Map<String, Value>) -> Vec<Value> {
    attributes
        .iter()
        .map(|(key, value)| {
            json!({
                "key": key,
                "value": format_attribute_value(value),
            })
        })
        .collect()
}

/// OTLP encodes 64-bit integers as strings
fn format_attribute_value(value: &Value) -> Value {
    match value {
        Value::Bool(b) => json!({ "boolValue": b }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "intValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        Value::String(s) => json!({ "stringValue": s }),
        other => json!({ "stringValue": other.to_string() }),
    }
}
