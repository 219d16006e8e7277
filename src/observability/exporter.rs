//! Span exporters
//!
//! An exporter ships a finished batch somewhere. Exporters are only ever
//! called from the batch processor task, never on the request path.

use async_trait::async_trait;
use std::io::Write;

use super::span::SpanRecord;
use crate::error::ExportError;

#[async_trait]
pub trait SpanExporter: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &'static str;

    async fn export(&self, batch: &[SpanRecord]) -> Result<(), ExportError>;
}

/// Writes each span as one JSON line on stdout
#[derive(Debug, Default)]
pub struct ConsoleExporter;

#[async_trait]
impl SpanExporter for ConsoleExporter {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn export(&self, batch: &[SpanRecord]) -> Result<(), ExportError> {
        let mut out = Vec::new();
        for span in batch {
            serde_json::to_writer(&mut out, span)?;
            out.push(b'\n');
        }

        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(&out)?;
        lock.flush()?;
        Ok(())
    }
}
