//! Background batch span processor
//!
//! Closing a span only pushes the record onto an unbounded channel; a
//! background task groups records into batches and hands them to every
//! configured exporter:
//! - when the batch reaches `batch_size`
//! - when `flush_interval` elapses with spans pending
//! - on an explicit [`TelemetrySink::force_flush`]
//!
//! Export failures are logged and the batch is dropped.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

use super::exporter::SpanExporter;
use super::sink::TelemetrySink;
use super::span::SpanRecord;

#[derive(Debug)]
enum ProcessorMessage {
    Span(SpanRecord),
    Flush(oneshot::Sender<()>),
}

/// Handle to the batch task. Cheap to clone.
#[derive(Clone)]
pub struct BatchSpanProcessor {
    sender: mpsc::UnboundedSender<ProcessorMessage>,
}

impl BatchSpanProcessor {
    /// Spawn the batch task on the current runtime
    ///
    /// ```ignore
    /// let processor = BatchSpanProcessor::spawn(
    ///     vec![Arc::new(ConsoleExporter)],
    ///     64,
    ///     Duration::from_millis(500),
    /// );
    /// ```
    pub fn spawn(
        exporters: Vec<Arc<dyn SpanExporter>>,
        batch_size: usize,
        flush_interval: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let batch_size = batch_size.max(1);
        // tokio intervals panic on a zero period
        let flush_interval = flush_interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            processor_task(exporters, rx, batch_size, flush_interval).await;
        });

        Self { sender: tx }
    }
}

#[async_trait]
impl TelemetrySink for BatchSpanProcessor {
    fn on_span_end(&self, span: SpanRecord) {
        // The task only goes away with the runtime; nothing to do if it has.
        let _ = self.sender.send(ProcessorMessage::Span(span));
    }

    async fn force_flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(ProcessorMessage::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn processor_task(
    exporters: Vec<Arc<dyn SpanExporter>>,
    mut rx: mpsc::UnboundedReceiver<ProcessorMessage>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut batch: Vec<SpanRecord> = Vec::with_capacity(batch_size);

    // First tick one interval from now, not immediately
    let mut flush_timer =
        tokio::time::interval_at(tokio::time::Instant::now() + flush_interval, flush_interval);
    flush_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Some(ProcessorMessage::Span(span)) => {
                        batch.push(span);
                        if batch.len() >= batch_size {
                            export_batch(&exporters, &mut batch).await;
                        }
                    }
                    Some(ProcessorMessage::Flush(done)) => {
                        export_batch(&exporters, &mut batch).await;
                        let _ = done.send(());
                    }
                    // Every handle dropped
                    None => {
                        export_batch(&exporters, &mut batch).await;
                        break;
                    }
                }
            }

            _ = flush_timer.tick() => {
                export_batch(&exporters, &mut batch).await;
            }
        }
    }

    tracing::info!("Span processor shutting down");
}

async fn export_batch(exporters: &[Arc<dyn SpanExporter>], batch: &mut Vec<SpanRecord>) {
    if batch.is_empty() {
        return;
    }

    for exporter in exporters {
        let start = Instant::now();
        match exporter.export(batch).await {
            Ok(()) => {
                tracing::debug!(
                    exporter = exporter.name(),
                    count = batch.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Exported span batch"
                );
            }
            Err(e) => {
                tracing::warn!(
                    exporter = exporter.name(),
                    error = %e,
                    count = batch.len(),
                    "Failed to export span batch"
                );
            }
        }
    }

    batch.clear();
}
