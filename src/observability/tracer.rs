//! Tracer provider exporting finished spans to a local OTLP JSON file.

use super::file_writer::FileWriter;
use super::span_formatter::SpanFormatter;
use futures_util::future::{self, BoxFuture};
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::{Config as TraceConfig, TracerProvider};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writes each export batch as one OTLP JSON line.
struct FileSpanExporter {
    writer: FileWriter,
    formatter: SpanFormatter,
    is_shutdown: AtomicBool,
}

impl FileSpanExporter {
    const fn new(file_path: PathBuf, resource: Resource) -> Self {
        Self {
            writer: FileWriter::new(file_path),
            formatter: SpanFormatter::new(resource),
            is_shutdown: AtomicBool::new(false),
        }
    }
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let line = self.formatter.format_batch(&batch).to_string();
        let result = self
            .writer
            .write_line(&line)
            .map_err(|e| TraceError::from(e.to_string()));
        Box::pin(future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }

    // The resource is fixed at construction.
    fn set_resource(&mut self, _resource: &Resource) {}
}

impl std::fmt::Debug for FileSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSpanExporter")
            .field("writer", &self.writer)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}

/// Creates a provider that exports every span synchronously as it ends.
///
/// The simple (non-batching) exporter needs no async runtime, which suits a
/// single-threaded CLI.
pub fn create_tracer_provider(file_path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter::new(file_path, resource.clone());

    TracerProvider::builder()
        .with_config(TraceConfig::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::task::noop_waker;
    use opentelemetry::KeyValue;
    use std::future::Future;
    use std::task::{Context, Poll};
    use tempfile::TempDir;

    fn resolve(mut fut: BoxFuture<'static, ExportResult>) -> ExportResult {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(result) => result,
            Poll::Pending => panic!("export future should be ready immediately"),
        }
    }

    #[test]
    fn export_writes_one_line_per_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("holdsend-otlp.json");
        let resource = Resource::new(vec![KeyValue::new("service.name", "holdsend")]);
        let mut exporter = FileSpanExporter::new(path.clone(), resource);

        assert!(resolve(exporter.export(vec![])).is_ok());
        assert!(resolve(exporter.export(vec![])).is_ok());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert!(first["resourceSpans"].is_array());
    }

    #[test]
    fn export_after_shutdown_fails() {
        let dir = TempDir::new().unwrap();
        let mut exporter = FileSpanExporter::new(dir.path().join("t.json"), Resource::empty());
        exporter.shutdown();
        assert!(resolve(exporter.export(vec![])).is_err());
        assert!(!dir.path().join("t.json").exists());
    }
}
