//! Logging and trace export.
//!
//! Every component logs through `tracing`. This module installs the
//! subscriber: a console layer on stderr and, when `trace_export` is enabled,
//! an OpenTelemetry layer writing spans to a local file.
//!
//! ```text
//! tracing ─┬─► fmt layer ─► stderr
//!          └─► tracing-opentelemetry ─► OpenTelemetry SDK ─► FileSpanExporter ─► JSON lines
//! ```
//!
//! The trace file rotates at 10 MB and keeps three backups.
//!
//! # Modules
//!
//! - `init`: subscriber setup
//! - `tracer`: tracer provider with the file exporter
//! - `span_formatter`: OTLP JSON serialization
//! - `file_writer`: rotating file writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::init_tracing;
