//! Tracing subscriber setup.

use super::tracer;
use crate::infrastructure::paths;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber.
///
/// Events are always printed to stderr. With `trace_export` enabled, spans are
/// additionally exported as OTLP JSON to `<data dir>/holdsend-otlp.json`.
///
/// The filter comes from `RUST_LOG` when set, then `config.trace_level`, then
/// `"info"`. An unparsable directive falls back to the default level.
///
/// Observability is optional: if the trace directory cannot be created the
/// export layer is skipped with a warning, and calling this more than once
/// leaves the first subscriber in place.
///
/// ```rust
/// use holdsend::observability::init_tracing;
/// use holdsend::Config;
///
/// init_tracing(&Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// });
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let (otel_layer, export_error) = if config.trace_export {
        match export_file() {
            Ok(trace_file) => {
                let resource = Resource::new(vec![
                    KeyValue::new("service.name", "holdsend"),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ]);
                let provider = tracer::create_tracer_provider(trace_file, resource);
                (Some(OpenTelemetryLayer::new(provider.tracer("holdsend"))), None)
            }
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .is_ok();

    if let Some(e) = export_error {
        tracing::warn!(error = %e, "trace export disabled");
    }
    if initialized {
        tracing::debug!(export = config.trace_export, "tracing initialized");
    }
}

fn export_file() -> crate::Result<std::path::PathBuf> {
    let trace_file = paths::trace_file()?;
    if let Some(dir) = trace_file.parent() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(trace_file)
}
