//! Request and outcome types crossing the send seam.
//!
//! A [`SendRequest`] is what the controller hands to the runtime when a hold
//! completes; a [`SendOutcome`] is what comes back. Requests carry the tracing
//! context of the span that dispatched them so a network-backed notifier can
//! continue the same trace.

use serde::{Deserialize, Serialize};

/// Distributed tracing context for cross-boundary span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry to maintain
/// trace continuity when the send leaves the owning event loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` if the current span context is invalid or not sampled,
    /// which is always the case when OpenTelemetry export is disabled.
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();

        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if span_context.is_valid() {
            Some(Self {
                trace_id: format!("{:032x}", span_context.trace_id()),
                parent_span_id: format!("{:016x}", span_context.span_id()),
            })
        } else {
            None
        }
    }
}

/// Identifier of one dispatched send, unique per controller.
///
/// Results tagged with an identifier other than the outstanding one are stale
/// (their send was cancelled) and get discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A notification send handed to the runtime for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub id: RequestId,

    /// Trace context for linking spans across the send boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_context: Option<TraceContext>,
}

impl SendRequest {
    /// Creates a request tagged with the current trace context.
    #[must_use]
    pub fn new(id: RequestId) -> Self {
        Self {
            id,
            trace_context: TraceContext::from_current(),
        }
    }
}

/// Result of a resolved send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendOutcome {
    /// The notification reached its peer.
    Delivered,
    /// The notification was not delivered. No heart is spent.
    Failed,
}

impl SendOutcome {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl From<bool> for SendOutcome {
    fn from(success: bool) -> Self {
        if success {
            Self::Delivered
        } else {
            Self::Failed
        }
    }
}
