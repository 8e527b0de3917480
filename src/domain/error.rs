//! Error types for the hold-to-send controller.
//!
//! This module defines the centralized error type [`HoldSendError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! Two variants describe rejected interactions rather than failures:
//! [`HoldSendError::InvalidTransition`] and [`HoldSendError::ResourceExhausted`].
//! The event handler recovers from both locally by treating the rejected event as
//! a no-op, so they never escape [`crate::app::handle_event`].

use crate::app::Phase;
use thiserror::Error;

/// The main error type for hold-to-send operations.
///
/// # Examples
///
/// ```
/// use holdsend::{HoldSendError, Phase};
///
/// let err = HoldSendError::InvalidTransition { operation: "try_send", phase: Phase::Idle };
/// assert_eq!(err.to_string(), "try_send is not allowed while idle");
/// assert!(err.is_rejection());
/// ```
#[derive(Debug, Error)]
pub enum HoldSendError {
    /// An operation was invoked outside of the phase where it is legal.
    ///
    /// For example `try_send` before the hold completed, or a new hold while a
    /// send is still outstanding.
    #[error("{operation} is not allowed while {phase}")]
    InvalidTransition {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Phase the controller was in when the operation arrived.
        phase: Phase,
    },

    /// The heart pool is empty, so no hold may lead to a send.
    #[error("no hearts available")]
    ResourceExhausted,

    /// Configuration is invalid or missing.
    ///
    /// The string describes the specific configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A platform directory could not be determined.
    #[error("Path error: {0}")]
    Path(String),

    /// Advancing the clock would move it past the largest representable time.
    #[error("cannot advance the clock by {by:?} from {now:?}")]
    ClockOverflow {
        /// Clock time when the advance was requested.
        now: std::time::Duration,
        /// Requested advance.
        by: std::time::Duration,
    },

    /// A demo script step could not be parsed.
    #[error("Script error: {0}")]
    Script(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML configuration file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl HoldSendError {
    /// Returns `true` for errors that only mean "this event was rejected".
    ///
    /// Rejections leave every piece of state untouched and are recovered by
    /// the caller as a no-op.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. } | Self::ResourceExhausted)
    }
}

/// A specialized `Result` type for hold-to-send operations.
pub type Result<T> = std::result::Result<T, HoldSendError>;
