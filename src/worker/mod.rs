//! The asynchronous send seam.
//!
//! The controller never performs the send itself. It emits a
//! [`SendRequest`] which the runtime hands to a [`Notifier`]; the resolved
//! [`SendOutcome`] comes back to the controller as an event.
//!
//! - `messages`: request/outcome types with trace context propagation
//! - `notifier`: the [`Notifier`] trait and the simulated implementation

pub mod messages;
pub mod notifier;

pub use messages::{RequestId, SendOutcome, SendRequest, TraceContext};
pub use notifier::{Notifier, SimulatedNotifier};
