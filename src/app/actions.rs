//! Actions representing side effects to be executed by the runtime.
//!
//! The event handler returns a `Vec<Action>` after processing each event. The
//! controller itself never touches the scheduler or the notifier; the runtime
//! executes these actions in order and feeds the results back as events.
//!
//! # Example
//!
//! ```rust
//! use holdsend::app::{Action, TimerKind};
//! use std::time::Duration;
//!
//! let actions = vec![
//!     Action::CancelTicker(TimerKind::Progress),
//!     Action::StartTicker { timer: TimerKind::Cooldown, interval: Duration::from_secs(1) },
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use crate::worker::{RequestId, SendRequest};
use std::time::Duration;

/// The recurring timers a controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Hold progress ticks.
    Progress,
    /// One-second cooldown ticks.
    Cooldown,
}

/// Commands the runtime executes on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Starts delivering ticks for `timer` every `interval`.
    ///
    /// Replaces any ticker of the same kind that is still scheduled.
    StartTicker {
        timer: TimerKind,
        interval: Duration,
    },

    /// Stops delivering ticks for `timer`.
    CancelTicker(TimerKind),

    /// Hands the request to the notifier.
    DispatchSend(SendRequest),

    /// Drops the outstanding send; its result must never reach the controller.
    CancelSend {
        request_id: RequestId,
    },
}
