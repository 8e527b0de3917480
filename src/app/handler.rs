//! Event handling and state transition logic.
//!
//! This module implements the event handler that processes gesture signals,
//! timer wake-ups and send results, translating them into controller
//! transitions and action sequences.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the rendering layer or from the runtime (timers, sends)
//! 2. [`handle_event`] pattern-matches the event type
//! 3. State mutations occur via `InteractionController` methods
//! 4. Actions are collected and returned for execution
//!
//! Rejected transitions are recovered here: they are logged and turned into
//! "nothing changed, nothing to do".
//!
//! # Example
//!
//! ```rust
//! use holdsend::app::{handle_event, Event, InteractionController};
//! use holdsend::Config;
//!
//! let mut controller = InteractionController::from_config(&Config::default())?;
//! let (changed, actions) = handle_event(&mut controller, &Event::PressStart)?;
//! assert!(changed);
//! assert_eq!(actions.len(), 1);
//!
//! // Sending before the hold completed is rejected as a no-op.
//! let (changed, actions) = handle_event(&mut controller, &Event::TrySend)?;
//! assert!(!changed);
//! assert!(actions.is_empty());
//! # Ok::<(), holdsend::HoldSendError>(())
//! ```

use super::{Action, InteractionController};
use crate::domain::Result;
use crate::worker::{RequestId, SendOutcome};

/// Events triggered by the rendering layer, timers or the send seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The control was pressed.
    PressStart,
    /// The control was released.
    PressEnd,
    /// The caller observed a completed hold and asks for the send.
    TrySend,
    /// The caller displayed a settled result and wants a fresh interaction.
    Reset,
    /// Starts the heart regeneration countdown.
    StartCooldown,
    /// The interaction is torn down (e.g. the app went to the background).
    Teardown,
    /// A progress tick fired.
    ProgressTick,
    /// A cooldown second elapsed.
    CooldownTick,
    /// The notifier finished a send.
    SendResolved {
        request_id: RequestId,
        outcome: SendOutcome,
    },
}

/// Processes an event, mutates controller state, and returns actions to execute.
///
/// # Returns
///
/// `(changed, actions)`: whether any observable state changed (a re-render hint)
/// and the side effects to perform in order.
///
/// # Errors
///
/// Rejections never surface as errors. The `Result` carries only failures
/// that cannot be recovered locally, of which the controller currently has none.
///
/// # Tracing
///
/// Each call creates a debug-level span with the event type.
pub fn handle_event(controller: &mut InteractionController, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    let before = controller.observe();

    let outcome = match *event {
        Event::PressStart => controller.press_start(),
        Event::PressEnd => controller.press_end(),
        Event::TrySend => controller.try_send(),
        Event::Reset => controller.reset(),
        Event::StartCooldown => Ok(controller.start_cooldown()),
        Event::Teardown => Ok(controller.teardown()),
        Event::ProgressTick => controller.progress_tick(),
        Event::CooldownTick => Ok(controller.cooldown_tick()),
        Event::SendResolved { request_id, outcome } => controller.send_resolved(request_id, outcome),
    };

    let actions = match outcome {
        Ok(actions) => actions,
        Err(e) if e.is_rejection() => {
            tracing::debug!(error = %e, phase = %controller.phase(), "event rejected");
            return Ok((false, vec![]));
        }
        Err(e) => return Err(e),
    };

    let changed = controller.observe() != before;
    if !changed && actions.is_empty() {
        tracing::trace!("event had no effect");
    }

    Ok((changed, actions))
}
