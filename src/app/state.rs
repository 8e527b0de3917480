//! Interaction controller state and transitions.
//!
//! This module defines [`InteractionController`], the single owner of the
//! interaction flags, the heart pool and both timers. Every mutation goes
//! through one of its methods, which either succeed and return the side
//! effects to perform, or reject the call without touching anything.
//!
//! # State Components
//!
//! - **Interaction**: press, progress and send flags for the current hold
//! - **Pool**: hearts gating sends, spent only on confirmed delivery
//! - **Progress timer**: advances the hold while the control is pressed
//! - **Cooldown timer**: regenerates hearts independently of the hold
//!
//! # Example
//!
//! ```rust
//! use holdsend::app::{InteractionController, Phase};
//! use holdsend::Config;
//!
//! let mut controller = InteractionController::from_config(&Config::default())?;
//! controller.press_start()?;
//! assert_eq!(controller.phase(), Phase::Holding);
//!
//! controller.press_end()?;
//! assert_eq!(controller.phase(), Phase::Idle);
//! assert_eq!(controller.observe().progress, 0.0);
//! # Ok::<(), holdsend::HoldSendError>(())
//! ```

use super::actions::{Action, TimerKind};
use super::modes::Phase;
use crate::domain::{HoldSendError, ResourcePool, Result};
use crate::timing::{CooldownTick, CooldownTimer, ProgressTimer};
use crate::worker::{RequestId, SendOutcome, SendRequest};
use crate::Config;
use std::time::Duration;

/// Interval between cooldown ticks.
const COOLDOWN_TICK: Duration = Duration::from_secs(1);

/// Flags describing the hold currently in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    /// The control is physically pressed.
    pub press_active: bool,

    /// A hold (as opposed to a tap) has been registered.
    pub hold_confirmed: bool,

    /// Fill fraction in `0.0..=1.0`.
    pub progress: f64,

    /// Progress reached one; the send may start.
    pub progress_complete: bool,

    /// The send is outstanding.
    pub sending: bool,

    /// Result of the last resolved send, `None` until one resolves.
    pub send_result: Option<SendOutcome>,
}

impl InteractionState {
    #[must_use]
    pub fn send_succeeded(&self) -> bool {
        self.send_result.is_some_and(SendOutcome::is_success)
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.sending {
            Phase::Sending
        } else if self.send_result.is_some() {
            Phase::Settled
        } else if self.progress_complete {
            Phase::Completed
        } else if self.press_active {
            Phase::Holding
        } else {
            Phase::Idle
        }
    }
}

/// Read-only view of everything the rendering layer may observe.
///
/// Two snapshots compare equal exactly when nothing visible changed, which the
/// event handler uses to decide whether a re-render is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservableState {
    pub phase: Phase,
    pub press_active: bool,
    pub progress: f64,
    pub progress_complete: bool,
    pub sending: bool,
    pub send_succeeded: bool,
    pub available: u32,
    pub capacity: u32,
    pub cooldown_running: bool,
    pub cooldown_remaining_seconds: u32,
}

/// Timing and policy knobs taken from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub hold_duration: Duration,
    pub tick_interval: Duration,
    /// Dispatch the send as soon as the hold completes.
    pub auto_send: bool,
    /// Start the cooldown after a delivered send when it is not running.
    pub auto_cooldown: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            hold_duration: Duration::from_secs(2),
            tick_interval: Duration::from_millis(10),
            auto_send: true,
            auto_cooldown: true,
        }
    }
}

/// Owner of the hold-to-send state machine.
///
/// Methods mirror the inbound events. Rejected calls return
/// [`HoldSendError::InvalidTransition`] or [`HoldSendError::ResourceExhausted`]
/// and leave the controller exactly as it was.
#[derive(Debug, Clone)]
pub struct InteractionController {
    interaction: InteractionState,
    pool: ResourcePool,
    progress_timer: ProgressTimer,
    cooldown: CooldownTimer,
    settings: ControllerSettings,
    outstanding: Option<RequestId>,
    next_request: u64,
}

impl InteractionController {
    /// Creates a controller from explicit parts.
    #[must_use]
    pub fn new(settings: ControllerSettings, pool: ResourcePool, cooldown: CooldownTimer) -> Self {
        Self {
            interaction: InteractionState::default(),
            pool,
            progress_timer: ProgressTimer::new(),
            cooldown,
            settings,
            outstanding: None,
            next_request: 1,
        }
    }

    /// Creates a controller from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] if the configuration is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let settings = ControllerSettings {
            hold_duration: config.hold_duration()?,
            tick_interval: config.tick_interval()?,
            auto_send: config.auto_send,
            auto_cooldown: config.auto_cooldown,
        };
        let pool = ResourcePool::with_available(
            config.capacity,
            config.initial_available.unwrap_or(config.capacity),
        );

        Ok(Self::new(
            settings,
            pool,
            CooldownTimer::new(config.cooldown_period_secs),
        ))
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.interaction.phase()
    }

    #[must_use]
    pub const fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    #[must_use]
    pub const fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    #[must_use]
    pub const fn cooldown(&self) -> &CooldownTimer {
        &self.cooldown
    }

    /// Identifier of the send currently outstanding, if any.
    #[must_use]
    pub const fn outstanding_request(&self) -> Option<RequestId> {
        self.outstanding
    }

    /// Whether the rendering layer should offer the send affordance.
    #[must_use]
    pub const fn send_enabled(&self) -> bool {
        !self.pool.is_empty() && !self.interaction.sending
    }

    /// Snapshot of the observable state.
    #[must_use]
    pub fn observe(&self) -> ObservableState {
        ObservableState {
            phase: self.phase(),
            press_active: self.interaction.press_active,
            progress: self.interaction.progress,
            progress_complete: self.interaction.progress_complete,
            sending: self.interaction.sending,
            send_succeeded: self.interaction.send_succeeded(),
            available: self.pool.available(),
            capacity: self.pool.capacity(),
            cooldown_running: self.cooldown.is_running(),
            cooldown_remaining_seconds: self.cooldown.remaining_seconds(),
        }
    }

    fn reject(&self, operation: &'static str) -> HoldSendError {
        HoldSendError::InvalidTransition {
            operation,
            phase: self.phase(),
        }
    }

    /// Begins (or restarts) a hold.
    ///
    /// # Errors
    ///
    /// - [`HoldSendError::InvalidTransition`] while a send is outstanding or a
    ///   completed hold has not been reset yet
    /// - [`HoldSendError::ResourceExhausted`] when no heart is available
    pub fn press_start(&mut self) -> Result<Vec<Action>> {
        match self.phase() {
            Phase::Idle | Phase::Holding => {}
            Phase::Completed | Phase::Sending | Phase::Settled => {
                return Err(self.reject("press_start"));
            }
        }
        if self.pool.is_empty() {
            return Err(HoldSendError::ResourceExhausted);
        }

        self.interaction.press_active = true;
        self.interaction.hold_confirmed = true;
        self.interaction.progress = 0.0;
        self.progress_timer
            .start(self.settings.hold_duration, self.settings.tick_interval);

        tracing::debug!(hold_duration = ?self.settings.hold_duration, "hold started");

        Ok(vec![Action::StartTicker {
            timer: TimerKind::Progress,
            interval: self.settings.tick_interval,
        }])
    }

    /// Ends the press.
    ///
    /// Aborts the hold when it has not completed yet; a completed hold is not
    /// affected by the release.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches the other transitions.
    pub fn press_end(&mut self) -> Result<Vec<Action>> {
        if self.interaction.progress_complete || !self.interaction.press_active {
            return Ok(vec![]);
        }

        self.progress_timer.stop();
        self.interaction.press_active = false;
        self.interaction.hold_confirmed = false;
        self.interaction.progress = 0.0;

        tracing::debug!("hold released early, aborted");

        Ok(vec![Action::CancelTicker(TimerKind::Progress)])
    }

    /// Applies one progress tick.
    ///
    /// On the completing tick the ticker is cancelled and, with `auto_send`,
    /// the send is dispatched right away.
    ///
    /// # Errors
    ///
    /// Never fails; a tick arriving after the hold ended is ignored.
    pub fn progress_tick(&mut self) -> Result<Vec<Action>> {
        let Some(tick) = self.progress_timer.tick() else {
            return Ok(vec![]);
        };

        self.interaction.progress = tick.progress.max(self.interaction.progress);
        if !tick.completed {
            return Ok(vec![]);
        }

        self.interaction.progress = 1.0;
        self.interaction.progress_complete = true;
        tracing::debug!("hold completed");

        let mut actions = vec![Action::CancelTicker(TimerKind::Progress)];
        if self.settings.auto_send {
            match self.try_send() {
                Ok(send) => actions.extend(send),
                Err(e) => tracing::debug!(error = %e, "automatic send refused"),
            }
        }
        Ok(actions)
    }

    /// Dispatches the send for a completed hold.
    ///
    /// No heart is spent here; that happens in [`send_resolved`](Self::send_resolved)
    /// once delivery is confirmed.
    ///
    /// # Errors
    ///
    /// - [`HoldSendError::InvalidTransition`] unless the hold completed and no
    ///   send has been dispatched for it
    /// - [`HoldSendError::ResourceExhausted`] when the pool is empty
    pub fn try_send(&mut self) -> Result<Vec<Action>> {
        if self.phase() != Phase::Completed {
            return Err(self.reject("try_send"));
        }
        if self.pool.is_empty() {
            return Err(HoldSendError::ResourceExhausted);
        }

        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.outstanding = Some(id);
        self.interaction.sending = true;

        tracing::debug!(request_id = %id, available = self.pool.available(), "send dispatched");

        Ok(vec![Action::DispatchSend(SendRequest::new(id))])
    }

    /// Applies the result of a send.
    ///
    /// A result for any request other than the outstanding one is discarded.
    ///
    /// # Errors
    ///
    /// Never fails; stale results are logged and ignored.
    pub fn send_resolved(&mut self, request_id: RequestId, outcome: SendOutcome) -> Result<Vec<Action>> {
        if self.outstanding != Some(request_id) {
            tracing::warn!(
                request_id = %request_id,
                outstanding = ?self.outstanding,
                "discarding result of a send that is no longer outstanding"
            );
            return Ok(vec![]);
        }

        self.outstanding = None;
        self.interaction.sending = false;
        self.interaction.send_result = Some(outcome);

        let mut actions = vec![];
        if outcome.is_success() {
            if !self.pool.try_consume() {
                tracing::warn!(request_id = %request_id, "send delivered with an empty pool");
            }
            if self.settings.auto_cooldown {
                actions.extend(self.start_cooldown());
            }
        }

        tracing::debug!(
            request_id = %request_id,
            ?outcome,
            available = self.pool.available(),
            "send settled"
        );

        Ok(actions)
    }

    /// Returns the interaction flags to their initial values.
    ///
    /// # Errors
    ///
    /// [`HoldSendError::InvalidTransition`] while a send is outstanding; use
    /// [`teardown`](Self::teardown) to abandon it instead.
    pub fn reset(&mut self) -> Result<Vec<Action>> {
        if self.interaction.sending {
            return Err(self.reject("reset"));
        }

        let mut actions = vec![];
        if self.progress_timer.stop() {
            actions.push(Action::CancelTicker(TimerKind::Progress));
        }
        self.interaction = InteractionState::default();
        tracing::debug!("interaction reset");
        Ok(actions)
    }

    /// Abandons the interaction, cancelling the hold and any outstanding send.
    ///
    /// The pool and the cooldown are left alone.
    pub fn teardown(&mut self) -> Vec<Action> {
        let mut actions = vec![];
        if self.progress_timer.stop() {
            actions.push(Action::CancelTicker(TimerKind::Progress));
        }
        if let Some(request_id) = self.outstanding.take() {
            tracing::debug!(request_id = %request_id, "cancelling outstanding send");
            actions.push(Action::CancelSend { request_id });
        }
        self.interaction = InteractionState::default();
        actions
    }

    /// Starts the cooldown unless it is already running.
    pub fn start_cooldown(&mut self) -> Vec<Action> {
        if !self.cooldown.start() {
            return vec![];
        }
        vec![Action::StartTicker {
            timer: TimerKind::Cooldown,
            interval: COOLDOWN_TICK,
        }]
    }

    /// Applies one cooldown second.
    pub fn cooldown_tick(&mut self) -> Vec<Action> {
        match self.cooldown.tick(&mut self.pool) {
            Some(CooldownTick::Expired { restarted: false, .. }) => {
                vec![Action::CancelTicker(TimerKind::Cooldown)]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(available: u32) -> InteractionController {
        let settings = ControllerSettings {
            hold_duration: Duration::from_millis(40),
            tick_interval: Duration::from_millis(10),
            auto_send: false,
            auto_cooldown: false,
        };
        InteractionController::new(
            settings,
            ResourcePool::with_available(5, available),
            CooldownTimer::new(60),
        )
    }

    fn complete_hold(c: &mut InteractionController) {
        c.press_start().unwrap();
        for _ in 0..4 {
            c.progress_tick().unwrap();
        }
        assert_eq!(c.phase(), Phase::Completed);
    }

    #[test]
    fn full_hold_then_delivery_spends_one_heart() {
        let mut c = controller(5);
        complete_hold(&mut c);
        assert_eq!(c.interaction().progress, 1.0);

        let actions = c.try_send().unwrap();
        let Some(Action::DispatchSend(request)) = actions.first() else {
            panic!("expected a dispatch, got {actions:?}");
        };
        assert_eq!(c.phase(), Phase::Sending);
        assert_eq!(c.pool().available(), 5);

        c.send_resolved(request.id, SendOutcome::Delivered).unwrap();
        assert_eq!(c.phase(), Phase::Settled);
        assert!(c.interaction().send_succeeded());
        assert_eq!(c.pool().available(), 4);

        c.reset().unwrap();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(*c.interaction(), InteractionState::default());
    }

    #[test]
    fn failed_send_spends_nothing() {
        let mut c = controller(3);
        complete_hold(&mut c);
        c.try_send().unwrap();
        let id = c.outstanding_request().unwrap();
        c.send_resolved(id, SendOutcome::Failed).unwrap();

        assert_eq!(c.phase(), Phase::Settled);
        assert!(!c.interaction().send_succeeded());
        assert_eq!(c.pool().available(), 3);
    }

    #[test]
    fn early_release_aborts_without_cost() {
        let mut c = controller(5);
        c.press_start().unwrap();
        c.progress_tick().unwrap();
        assert!(c.interaction().progress > 0.0);

        let actions = c.press_end().unwrap();
        assert_eq!(actions, vec![Action::CancelTicker(TimerKind::Progress)]);
        assert_eq!(c.interaction().progress, 0.0);
        assert!(!c.interaction().hold_confirmed);
        assert_eq!(c.pool().available(), 5);

        assert!(c.progress_tick().unwrap().is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn release_after_completion_keeps_the_hold() {
        let mut c = controller(5);
        complete_hold(&mut c);
        assert!(c.press_end().unwrap().is_empty());
        assert!(c.interaction().progress_complete);
        assert_eq!(c.interaction().progress, 1.0);
    }

    #[test]
    fn try_send_before_completion_is_rejected() {
        let mut c = controller(5);
        let err = c.try_send().unwrap_err();
        assert!(matches!(
            err,
            HoldSendError::InvalidTransition { operation: "try_send", phase: Phase::Idle }
        ));

        c.press_start().unwrap();
        assert!(c.try_send().is_err());
    }

    #[test]
    fn press_while_sending_is_rejected() {
        let mut c = controller(5);
        complete_hold(&mut c);
        c.try_send().unwrap();

        let before = c.observe();
        assert!(c.press_start().unwrap_err().is_rejection());
        assert_eq!(c.observe(), before);
    }

    #[test]
    fn empty_pool_disables_everything() {
        let mut c = controller(0);
        assert!(!c.send_enabled());
        assert!(matches!(c.press_start(), Err(HoldSendError::ResourceExhausted)));
        assert!(c.try_send().is_err());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut c = controller(5);
        complete_hold(&mut c);
        c.try_send().unwrap();
        let id = c.outstanding_request().unwrap();

        let actions = c.teardown();
        assert!(actions.contains(&Action::CancelSend { request_id: id }));
        assert_eq!(c.phase(), Phase::Idle);

        c.send_resolved(id, SendOutcome::Delivered).unwrap();
        assert_eq!(c.pool().available(), 5);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn reset_while_sending_is_rejected() {
        let mut c = controller(5);
        complete_hold(&mut c);
        c.try_send().unwrap();
        assert!(c.reset().is_err());
        assert_eq!(c.phase(), Phase::Sending);
    }

    #[test]
    fn auto_send_dispatches_on_completion() {
        let mut c = controller(5);
        c.settings.auto_send = true;
        c.press_start().unwrap();
        let mut actions = vec![];
        for _ in 0..4 {
            actions.extend(c.progress_tick().unwrap());
        }
        assert!(matches!(actions.last(), Some(Action::DispatchSend(_))));
        assert_eq!(c.phase(), Phase::Sending);
    }

    #[test]
    fn delivery_starts_cooldown_when_enabled() {
        let mut c = controller(5);
        c.settings.auto_cooldown = true;
        complete_hold(&mut c);
        c.try_send().unwrap();
        let id = c.outstanding_request().unwrap();

        let actions = c.send_resolved(id, SendOutcome::Delivered).unwrap();
        assert_eq!(
            actions,
            vec![Action::StartTicker {
                timer: TimerKind::Cooldown,
                interval: COOLDOWN_TICK
            }]
        );
        assert!(c.cooldown().is_running());
    }

    #[test]
    fn cooldown_expiry_on_full_pool_cancels_ticker() {
        let mut c = InteractionController::new(
            ControllerSettings::default(),
            ResourcePool::new(5),
            CooldownTimer::new(2),
        );
        c.start_cooldown();
        assert!(c.cooldown_tick().is_empty());
        assert_eq!(c.cooldown_tick(), vec![Action::CancelTicker(TimerKind::Cooldown)]);
        assert_eq!(c.pool().available(), 5);
        assert!(!c.cooldown().is_running());
    }
}
