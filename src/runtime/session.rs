//! Single-owner event loop.
//!
//! A [`Session`] owns the controller together with everything that produces
//! events for it: the clock, the tickers the controller asked for, and the
//! outstanding send. It is the only place where actions are executed.
//!
//! The clock is any [`Scheduler`]: the default [`VirtualScheduler`] makes
//! `advance` return immediately, while a [`WallScheduler`](crate::timing::WallScheduler)
//! blocks until the requested time has really passed.
//!
//! # Loop
//!
//! ```text
//! advance(by) ─► clock.pop_due ─► Wake::ProgressTick ─► Event::ProgressTick ─┐
//!                                 Wake::CooldownTick ─► Event::CooldownTick ─┤
//!                                 Wake::Resume ───────► poll send ───────────┤
//!                                                                            ▼
//!                                        execute actions ◄── handle_event(controller)
//! ```

use super::ScriptStep;
use crate::app::{handle_event, Action, Event, InteractionController, TimerKind};
use crate::domain::{HoldSendError, Result};
use crate::timing::{Scheduler, TimerHandle, VirtualScheduler, Wake};
use crate::ui::SendButtonViewModel;
use crate::worker::{Notifier, RequestId, SendOutcome, SimulatedNotifier};
use crate::Config;
use futures_util::future::BoxFuture;
use futures_util::task::noop_waker;
use futures_util::FutureExt;
use std::collections::HashMap;
use std::task::{Context, Poll};
use std::time::Duration;

/// A send handed to the notifier whose outcome has not arrived yet.
struct InFlight {
    request_id: RequestId,
    outcome: BoxFuture<'static, SendOutcome>,
}

/// Owner of one controller and the machinery driving it.
pub struct Session<S: Scheduler = VirtualScheduler> {
    controller: InteractionController,
    clock: S,
    notifier: Box<dyn Notifier>,
    tickers: HashMap<TimerKind, TimerHandle>,
    in_flight: Option<InFlight>,
    revision: u64,
}

impl Session {
    /// Builds a session on a fresh virtual clock with the simulated notifier
    /// described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] if the configuration is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_clock(config, VirtualScheduler::new())
    }
}

impl<S: Scheduler> Session<S> {
    /// Builds a session on `clock` with the simulated notifier described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] if the configuration is invalid.
    pub fn with_clock(config: &Config, clock: S) -> Result<Self> {
        let controller = InteractionController::from_config(config)?;
        let notifier = SimulatedNotifier::new(
            clock.clone(),
            config.send_latency()?,
            SendOutcome::from(!config.simulate_failure),
        );
        Ok(Self::with_parts(controller, clock, Box::new(notifier)))
    }

    /// Builds a session from explicit parts.
    ///
    /// The notifier should schedule its completion on `clock` (for example via
    /// [`Scheduler::sleep`]); a future that never gets a
    /// [`Wake::Resume`] is only polled when the clock next stops.
    #[must_use]
    pub fn with_parts(
        controller: InteractionController,
        clock: S,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            controller,
            clock,
            notifier,
            tickers: HashMap::new(),
            in_flight: None,
            revision: 0,
        }
    }

    #[must_use]
    pub const fn controller(&self) -> &InteractionController {
        &self.controller
    }

    #[must_use]
    pub const fn clock(&self) -> &S {
        &self.clock
    }

    /// Current time on the session clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Incremented every time observable state changes.
    ///
    /// A rendering layer can compare revisions to decide whether to redraw.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether a send is waiting for its outcome.
    #[must_use]
    pub const fn has_send_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn view_model(&self) -> SendButtonViewModel {
        SendButtonViewModel::from_controller(&self.controller)
    }

    /// Feeds one event to the controller and executes the resulting actions.
    ///
    /// Returns whether observable state changed, including changes caused by
    /// follow-up events (such as a send resolving immediately).
    ///
    /// # Errors
    ///
    /// Propagates unrecoverable errors from the event handler.
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        let (changed, actions) = handle_event(&mut self.controller, &event)?;
        if changed {
            self.revision += 1;
        }

        let mut follow_up_changed = false;
        for action in actions {
            follow_up_changed |= self.execute(action)?;
        }

        Ok(changed || follow_up_changed)
    }

    /// Reports a press of the control.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn press_start(&mut self) -> Result<bool> {
        self.dispatch(Event::PressStart)
    }

    /// Reports the release of the control.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn press_end(&mut self) -> Result<bool> {
        self.dispatch(Event::PressEnd)
    }

    /// Asks for the send of a completed hold.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn try_send(&mut self) -> Result<bool> {
        self.dispatch(Event::TrySend)
    }

    /// Clears a settled (or completed) interaction.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn reset(&mut self) -> Result<bool> {
        self.dispatch(Event::Reset)
    }

    /// Starts the heart regeneration countdown.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn start_cooldown(&mut self) -> Result<bool> {
        self.dispatch(Event::StartCooldown)
    }

    /// Abandons the current interaction and any outstanding send.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn teardown(&mut self) -> Result<bool> {
        self.dispatch(Event::Teardown)
    }

    /// Moves time forward by `by`, delivering every wake-up due on the way.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::ClockOverflow`] if the target time does not fit
    /// in a `Duration`; otherwise see [`dispatch`](Self::dispatch).
    pub fn advance(&mut self, by: Duration) -> Result<()> {
        let now = self.clock.now();
        let deadline = now
            .checked_add(by)
            .ok_or(HoldSendError::ClockOverflow { now, by })?;
        let _span = tracing::debug_span!("advance", from = ?now, to = ?deadline).entered();

        while let Some(wake) = self.clock.pop_due(deadline) {
            match wake {
                Wake::ProgressTick => {
                    self.dispatch(Event::ProgressTick)?;
                }
                Wake::CooldownTick => {
                    self.dispatch(Event::CooldownTick)?;
                }
                Wake::Resume => {
                    self.poll_send()?;
                }
            }
        }

        self.poll_send()?;
        Ok(())
    }

    /// Replays one scripted step.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn run_step(&mut self, step: ScriptStep) -> Result<()> {
        tracing::info!(%step, now = ?self.clock.now(), "running step");
        match step {
            ScriptStep::Press => self.press_start().map(drop),
            ScriptStep::Release => self.press_end().map(drop),
            ScriptStep::Send => self.try_send().map(drop),
            ScriptStep::Reset => self.reset().map(drop),
            ScriptStep::Cooldown => self.start_cooldown().map(drop),
            ScriptStep::Teardown => self.teardown().map(drop),
            ScriptStep::Wait(by) => self.advance(by),
        }
    }

    fn execute(&mut self, action: Action) -> Result<bool> {
        tracing::trace!(?action, "executing action");

        match action {
            Action::StartTicker { timer, interval } => {
                let wake = match timer {
                    TimerKind::Progress => Wake::ProgressTick,
                    TimerKind::Cooldown => Wake::CooldownTick,
                };
                let handle = self.clock.schedule_repeating(interval, wake);
                if let Some(previous) = self.tickers.insert(timer, handle) {
                    self.clock.cancel(previous);
                }
                Ok(false)
            }
            Action::CancelTicker(timer) => {
                if let Some(handle) = self.tickers.remove(&timer) {
                    self.clock.cancel(handle);
                }
                Ok(false)
            }
            Action::DispatchSend(request) => {
                let outcome = self.notifier.send(&request);
                if let Some(stale) = self.in_flight.replace(InFlight {
                    request_id: request.id,
                    outcome,
                }) {
                    tracing::warn!(request_id = %stale.request_id, "replaced a send that was still in flight");
                }
                self.poll_send()
            }
            Action::CancelSend { request_id } => {
                if self
                    .in_flight
                    .as_ref()
                    .is_some_and(|in_flight| in_flight.request_id == request_id)
                {
                    self.in_flight = None;
                    tracing::debug!(request_id = %request_id, "send cancelled");
                }
                Ok(false)
            }
        }
    }

    /// Polls the outstanding send once and reports its outcome if it is ready.
    fn poll_send(&mut self) -> Result<bool> {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return Ok(false);
        };

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let Poll::Ready(outcome) = in_flight.outcome.poll_unpin(&mut cx) else {
            return Ok(false);
        };

        let request_id = in_flight.request_id;
        self.in_flight = None;
        tracing::debug!(request_id = %request_id, ?outcome, "send resolved");
        self.dispatch(Event::SendResolved { request_id, outcome })
    }
}

impl<S: Scheduler> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("controller", &self.controller)
            .field("now", &self.clock.now())
            .field("tickers", &self.tickers)
            .field("send_in_flight", &self.in_flight.as_ref().map(|f| f.request_id))
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
