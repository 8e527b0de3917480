//! View model for the hold-to-send button.
//!
//! The view model is computed from the controller and holds display-ready
//! data only. A rendering layer draws from it and never reads the controller
//! directly.
//!
//! # Example
//!
//! ```rust
//! use holdsend::ui::{ButtonStatus, SendButtonViewModel};
//! use holdsend::{Config, InteractionController};
//!
//! let controller = InteractionController::from_config(&Config::default())?;
//! let vm = SendButtonViewModel::from_controller(&controller);
//! assert_eq!(vm.status, ButtonStatus::Ready);
//! assert_eq!(vm.timer_text, "01:00");
//! assert!(vm.send_enabled);
//! # Ok::<(), holdsend::HoldSendError>(())
//! ```

use crate::app::{InteractionController, Phase};
use std::fmt;

/// Label shown on the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStatus {
    /// Nothing in progress, a heart is available.
    Ready,
    /// The control is held and progress is filling.
    Holding,
    /// The send is outstanding.
    Sending,
    Sent,
    Failed,
    /// Idle with an empty pool.
    NoHearts,
}

impl ButtonStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "SEND",
            Self::Holding => "Hold…",
            Self::Sending => "Sending…",
            Self::Sent => "Sent",
            Self::Failed => "Failed",
            Self::NoHearts => "No hearts",
        }
    }
}

impl fmt::Display for ButtonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complete view model for one button.
#[derive(Debug, Clone, PartialEq)]
pub struct SendButtonViewModel {
    /// Hold progress in `[0, 1]`.
    pub progress: f64,

    /// Whether the progress bar is drawn (while holding or once completed).
    pub show_progress_bar: bool,

    pub progress_complete: bool,
    pub sending: bool,
    pub send_succeeded: bool,

    pub hearts_available: u32,
    pub hearts_capacity: u32,

    pub cooldown_running: bool,
    pub cooldown_remaining_seconds: u32,

    /// Cooldown countdown formatted as `MM:SS`.
    pub timer_text: String,

    /// Whether the button accepts a new interaction.
    pub send_enabled: bool,

    pub status: ButtonStatus,
}

impl SendButtonViewModel {
    #[must_use]
    pub fn from_controller(controller: &InteractionController) -> Self {
        let state = controller.observe();

        let status = match state.phase {
            Phase::Sending => ButtonStatus::Sending,
            Phase::Settled if state.send_succeeded => ButtonStatus::Sent,
            Phase::Settled => ButtonStatus::Failed,
            Phase::Holding => ButtonStatus::Holding,
            Phase::Idle | Phase::Completed if state.available == 0 => ButtonStatus::NoHearts,
            Phase::Idle | Phase::Completed => ButtonStatus::Ready,
        };

        Self {
            progress: state.progress,
            show_progress_bar: matches!(state.phase, Phase::Holding | Phase::Completed),
            progress_complete: state.progress_complete,
            sending: state.sending,
            send_succeeded: state.send_succeeded,
            hearts_available: state.available,
            hearts_capacity: state.capacity,
            cooldown_running: state.cooldown_running,
            cooldown_remaining_seconds: state.cooldown_remaining_seconds,
            timer_text: format_timer(state.cooldown_remaining_seconds),
            send_enabled: controller.send_enabled(),
            status,
        }
    }
}

/// Formats whole seconds as `MM:SS`. Minutes are not capped at 59.
#[must_use]
pub fn format_timer(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{RequestId, SendOutcome};
    use crate::Config;

    fn controller(config: Config) -> InteractionController {
        InteractionController::from_config(&Config {
            hold_duration_secs: 0.02,
            tick_interval_secs: 0.01,
            ..config
        })
        .unwrap()
    }

    fn complete_hold(c: &mut InteractionController) {
        c.press_start().unwrap();
        while !c.interaction().progress_complete {
            c.progress_tick().unwrap();
        }
    }

    #[test]
    fn formats_timer_text() {
        assert_eq!(format_timer(0), "00:00");
        assert_eq!(format_timer(59), "00:59");
        assert_eq!(format_timer(60), "01:00");
        assert_eq!(format_timer(125), "02:05");
        assert_eq!(format_timer(6000), "100:00");
    }

    #[test]
    fn idle_controller_is_ready() {
        let vm = SendButtonViewModel::from_controller(&controller(Config::default()));
        assert_eq!(vm.status, ButtonStatus::Ready);
        assert!(!vm.show_progress_bar);
        assert_eq!(vm.hearts_available, 5);
        assert_eq!(vm.hearts_capacity, 5);
        assert_eq!(vm.cooldown_remaining_seconds, 60);
    }

    #[test]
    fn empty_pool_disables_sending() {
        let vm = SendButtonViewModel::from_controller(&controller(Config {
            initial_available: Some(0),
            ..Config::default()
        }));
        assert_eq!(vm.status, ButtonStatus::NoHearts);
        assert!(!vm.send_enabled);
        assert_eq!(vm.status.to_string(), "No hearts");
    }

    #[test]
    fn holding_shows_progress_bar() {
        let mut c = controller(Config::default());
        c.press_start().unwrap();
        c.progress_tick().unwrap();

        let vm = SendButtonViewModel::from_controller(&c);
        assert_eq!(vm.status, ButtonStatus::Holding);
        assert!(vm.show_progress_bar);
        assert!((vm.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sending_then_failed() {
        let mut c = controller(Config::default());
        complete_hold(&mut c);

        let vm = SendButtonViewModel::from_controller(&c);
        assert_eq!(vm.status, ButtonStatus::Sending);
        assert!(vm.sending);
        assert!(!vm.send_enabled);

        let id = c.outstanding_request().unwrap();
        c.send_resolved(id, SendOutcome::Failed).unwrap();
        let vm = SendButtonViewModel::from_controller(&c);
        assert_eq!(vm.status, ButtonStatus::Failed);
        assert_eq!(vm.hearts_available, 5);
    }

    #[test]
    fn delivered_send_reads_sent() {
        let mut c = controller(Config {
            auto_cooldown: false,
            ..Config::default()
        });
        complete_hold(&mut c);
        c.send_resolved(RequestId(1), SendOutcome::Delivered).unwrap();

        let vm = SendButtonViewModel::from_controller(&c);
        assert_eq!(vm.status, ButtonStatus::Sent);
        assert!(vm.send_succeeded);
        assert_eq!(vm.hearts_available, 4);
        assert!(!vm.cooldown_running);
    }
}
