//! Holdsend: a press-and-hold to send interaction controller.
//!
//! Holdsend provides the logic behind a "hold to send" button:
//! - Hold progress that fills over a fixed duration and completes exactly once
//! - A pool of hearts that gates sends and is spent only on confirmed delivery
//! - A one-second cooldown countdown regenerating hearts up to capacity
//! - An injected asynchronous send with cancellation on teardown
//! - A deterministic virtual clock so every timing path is testable, and a
//!   wall clock for real-time runs

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Script replay
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Runtime (runtime/)                                 │  ← Single owner
//! │  - Clock wake-ups → events                          │
//! │  - Action execution                                 │
//! │  - Outstanding send future                          │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ App Layer     │   │ Timing        │   │ Worker Layer  │
//! │ (app/)        │   │ (timing/)     │   │ (worker/)     │
//! │ - Controller  │   │ - Scheduler   │   │ - Notifier    │
//! │ - Events      │   │ - Progress    │   │ - Requests    │
//! │ - Actions     │   │ - Cooldown    │   │ - Trace ctx   │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain & UI                                        │
//! │  - Heart pool, errors (domain/)                     │
//! │  - Button view model (ui/)                          │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - Console logging                                  │
//! │  - File-based OTLP export                           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Interaction state machine with event/action model
//! - [`domain`]: Heart pool and error types
//! - [`timing`]: Scheduler seam, virtual and wall clocks, progress and cooldown timers
//! - [`worker`]: The asynchronous send seam
//! - [`runtime`]: Single-owner session loop and demo script parsing
//! - [`ui`]: View model for the rendering layer
//! - [`infrastructure`]: Platform paths
//! - [`observability`]: Console logging and optional OTLP file export
//!
//! # Configuration
//!
//! Configuration is read from TOML; every key is optional:
//!
//! ```toml
//! hold_duration_secs = 2.0
//! tick_interval_secs = 0.01
//! cooldown_period_secs = 60
//! capacity = 5
//! send_latency_secs = 2.0
//! trace_level = "debug"
//! ```
//!
//! # Examples
//!
//! ```rust
//! use holdsend::{initialize, Config};
//! use std::time::Duration;
//!
//! let mut session = initialize(&Config::default())?;
//!
//! session.press_start()?;
//! session.advance(Duration::from_secs(2))?; // hold completes, send dispatched
//! session.advance(Duration::from_secs(2))?; // send resolves
//!
//! let view = session.view_model();
//! assert!(view.send_succeeded);
//! assert_eq!(view.hearts_available, 4);
//! # Ok::<(), holdsend::HoldSendError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Timers Post Wake-ups
//!
//! Timers never mutate state from a callback. The scheduler queues a
//! [`timing::Wake`] that the runtime turns into an [`app::Event`], so the
//! controller is only ever touched by its owner.
//!
//! ## Confirmed Consumption
//!
//! A heart is spent when the send resolves as delivered, never when it is
//! dispatched. A failed or cancelled send costs nothing.

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod runtime;
pub mod timing;
pub mod ui;
pub mod worker;

pub mod observability;

pub use app::{handle_event, Action, Event, InteractionController, Phase};
pub use domain::{HoldSendError, ResourcePool, Result};
pub use runtime::Session;
pub use ui::SendButtonViewModel;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const DEFAULT_HOLD_SECS: f64 = 2.0;
const DEFAULT_TICK_SECS: f64 = 0.01;
const DEFAULT_COOLDOWN_SECS: u32 = 60;
const DEFAULT_CAPACITY: u32 = 5;
const DEFAULT_SEND_LATENCY_SECS: f64 = 2.0;

/// Controller configuration.
///
/// Every field has a default matching the reference behaviour (2 s hold,
/// 10 ms ticks, 60 s cooldown, five hearts, 2 s simulated send).
///
/// # Example
///
/// ```toml
/// hold_duration_secs = 1.5
/// capacity = 3
/// initial_available = 1
/// auto_send = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How long the control must be held. Default: `2.0`
    pub hold_duration_secs: f64,

    /// Interval between progress ticks. Default: `0.01`
    pub tick_interval_secs: f64,

    /// Seconds per regenerated heart. Default: `60`
    pub cooldown_period_secs: u32,

    /// Maximum number of hearts. Default: `5`
    pub capacity: u32,

    /// Hearts available at startup, clamped to `capacity`. Default: full.
    pub initial_available: Option<u32>,

    /// Latency of the simulated send. Default: `2.0`
    pub send_latency_secs: f64,

    /// Make the simulated send fail instead of deliver. Default: `false`
    pub simulate_failure: bool,

    /// Dispatch the send as soon as a hold completes. Default: `true`
    pub auto_send: bool,

    /// Start the cooldown after each delivered send. Default: `true`
    pub auto_cooldown: bool,

    /// Tracing filter directive. `RUST_LOG` takes precedence. Default: `"info"`
    pub trace_level: Option<String>,

    /// Export spans as OTLP JSON into the data directory. Default: `false`
    pub trace_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hold_duration_secs: DEFAULT_HOLD_SECS,
            tick_interval_secs: DEFAULT_TICK_SECS,
            cooldown_period_secs: DEFAULT_COOLDOWN_SECS,
            capacity: DEFAULT_CAPACITY,
            initial_available: None,
            send_latency_secs: DEFAULT_SEND_LATENCY_SECS,
            simulate_failure: false,
            auto_send: true,
            auto_cooldown: true,
            trace_level: None,
            trace_export: false,
        }
    }
}

/// Converts seconds to a `Duration`, rounding to the nearest nanosecond.
fn secs_to_duration(name: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(HoldSendError::Config(format!(
            "{name} must be a finite, non-negative number of seconds (got {secs})"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = (secs * 1e9).round() as u64;
    Ok(Duration::from_nanos(nanos))
}

impl Config {
    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, contains
    /// unknown keys, or fails [`validate`](Self::validate).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Applies `key=value` overrides on top of this configuration.
    ///
    /// Keys match the TOML field names. The result is validated as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] for an unknown key, a value that does
    /// not parse as the field's type, or a result failing
    /// [`validate`](Self::validate).
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use holdsend::Config;
    ///
    /// let mut overrides = BTreeMap::new();
    /// overrides.insert("capacity".to_string(), "3".to_string());
    /// overrides.insert("auto_send".to_string(), "false".to_string());
    ///
    /// let config = Config::default().with_overrides(&overrides)?;
    /// assert_eq!(config.capacity, 3);
    /// assert!(!config.auto_send);
    ///
    /// overrides.insert("hold_duration_secs".to_string(), "oops".to_string());
    /// assert!(Config::default().with_overrides(&overrides).is_err());
    /// # Ok::<(), holdsend::HoldSendError>(())
    /// ```
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Result<Self> {
        fn parsed<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .trim()
                .parse()
                .map_err(|_| HoldSendError::Config(format!("invalid value '{value}' for {key}")))
        }

        for (key, value) in overrides {
            match key.as_str() {
                "hold_duration_secs" => self.hold_duration_secs = parsed(key, value)?,
                "tick_interval_secs" => self.tick_interval_secs = parsed(key, value)?,
                "cooldown_period_secs" => self.cooldown_period_secs = parsed(key, value)?,
                "capacity" => self.capacity = parsed(key, value)?,
                "initial_available" => self.initial_available = Some(parsed(key, value)?),
                "send_latency_secs" => self.send_latency_secs = parsed(key, value)?,
                "simulate_failure" => self.simulate_failure = parsed(key, value)?,
                "auto_send" => self.auto_send = parsed(key, value)?,
                "auto_cooldown" => self.auto_cooldown = parsed(key, value)?,
                "trace_level" => self.trace_level = Some(value.clone()),
                "trace_export" => self.trace_export = parsed(key, value)?,
                other => return Err(HoldSendError::Config(format!("unknown setting '{other}'"))),
            }
            tracing::debug!(%key, %value, "configuration override");
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks that durations are usable.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] when the hold or tick is not positive,
    /// the tick is longer than the hold, the cooldown period is zero, or the
    /// send latency is negative.
    pub fn validate(&self) -> Result<()> {
        let hold = self.hold_duration()?;
        let tick = self.tick_interval()?;
        self.send_latency()?;

        if hold.is_zero() {
            return Err(HoldSendError::Config("hold_duration_secs must be positive".to_string()));
        }
        if tick.is_zero() {
            return Err(HoldSendError::Config("tick_interval_secs must be positive".to_string()));
        }
        if tick > hold {
            return Err(HoldSendError::Config(format!(
                "tick_interval_secs ({}) must not exceed hold_duration_secs ({})",
                self.tick_interval_secs, self.hold_duration_secs
            )));
        }
        if self.cooldown_period_secs == 0 {
            return Err(HoldSendError::Config("cooldown_period_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Hold duration as a `Duration`.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] for negative or non-finite values.
    pub fn hold_duration(&self) -> Result<Duration> {
        secs_to_duration("hold_duration_secs", self.hold_duration_secs)
    }

    /// Progress tick interval as a `Duration`.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] for negative or non-finite values.
    pub fn tick_interval(&self) -> Result<Duration> {
        secs_to_duration("tick_interval_secs", self.tick_interval_secs)
    }

    /// Simulated send latency as a `Duration`.
    ///
    /// # Errors
    ///
    /// Returns [`HoldSendError::Config`] for negative or non-finite values.
    pub fn send_latency(&self) -> Result<Duration> {
        secs_to_duration("send_latency_secs", self.send_latency_secs)
    }
}

/// Builds a session from configuration.
///
/// Creates the controller, the virtual clock and the simulated notifier.
/// Tracing is not initialized here; see `observability::init_tracing`.
///
/// # Errors
///
/// Returns [`HoldSendError::Config`] if the configuration is invalid.
pub fn initialize(config: &Config) -> Result<Session> {
    tracing::debug!(?config, "initializing holdsend session");
    Session::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_constants() {
        let config = Config::default();
        assert_eq!(config.hold_duration().unwrap(), Duration::from_secs(2));
        assert_eq!(config.tick_interval().unwrap(), Duration::from_millis(10));
        assert_eq!(config.cooldown_period_secs, 60);
        assert_eq!(config.capacity, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "capacity = 3\ninitial_available = 1\nhold_duration_secs = 1.5").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.capacity, 3);
        assert_eq!(config.initial_available, Some(1));
        assert_eq!(config.hold_duration().unwrap(), Duration::from_millis(1500));
        assert_eq!(config.cooldown_period_secs, 60);
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hearts = 3").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(HoldSendError::Toml(_))));
    }

    #[test]
    fn rejects_tick_longer_than_hold() {
        let config = Config {
            hold_duration_secs: 0.01,
            tick_interval_secs: 0.5,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(HoldSendError::Config(_))));
    }

    #[test]
    fn rejects_zero_period_and_negative_latency() {
        let zero_period = Config {
            cooldown_period_secs: 0,
            ..Config::default()
        };
        assert!(zero_period.validate().is_err());

        let negative = Config {
            send_latency_secs: -1.0,
            ..Config::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn overrides_replace_individual_fields() {
        let mut overrides = BTreeMap::new();
        overrides.insert("auto_send".to_string(), "false".to_string());
        overrides.insert("initial_available".to_string(), " 2 ".to_string());

        let config = Config::default().with_overrides(&overrides).unwrap();
        assert!(!config.auto_send);
        assert_eq!(config.initial_available, Some(2));
        assert_eq!(config.cooldown_period_secs, 60);
    }

    #[test]
    fn overrides_are_validated() {
        for (key, value) in [
            ("cooldown_period_secs", "-5"),
            ("cooldown_period_secs", "0"),
            ("tick_interval_secs", "5"),
            ("colour", "red"),
        ] {
            let overrides = BTreeMap::from([(key.to_string(), value.to_string())]);
            let err = Config::default().with_overrides(&overrides).unwrap_err();
            assert!(matches!(err, HoldSendError::Config(_)), "{key}={value}: {err}");
        }
    }
}
