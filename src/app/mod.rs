//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the rendering layer (which reports presses and
//! reads state) and the runtime (which owns the clock and the notifier).
//!
//! # Architecture
//!
//! ```text
//! Gestures / Timers / Sends → Events → handle_event → Controller transitions → Actions
//!                                ↑                                                │
//!                                └──────────── Runtime executes actions ──────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing and rejection recovery
//! - [`modes`]: Interaction phase type
//! - [`state`]: The interaction controller and its observable state

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::{Action, TimerKind};
pub use handler::{handle_event, Event};
pub use modes::Phase;
pub use state::{ControllerSettings, InteractionController, InteractionState, ObservableState};
