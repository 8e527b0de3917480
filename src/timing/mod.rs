//! Time-driven components.
//!
//! # Modules
//!
//! - [`scheduler`]: the [`Scheduler`] seam, the [`VirtualScheduler`] test clock
//!   and the real-time [`WallScheduler`]
//! - [`progress`]: hold progress from zero to one
//! - [`cooldown`]: one-second countdown regenerating hearts

pub mod cooldown;
pub mod progress;
pub mod scheduler;

pub use cooldown::{CooldownTick, CooldownTimer};
pub use progress::{ProgressTick, ProgressTimer};
pub use scheduler::{Scheduler, Sleep, TimerHandle, VirtualScheduler, Wake, WallScheduler};
