//! Presentation layer.
//!
//! The crate does not draw anything itself. It hands the rendering layer a
//! [`SendButtonViewModel`] computed from controller state:
//!
//! ```text
//! InteractionController → SendButtonViewModel::from_controller → renderer
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: the button view model, its status label and timer text

pub mod viewmodel;

pub use viewmodel::{format_timer, ButtonStatus, SendButtonViewModel};
