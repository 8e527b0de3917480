//! Runtime driving the controller.
//!
//! - `session`: the single owner of controller, clock and outstanding send
//! - `script`: textual demo scripts replayed against a session

pub mod script;
pub mod session;

pub use script::{parse_script, ScriptStep, MAX_WAIT};
pub use session::Session;
