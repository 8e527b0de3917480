//! Domain layer for the hold-to-send controller.
//!
//! This module contains the leaf domain types, independent of timing and of
//! any rendering concerns.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`pool`]: The regenerating heart pool gating sends
//!
//! # Examples
//!
//! ```
//! use holdsend::domain::{ResourcePool, Result};
//!
//! fn spend_one(pool: &mut ResourcePool) -> Result<()> {
//!     if pool.try_consume() {
//!         Ok(())
//!     } else {
//!         Err(holdsend::HoldSendError::ResourceExhausted)
//!     }
//! }
//!
//! let mut pool = ResourcePool::new(5);
//! spend_one(&mut pool).unwrap();
//! assert_eq!(pool.available(), 4);
//! ```

pub mod error;
pub mod pool;

pub use error::{HoldSendError, Result};
pub use pool::{Regeneration, ResourcePool};
