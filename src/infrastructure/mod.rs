//! Infrastructure layer for filesystem and environment interactions.
//!
//! This module resolves the platform locations holdsend reads its
//! configuration from and writes trace files to.

pub mod paths;

pub use paths::{config_file, data_dir, trace_file};
