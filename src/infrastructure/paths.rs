//! Platform path resolution.
//!
//! Locations follow the platform conventions exposed by the `dirs` crate,
//! with an `holdsend` directory appended.

use crate::domain::{HoldSendError, Result};
use std::path::PathBuf;

const APP_NAME: &str = "holdsend";

/// File name of the OTLP JSON trace export.
pub const TRACE_FILE_NAME: &str = "holdsend-otlp.json";

/// Returns the data directory for holdsend.
///
/// - Linux: `$XDG_DATA_HOME/holdsend` (defaults to `~/.local/share/holdsend`)
/// - macOS: `~/Library/Application Support/holdsend`
/// - Windows: `%APPDATA%\holdsend`
///
/// # Errors
///
/// Returns [`HoldSendError::Path`] if the platform has no data directory.
pub fn data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .ok_or_else(|| HoldSendError::Path("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Returns the default configuration file, `config_dir()/holdsend/config.toml`.
///
/// The file is optional; callers fall back to defaults when it does not exist.
///
/// # Errors
///
/// Returns [`HoldSendError::Path`] if the platform has no config directory.
pub fn config_file() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| HoldSendError::Path("could not determine config directory".into()))?
        .join(APP_NAME)
        .join("config.toml"))
}

/// Returns the trace export file inside [`data_dir`].
///
/// # Errors
///
/// See [`data_dir`].
pub fn trace_file() -> Result<PathBuf> {
    Ok(data_dir()?.join(TRACE_FILE_NAME))
}
