//! Module host error types.
//!
//! All errors include the module name so a failing startup points straight
//! at the module to fix.

use rootline_sdk::error::BootError;
use thiserror::Error;

/// Errors that can occur while installing and booting modules.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Two installed modules share a machine name.
    #[error("module '{module}': installed twice")]
    Duplicate { module: String },

    /// The module's `boot` returned an error.
    #[error("module '{module}': boot failed: {source}")]
    Boot {
        module: String,
        #[source]
        source: BootError,
    },
}

impl ModuleError {
    /// Name of the module that caused the error.
    pub fn module(&self) -> &str {
        match self {
            ModuleError::Duplicate { module } | ModuleError::Boot { module, .. } => module,
        }
    }
}
