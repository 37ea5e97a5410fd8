//! Errors crossing the module/host boundary.

use thiserror::Error;

use crate::module::ModuleCapability;

/// The authorizer refused access to a module component.
///
/// Modules propagate this unchanged; the host turns it into a 403.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access to module '{module}' ({capability}) denied in tree '{tree}'")]
pub struct AccessDenied {
    pub module: String,
    pub capability: ModuleCapability,
    pub tree: String,
}

impl AccessDenied {
    pub fn new(module: &str, capability: ModuleCapability, tree: &str) -> Self {
        Self {
            module: module.to_string(),
            capability,
            tree: tree.to_string(),
        }
    }
}

/// Route registration and URL generation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route '{name}' is already registered")]
    Duplicate { name: String },

    #[error("no route named '{name}'")]
    Unknown { name: String },

    #[error("route '{route}': missing value for '{{{param}}}'")]
    MissingParameter { route: String, param: String },

    #[error("route '{route}': path must start with '/' and contain '{{tree}}', got '{path}'")]
    InvalidPath { route: String, path: String },
}

/// View namespace registration errors.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view namespace '{namespace}' is already registered")]
    DuplicateNamespace { namespace: String },

    #[error("view namespace '{namespace}': cannot read {path}: {source}")]
    Io {
        namespace: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("view namespace '{namespace}': template error: {details}")]
    Template { namespace: String, details: String },
}

/// Errors a module can raise while booting.
#[derive(Debug, Error)]
pub enum BootError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    View(#[from] ViewError),
}
