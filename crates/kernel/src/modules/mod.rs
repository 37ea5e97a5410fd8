//! Module host.
//!
//! Holds the installed modules and boots them: each module registers its
//! routes and view namespaces, and its menu capability is collected into
//! the [`MenuRegistry`](crate::menu::MenuRegistry).

mod error;
mod registry;

pub use error::ModuleError;
pub use registry::{InstalledModule, ModuleRegistry, builtin_modules};
