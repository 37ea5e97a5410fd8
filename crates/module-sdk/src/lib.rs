//! Rootline Module SDK
//!
//! Types, capability traits, and host interfaces for Rootline modules.
//! Modules depend on this crate only; the kernel implements the host side
//! of every trait in [`host`] and drives the capabilities in [`module`].

pub mod error;
pub mod host;
pub mod module;
pub mod types;

// Re-export serde_json so modules can build view values without a direct dependency
#[doc(hidden)]
pub use serde_json;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::host::*;
    pub use crate::module::*;
    pub use crate::types::*;
}
