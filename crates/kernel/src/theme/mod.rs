//! Theme engine and template rendering.
//!
//! Provides Tera-based rendering for kernel templates and for the view
//! namespaces modules register while booting.

mod engine;

pub use engine::{NAMESPACE_SEPARATOR, SiteContext, ThemeEngine, html_escape};
