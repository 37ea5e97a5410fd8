//! Main menu assembly.
//!
//! Menus are contributed by modules implementing `MenuProvider` and are
//! filtered per tree and user before being shown.

mod registry;

pub use registry::MenuRegistry;
