//! HTTP route handlers.

pub mod health;
pub mod map;
pub mod module;

pub use map::{ModuleRoutes, RouteDefinition, RouteMap};
