//! HTTP middleware components.

pub mod remote_user;

pub use remote_user::{CurrentUser, resolve_request_user};
