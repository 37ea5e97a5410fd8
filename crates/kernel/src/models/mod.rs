//! Site models: trees and users, loaded from the site config.

pub mod tree;
pub mod user;

pub use tree::TreeRegistry;
pub use user::UserDirectory;
