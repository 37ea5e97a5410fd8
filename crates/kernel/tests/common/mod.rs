#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! This module provides test infrastructure that uses the REAL kernel code:
//! the real site parser, the built-in modules, the kernel templates, and the
//! same router `main.rs` serves.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rootline_kernel::modules::builtin_modules;
use rootline_kernel::{AppState, SiteConfig};

/// Header the test app trusts for the authenticated user name.
pub const REMOTE_USER: &str = "X-Remote-User";

/// Site used by every integration test.
///
/// - `family1`: default access for every module.
/// - `family2`: the test module is restricted to members.
/// - `private`: the test module is hidden from everyone.
pub const TEST_SITE: &str = r#"
[site]
name = "Test Genealogy"

[[trees]]
name = "family1"
title = "Family One"

[[trees]]
name = "family2"
title = "Family Two"

[[trees]]
name = "private"
title = "Private Tree"

[[users]]
name = "alice"
real_name = "Alice Member"
roles = { family1 = "member", family2 = "member" }

[[users]]
name = "root"
real_name = "Site Admin"
admin = true

[[module_access]]
module = "test_post"
capability = "custom"
tree = "family2"
level = "member"

[[module_access]]
module = "test_post"
capability = "menu"
tree = "family2"
level = "member"

[[module_access]]
module = "test_post"
capability = "custom"
tree = "private"
level = "hidden"
"#;

/// Kernel templates directory.
pub fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a test application from [`TEST_SITE`].
    pub fn new() -> Self {
        let site = SiteConfig::parse_str(TEST_SITE, Path::new("test-site.toml"))
            .expect("Failed to parse test site");

        let state = AppState::build(&site, &templates_dir(), REMOTE_USER, builtin_modules())
            .expect("Failed to initialize AppState");

        let router = rootline_kernel::app(state.clone());

        Self { router, state }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET a path, optionally as a named user.
    pub async fn get(&self, path: &str, user: Option<&str>) -> Response {
        let mut builder = Request::get(path);
        if let Some(user) = user {
            builder = builder.header(REMOTE_USER, user);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// POST a form-encoded body, optionally as a named user.
    pub async fn post_form(&self, path: &str, body: &str, user: Option<&str>) -> Response {
        let mut builder = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            builder = builder.header(REMOTE_USER, user);
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

/// Collect a response body into a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
