//! Rootline test utilities.
//!
//! Stand-ins for the host services so modules can be unit tested without a
//! running kernel: a renderer that records what it was asked to render, an
//! authorizer with a fixed answer, a URL generator over a static route list,
//! and builders for trees, users and requests.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rootline_sdk::prelude::*;

/// Create a test tree.
pub fn test_tree(name: &str) -> Tree {
    Tree::new(1, name, format!("{name} tree"))
}

/// Create a test user with the given role in one tree.
pub fn test_user(name: &str, tree: &str, role: TreeRole) -> User {
    let mut roles = BTreeMap::new();
    roles.insert(tree.to_string(), role);
    User {
        id: 1,
        name: name.to_string(),
        real_name: name.to_string(),
        is_admin: false,
        roles,
    }
}

/// A GET request from a visitor.
pub fn get_request(target: &str, tree: &Tree) -> IncomingRequest {
    IncomingRequest::new(Method::Get, target, tree.clone(), User::visitor())
}

/// A POST request from a visitor carrying form fields.
pub fn post_request(target: &str, tree: &Tree, fields: &[(&str, &str)]) -> IncomingRequest {
    let body: ParsedBody = fields
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    IncomingRequest::new(Method::Post, target, tree.clone(), User::visitor()).with_body(body)
}

/// A single call made to a [`RecordingRenderer`].
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub template: String,
    pub values: ViewData,
}

/// Renderer that returns view responses untouched and remembers each call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, template: &str, values: ViewData) -> RenderedResponse {
        self.calls.lock().push(RenderCall {
            template: template.to_string(),
            values: values.clone(),
        });
        RenderedResponse::view(template, values)
    }
}

/// Authorizer with a fixed verdict.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuthorizer {
    allow: bool,
}

impl StaticAuthorizer {
    pub fn allow() -> Self {
        Self { allow: true }
    }

    pub fn deny() -> Self {
        Self { allow: false }
    }
}

impl Authorizer for StaticAuthorizer {
    fn check_access(
        &self,
        module: &dyn ModuleInfo,
        capability: ModuleCapability,
        tree: &Tree,
        _user: &User,
    ) -> Result<(), AccessDenied> {
        if self.allow {
            Ok(())
        } else {
            Err(AccessDenied::new(module.name(), capability, tree.name()))
        }
    }
}

/// URL generator over a fixed `(name, path)` list.
#[derive(Debug, Clone, Default)]
pub struct FixedUrls {
    routes: Vec<(String, String)>,
}

impl FixedUrls {
    pub fn new(routes: &[(&str, &str)]) -> Self {
        Self {
            routes: routes
                .iter()
                .map(|(name, path)| ((*name).to_string(), (*path).to_string()))
                .collect(),
        }
    }
}

impl UrlGenerator for FixedUrls {
    fn route(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let (_, path) = self
            .routes
            .iter()
            .find(|(route, _)| route == name)
            .ok_or_else(|| RouteError::Unknown {
                name: name.to_string(),
            })?;
        expand_route_path(name, path, params)
    }
}
