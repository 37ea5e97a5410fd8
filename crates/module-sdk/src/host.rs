//! Host interfaces.
//!
//! The kernel implements these traits; modules only ever see them as
//! trait objects. During boot a module receives a [`BootContext`] to
//! register routes and views. Per request it receives [`HostServices`].

use std::path::Path;
use std::sync::Arc;

use crate::error::{AccessDenied, RouteError, ViewError};
use crate::module::{ModuleCapability, ModuleInfo, RequestHandler};
use crate::types::{Method, RenderedResponse, Tree, User, ViewData};

/// Decides whether a user may use a module component in a tree.
pub trait Authorizer: Send + Sync {
    fn check_access(
        &self,
        module: &dyn ModuleInfo,
        capability: ModuleCapability,
        tree: &Tree,
        user: &User,
    ) -> Result<(), AccessDenied>;
}

/// Turns a template identifier and values into a response.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, values: ViewData) -> RenderedResponse;
}

/// Builds URLs for named routes.
pub trait UrlGenerator: Send + Sync {
    fn route(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError>;
}

/// Route table a module registers into while booting.
pub trait RouteRegistrar {
    fn get(
        &mut self,
        name: &str,
        path: &str,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), RouteError>;

    fn post(
        &mut self,
        name: &str,
        path: &str,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), RouteError>;

    /// Also accept `method` on every route this module registers.
    fn allows(&mut self, method: Method);
}

/// View namespaces, so `"<namespace>::<view>"` resolves to `<dir>/<view>.html`.
pub trait ViewRegistrar {
    fn register_namespace(&mut self, namespace: &str, dir: &Path) -> Result<(), ViewError>;
}

/// Registrars handed to a module's `boot`.
pub struct BootContext<'a> {
    pub routes: &'a mut dyn RouteRegistrar,
    pub views: &'a mut dyn ViewRegistrar,
}

impl<'a> BootContext<'a> {
    pub fn new(routes: &'a mut dyn RouteRegistrar, views: &'a mut dyn ViewRegistrar) -> Self {
        Self { routes, views }
    }
}

/// Host services available while handling one request.
#[derive(Clone, Copy)]
pub struct HostServices<'a> {
    pub authorizer: &'a dyn Authorizer,
    pub renderer: &'a dyn Renderer,
    pub urls: &'a dyn UrlGenerator,
}

/// Substitute `{param}` placeholders in a route path.
///
/// Values are percent-encoded. Parameters not named in the path are ignored.
///
/// Pattern: "/tree/{tree}/testpost"
/// Params: [("tree", "family1")]
/// Result: "/tree/family1/testpost"
pub fn expand_route_path(
    route: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<String, RouteError> {
    let mut url = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        url.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder: keep it literally
            url.push_str(&rest[start..]);
            return Ok(url);
        };
        let param = &after[..end];
        let value = params
            .iter()
            .find(|(key, _)| *key == param)
            .map(|(_, value)| *value)
            .ok_or_else(|| RouteError::MissingParameter {
                route: route.to_string(),
                param: param.to_string(),
            })?;
        url.push_str(&urlencoding::encode(value));
        rest = &after[end + 1..];
    }

    url.push_str(rest);
    Ok(url)
}
