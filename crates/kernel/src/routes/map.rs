//! Route map: named routes registered by modules during boot.
//!
//! Each route has a stable key (e.g. `"test_post:do_post"`), a path
//! template with `{param}` segments, the method it answers, and the handler
//! it dispatches to. The same map generates URLs for templates and menus.
//!
//! Module routes are tree-scoped: every path must carry a `{tree}` segment.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rootline_sdk::error::RouteError;
use rootline_sdk::host::{RouteRegistrar, UrlGenerator, expand_route_path};
use rootline_sdk::module::RequestHandler;
use rootline_sdk::types::Method;
use tracing::debug;

/// A route registered by a module.
#[derive(Clone)]
pub struct RouteDefinition {
    /// Stable route key.
    pub name: String,
    /// Module that registered the route.
    pub owner: String,
    /// Path template, e.g. "/tree/{tree}/testpost".
    pub path: String,
    /// Method the route was registered for.
    pub method: Method,
    /// Further methods the owning module declared as allowed.
    pub extra_methods: Vec<Method>,
    pub handler: Arc<dyn RequestHandler>,
}

impl RouteDefinition {
    /// Every method this route answers, registration method first.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods = vec![self.method];
        for method in &self.extra_methods {
            if !methods.contains(method) {
                methods.push(*method);
            }
        }
        methods
    }
}

impl std::fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("path", &self.path)
            .field("method", &self.method)
            .field("extra_methods", &self.extra_methods)
            .finish_non_exhaustive()
    }
}

/// All named routes, in registration order.
#[derive(Debug, Default)]
pub struct RouteMap {
    routes: Vec<RouteDefinition>,
}

impl RouteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registrar that records `owner` on every route it adds.
    pub fn scoped(&mut self, owner: &str) -> ModuleRoutes<'_> {
        ModuleRoutes {
            map: self,
            owner: owner.to_string(),
        }
    }

    /// Find a route by key.
    pub fn get(&self, name: &str) -> Option<&RouteDefinition> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Build the URL for a named route.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let route = self.get(name).ok_or_else(|| RouteError::Unknown {
            name: name.to_string(),
        })?;
        expand_route_path(&route.name, &route.path, params)
    }

    /// Group routes by path so each path becomes one HTTP route.
    ///
    /// When two routes claim the same method on the same path, the one
    /// registered first wins.
    pub fn by_path(&self) -> BTreeMap<&str, Vec<(Method, &RouteDefinition)>> {
        let mut grouped: BTreeMap<&str, Vec<(Method, &RouteDefinition)>> = BTreeMap::new();
        let mut claimed: HashSet<(&str, Method)> = HashSet::new();

        for route in &self.routes {
            for method in route.methods() {
                if claimed.insert((route.path.as_str(), method)) {
                    grouped
                        .entry(route.path.as_str())
                        .or_default()
                        .push((method, route));
                } else {
                    debug!(
                        route = %route.name,
                        path = %route.path,
                        %method,
                        "method already claimed by an earlier route"
                    );
                }
            }
        }

        grouped
    }

    fn add(
        &mut self,
        owner: &str,
        name: &str,
        path: &str,
        method: Method,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), RouteError> {
        if self.get(name).is_some() {
            return Err(RouteError::Duplicate {
                name: name.to_string(),
            });
        }
        if !path.starts_with('/') || !path.contains("{tree}") {
            return Err(RouteError::InvalidPath {
                route: name.to_string(),
                path: path.to_string(),
            });
        }

        debug!(route = %name, %path, %method, module = %owner, "registered route");

        self.routes.push(RouteDefinition {
            name: name.to_string(),
            owner: owner.to_string(),
            path: path.to_string(),
            method,
            extra_methods: Vec::new(),
            handler,
        });
        Ok(())
    }
}

impl UrlGenerator for RouteMap {
    fn route(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        self.url_for(name, params)
    }
}

/// Route registrar scoped to one module.
pub struct ModuleRoutes<'a> {
    map: &'a mut RouteMap,
    owner: String,
}

impl RouteRegistrar for ModuleRoutes<'_> {
    fn get(
        &mut self,
        name: &str,
        path: &str,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), RouteError> {
        self.map.add(&self.owner, name, path, Method::Get, handler)
    }

    fn post(
        &mut self,
        name: &str,
        path: &str,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), RouteError> {
        self.map.add(&self.owner, name, path, Method::Post, handler)
    }

    fn allows(&mut self, method: Method) {
        for route in self.map.routes.iter_mut().filter(|r| r.owner == self.owner) {
            if route.method != method && !route.extra_methods.contains(&method) {
                route.extra_methods.push(method);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rootline_sdk::error::AccessDenied;
    use rootline_sdk::host::HostServices;
    use rootline_sdk::types::{IncomingRequest, RenderedResponse};

    struct Echo;

    impl RequestHandler for Echo {
        fn handle(
            &self,
            request: &IncomingRequest,
            _services: &HostServices<'_>,
        ) -> Result<RenderedResponse, AccessDenied> {
            Ok(RenderedResponse::text(request.target()))
        }
    }

    fn map() -> RouteMap {
        let mut map = RouteMap::new();
        let mut routes = map.scoped("echo");
        routes.get("echo", "/tree/{tree}/echo", Arc::new(Echo)).unwrap();
        routes
            .post("echo:save", "/tree/{tree}/save", Arc::new(Echo))
            .unwrap();
        map
    }

    #[test]
    fn url_for_named_route() {
        let map = map();
        assert_eq!(
            map.url_for("echo", &[("tree", "family1")]).unwrap(),
            "/tree/family1/echo"
        );
        assert_eq!(
            map.route("echo:save", &[("tree", "family1")]).unwrap(),
            "/tree/family1/save"
        );
    }

    #[test]
    fn url_for_unknown_route() {
        let err = map().url_for("missing", &[]).unwrap_err();
        assert_eq!(
            err,
            RouteError::Unknown {
                name: "missing".into()
            }
        );
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut map = map();
        let err = map
            .scoped("other")
            .get("echo", "/tree/{tree}/other", Arc::new(Echo))
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::Duplicate {
                name: "echo".into()
            }
        );
    }

    #[test]
    fn relative_path_rejected() {
        let mut map = RouteMap::new();
        let err = map
            .scoped("echo")
            .get("echo", "tree/{tree}", Arc::new(Echo))
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPath { .. }));

        let err = map
            .scoped("echo")
            .get("echo", "/about", Arc::new(Echo))
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPath { .. }));
    }

    #[test]
    fn allows_widens_only_own_routes() {
        let mut map = map();
        map.scoped("other")
            .get("other", "/tree/{tree}/other", Arc::new(Echo))
            .unwrap();
        map.scoped("echo").allows(Method::Post);

        assert_eq!(
            map.get("echo").unwrap().methods(),
            vec![Method::Get, Method::Post]
        );
        assert_eq!(map.get("echo:save").unwrap().methods(), vec![Method::Post]);
        assert_eq!(map.get("other").unwrap().methods(), vec![Method::Get]);
    }

    #[test]
    fn by_path_first_registration_wins() {
        let mut map = RouteMap::new();
        {
            let mut routes = map.scoped("a");
            routes.get("a", "/tree/{tree}/same", Arc::new(Echo)).unwrap();
            routes.allows(Method::Post);
        }
        map.scoped("b")
            .post("b", "/tree/{tree}/same", Arc::new(Echo))
            .unwrap();

        let grouped = map.by_path();
        let same = grouped.get("/tree/{tree}/same").unwrap();
        assert_eq!(same.len(), 2);
        assert!(same.iter().all(|(_, route)| route.name == "a"));
    }
}
