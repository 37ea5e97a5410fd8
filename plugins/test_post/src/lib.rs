//! Test post module for Rootline.
//!
//! Adds a "Test" entry to the main menu that opens a small form. Submitting
//! the form posts to a second route, which echoes the submitted content back
//! on a result page.

use std::path::PathBuf;
use std::sync::Arc;

use rootline_sdk::prelude::*;

/// Marker that sends a POST to the submission handler.
const DO_POST_MARKER: &str = "do_post";

pub struct TestPostModule {
    resources: PathBuf,
}

impl TestPostModule {
    pub const ROUTE_NAME: &'static str = "test_post";
    pub const DO_POST_ROUTE_NAME: &'static str = "test_post:do_post";
    pub const ROUTE_URL: &'static str = "/tree/{tree}/testpost";
    pub const ROUTE_URL_DO_POST: &'static str = "/tree/{tree}/do_post";

    /// Module using the resources shipped with this crate.
    pub fn new() -> Self {
        Self::with_resources(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources"))
    }

    /// Module reading its views from another directory.
    pub fn with_resources(resources: impl Into<PathBuf>) -> Self {
        Self {
            resources: resources.into(),
        }
    }

    fn handle_do_post(
        &self,
        request: &IncomingRequest,
        services: &HostServices<'_>,
    ) -> RenderedResponse {
        let tree = request.tree();
        let content = request.body_field("content").unwrap_or_default();

        let values = ViewData::new()
            .with("title", "Post Result")
            .with("tree", tree)
            .with("content", content)
            .with("module", self.summary());

        view_response(services.renderer, self, "result", values)
    }
}

impl Default for TestPostModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleInfo for TestPostModule {
    fn name(&self) -> &str {
        "test_post"
    }

    fn title(&self) -> String {
        "Test".to_string()
    }

    fn description(&self) -> String {
        "A simple test post page.".to_string()
    }

    fn resources_folder(&self) -> PathBuf {
        self.resources.clone()
    }
}

impl CustomModule for TestPostModule {
    fn boot(self: Arc<Self>, ctx: &mut BootContext<'_>) -> Result<(), BootError> {
        ctx.routes
            .get(Self::ROUTE_NAME, Self::ROUTE_URL, self.clone())?;
        ctx.routes
            .post(Self::DO_POST_ROUTE_NAME, Self::ROUTE_URL_DO_POST, self.clone())?;
        ctx.routes.allows(Method::Post);

        ctx.views
            .register_namespace(self.name(), &self.resources_folder().join("views"))?;

        Ok(())
    }
}

impl MenuProvider for TestPostModule {
    fn default_menu_order(&self) -> i32 {
        9
    }

    fn menu(&self, tree: &Tree, urls: &dyn UrlGenerator) -> Option<Menu> {
        let url = urls.route(Self::ROUTE_NAME, &[("tree", tree.name())]).ok()?;
        Some(Menu::new(self.title(), url, "menu-test").attribute("rel", "nofollow"))
    }
}

impl RequestHandler for TestPostModule {
    fn handle(
        &self,
        request: &IncomingRequest,
        services: &HostServices<'_>,
    ) -> Result<RenderedResponse, AccessDenied> {
        let tree = request.tree();
        let user = request.user();

        services
            .authorizer
            .check_access(self, ModuleCapability::Custom, tree, user)?;

        if request.method() == Method::Post && request.target().contains(DO_POST_MARKER) {
            return Ok(self.handle_do_post(request, services));
        }

        if request.method() == Method::Post {
            return Ok(RenderedResponse::text(format!("works2:{}", request.target())));
        }

        // Default: show the form
        let values = ViewData::new()
            .with("title", self.title())
            .with("tree", tree)
            .with("module", self.summary());

        Ok(view_response(services.renderer, self, "form", values))
    }
}
