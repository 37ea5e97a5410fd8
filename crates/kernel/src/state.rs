//! Application state shared across all handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rootline_sdk::host::HostServices;
use rootline_sdk::types::{Menu, Tree, User};
use tracing::info;

use crate::config::{Config, SiteConfig};
use crate::menu::MenuRegistry;
use crate::models::{TreeRegistry, UserDirectory};
use crate::modules::{InstalledModule, ModuleRegistry, builtin_modules};
use crate::permissions::PermissionService;
use crate::routes::RouteMap;
use crate::theme::{SiteContext, ThemeEngine};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Site name shown in page headers.
    site_name: String,

    /// Header carrying the proxy-authenticated user name.
    remote_user_header: String,

    /// Hosted trees.
    trees: TreeRegistry,

    /// Known users.
    users: UserDirectory,

    /// Permission service for module access control.
    permissions: PermissionService,

    /// Installed modules.
    modules: ModuleRegistry,

    /// Named routes registered by modules.
    routes: Arc<RouteMap>,

    /// Menu registry.
    menus: MenuRegistry,

    /// Theme engine for template rendering.
    theme: Arc<ThemeEngine>,
}

impl AppState {
    /// Create application state from configuration with the built-in modules.
    pub fn new(config: &Config) -> Result<Self> {
        let site = SiteConfig::parse(&config.site_config)?;
        Self::build(
            &site,
            &config.templates_dir,
            &config.remote_user_header,
            builtin_modules(),
        )
    }

    /// Create application state from an already-parsed site.
    pub fn build(
        site: &SiteConfig,
        templates_dir: &Path,
        remote_user_header: &str,
        modules: Vec<InstalledModule>,
    ) -> Result<Self> {
        let trees = TreeRegistry::from_config(&site.trees);
        let users = UserDirectory::from_config(&site.users);
        let permissions = PermissionService::from_config(&site.module_access);
        info!(
            trees = trees.len(),
            users = users.len(),
            access_overrides = permissions.override_count(),
            "site loaded"
        );

        let mut theme =
            ThemeEngine::new(templates_dir).context("failed to initialize theme engine")?;
        let mut routes = RouteMap::new();

        let modules = ModuleRegistry::new(modules).context("invalid module set")?;
        let menus = modules
            .boot(&mut routes, &mut theme)
            .context("failed to boot modules")?;

        let routes = Arc::new(routes);
        theme.register_route_function(routes.clone());

        info!(
            modules = modules.len(),
            routes = routes.len(),
            "modules booted"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                site_name: site.site.name.clone(),
                remote_user_header: remote_user_header.to_string(),
                trees,
                users,
                permissions,
                modules,
                routes,
                menus,
                theme: Arc::new(theme),
            }),
        })
    }

    pub fn site_name(&self) -> &str {
        &self.inner.site_name
    }

    pub fn remote_user_header(&self) -> &str {
        &self.inner.remote_user_header
    }

    pub fn trees(&self) -> &TreeRegistry {
        &self.inner.trees
    }

    pub fn users(&self) -> &UserDirectory {
        &self.inner.users
    }

    pub fn permissions(&self) -> &PermissionService {
        &self.inner.permissions
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.inner.modules
    }

    pub fn routes(&self) -> &Arc<RouteMap> {
        &self.inner.routes
    }

    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    /// Host services handed to module request handlers.
    pub fn host_services(&self) -> HostServices<'_> {
        HostServices {
            authorizer: &self.inner.permissions,
            renderer: self.inner.theme.as_ref(),
            urls: self.inner.routes.as_ref(),
        }
    }

    /// Main menu for a tree as seen by a user.
    pub fn menus_for(&self, tree: &Tree, user: &User) -> Vec<Menu> {
        self.inner.menus.menus_for(
            tree,
            user,
            &self.inner.permissions,
            self.inner.routes.as_ref(),
        )
    }

    /// Site-wide page context for a request.
    pub fn site_context(&self, tree: Option<&Tree>, user: &User) -> SiteContext {
        let menus = tree
            .map(|tree| self.menus_for(tree, user))
            .unwrap_or_default();

        SiteContext {
            site_name: self.inner.site_name.clone(),
            tree: tree.cloned(),
            user: user.clone(),
            menus,
        }
    }
}
