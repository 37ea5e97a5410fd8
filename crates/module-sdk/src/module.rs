//! Module capability traits.
//!
//! A module is a plain struct that opts into capabilities by implementing
//! the matching trait. Every capability extends [`ModuleInfo`], which carries
//! the metadata the host shows in its control panel and uses for access
//! control. Request handling is a separate trait so the host can hold a
//! route's handler without knowing which module owns it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AccessDenied, BootError};
use crate::host::{BootContext, HostServices, Renderer, UrlGenerator};
use crate::types::{AccessLevel, IncomingRequest, Menu, RenderedResponse, Tree, ViewData};

/// Capability marker passed to the authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCapability {
    /// Custom (third-party) module pages.
    Custom,
    /// Entries in the main menu.
    Menu,
}

impl ModuleCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleCapability::Custom => "custom",
            ModuleCapability::Menu => "menu",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "custom" => Some(ModuleCapability::Custom),
            "menu" => Some(ModuleCapability::Menu),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable snapshot of a module, passed to templates as `module`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: String,
    pub title: String,
    pub description: String,
}

/// Metadata every module provides.
pub trait ModuleInfo: Send + Sync {
    /// Machine name. Also the view namespace and the route key prefix.
    fn name(&self) -> &str;

    /// How the module is identified in menus and the control panel.
    fn title(&self) -> String;

    /// A sentence describing what the module does.
    fn description(&self) -> String;

    /// Directory holding the module's `views/` and other assets.
    fn resources_folder(&self) -> PathBuf;

    /// Access level used when the site has no override for this component.
    fn default_access_level(&self, _capability: ModuleCapability) -> AccessLevel {
        AccessLevel::Visitor
    }

    fn summary(&self) -> ModuleSummary {
        ModuleSummary {
            name: self.name().to_string(),
            title: self.title(),
            description: self.description(),
        }
    }
}

/// A custom module: booted once at startup to register routes and views.
pub trait CustomModule: ModuleInfo {
    fn boot(self: Arc<Self>, ctx: &mut BootContext<'_>) -> Result<(), BootError>;
}

/// A module that contributes an entry to the main menu.
pub trait MenuProvider: ModuleInfo {
    /// Position among the other menus (lower sorts first).
    fn default_menu_order(&self) -> i32;

    /// The menu for a tree, or `None` to contribute nothing.
    fn menu(&self, tree: &Tree, urls: &dyn UrlGenerator) -> Option<Menu>;
}

/// Handles requests routed to it by the host.
pub trait RequestHandler: Send + Sync {
    fn handle(
        &self,
        request: &IncomingRequest,
        services: &HostServices<'_>,
    ) -> Result<RenderedResponse, AccessDenied>;
}

/// Render one of a module's own views, e.g. `view_response(r, m, "form", ..)`
/// renders `"<module name>::form"`.
pub fn view_response(
    renderer: &dyn Renderer,
    module: &dyn ModuleInfo,
    view: &str,
    values: ViewData,
) -> RenderedResponse {
    renderer.render(&format!("{}::{view}", module.name()), values)
}
