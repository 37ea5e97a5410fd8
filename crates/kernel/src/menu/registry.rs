//! Menu registry - collects menu providers and builds the main menu.

use std::sync::Arc;

use rootline_sdk::host::{Authorizer, UrlGenerator};
use rootline_sdk::module::{MenuProvider, ModuleCapability, ModuleInfo};
use rootline_sdk::types::{Menu, Tree, User};
use tracing::debug;

/// A module's menu capability, paired with its metadata for access checks.
#[derive(Clone)]
struct MenuEntry {
    info: Arc<dyn ModuleInfo>,
    provider: Arc<dyn MenuProvider>,
}

/// Registry of all menu providers, ordered by their default menu order.
#[derive(Default)]
pub struct MenuRegistry {
    entries: Vec<MenuEntry>,
}

impl MenuRegistry {
    /// Create an empty menu registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider.
    pub fn register(&mut self, info: Arc<dyn ModuleInfo>, provider: Arc<dyn MenuProvider>) {
        self.entries.push(MenuEntry { info, provider });
        // Stable sort keeps registration order among equal weights
        self.entries.sort_by(|a, b| {
            a.provider
                .default_menu_order()
                .cmp(&b.provider.default_menu_order())
                .then_with(|| a.info.title().cmp(&b.info.title()))
        });
    }

    /// Menus visible to `user` in `tree`, in menu order.
    ///
    /// Providers the user may not access, and providers returning no menu,
    /// are skipped.
    pub fn menus_for(
        &self,
        tree: &Tree,
        user: &User,
        authorizer: &dyn Authorizer,
        urls: &dyn UrlGenerator,
    ) -> Vec<Menu> {
        self.entries
            .iter()
            .filter(|entry| {
                let allowed = authorizer
                    .check_access(entry.info.as_ref(), ModuleCapability::Menu, tree, user)
                    .is_ok();
                if !allowed {
                    debug!(module = %entry.info.name(), tree = %tree.name, "menu hidden");
                }
                allowed
            })
            .filter_map(|entry| entry.provider.menu(tree, urls))
            .collect()
    }

    /// Get provider count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
