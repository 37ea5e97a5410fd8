//! Installed modules and their boot sequence.

use std::collections::HashSet;
use std::sync::Arc;

use rootline_sdk::host::BootContext;
use rootline_sdk::module::{CustomModule, MenuProvider, ModuleInfo};
use test_post::TestPostModule;
use tracing::info;

use super::ModuleError;
use crate::menu::MenuRegistry;
use crate::routes::RouteMap;
use crate::theme::ThemeEngine;

/// One installed module, held as handles to each capability it implements.
#[derive(Clone)]
pub struct InstalledModule {
    info: Arc<dyn ModuleInfo>,
    custom: Arc<dyn CustomModule>,
    menu: Option<Arc<dyn MenuProvider>>,
}

impl InstalledModule {
    /// Install a custom module.
    pub fn custom<M: CustomModule + 'static>(module: Arc<M>) -> Self {
        Self {
            info: module.clone(),
            custom: module,
            menu: None,
        }
    }

    /// Also register the module's menu capability.
    pub fn with_menu<M: MenuProvider + 'static>(mut self, module: Arc<M>) -> Self {
        self.menu = Some(module);
        self
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }
}

/// The modules compiled into this kernel.
pub fn builtin_modules() -> Vec<InstalledModule> {
    let test_post = Arc::new(TestPostModule::new());
    vec![InstalledModule::custom(test_post.clone()).with_menu(test_post)]
}

/// Registry of installed modules, in boot order.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<InstalledModule>,
}

impl ModuleRegistry {
    /// Create a registry, rejecting duplicate module names.
    pub fn new(modules: Vec<InstalledModule>) -> Result<Self, ModuleError> {
        let mut seen = HashSet::new();
        for module in &modules {
            if !seen.insert(module.name().to_string()) {
                return Err(ModuleError::Duplicate {
                    module: module.name().to_string(),
                });
            }
        }
        Ok(Self { modules })
    }

    /// Boot every module and collect their menus.
    pub fn boot(
        &self,
        routes: &mut RouteMap,
        theme: &mut ThemeEngine,
    ) -> Result<MenuRegistry, ModuleError> {
        let mut menus = MenuRegistry::new();

        for module in &self.modules {
            let mut scoped = routes.scoped(module.name());
            let mut ctx = BootContext::new(&mut scoped, &mut *theme);

            module
                .custom
                .clone()
                .boot(&mut ctx)
                .map_err(|source| ModuleError::Boot {
                    module: module.name().to_string(),
                    source,
                })?;

            if let Some(provider) = &module.menu {
                menus.register(module.info.clone(), provider.clone());
            }

            info!(
                module = %module.name(),
                title = %module.info.title(),
                menu = module.menu.is_some(),
                "module booted"
            );
        }

        Ok(menus)
    }

    /// Find a module by machine name.
    pub fn get(&self, name: &str) -> Option<&InstalledModule> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstalledModule> {
        self.modules.iter()
    }

    /// Get module count.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rootline_sdk::types::Method;

    #[test]
    fn duplicate_modules_rejected() {
        let first = Arc::new(TestPostModule::new());
        let second = Arc::new(TestPostModule::new());
        let err = ModuleRegistry::new(vec![
            InstalledModule::custom(first),
            InstalledModule::custom(second),
        ])
        .err()
        .unwrap();
        assert_eq!(err.module(), "test_post");
    }

    #[test]
    fn builtin_boot_registers_routes_views_and_menu() {
        let registry = ModuleRegistry::new(builtin_modules()).unwrap();
        let mut routes = RouteMap::new();
        let mut theme = ThemeEngine::empty();
        theme
            .tera_mut()
            .add_raw_template("layout.html", "{% block content %}{% endblock content %}")
            .unwrap();

        let menus = registry.boot(&mut routes, &mut theme).unwrap();

        assert_eq!(menus.len(), 1);
        assert_eq!(routes.len(), 2);
        let form = routes.get(TestPostModule::ROUTE_NAME).unwrap();
        assert_eq!(form.path, "/tree/{tree}/testpost");
        assert_eq!(form.methods(), vec![Method::Get, Method::Post]);
        assert_eq!(
            routes.get(TestPostModule::DO_POST_ROUTE_NAME).unwrap().methods(),
            vec![Method::Post]
        );
        assert!(theme.has_template("test_post::form"));
        assert!(theme.has_template("test_post::result"));
    }

    #[test]
    fn booting_twice_fails_on_duplicate_routes() {
        let registry = ModuleRegistry::new(builtin_modules()).unwrap();
        let mut routes = RouteMap::new();
        let mut theme = ThemeEngine::empty();
        theme
            .tera_mut()
            .add_raw_template("layout.html", "{% block content %}{% endblock content %}")
            .unwrap();

        registry.boot(&mut routes, &mut theme).unwrap();
        let err = registry.boot(&mut routes, &mut theme).err().unwrap();
        assert!(matches!(err, ModuleError::Boot { .. }));
    }
}
