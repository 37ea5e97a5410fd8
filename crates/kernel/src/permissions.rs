//! Module access control.
//!
//! Every module component has an access level per tree: the site's override
//! if one is configured, otherwise the module's default. A user's own level
//! in a tree comes from their role there. Access is granted when the
//! component's level is at least as permissive as the user's.

use std::sync::Arc;

use dashmap::DashMap;
use rootline_sdk::error::AccessDenied;
use rootline_sdk::host::Authorizer;
use rootline_sdk::module::{ModuleCapability, ModuleInfo};
use rootline_sdk::types::{AccessLevel, Tree, TreeRole, User};
use tracing::debug;

use crate::config::ModuleAccessConfig;

/// Key for a per-tree access override.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AccessKey {
    module: String,
    capability: ModuleCapability,
    tree: String,
}

/// Permission service with DashMap-backed access overrides.
#[derive(Clone, Default)]
pub struct PermissionService {
    inner: Arc<PermissionServiceInner>,
}

#[derive(Default)]
struct PermissionServiceInner {
    /// (module, capability, tree) -> configured access level.
    overrides: DashMap<AccessKey, AccessLevel>,
}

impl PermissionService {
    /// Create a permission service with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a permission service seeded from the site config.
    pub fn from_config(rules: &[ModuleAccessConfig]) -> Self {
        let service = Self::new();
        for rule in rules {
            service.set_access_level(&rule.module, rule.capability, &rule.tree, rule.level);
        }
        service
    }

    /// The privilege level a user holds in a tree.
    ///
    /// - Administrators and tree managers are `Manager`.
    /// - Members, editors and moderators are `Member`.
    /// - Everyone else, including the visitor, is `Visitor`.
    pub fn user_access_level(tree: &Tree, user: &User) -> AccessLevel {
        if user.is_admin {
            return AccessLevel::Manager;
        }

        match user.role_in(tree) {
            TreeRole::Manager => AccessLevel::Manager,
            TreeRole::Member | TreeRole::Editor | TreeRole::Moderator => AccessLevel::Member,
            TreeRole::None => AccessLevel::Visitor,
        }
    }

    /// The access level configured for a module component in a tree.
    pub fn module_access_level(
        &self,
        module: &dyn ModuleInfo,
        capability: ModuleCapability,
        tree: &Tree,
    ) -> AccessLevel {
        let key = AccessKey {
            module: module.name().to_string(),
            capability,
            tree: tree.name.clone(),
        };

        self.inner
            .overrides
            .get(&key)
            .map(|level| *level)
            .unwrap_or_else(|| module.default_access_level(capability))
    }

    /// Override the access level of a module component in one tree.
    pub fn set_access_level(
        &self,
        module: &str,
        capability: ModuleCapability,
        tree: &str,
        level: AccessLevel,
    ) {
        self.inner.overrides.insert(
            AccessKey {
                module: module.to_string(),
                capability,
                tree: tree.to_string(),
            },
            level,
        );
    }

    /// Drop every override, reverting all components to their defaults.
    pub fn reset_all(&self) {
        self.inner.overrides.clear();
    }

    /// Number of configured overrides (for monitoring).
    pub fn override_count(&self) -> usize {
        self.inner.overrides.len()
    }
}

impl Authorizer for PermissionService {
    fn check_access(
        &self,
        module: &dyn ModuleInfo,
        capability: ModuleCapability,
        tree: &Tree,
        user: &User,
    ) -> Result<(), AccessDenied> {
        let required = self.module_access_level(module, capability, tree);
        let held = Self::user_access_level(tree, user);

        if required < held {
            debug!(
                module = %module.name(),
                %capability,
                tree = %tree.name,
                user = %user.name,
                required = required.value(),
                held = held.value(),
                "module access denied"
            );
            return Err(AccessDenied::new(module.name(), capability, &tree.name));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rootline_test_utils::test_user;
    use std::path::PathBuf;

    struct Dummy;

    impl ModuleInfo for Dummy {
        fn name(&self) -> &str {
            "dummy"
        }
        fn title(&self) -> String {
            "Dummy".into()
        }
        fn description(&self) -> String {
            String::new()
        }
        fn resources_folder(&self) -> PathBuf {
            PathBuf::new()
        }
    }

    fn tree() -> Tree {
        Tree::new(1, "family1", "Family One")
    }

    fn user_with(role: TreeRole) -> User {
        test_user("u", "family1", role)
    }

    fn admin() -> User {
        User {
            is_admin: true,
            ..user_with(TreeRole::None)
        }
    }

    #[test]
    fn user_levels() {
        let tree = tree();
        assert_eq!(
            PermissionService::user_access_level(&tree, &User::visitor()),
            AccessLevel::Visitor
        );
        assert_eq!(
            PermissionService::user_access_level(&tree, &user_with(TreeRole::Editor)),
            AccessLevel::Member
        );
        assert_eq!(
            PermissionService::user_access_level(&tree, &user_with(TreeRole::Manager)),
            AccessLevel::Manager
        );
        assert_eq!(
            PermissionService::user_access_level(&tree, &admin()),
            AccessLevel::Manager
        );
    }

    #[test]
    fn default_level_admits_visitors() {
        let service = PermissionService::new();
        assert!(
            service
                .check_access(&Dummy, ModuleCapability::Custom, &tree(), &User::visitor())
                .is_ok()
        );
    }

    #[test]
    fn member_level_excludes_visitors() {
        let service = PermissionService::new();
        service.set_access_level(
            "dummy",
            ModuleCapability::Custom,
            "family1",
            AccessLevel::Member,
        );

        let err = service
            .check_access(&Dummy, ModuleCapability::Custom, &tree(), &User::visitor())
            .unwrap_err();
        assert_eq!(err.module, "dummy");
        assert_eq!(err.tree, "family1");

        assert!(
            service
                .check_access(
                    &Dummy,
                    ModuleCapability::Custom,
                    &tree(),
                    &user_with(TreeRole::Member)
                )
                .is_ok()
        );
        // Overrides are per capability
        assert!(
            service
                .check_access(&Dummy, ModuleCapability::Menu, &tree(), &User::visitor())
                .is_ok()
        );
    }

    #[test]
    fn hidden_excludes_everyone() {
        let service = PermissionService::new();
        service.set_access_level(
            "dummy",
            ModuleCapability::Custom,
            "family1",
            AccessLevel::Hidden,
        );

        assert!(
            service
                .check_access(&Dummy, ModuleCapability::Custom, &tree(), &admin())
                .is_err()
        );
    }

    #[test]
    fn overrides_are_per_tree() {
        let service = PermissionService::new();
        service.set_access_level(
            "dummy",
            ModuleCapability::Custom,
            "family2",
            AccessLevel::Manager,
        );

        assert!(
            service
                .check_access(&Dummy, ModuleCapability::Custom, &tree(), &User::visitor())
                .is_ok()
        );

        service.reset_all();
        assert_eq!(service.override_count(), 0);
    }
}
