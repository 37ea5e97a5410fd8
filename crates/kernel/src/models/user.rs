//! User directory.

use std::collections::HashMap;

use rootline_sdk::types::User;

use crate::config::UserConfig;

/// Known user accounts, looked up by user name.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    /// Build the directory. Ids are assigned from 1 in configuration order;
    /// id 0 belongs to the visitor.
    pub fn from_config(users: &[UserConfig]) -> Self {
        let users = users
            .iter()
            .enumerate()
            .map(|(index, user)| {
                let id = u32::try_from(index + 1).unwrap_or(u32::MAX);
                let account = User {
                    id,
                    name: user.name.clone(),
                    real_name: user.real_name.clone().unwrap_or_else(|| user.name.clone()),
                    is_admin: user.admin,
                    roles: user.roles.clone(),
                };
                (user.name.clone(), account)
            })
            .collect();

        Self { users }
    }

    /// Find a user by name.
    pub fn find(&self, name: &str) -> Option<&User> {
        self.users.get(name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
