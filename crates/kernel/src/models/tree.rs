//! Tree registry.

use std::collections::HashMap;

use rootline_sdk::types::Tree;

use crate::config::TreeConfig;

/// All trees hosted by the site, looked up by name.
#[derive(Debug, Default)]
pub struct TreeRegistry {
    /// Trees in configuration order.
    trees: Vec<Tree>,
    /// Tree name -> index into `trees`.
    by_name: HashMap<String, usize>,
}

impl TreeRegistry {
    /// Build the registry. Ids are assigned from 1 in configuration order.
    pub fn from_config(trees: &[TreeConfig]) -> Self {
        let mut registry = Self::default();
        for (index, tree) in trees.iter().enumerate() {
            let id = u32::try_from(index + 1).unwrap_or(u32::MAX);
            registry
                .by_name
                .insert(tree.name.clone(), registry.trees.len());
            registry
                .trees
                .push(Tree::new(id, tree.name.clone(), tree.title.clone()));
        }
        registry
    }

    /// Find a tree by its URL name.
    pub fn get(&self, name: &str) -> Option<&Tree> {
        self.by_name.get(name).and_then(|i| self.trees.get(*i))
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
