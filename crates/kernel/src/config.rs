//! Configuration.
//!
//! Process settings come from environment variables (with `.env` support).
//! The site itself (trees, users, module access rules) comes from a TOML
//! file named by `SITE_CONFIG`.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rootline_sdk::module::ModuleCapability;
use rootline_sdk::types::{AccessLevel, TreeRole};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path to the site TOML file (default: ./rootline.toml).
    pub site_config: PathBuf,

    /// Directory holding the kernel's own templates (default: ./crates/kernel/templates).
    pub templates_dir: PathBuf,

    /// Header a trusted reverse proxy sets to the authenticated user name
    /// (default: X-Remote-User).
    pub remote_user_header: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let site_config = env::var("SITE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./rootline.toml"));

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./crates/kernel/templates"));

        let remote_user_header =
            env::var("REMOTE_USER_HEADER").unwrap_or_else(|_| "X-Remote-User".to_string());

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            site_config,
            templates_dir,
            remote_user_header,
            cors_allowed_origins,
        })
    }
}

/// Site definition parsed from the site TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSettings,

    #[serde(default)]
    pub trees: Vec<TreeConfig>,

    #[serde(default)]
    pub users: Vec<UserConfig>,

    /// Per-tree overrides of module access levels.
    #[serde(default)]
    pub module_access: Vec<ModuleAccessConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_site_name")]
    pub name: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: default_site_name(),
        }
    }
}

fn default_site_name() -> String {
    "Rootline".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeConfig {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub admin: bool,
    /// Tree name -> role.
    #[serde(default)]
    pub roles: std::collections::BTreeMap<String, TreeRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleAccessConfig {
    pub module: String,
    pub capability: ModuleCapability,
    pub tree: String,
    pub level: AccessLevel,
}

impl SiteConfig {
    /// Parse a site file from the given path.
    pub fn parse(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read site config: {}", path.display()))?;

        Self::parse_str(&content, path)
    }

    /// Parse a site definition from a TOML string.
    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let site: SiteConfig = toml::from_str(content)
            .with_context(|| format!("failed to parse site config TOML at {}", path.display()))?;

        site.validate(path)?;
        Ok(site)
    }

    /// Validate cross references between trees, users and access rules.
    fn validate(&self, path: &Path) -> Result<()> {
        let mut trees = HashSet::new();
        for tree in &self.trees {
            if tree.name.is_empty() || tree.name.contains('/') {
                bail!(
                    "site config {}: invalid tree name '{}'",
                    path.display(),
                    tree.name
                );
            }
            if !trees.insert(tree.name.as_str()) {
                bail!(
                    "site config {}: tree '{}' is defined twice",
                    path.display(),
                    tree.name
                );
            }
        }

        let mut users = HashSet::new();
        for user in &self.users {
            if user.name.is_empty() {
                bail!("site config {}: user with empty name", path.display());
            }
            if !users.insert(user.name.as_str()) {
                bail!(
                    "site config {}: user '{}' is defined twice",
                    path.display(),
                    user.name
                );
            }
            for tree in user.roles.keys() {
                if !trees.contains(tree.as_str()) {
                    bail!(
                        "site config {}: user '{}' has a role in unknown tree '{}'",
                        path.display(),
                        user.name,
                        tree
                    );
                }
            }
        }

        for rule in &self.module_access {
            if !trees.contains(rule.tree.as_str()) {
                bail!(
                    "site config {}: access rule for module '{}' names unknown tree '{}'",
                    path.display(),
                    rule.module,
                    rule.tree
                );
            }
        }

        Ok(())
    }
}
