//! Theme engine with Tera templates and module view namespaces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use rootline_sdk::error::ViewError;
use rootline_sdk::host::{Renderer, ViewRegistrar};
use rootline_sdk::types::{Menu, RenderedResponse, ResponseBody, Tree, User, ViewData};
use tera::Tera;
use tracing::{debug, error, warn};

use crate::routes::RouteMap;

/// Separator between a view namespace and the view name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Site-wide values injected into every page.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site_name: String,
    pub tree: Option<Tree>,
    pub user: User,
    pub menus: Vec<Menu>,
}

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
    /// Registered view namespaces and their directories.
    namespaces: HashMap<String, PathBuf>,
}

impl ThemeEngine {
    /// Create a new theme engine loading templates from the given directory.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self {
            tera,
            namespaces: HashMap::new(),
        })
    }

    /// Create a theme engine with no templates (for testing).
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
            namespaces: HashMap::new(),
        }
    }

    /// Get a mutable reference to Tera (for adding templates at runtime).
    pub fn tera_mut(&mut self) -> &mut Tera {
        &mut self.tera
    }

    /// Expose named-route URLs to templates as `route(name=..., <param>=...)`.
    ///
    /// Call after every module has booted so all routes are known.
    pub fn register_route_function(&mut self, routes: Arc<RouteMap>) {
        self.tera.register_function(
            "route",
            move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                let name = args
                    .get("name")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| tera::Error::msg("route() requires a `name` argument"))?;

                let params: Vec<(&str, String)> = args
                    .iter()
                    .filter(|(key, _)| key.as_str() != "name")
                    .map(|(key, value)| {
                        let value = match value {
                            tera::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (key.as_str(), value)
                    })
                    .collect();
                let params: Vec<(&str, &str)> =
                    params.iter().map(|(k, v)| (*k, v.as_str())).collect();

                routes
                    .url_for(name, &params)
                    .map(tera::Value::String)
                    .map_err(|e| tera::Error::msg(e.to_string()))
            },
        );
    }

    /// Whether a template identifier resolves to a loaded template.
    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template(&Self::template_file(template)).is_ok()
    }

    /// Names of all registered view namespaces.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Map a template identifier to the name Tera knows it by.
    ///
    /// `"test_post::form"` -> `"test_post::form.html"`. The `.html` suffix
    /// keeps Tera's autoescaping on for module views.
    fn template_file(template: &str) -> String {
        if template.ends_with(".html") {
            template.to_string()
        } else {
            format!("{template}.html")
        }
    }

    /// Render a module response into an HTTP response.
    ///
    /// Text bodies go out as `text/plain`. Views are rendered with the site
    /// context merged in; a template failure becomes a 500 error page.
    pub fn materialize(&self, response: RenderedResponse, site: &SiteContext) -> Response {
        let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);

        match response.body {
            ResponseBody::Text(text) => (status, text).into_response(),
            ResponseBody::View { template, values } => {
                match self.render_page(&template, values, site) {
                    Ok(html) => (status, Html(html)).into_response(),
                    Err(e) => {
                        error!(error = %e, template = %template, "failed to render template");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Html(format!(
                                r#"<!DOCTYPE html>
<html><head><title>Error</title></head>
<body><h1>Template Error</h1><pre>{}</pre></body></html>"#,
                                html_escape(&format!("{e:#}"))
                            )),
                        )
                            .into_response()
                    }
                }
            }
        }
    }

    /// Render a view with site context to an HTML string.
    pub fn render_page(
        &self,
        template: &str,
        values: ViewData,
        site: &SiteContext,
    ) -> Result<String> {
        let mut context = tera::Context::from_serialize(&values)
            .context("template values must be a JSON object")?;
        context.insert("site_name", &site.site_name);
        context.insert("menus", &site.menus);
        context.insert("user", &site.user);
        if !values.contains_key("tree")
            && let Some(tree) = &site.tree
        {
            context.insert("tree", tree);
        }

        self.tera
            .render(&Self::template_file(template), &context)
            .with_context(|| format!("failed to render '{template}'"))
    }
}

impl Renderer for ThemeEngine {
    fn render(&self, template: &str, values: ViewData) -> RenderedResponse {
        if !self.has_template(template) {
            // Rendered lazily by `materialize`, which reports the failure
            warn!(template = %template, "rendering unknown template");
        }
        RenderedResponse::view(template, values)
    }
}

impl ViewRegistrar for ThemeEngine {
    fn register_namespace(&mut self, namespace: &str, dir: &Path) -> Result<(), ViewError> {
        if self.namespaces.contains_key(namespace) {
            return Err(ViewError::DuplicateNamespace {
                namespace: namespace.to_string(),
            });
        }

        let io_error = |source| ViewError::Io {
            namespace: namespace.to_string(),
            path: dir.display().to_string(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let name = format!("{namespace}{NAMESPACE_SEPARATOR}{stem}.html");
            files.push((path.clone(), Some(name)));
        }

        let count = files.len();
        self.tera
            .add_template_files(files)
            .map_err(|e| ViewError::Template {
                namespace: namespace.to_string(),
                details: format!("{e:?}"),
            })?;

        debug!(namespace = %namespace, dir = %dir.display(), views = count, "registered view namespace");
        self.namespaces
            .insert(namespace.to_string(), dir.to_path_buf());
        Ok(())
    }
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
