//! Core types shared between modules and the kernel.
//!
//! Everything here lives for a single request/response cycle. The kernel
//! builds an [`IncomingRequest`] from the HTTP request, hands it to a module,
//! and turns the returned [`RenderedResponse`] back into HTTP.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP request method as seen by modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }

    /// Parse an upper-case method token. Returns `None` for extension methods.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::Get),
            "HEAD" => Some(Method::Head),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            "OPTIONS" => Some(Method::Options),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A family tree (genealogical database) hosted by the application.
///
/// Modules treat trees as opaque: they receive one per request and pass it
/// on to the authorizer, the renderer and the URL generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub id: u32,
    /// URL-safe machine name, used in `/tree/{tree}/...` paths.
    pub name: String,
    pub title: String,
}

impl Tree {
    pub fn new(id: u32, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: title.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Role a user holds within one tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeRole {
    #[default]
    None,
    Member,
    Editor,
    Moderator,
    Manager,
}

/// Minimum privilege required to see something.
///
/// Lower is more privileged, so a module configured at `Member` is visible
/// to members and managers but not to visitors. `Hidden` is below every
/// user level and therefore hides the component from everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Hidden,
    Manager,
    Member,
    Visitor,
}

impl AccessLevel {
    /// Numeric privilege value (-1 hidden, 0 manager, 1 member, 2 visitor).
    pub fn value(&self) -> i8 {
        match self {
            AccessLevel::Hidden => -1,
            AccessLevel::Manager => 0,
            AccessLevel::Member => 1,
            AccessLevel::Visitor => 2,
        }
    }
}

/// An authenticated user, or the anonymous visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// `0` is reserved for the visitor.
    pub id: u32,
    pub name: String,
    pub real_name: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Per-tree roles keyed by tree name.
    #[serde(default)]
    pub roles: BTreeMap<String, TreeRole>,
}

impl User {
    /// The anonymous visitor.
    pub fn visitor() -> Self {
        Self {
            id: 0,
            name: String::new(),
            real_name: "Visitor".to_string(),
            is_admin: false,
            roles: BTreeMap::new(),
        }
    }

    pub fn is_visitor(&self) -> bool {
        self.id == 0
    }

    /// Role held in the given tree (`TreeRole::None` when unassigned).
    pub fn role_in(&self, tree: &Tree) -> TreeRole {
        self.roles.get(&tree.name).copied().unwrap_or_default()
    }
}

/// Form fields decoded from a request body.
pub type ParsedBody = BTreeMap<String, String>;

/// An inbound request, already resolved against a tree and a user.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    target: String,
    body: Option<ParsedBody>,
    tree: Tree,
    user: User,
}

impl IncomingRequest {
    pub fn new(method: Method, target: impl Into<String>, tree: Tree, user: User) -> Self {
        Self {
            method,
            target: target.into(),
            body: None,
            tree,
            user,
        }
    }

    /// Attach a decoded form body.
    pub fn with_body(mut self, body: ParsedBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Raw request target: path plus query string, exactly as received.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Decoded body, or `None` when the body was absent or not form-encoded.
    pub fn parsed_body(&self) -> Option<&ParsedBody> {
        self.body.as_ref()
    }

    /// Single body field, if present.
    pub fn body_field(&self, name: &str) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get(name))
            .map(String::as_str)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

/// Named values handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewData(Map<String, Value>);

impl ViewData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Values that fail to serialize are skipped.
    pub fn insert<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.0.insert(key.to_string(), v);
        }
    }

    /// Builder form of [`ViewData::insert`].
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a value as a string slice, if it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// What a module hands back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
    pub status: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A template to render, e.g. `"test_post::form"`, with its values.
    View { template: String, values: ViewData },
    /// Literal text, sent as `text/plain`.
    Text(String),
}

impl RenderedResponse {
    pub fn view(template: impl Into<String>, values: ViewData) -> Self {
        Self {
            status: 200,
            body: ResponseBody::View {
                template: template.into(),
                values,
            },
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Text(content.into()),
        }
    }

    /// Template identifier for view responses.
    pub fn template(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::View { template, .. } => Some(template),
            ResponseBody::Text(_) => None,
        }
    }

    /// Template values for view responses.
    pub fn values(&self) -> Option<&ViewData> {
        match &self.body {
            ResponseBody::View { values, .. } => Some(values),
            ResponseBody::Text(_) => None,
        }
    }

    /// Body of text responses.
    pub fn text_body(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::View { .. } => None,
        }
    }
}

/// An entry contributed to the main application menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub label: String,
    pub url: String,
    pub class: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Menu {
    pub fn new(label: impl Into<String>, url: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            class: class.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an HTML attribute to the menu link.
    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
