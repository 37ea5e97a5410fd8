//! Remote user middleware.
//!
//! Authentication happens in front of the kernel: a trusted reverse proxy
//! sets a header (default `X-Remote-User`) to the authenticated user name.
//! This middleware resolves that name against the user directory and stores
//! the result in request extensions. Requests without the header, or naming
//! an unknown user, proceed as the visitor.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use rootline_sdk::types::User;
use tracing::debug;

use crate::state::AppState;

/// The user making the current request.
///
/// Stored in request extensions for per-request access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub User);

/// Middleware to attach the current user to the request.
pub async fn resolve_request_user(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let name = request
        .headers()
        .get(state.remote_user_header())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let user = match name {
        Some(name) => match state.users().find(name) {
            Some(user) => user.clone(),
            None => {
                debug!(user = %name, "unknown remote user; treating as visitor");
                User::visitor()
            }
        },
        None => User::visitor(),
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}
