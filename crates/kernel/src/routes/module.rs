//! Module routes: adapts HTTP requests to module request handlers.
//!
//! Every route in the [`RouteMap`] becomes an axum route. The adapter
//! resolves the `{tree}` parameter, picks up the current user from the
//! request extensions, decodes form bodies on POST (url-encoded or
//! multipart), and renders whatever the module returns through the theme
//! engine.

use std::collections::HashMap;

use axum::Router;
use axum::extract::{Form, FromRequest, Multipart, Path, Request, State};
use axum::http::header;
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use rootline_sdk::module::RequestHandler;
use rootline_sdk::types::{IncomingRequest, Method, ParsedBody, User};
use tracing::debug;

use super::RouteMap;
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Create the router for every module route.
pub fn router(routes: &RouteMap) -> Router<AppState> {
    let mut router = Router::new();

    for (path, methods) in routes.by_path() {
        let mut method_router: MethodRouter<AppState> = MethodRouter::new();

        for (method, route) in methods {
            let name = route.name.clone();
            let handler = route.handler.clone();
            method_router = method_router.on(
                method_filter(method),
                move |State(state): State<AppState>,
                      Path(params): Path<HashMap<String, String>>,
                      request: Request| async move {
                    dispatch(state, &name, handler.as_ref(), params, request).await
                },
            );
        }

        router = router.route(path, method_router);
    }

    router
}

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Head => MethodFilter::HEAD,
        Method::Post => MethodFilter::POST,
        Method::Put => MethodFilter::PUT,
        Method::Patch => MethodFilter::PATCH,
        Method::Delete => MethodFilter::DELETE,
        Method::Options => MethodFilter::OPTIONS,
    }
}

/// Run one request through a module handler.
async fn dispatch(
    state: AppState,
    route: &str,
    handler: &dyn RequestHandler,
    params: HashMap<String, String>,
    request: Request,
) -> AppResult<Response> {
    let tree = params
        .get("tree")
        .and_then(|name| state.trees().get(name))
        .cloned()
        .ok_or(AppError::NotFound)?;

    let user = request
        .extensions()
        .get::<CurrentUser>()
        .map(|current| current.0.clone())
        .unwrap_or_else(User::visitor);

    let method = Method::parse(request.method().as_str()).ok_or(AppError::MethodNotAllowed)?;

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let mut incoming = IncomingRequest::new(method, target, tree.clone(), user.clone());

    if method == Method::Post
        && let Some(body) = parse_body(&state, route, request).await
    {
        incoming = incoming.with_body(body);
    }

    let response = handler.handle(&incoming, &state.host_services())?;

    let site = state.site_context(Some(&tree), &user);
    Ok(state.theme().materialize(response, &site))
}

/// Decode a POST body into form fields.
///
/// Url-encoded and multipart bodies are decoded. Anything else yields `None`
/// and handlers fall back to their defaults. Multipart file parts are not
/// form fields and are skipped.
async fn parse_body(state: &AppState, route: &str, request: Request) -> Option<ParsedBody> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        });

    if !is_multipart {
        return match Form::<ParsedBody>::from_request(request, state).await {
            Ok(Form(body)) => Some(body),
            Err(rejection) => {
                debug!(route, error = %rejection, "request body is not a form");
                None
            }
        };
    }

    let mut multipart = match Multipart::from_request(request, state).await {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!(route, error = %rejection, "invalid multipart request");
            return None;
        }
    };

    let mut body = ParsedBody::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                match field.text().await {
                    Ok(value) => {
                        body.insert(name, value);
                    }
                    Err(e) => {
                        debug!(route, field = %name, error = %e, "unreadable multipart field");
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                // Keep the fields read so far
                debug!(route, error = %e, "malformed multipart body");
                break;
            }
        }
    }

    Some(body)
}
