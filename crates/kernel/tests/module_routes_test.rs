#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for module routes served through the full router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{TestApp, body_string};

#[tokio::test]
async fn form_page_renders_for_visitor() {
    let app = TestApp::new();

    let response = app.get("/tree/family1/testpost", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("<h2>Test</h2>"));
    assert!(body.contains(r#"action="/tree/family1/do_post""#));
    assert!(body.contains(r#"name="content""#));
    assert!(body.contains("Family One"));
    assert!(body.contains("Visitor"));
}

#[tokio::test]
async fn form_page_lists_module_menu() {
    let app = TestApp::new();

    let body = body_string(app.get("/tree/family1/testpost", None).await).await;
    assert!(body.contains(r#"href="/tree/family1/testpost""#));
    assert!(body.contains(r#"class="menu-test""#));
    assert!(body.contains(r#"rel="nofollow""#));
}

#[tokio::test]
async fn do_post_echoes_content() {
    let app = TestApp::new();

    let response = app
        .post_form("/tree/family1/do_post", "content=hello+there", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Post Result"));
    assert!(body.contains(r#"<pre class="test-post-content">hello there</pre>"#));
    assert!(body.contains(r#"href="/tree/family1/testpost""#));
}

#[tokio::test]
async fn do_post_without_content_renders_empty() {
    let app = TestApp::new();

    let response = app
        .post_form("/tree/family1/do_post", "other=value", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Post Result"));
    assert!(body.contains(r#"<pre class="test-post-content"></pre>"#));
}

#[tokio::test]
async fn do_post_with_non_form_body_renders_empty() {
    let app = TestApp::new();

    let request = Request::post("/tree/family1/do_post")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"content":"ignored"}"#))
        .unwrap();
    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains(r#"<pre class="test-post-content"></pre>"#));
    assert!(!body.contains("ignored"));
}

fn multipart_request(path: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XX")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn do_post_with_multipart_body_echoes_content() {
    let app = TestApp::new();

    let body = "--XX\r\n\
                Content-Disposition: form-data; name=\"content\"\r\n\
                \r\n\
                hello\r\n\
                --XX--\r\n";
    let response = app
        .request(multipart_request("/tree/family1/do_post", body))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Post Result"));
    assert!(body.contains(r#"<pre class="test-post-content">hello</pre>"#));
}

#[tokio::test]
async fn multipart_file_parts_are_not_fields() {
    let app = TestApp::new();

    let body = "--XX\r\n\
                Content-Disposition: form-data; name=\"content\"; filename=\"notes.txt\"\r\n\
                Content-Type: text/plain\r\n\
                \r\n\
                from a file\r\n\
                --XX--\r\n";
    let response = app
        .request(multipart_request("/tree/family1/do_post", body))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains(r#"<pre class="test-post-content"></pre>"#));
    assert!(!body.contains("from a file"));
}

#[tokio::test]
async fn do_post_escapes_markup() {
    let app = TestApp::new();

    let body = body_string(
        app.post_form("/tree/family1/do_post", "content=%3Cb%3Ebold%3C%2Fb%3E", None)
            .await,
    )
    .await;
    assert!(body.contains("&lt;b&gt;bold"));
    assert!(!body.contains("<b>bold"));
}

#[tokio::test]
async fn post_to_form_route_returns_plain_marker() {
    let app = TestApp::new();

    let response = app
        .post_form("/tree/family1/testpost", "content=x", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "works2:/tree/family1/testpost"
    );
}

#[tokio::test]
async fn plain_marker_keeps_query_string() {
    let app = TestApp::new();

    let response = app
        .post_form("/tree/family1/testpost?x=1", "", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "works2:/tree/family1/testpost?x=1"
    );
}

#[tokio::test]
async fn get_on_do_post_is_not_allowed() {
    let app = TestApp::new();

    let response = app.get("/tree/family1/do_post", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn member_level_module_denies_visitor() {
    let app = TestApp::new();

    let response = app.get("/tree/family2/testpost", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_form("/tree/family2/do_post", "content=hello", None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn member_level_module_allows_member() {
    let app = TestApp::new();

    let response = app.get("/tree/family2/testpost", Some("alice")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Alice Member"));
    assert!(body.contains(r#"class="menu-test""#));
}

#[tokio::test]
async fn unknown_remote_user_is_visitor() {
    let app = TestApp::new();

    let response = app.get("/tree/family2/testpost", Some("mallory")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn hidden_module_denies_admin() {
    let app = TestApp::new();

    let response = app.get("/tree/private/testpost", Some("root")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn runtime_override_takes_effect() {
    let app = TestApp::new();
    app.state.permissions().set_access_level(
        "test_post",
        rootline_sdk::module::ModuleCapability::Custom,
        "family1",
        rootline_sdk::types::AccessLevel::Manager,
    );

    let response = app.get("/tree/family1/testpost", Some("alice")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/tree/family1/testpost", Some("root")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_tree_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/tree/nowhere/testpost", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_counts() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["modules"], 1);
    assert_eq!(json["routes"], 2);
    assert_eq!(json["trees"], 3);
}
