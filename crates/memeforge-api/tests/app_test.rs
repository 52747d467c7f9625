//! Landing page, health, session and header integration tests.
//!
//! Run with: `cargo test -p memeforge-api --test app_test`

mod helpers;

use axum::http::StatusCode;
use helpers::setup_test_app;

#[tokio::test]
async fn test_landing_page_serves_form() {
    let app = setup_test_app().await;

    let response = app.client().get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("name=\"image\""));
    assert!(html.contains("value=\"phub.png\""));
    assert!(html.contains("value=\"xnxx.png\""));

    let script = app.client().get("/app.js").await;
    assert_eq!(script.status_code(), StatusCode::OK);
    assert!(script.text().contains("/generate"));
}

#[tokio::test]
async fn test_health_reports_ready() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["templates"]["classic"], "healthy");
    assert_eq!(body["templates"]["detailed"], "healthy");
}

#[tokio::test]
async fn test_health_reports_missing_template() {
    let app = setup_test_app().await;
    std::fs::remove_file(app.config.template_dir.join("xnxx.png")).unwrap();

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let body: serde_json::Value = response.json();
    assert_eq!(body["templates"]["detailed"], "missing");
}

#[tokio::test]
async fn test_session_cookie_issued_once() {
    let app = setup_test_app().await;

    let first = app.client().get("/").await;
    let set_cookie = first.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("memeforge.sid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(!set_cookie.contains("Secure"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let second = app
        .client()
        .get("/")
        .add_header("Cookie", cookie)
        .await;
    assert!(!second.headers().contains_key("set-cookie"));

    let forged = app
        .client()
        .get("/")
        .add_header("Cookie", "memeforge.sid=abc.0000")
        .await;
    assert!(forged.headers().contains_key("set-cookie"));
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = setup_test_app().await;

    let response = app.client().get("/").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));

    let echoed = app
        .client()
        .get("/health")
        .add_header("X-Request-ID", "req-123")
        .await;
    assert_eq!(echoed.headers()["x-request-id"], "req-123");
}

#[test]
fn test_bundled_template_images_fit_their_layouts() {
    use image::GenericImageView;
    use memeforge_core::models::Template;

    let template_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../template");
    for template in Template::ALL {
        let path = template_dir.join(template.form_value());
        let background = image::open(&path)
            .unwrap_or_else(|e| panic!("{} should decode: {e}", path.display()));
        let (width, height) = background.dimensions();

        let rect = template.layout().image_rect;
        assert!(rect.x >= 0 && rect.y >= 0);
        assert!(rect.x as u32 + rect.width <= width, "{template} image slot too wide");
        assert!(rect.y as u32 + rect.height <= height, "{template} image slot too tall");
    }
}
