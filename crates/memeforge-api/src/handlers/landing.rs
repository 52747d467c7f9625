use axum::{
    http::header,
    response::{Html, IntoResponse},
};

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const APP_JS: &str = include_str!("../../assets/app.js");

/// Landing page with the upload form
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Script driving the upload form, served separately so the CSP can forbid inline scripts
pub async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
}
