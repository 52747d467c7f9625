//! Route configuration and setup

use crate::constants::{
    DOWNLOAD_RATE_LIMIT_MESSAGE, GENERATE_RATE_LIMIT_MESSAGE, HTTP_CONCURRENCY_LIMIT,
    MULTIPART_OVERHEAD_BYTES, RATE_LIMITER_CLEANUP_INTERVAL_SECS,
};
use crate::handlers;
use crate::middleware::{
    client_ip_middleware,
    rate_limit::{rate_limit_middleware, HttpRateLimiter},
    get_request_id, request_id_middleware,
    security_headers::{security_headers_middleware, SecurityHeadersConfig},
    session_middleware, SessionConfig, TrustedProxies, VisitorSession,
};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use memeforge_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let window = Duration::from_secs(config.rate_limit_window_secs);
    let generate_limiter = setup_rate_limiter(
        config.generate_rate_limit_per_hour,
        window,
        GENERATE_RATE_LIMIT_MESSAGE,
    );
    let download_limiter = setup_rate_limiter(
        config.download_rate_limit_per_hour,
        window,
        DOWNLOAD_RATE_LIMIT_MESSAGE,
    );

    let generate_routes = Router::new()
        .route("/generate", post(handlers::generate::generate))
        .route_layer(axum::middleware::from_fn_with_state(
            generate_limiter,
            rate_limit_middleware,
        ));

    let download_routes = Router::new()
        .route("/download/{filename}", get(handlers::download::download))
        .route_layer(axum::middleware::from_fn_with_state(
            download_limiter,
            rate_limit_middleware,
        ));

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));
    let session_config = Arc::new(SessionConfig::new(
        &config.session_secret,
        config.cookie_secure(),
    ));

    let app = Router::new()
        .route("/", get(handlers::landing::index))
        .route("/app.js", get(handlers::landing::app_js))
        .route("/health", get(handlers::health::health_check))
        .merge(generate_routes)
        .merge(download_routes)
        .nest_service("/output", ServeDir::new(&config.output_dir))
        .layer(DefaultBodyLimit::disable())
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(
            config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(axum::middleware::from_fn_with_state(
            session_config,
            session_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            TrustedProxies(config.trusted_proxy_count),
            client_ip_middleware,
        ))
        .with_state(state);

    Ok(app)
}

/// Request span carrying the request id and visitor session
fn make_request_span(request: &Request) -> tracing::Span {
    let request_id = get_request_id(request).unwrap_or_default();
    let session_id = request
        .extensions()
        .get::<VisitorSession>()
        .map(|session| session.0.as_str())
        .unwrap_or_default();
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
        session_id = %session_id,
    )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .expose_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .allow_credentials(false)
    };
    Ok(cors)
}

/// Setup a rate limiter with its periodic cleanup task
fn setup_rate_limiter(limit: u32, window: Duration, message: &'static str) -> Arc<HttpRateLimiter> {
    let rate_limiter = Arc::new(HttpRateLimiter::new(limit, window, message));

    rate_limiter
        .clone()
        .start_cleanup(Duration::from_secs(RATE_LIMITER_CLEANUP_INTERVAL_SECS));

    tracing::info!(
        limit,
        window_secs = window.as_secs(),
        "HTTP rate limiter configured"
    );

    rate_limiter
}
