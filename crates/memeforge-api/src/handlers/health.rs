//! Liveness endpoint reporting working directory and template availability.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use memeforge_core::models::Template;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(serde::Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub uploads: String,
    pub outputs: String,
    pub templates: BTreeMap<&'static str, String>,
}

async fn check_dir(path: &Path) -> String {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => "healthy".to_string(),
        Ok(_) => "unhealthy: not a directory".to_string(),
        Err(e) => format!("unhealthy: {}", e),
    }
}

async fn check_file(path: &Path) -> String {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => "healthy".to_string(),
        Ok(_) => "missing".to_string(),
        Err(_) => "missing".to_string(),
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uploads = check_dir(&state.config.upload_dir).await;
    let outputs = check_dir(&state.config.output_dir).await;

    let mut templates = BTreeMap::new();
    for template in Template::ALL {
        templates.insert(
            template.slug(),
            check_file(state.templates.path(template)).await,
        );
    }

    let healthy = uploads == "healthy"
        && outputs == "healthy"
        && templates.values().all(|status| status == "healthy");

    if !healthy {
        tracing::warn!(%uploads, %outputs, ?templates, "Health check failed");
    }

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            uploads,
            outputs,
            templates,
        }),
    )
}
