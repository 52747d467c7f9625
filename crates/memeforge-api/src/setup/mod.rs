//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use memeforge_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production());

    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment, "Configuration loaded and validated");

    let (uploads, outputs) = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, uploads, outputs)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
