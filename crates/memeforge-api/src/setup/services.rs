//! Service wiring and background tasks

use crate::constants::COOLDOWN_PURGE_INTERVAL_SECS;
use crate::state::AppState;
use anyhow::{Context, Result};
use memeforge_core::{Clock, Config, SystemClock};
use memeforge_processing::{load_font, Compositor, TemplateAssets, UploadValidator};
use memeforge_services::{CooldownTracker, GenerationService, RetentionSweeper};
use memeforge_storage::Storage;
use std::sync::Arc;
use std::time::Duration;

/// Build the application state and start the retention sweeper and cooldown janitor.
pub fn initialize_services(
    config: &Config,
    uploads: Arc<dyn Storage>,
    outputs: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let font = load_font(config.font_path.as_deref()).context("Failed to load caption font")?;
    let templates = TemplateAssets::from_config(config);
    let compositor = Arc::new(Compositor::new(templates.clone(), font));

    let cooldown = Arc::new(CooldownTracker::new(
        config.cooldown_window(),
        clock.clone(),
    ));

    let generation = GenerationService::new(
        uploads.clone(),
        outputs.clone(),
        compositor,
        cooldown.clone(),
        config.composite_timeout(),
    );

    let validator = UploadValidator::new(
        config.max_upload_bytes,
        config.allowed_extensions.clone(),
    );

    let sweeper = Arc::new(RetentionSweeper::new(
        vec![uploads, outputs.clone()],
        clock,
        config.retention_max_age(),
        config.sweep_interval(),
    ));
    sweeper.start();
    tracing::info!(
        retention_max_age_secs = config.retention_max_age_secs,
        sweep_interval_secs = config.sweep_interval_secs,
        "Retention sweeper started"
    );

    cooldown
        .clone()
        .start_janitor(Duration::from_secs(COOLDOWN_PURGE_INTERVAL_SECS));

    Ok(Arc::new(AppState {
        config: config.clone(),
        generation,
        cooldown,
        validator,
        outputs,
        templates,
    }))
}
