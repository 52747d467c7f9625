//! Working directory bootstrap

use anyhow::{Context, Result};
use memeforge_core::models::Template;
use memeforge_core::Config;
use memeforge_storage::{LocalStorage, Storage};
use std::sync::Arc;

/// Create the upload, output and template directories and open the two file stores.
///
/// Missing template images only produce a warning: the server still starts and generation
/// for that template fails with a 500 until the asset is provided.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Arc<dyn Storage>)> {
    let uploads = LocalStorage::new("uploads", &config.upload_dir)
        .await
        .context("Failed to initialize upload directory")?;
    let outputs = LocalStorage::new("outputs", &config.output_dir)
        .await
        .context("Failed to initialize output directory")?;

    tokio::fs::create_dir_all(&config.template_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create template directory {}",
                config.template_dir.display()
            )
        })?;

    for template in Template::ALL {
        let path = config.template_asset_path(template);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::warn!(
                template = %template,
                path = %path.display(),
                "Template image missing; generation with this template fails until a PNG is placed here or TEMPLATE_DIR is changed"
            );
        }
    }

    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.output_dir.display(),
        template_dir = %config.template_dir.display(),
        "Working directories ready"
    );

    Ok((Arc::new(uploads), Arc::new(outputs)))
}
