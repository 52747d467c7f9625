use crate::cooldown::CooldownTracker;
use memeforge_core::models::{GenerationRequest, GenerationResponse};
use memeforge_core::AppError;
use memeforge_processing::Compositor;
use memeforge_storage::{generate_key, Storage, StorageError};
use std::sync::Arc;
use std::time::Duration;

fn storage_error(context: &str, err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(key) => AppError::NotFound(key),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        other => AppError::Storage(format!("{}: {}", context, other)),
    }
}

/// Runs one generation request end to end: persist the upload, composite off the async
/// executor, write the PNG, then start the client's cooldown.
#[derive(Clone)]
pub struct GenerationService {
    uploads: Arc<dyn Storage>,
    outputs: Arc<dyn Storage>,
    compositor: Arc<Compositor>,
    cooldown: Arc<CooldownTracker>,
    composite_timeout: Duration,
}

impl GenerationService {
    pub fn new(
        uploads: Arc<dyn Storage>,
        outputs: Arc<dyn Storage>,
        compositor: Arc<Compositor>,
        cooldown: Arc<CooldownTracker>,
        composite_timeout: Duration,
    ) -> Self {
        Self {
            uploads,
            outputs,
            compositor,
            cooldown,
            composite_timeout,
        }
    }

    pub fn cooldown(&self) -> &Arc<CooldownTracker> {
        &self.cooldown
    }

    #[tracing::instrument(
        skip(self, request),
        fields(
            client_id = %request.client_id,
            template = %request.template,
            upload_bytes = request.image.data.len()
        )
    )]
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AppError> {
        self.cooldown.reserve(&request.client_id).await?;

        match self.run(&request).await {
            Ok(output_key) => {
                self.cooldown.record_success(&request.client_id).await;
                tracing::info!(key = %output_key, "Generated image");
                Ok(GenerationResponse::for_file(&output_key))
            }
            Err(e) => {
                self.cooldown.release(&request.client_id).await;
                Err(e)
            }
        }
    }

    async fn run(&self, request: &GenerationRequest) -> Result<String, AppError> {
        let upload_key = generate_key(&request.image.extension);
        let upload_path = self
            .uploads
            .write(&upload_key, &request.image.data)
            .await
            .map_err(|e| storage_error("Failed to persist upload", e))?;

        let result = self.render_and_store(request, upload_path).await;

        // The upload is only needed for compositing; the sweep catches anything missed here
        if let Err(e) = self.uploads.delete(&upload_key).await {
            tracing::warn!(key = %upload_key, error = %e, "Failed to delete temporary upload");
        }

        result
    }

    async fn render_and_store(
        &self,
        request: &GenerationRequest,
        upload_path: std::path::PathBuf,
    ) -> Result<String, AppError> {
        let compositor = Arc::clone(&self.compositor);
        let template = request.template;
        let captions = request.captions.clone();

        let task = tokio::task::spawn_blocking(move || {
            compositor.render_png(template, &upload_path, &captions)
        });

        let png = match tokio::time::timeout(self.composite_timeout, task).await {
            Ok(Ok(rendered)) => rendered?,
            Ok(Err(join_error)) => {
                return Err(AppError::Internal(format!(
                    "Compositing task failed: {}",
                    join_error
                )));
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.composite_timeout.as_secs(),
                    "Compositing timed out"
                );
                return Err(AppError::Timeout(self.composite_timeout.as_secs()));
            }
        };

        let output_key = generate_key("png");
        self.outputs
            .write(&output_key, &png)
            .await
            .map_err(|e| storage_error("Failed to write generated image", e))?;

        Ok(output_key)
    }
}
