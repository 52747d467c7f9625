use crate::error::HttpAppError;
use crate::middleware::ClientIp;
use crate::state::AppState;
use crate::utils::upload::read_generate_form;
use axum::{
    extract::{Multipart, State},
    Json,
};
use memeforge_core::models::{GenerationRequest, GenerationResponse, Template};
use memeforge_core::AppError;
use std::sync::Arc;

/// Generate a meme from an uploaded image
///
/// Checks run cheapest first so a rejected request never touches the disk:
/// cooldown, then the multipart form (extension, content type, size), then presence of the
/// image, then the template name.
///
/// # Errors
/// - `AppError::CooldownActive` - the client generated an image less than 30 seconds ago
/// - `AppError::InvalidInput` / `AppError::PayloadTooLarge` - the upload was rejected
/// - `AppError::MissingImage` - no file in the `image` field
/// - `AppError::InvalidTemplate` - unknown template value
/// - `AppError::ImageProcessing` / `AppError::Storage` - compositing or writing failed
#[tracing::instrument(
    skip(state, multipart),
    fields(client_ip = %client_ip.as_str(), operation = "generate")
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    client_ip: ClientIp,
    multipart: Multipart,
) -> Result<Json<GenerationResponse>, HttpAppError> {
    state.cooldown.ensure_allowed(client_ip.as_str()).await?;

    let form = read_generate_form(multipart, &state.validator).await?;

    let image = form.image.ok_or(AppError::MissingImage)?;
    let template: Template = form
        .template
        .as_deref()
        .unwrap_or_default()
        .parse()?;

    tracing::debug!(
        template = %template,
        original_filename = %image.original_filename,
        content_type = %image.content_type,
        size_bytes = image.data.len(),
        "Generate request accepted"
    );

    let response = state
        .generation
        .generate(GenerationRequest {
            client_id: client_ip.0,
            template,
            captions: form.captions,
            image,
        })
        .await?;

    Ok(Json(response))
}
