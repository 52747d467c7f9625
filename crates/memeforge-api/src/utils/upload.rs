//! Multipart parsing for the generate form

use crate::error::multipart_error_to_app;
use axum::extract::multipart::{Field, Multipart};
use bytes::BytesMut;
use memeforge_core::models::{Captions, UploadedImage};
use memeforge_core::AppError;
use memeforge_processing::{UploadValidator, ValidationError};

/// Name of the only accepted file field
pub const IMAGE_FIELD: &str = "image";

/// Parsed `POST /generate` form. Template and image presence are checked by the caller.
#[derive(Debug, Default)]
pub struct GenerateForm {
    pub template: Option<String>,
    pub captions: Captions,
    pub image: Option<UploadedImage>,
}

/// Read the generate form, validating the image as it streams in.
///
/// Exactly one file is accepted and only under `image`. The file's declared name and content
/// type are checked before its bytes are read, and reading stops as soon as the size cap is
/// exceeded. Unknown text fields are ignored.
pub async fn read_generate_form(
    mut multipart: Multipart,
    validator: &UploadValidator,
) -> Result<GenerateForm, AppError> {
    let max_bytes = validator.max_file_size();
    let mut form = GenerateForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error_to_app(e, max_bytes))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error_to_app(e, max_bytes))?;
            if field_name == "template" {
                form.template = Some(value);
            } else if !form.captions.set_field(&field_name, value) {
                tracing::debug!(field = %field_name, "Ignoring unknown form field");
            }
            continue;
        };

        if field_name != IMAGE_FIELD {
            return Err(AppError::InvalidInput(format!(
                "Unexpected file field '{}'; send exactly one file in '{}'",
                field_name, IMAGE_FIELD
            )));
        }

        // Browsers submit an empty, unnamed part when no file was chosen
        if file_name.is_empty() {
            read_capped(&mut field, max_bytes).await?;
            continue;
        }

        if form.image.is_some() {
            return Err(AppError::InvalidInput(
                "Only one image may be uploaded per request".to_string(),
            ));
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let extension = validator.validate_declared(&file_name, &content_type)?;

        let data = read_capped(&mut field, max_bytes).await?;
        validator.validate_file_size(data.len())?;

        form.image = Some(UploadedImage {
            original_filename: file_name,
            content_type,
            extension,
            data: data.freeze(),
        });
    }

    Ok(form)
}

async fn read_capped(field: &mut Field<'_>, max_bytes: usize) -> Result<BytesMut, AppError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error_to_app(e, max_bytes))?
    {
        let size = buffer.len() + chunk.len();
        if size > max_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: max_bytes,
            }
            .into());
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}
