use memeforge_core::AppError;
use std::path::Path;

/// Validation errors for uploaded images
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {0} (expected image/*)")]
    InvalidContentType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { max, .. } => AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} MB.",
                max / (1024 * 1024)
            )),
            ValidationError::EmptyFile => {
                AppError::InvalidInput("Uploaded file is empty".to_string())
            }
            ValidationError::InvalidExtension { .. } | ValidationError::InvalidFilename(_) => {
                AppError::InvalidInput("Only image files are allowed!".to_string())
            }
            ValidationError::InvalidContentType(_) => {
                AppError::InvalidInput("Invalid file type!".to_string())
            }
        }
    }
}

/// Upload validator
///
/// Checks the declared file name and content type before any bytes are read, and the size once
/// the body has been buffered.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension, returning it lower-cased
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Any `image/*` content type is accepted; the extension check is what narrows formats.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !content_type.trim().to_lowercase().starts_with("image/") {
            return Err(ValidationError::InvalidContentType(content_type.to_string()));
        }
        Ok(())
    }

    /// Validate the multipart headers of a file field, returning the normalized extension.
    /// Both checks must pass.
    pub fn validate_declared(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<String, ValidationError> {
        let extension = self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        Ok(extension)
    }

    /// Validate all aspects of a buffered file
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<String, ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_declared(filename, content_type)
    }
}
