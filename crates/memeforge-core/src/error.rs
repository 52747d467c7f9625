//! Error types module
//!
//! All request-level failures are unified under [`AppError`]. Each variant describes how it
//! should be presented over HTTP through the [`ErrorMetadata`] trait, so the api crate can render
//! responses without matching on variants itself.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like rate limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_TEMPLATE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("No image uploaded")]
    MissingImage,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Cooldown active: {seconds_remaining}s remaining")]
    CooldownActive { seconds_remaining: u64 },

    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
    },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Image generation timed out after {0}s")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check the uploaded file and form fields"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidTemplate(_) => (
            400,
            "INVALID_TEMPLATE",
            false,
            Some("Select one of the available templates"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingImage => (
            400,
            "MISSING_IMAGE",
            false,
            Some("Attach an image in the 'image' field"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Generated images expire after 30 minutes"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Upload an image smaller than 5 MB"),
            false,
            LogLevel::Debug,
        ),
        AppError::CooldownActive { .. } => (
            429,
            "COOLDOWN_ACTIVE",
            true,
            Some("Wait for the cooldown to elapse and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::RateLimited { .. } => (
            429,
            "RATE_LIMITED",
            true,
            Some("Retry after the Retry-After interval"),
            false,
            LogLevel::Warn,
        ),
        AppError::ImageProcessing(_) => (
            500,
            "IMAGE_PROCESSING_ERROR",
            false,
            Some("Try a different image file"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Timeout(_) => (
            500,
            "GENERATION_TIMEOUT",
            true,
            Some("Try a smaller image"),
            false,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::InvalidTemplate(_) => "InvalidTemplate",
            AppError::MissingImage => "MissingImage",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::CooldownActive { .. } => "CooldownActive",
            AppError::RateLimited { .. } => "RateLimited",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::Storage(_) => "Storage",
            AppError::Timeout(_) => "Timeout",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Seconds the client should wait before retrying, for 429 responses.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AppError::CooldownActive { seconds_remaining } => Some(*seconds_remaining),
            AppError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;
        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::InvalidTemplate(_) => "Invalid template selected".to_string(),
            AppError::MissingImage => "No image uploaded".to_string(),
            AppError::NotFound(_) => "File not found".to_string(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::CooldownActive { seconds_remaining } => format!(
                "Please wait {} seconds before generating another image.",
                seconds_remaining
            ),
            AppError::RateLimited { message, .. } => message.clone(),
            AppError::ImageProcessing(_) | AppError::Timeout(_) => {
                "Error generating image".to_string()
            }
            AppError::Storage(_) => "Error saving generated image".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "An internal error occurred".to_string()
            }
        }
    }
}
