//! Image compositing module
//!
//! - Template compositing (compositor)
//! - Caption rendering with drop shadows (text)
//! - Caption font loading (fonts)

pub mod compositor;
pub mod fonts;
pub mod text;

pub use compositor::{encode_png, Compositor, TemplateAssets};
pub use fonts::load_font;

use std::path::PathBuf;

/// Errors raised while building a meme image
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("Failed to load template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode uploaded image {path}: {source}")]
    UserImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Font error: {0}")]
    Font(String),
}

impl From<CompositeError> for memeforge_core::AppError {
    fn from(err: CompositeError) -> Self {
        memeforge_core::AppError::ImageProcessing(err.to_string())
    }
}
