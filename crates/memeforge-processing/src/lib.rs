//! Memeforge Processing Library
//!
//! Upload validation and meme image compositing. Everything here is synchronous and CPU-bound.

pub mod image;
pub mod validator;

pub use self::image::{encode_png, load_font, CompositeError, Compositor, TemplateAssets};
pub use validator::{UploadValidator, ValidationError};
