//! Domain models

pub mod generation;
pub mod template;

pub use generation::{Captions, GenerationRequest, GenerationResponse, UploadedImage};
pub use template::{
    CaptionSlot, CaptionStyle, DropShadow, ImageRect, Rgba8, Template, TemplateLayout,
};
