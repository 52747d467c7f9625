//! Meme generation pipeline

pub mod service;

pub use service::GenerationService;
