//! Memeforge Core Library
//!
//! Domain models, error types, configuration and the clock abstraction shared by every
//! memeforge crate.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ALLOWED_EXTENSIONS};
pub use error::{AppError, ErrorMetadata, LogLevel};
