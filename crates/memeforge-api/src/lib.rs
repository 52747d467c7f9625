//! memeforge HTTP server
//!
//! Axum application exposing the landing page, the generate and download endpoints and static
//! serving of generated images. The binary in `main.rs` only loads configuration and starts the
//! server; everything else lives here so integration tests can build the same router.

pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use setup::initialize_app;
pub use state::AppState;
