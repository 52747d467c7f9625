//! Retention sweep for uploaded and generated files

pub mod service;

pub use service::{RetentionSweeper, SweepReport};
