//! Per-client generation cooldown

pub mod tracker;

pub use tracker::{evaluate, CooldownDecision, CooldownTracker};
