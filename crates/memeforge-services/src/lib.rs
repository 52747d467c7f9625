//! Memeforge Services Layer
//!
//! Business services sitting between the HTTP layer and the storage/processing crates: the
//! per-client cooldown, the retention sweep and the generation pipeline. Handlers in
//! memeforge-api stay thin and call into these.

pub mod cleanup;
pub mod cooldown;
pub mod generation;

pub use cleanup::{RetentionSweeper, SweepReport};
pub use cooldown::{CooldownDecision, CooldownTracker};
pub use generation::GenerationService;
pub use memeforge_processing::{
    load_font, CompositeError, Compositor, TemplateAssets, UploadValidator, ValidationError,
};
pub use memeforge_storage::{LocalStorage, Storage, StorageError, StorageResult};
