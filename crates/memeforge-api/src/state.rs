//! Application state shared by handlers and middleware.

use memeforge_core::Config;
use memeforge_processing::{TemplateAssets, UploadValidator};
use memeforge_services::{CooldownTracker, GenerationService};
use memeforge_storage::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub generation: GenerationService,
    pub cooldown: Arc<CooldownTracker>,
    pub validator: UploadValidator,
    pub outputs: Arc<dyn Storage>,
    pub templates: TemplateAssets,
}
