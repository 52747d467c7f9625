use super::CompositeError;
use ab_glyph::FontArc;
use std::path::Path;

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Load the caption font: the file at `path` when given, otherwise the bundled DejaVu Sans.
pub fn load_font(path: Option<&Path>) -> Result<FontArc, CompositeError> {
    match path {
        Some(path) => {
            let data = std::fs::read(path).map_err(|e| {
                CompositeError::Font(format!("Failed to read font {}: {}", path.display(), e))
            })?;
            let font = FontArc::try_from_vec(data).map_err(|e| {
                CompositeError::Font(format!("Invalid font {}: {}", path.display(), e))
            })?;
            tracing::info!(path = %path.display(), "Loaded caption font");
            Ok(font)
        }
        None => FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|e| CompositeError::Font(format!("Invalid bundled font: {}", e))),
    }
}
