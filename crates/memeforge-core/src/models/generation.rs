use super::template::{CaptionSlot, Template};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Caption text submitted with a generation request.
///
/// Text is drawn verbatim. Missing fields render nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Captions {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub subtitle2: Option<String>,
    pub subtitle3: Option<String>,
}

impl Captions {
    pub fn get(&self, slot: CaptionSlot) -> Option<&str> {
        let value = match slot {
            CaptionSlot::Title => &self.title,
            CaptionSlot::Subtitle => &self.subtitle,
            CaptionSlot::Subtitle2 => &self.subtitle2,
            CaptionSlot::Subtitle3 => &self.subtitle3,
        };
        value.as_deref().filter(|s| !s.is_empty())
    }

    /// Assign a form field by name. Returns false for names that are not captions.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let target = match name {
            "title" => &mut self.title,
            "subtitle" => &mut self.subtitle,
            "subtitle2" => &mut self.subtitle2,
            "subtitle3" => &mut self.subtitle3,
            _ => return false,
        };
        *target = Some(value);
        true
    }
}

/// An accepted upload waiting to be composited
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_filename: String,
    pub content_type: String,
    /// Lower-cased extension from the original filename
    pub extension: String,
    pub data: Bytes,
}

/// Everything needed to produce one image. Lives for one request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub client_id: String,
    pub template: Template,
    pub captions: Captions,
    pub image: UploadedImage,
}

/// Successful generation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    pub image_url: String,
    pub download_url: String,
}

impl GenerationResponse {
    pub fn for_file(filename: &str) -> Self {
        Self {
            success: true,
            image_url: format!("/output/{}", filename),
            download_url: format!("/download/{}", filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_caption_is_absent() {
        let captions = Captions {
            title: Some("Hello".to_string()),
            subtitle: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(captions.get(CaptionSlot::Title), Some("Hello"));
        assert_eq!(captions.get(CaptionSlot::Subtitle), None);
        assert_eq!(captions.get(CaptionSlot::Subtitle3), None);
    }

    #[test]
    fn test_set_field() {
        let mut captions = Captions::default();
        assert!(captions.set_field("subtitle2", "1.2M views".to_string()));
        assert!(!captions.set_field("template", "phub.png".to_string()));
        assert_eq!(captions.get(CaptionSlot::Subtitle2), Some("1.2M views"));
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_value(GenerationResponse::for_file("1700000000000-ab12.png"))
            .expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["imageUrl"], "/output/1700000000000-ab12.png");
        assert_eq!(json["downloadUrl"], "/download/1700000000000-ab12.png");
    }
}
