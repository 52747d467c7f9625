use super::text::draw_caption;
use super::CompositeError;
use ab_glyph::FontArc;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use memeforge_core::models::{Captions, Template};
use memeforge_core::Config;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// On-disk background image for each template
#[derive(Debug, Clone)]
pub struct TemplateAssets {
    pub classic: PathBuf,
    pub detailed: PathBuf,
}

impl TemplateAssets {
    pub fn from_config(config: &Config) -> Self {
        Self {
            classic: config.template_asset_path(Template::Classic),
            detailed: config.template_asset_path(Template::Detailed),
        }
    }

    pub fn path(&self, template: Template) -> &Path {
        match template {
            Template::Classic => &self.classic,
            Template::Detailed => &self.detailed,
        }
    }
}

/// Builds meme images from a template background, an uploaded image and captions.
///
/// All methods are blocking; callers on an async runtime should run them through
/// `spawn_blocking`.
#[derive(Clone)]
pub struct Compositor {
    assets: TemplateAssets,
    font: FontArc,
}

impl Compositor {
    pub fn new(assets: TemplateAssets, font: FontArc) -> Self {
        Self { assets, font }
    }

    pub fn assets(&self) -> &TemplateAssets {
        &self.assets
    }

    /// Compose a meme. The result always has the template's dimensions.
    pub fn composite(
        &self,
        template: Template,
        user_image_path: &Path,
        captions: &Captions,
    ) -> Result<RgbaImage, CompositeError> {
        let template_path = self.assets.path(template);
        let background = decode_file(template_path).map_err(|source| CompositeError::Template {
            path: template_path.to_path_buf(),
            source,
        })?;
        let user_image = decode_file(user_image_path).map_err(|source| CompositeError::UserImage {
            path: user_image_path.to_path_buf(),
            source,
        })?;

        let layout = template.layout();
        let mut canvas = RgbaImage::new(background.width(), background.height());
        imageops::overlay(&mut canvas, &background.to_rgba8(), 0, 0);

        let rect = layout.image_rect;
        let stretched = user_image
            .resize_exact(rect.width, rect.height, FilterType::Triangle)
            .to_rgba8();
        imageops::overlay(&mut canvas, &stretched, rect.x, rect.y);

        for style in layout.captions {
            if let Some(text) = captions.get(style.slot) {
                draw_caption(&mut canvas, &self.font, style, text);
            }
        }

        tracing::debug!(
            template = %template,
            width = canvas.width(),
            height = canvas.height(),
            "Composited meme image"
        );

        Ok(canvas)
    }

    /// Compose and encode as PNG in one step
    pub fn render_png(
        &self,
        template: Template,
        user_image_path: &Path,
        captions: &Captions,
    ) -> Result<Vec<u8>, CompositeError> {
        let canvas = self.composite(template, user_image_path, captions)?;
        encode_png(&canvas)
    }
}

fn decode_file(path: &Path) -> Result<DynamicImage, image::ImageError> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

/// Encode an RGBA raster as PNG bytes
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, CompositeError> {
    let mut buffer = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(CompositeError::Encode)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::fonts::load_font;
    use image::{GenericImageView, Rgba};
    use tempfile::TempDir;

    const BACKGROUND: Rgba<u8> = Rgba([20, 20, 20, 255]);
    const USER: Rgba<u8> = Rgba([0, 200, 0, 255]);

    fn write_png(path: &Path, width: u32, height: u32, color: Rgba<u8>) {
        RgbaImage::from_pixel(width, height, color).save(path).unwrap();
    }

    fn fixture() -> (TempDir, Compositor, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let assets = TemplateAssets {
            classic: dir.path().join("phub.png"),
            detailed: dir.path().join("xnxx.png"),
        };
        write_png(&assets.classic, 502, 500, BACKGROUND);
        write_png(&assets.detailed, 500, 490, BACKGROUND);

        // Uploaded files keep their original extension; the decoder sniffs the content anyway
        let user = dir.path().join("upload.jpg");
        let img = RgbaImage::from_pixel(40, 30, USER);
        img.save_with_format(&user, ImageFormat::Png).unwrap();

        let compositor = Compositor::new(assets, load_font(None).unwrap());
        (dir, compositor, user)
    }

    #[test]
    fn test_output_has_template_dimensions() {
        let (_dir, compositor, user) = fixture();
        let captions = Captions {
            title: Some("Hello".to_string()),
            subtitle: Some("World".to_string()),
            ..Default::default()
        };

        let classic = compositor
            .composite(Template::Classic, &user, &captions)
            .unwrap();
        assert_eq!(classic.dimensions(), (502, 500));

        let detailed = compositor
            .composite(Template::Detailed, &user, &captions)
            .unwrap();
        assert_eq!(detailed.dimensions(), (500, 490));
    }

    #[test]
    fn test_user_image_is_stretched_into_rect() {
        let (_dir, compositor, user) = fixture();
        let canvas = compositor
            .composite(Template::Classic, &user, &Captions::default())
            .unwrap();

        // Rect (1,110,500,315): corners inside are the user color, just outside is background
        let is_user = |p: &Rgba<u8>| p[0] < 5 && p[1] > 190 && p[2] < 5;
        assert!(is_user(canvas.get_pixel(1, 110)));
        assert!(is_user(canvas.get_pixel(500, 424)));
        assert!(is_user(canvas.get_pixel(250, 267)));
        assert_eq!(*canvas.get_pixel(0, 110), BACKGROUND);
        assert_eq!(*canvas.get_pixel(1, 109), BACKGROUND);
        assert_eq!(*canvas.get_pixel(501, 200), BACKGROUND);
        assert_eq!(*canvas.get_pixel(250, 425), BACKGROUND);
    }

    #[test]
    fn test_missing_captions_render_nothing() {
        let (_dir, compositor, user) = fixture();
        let canvas = compositor
            .composite(Template::Classic, &user, &Captions::default())
            .unwrap();
        // Caption band below the image stays untouched
        for y in 430..500 {
            for x in 0..502 {
                assert_eq!(*canvas.get_pixel(x, y), BACKGROUND);
            }
        }

        let captioned = compositor
            .composite(
                Template::Classic,
                &user,
                &Captions {
                    title: Some("Hello".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_ne!(canvas, captioned);
    }

    #[test]
    fn test_undecodable_upload_is_an_error() {
        let (dir, compositor, _user) = fixture();
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"definitely not an image").unwrap();

        let result = compositor.composite(Template::Classic, &bogus, &Captions::default());
        assert!(matches!(result, Err(CompositeError::UserImage { .. })));
    }

    #[test]
    fn test_missing_template_asset_is_an_error() {
        let (dir, _compositor, user) = fixture();
        let compositor = Compositor::new(
            TemplateAssets {
                classic: dir.path().join("absent.png"),
                detailed: dir.path().join("absent.png"),
            },
            load_font(None).unwrap(),
        );

        let result = compositor.composite(Template::Detailed, &user, &Captions::default());
        assert!(matches!(result, Err(CompositeError::Template { .. })));
    }

    #[test]
    fn test_render_png_produces_decodable_png() {
        let (_dir, compositor, user) = fixture();
        let png = compositor
            .render_png(Template::Detailed, &user, &Captions::default())
            .unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (500, 490));
    }
}
