//! Caption rendering
//!
//! Positions follow canvas conventions: `x` is the left edge and `baseline_y` the alphabetic
//! baseline. Font sizes are pixels per em.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use imageproc::filter::gaussian_blur_f32;
use memeforge_core::models::{CaptionStyle, DropShadow};

/// Convert an em size in pixels to the scale ab_glyph expects (ascent to descent height).
pub fn em_scale(font: &impl Font, size: f32) -> PxScale {
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(size * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(size),
    }
}

/// Top edge to hand to imageproc so the glyphs sit on `baseline_y`.
fn top_from_baseline(font: &impl Font, scale: PxScale, baseline_y: i32) -> i32 {
    baseline_y - font.as_scaled(scale).ascent().round() as i32
}

/// Draw one caption, shadow first. Empty text draws nothing; text past the canvas edge is clipped.
pub fn draw_caption(canvas: &mut RgbaImage, font: &impl Font, style: &CaptionStyle, text: &str) {
    if text.is_empty() {
        return;
    }

    let scale = em_scale(font, style.size);
    let top = top_from_baseline(font, scale, style.baseline_y);

    if let Some(shadow) = &style.shadow {
        draw_shadow(canvas, font, scale, style.x, top, shadow, text);
    }

    draw_text_mut(canvas, Rgba(style.color), style.x, top, scale, font, text);
}

fn draw_shadow(
    canvas: &mut RgbaImage,
    font: &impl Font,
    scale: PxScale,
    x: i32,
    top: i32,
    shadow: &DropShadow,
    text: &str,
) {
    let (text_width, _) = text_size(scale, font, text);
    let line_height = font.as_scaled(scale).height().ceil() as u32;
    let pad = (shadow.blur * 2.0).ceil() as u32 + 1;

    let mut layer = RgbaImage::new(text_width + pad * 2, line_height + pad * 2);
    draw_text_mut(
        &mut layer,
        Rgba(shadow.color),
        pad as i32,
        pad as i32,
        scale,
        font,
        text,
    );

    let layer = if shadow.blur > 0.0 {
        gaussian_blur_f32(&layer, shadow.blur / 2.0)
    } else {
        layer
    };

    imageops::overlay(
        canvas,
        &layer,
        (x + shadow.offset_x) as i64 - pad as i64,
        (top + shadow.offset_y) as i64 - pad as i64,
    );
}
