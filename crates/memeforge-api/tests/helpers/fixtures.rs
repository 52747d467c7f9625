//! Test fixtures: synthetic template and upload images.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Write a solid template background of the given size.
pub fn write_template(path: &Path, (width, height): (u32, u32)) {
    RgbaImage::from_pixel(width, height, Rgba([30, 30, 30, 255]))
        .save_with_format(path, ImageFormat::Png)
        .expect("Failed to write template fixture");
}

/// Encoded PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 180, 255, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    buffer
}
