//! Image inspection utilities for testing.

use image::{ImageError, Rgba, RgbaImage};
use std::path::Path;

/// Load a PNG as RGBA
pub fn load_rgba(path: &Path) -> Result<RgbaImage, ImageError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Pixel at a fractional position, truncated to the containing pixel
pub fn pixel_at(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    assert!(
        x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height(),
        "Position ({}, {}) outside {}x{} image",
        x,
        y,
        image.width(),
        image.height()
    );
    *image.get_pixel(x as u32, y as u32)
}

/// Number of pixels exactly equal to `color`
pub fn count_pixels(image: &RgbaImage, color: Rgba<u8>) -> usize {
    image.pixels().filter(|&&p| p == color).count()
}

/// Number of near-black pixels in rows strictly between `top` and `bottom`
pub fn count_dark_pixels(image: &RgbaImage, top: f64, bottom: f64) -> usize {
    image
        .enumerate_pixels()
        .filter(|(_, y, p)| {
            let y = *y as f64;
            y > top && y < bottom && p[0] < 100 && p[1] < 100 && p[2] < 100
        })
        .count()
}
