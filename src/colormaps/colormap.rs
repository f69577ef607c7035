//! Colormap trait and color utilities.
//!
//! This module defines the common interface for all colormaps and the
//! floating-point [`Rgb`] color they produce.

use image::Rgba;

use crate::error::{MapError, Result};

/// An RGB color with each channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (case-insensitive, leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(MapError::Config {
                message: format!("Invalid hex color: {}", hex),
            });
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| MapError::Config {
                message: format!("Invalid hex color: {}", hex),
            })
        };

        Ok(Self::from_u8([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }

    pub fn from_u8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f64 / 255.0,
            rgb[1] as f64 / 255.0,
            rgb[2] as f64 / 255.0,
        )
    }

    /// Clamp every channel into [0, 1]; NaN becomes 0
    pub fn clamped(self) -> Self {
        let clamp = |c: f64| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        Self::new(clamp(self.r), clamp(self.g), clamp(self.b))
    }

    /// 8-bit channels, rounding half to even
    pub fn to_u8(self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.r * 255.0).round_ties_even() as u8,
            (c.g * 255.0).round_ties_even() as u8,
            (c.b * 255.0).round_ties_even() as u8,
        ]
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn to_rgba(self, alpha: u8) -> Rgba<u8> {
        let [r, g, b] = self.to_u8();
        Rgba([r, g, b, alpha])
    }
}

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map one finite value to a color
    fn map_value(&self, value: f64) -> Rgb;

    /// Map a whole value column, preserving row order.
    ///
    /// Missing and NaN entries take the `missing` color.
    fn map_column(&self, values: &[Option<f64>], missing: Rgb) -> Vec<Rgb> {
        values
            .iter()
            .map(|value| match value {
                Some(v) if !v.is_nan() => self.map_value(*v),
                _ => missing,
            })
            .collect()
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// Get a colormap by name
pub fn get_colormap(name: &str, saturation_limit: f64) -> Result<Box<dyn Colormap>> {
    use super::diverging::ChangeColormap;

    match name.to_lowercase().as_str() {
        "change" => Ok(Box::new(ChangeColormap::new(saturation_limit))),
        _ => Err(MapError::Config {
            message: format!("Unknown colormap: {}", name),
        }),
    }
}

/// Linear interpolation between two colors
pub fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        c1.r * (1.0 - t) + c2.r * t,
        c1.g * (1.0 - t) + c2.g * t,
        c1.b * (1.0 - t) + c2.b * t,
    )
}
