//! Text annotations and the legend.
//!
//! Fonts are loaded once per run: the configured files when set, otherwise
//! the DejaVu Serif faces bundled with the crate.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::pixelops::interpolate;
use imageproc::rect::Rect;
use std::path::Path;
use tracing::debug;

use super::frame::MapFrame;
use crate::colormaps::Rgb;
use crate::config::{Annotation, LegendConfig, StyleConfig, VerticalAnchor};
use crate::error::{MapError, Result};

const BUNDLED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSerif.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSerif-Bold.ttf");

// Legend layout, in multiples of the legend font size
const LEGEND_BORDER_PAD: f64 = 0.4;
const LEGEND_LABEL_SPACING: f64 = 0.5;
const LEGEND_HANDLE_LENGTH: f64 = 2.0;
const LEGEND_HANDLE_HEIGHT: f64 = 0.7;
const LEGEND_HANDLE_TEXT_PAD: f64 = 0.8;
const LEGEND_AXES_PAD: f64 = 0.5;
const LEGEND_FRAME_ALPHA: f32 = 0.8;
const LEGEND_EDGE: Rgba<u8> = Rgba([204, 204, 204, 255]);

/// Convert a point size to pixels at `dpi`
pub fn points_to_pixels(points: f32, dpi: f32) -> f32 {
    points * dpi / 72.0
}

/// Regular and bold faces for the annotations
pub struct Fonts {
    regular: FontVec,
    bold: FontVec,
}

impl Fonts {
    /// Load the configured fonts, falling back to the bundled faces.
    ///
    /// A configured path that cannot be read or parsed is an error.
    pub fn load(style: &StyleConfig) -> Result<Self> {
        let regular = match &style.font_path {
            Some(path) => read_font(path)?,
            None => parse_font(BUNDLED_REGULAR.to_vec(), "bundled DejaVu Serif")?,
        };
        let bold = match &style.bold_font_path {
            Some(path) => read_font(path)?,
            None => parse_font(BUNDLED_BOLD.to_vec(), "bundled DejaVu Serif Bold")?,
        };
        Ok(Self { regular, bold })
    }

    fn face(&self, bold: bool) -> &FontVec {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }
}

fn read_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path)?;
    debug!("Using font {}", path.display());
    parse_font(bytes, &path.display().to_string())
}

fn parse_font(bytes: Vec<u8>, source: &str) -> Result<FontVec> {
    FontVec::try_from_vec(bytes).map_err(|e| MapError::Config {
        message: format!("Invalid font {}: {}", source, e),
    })
}

/// Draw one annotation, horizontally centered on its anchor
pub fn draw_annotation(
    image: &mut RgbaImage,
    frame: &MapFrame,
    fonts: &Fonts,
    annotation: &Annotation,
    year: &str,
    color: Rgba<u8>,
    dpi: f32,
) {
    let font = fonts.face(annotation.bold);

    let size_px = points_to_pixels(annotation.size_pt, dpi);
    let scale = PxScale::from(size_px);
    let ascent = font.as_scaled(scale).ascent() as f64;
    let line_advance = (size_px * annotation.line_spacing) as f64;

    let (center_x, anchor_y) = frame.axes_fraction_to_pixel(annotation.x, annotation.y);
    let first_baseline = match annotation.anchor {
        VerticalAnchor::Baseline => anchor_y,
        VerticalAnchor::Top => anchor_y + ascent,
    };

    let text = annotation.text_for(year);
    for (i, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (width, _) = text_size(scale, font, line);
        let x = center_x - width as f64 / 2.0;
        let top = first_baseline + i as f64 * line_advance - ascent;
        draw_text_mut(
            image,
            color,
            x.round() as i32,
            top.round() as i32,
            scale,
            font,
            line,
        );
    }
}

/// Draw the legend box in the lower-right corner of the axes
pub fn draw_legend(
    image: &mut RgbaImage,
    frame: &MapFrame,
    fonts: &Fonts,
    legend: &LegendConfig,
    background: Rgb,
    text_color: Rgba<u8>,
    dpi: f32,
) -> Result<()> {
    if legend.entries.is_empty() {
        return Ok(());
    }

    let size_px = points_to_pixels(legend.size_pt, dpi);
    let fs = size_px as f64;
    let scale = PxScale::from(size_px);
    let font = fonts.face(false);

    let label_width = legend
        .entries
        .iter()
        .map(|entry| text_size(scale, font, &entry.label).0 as f64)
        .fold(0.0, f64::max);

    let rows = legend.entries.len() as f64;
    let box_width = fs * (2.0 * LEGEND_BORDER_PAD + LEGEND_HANDLE_LENGTH + LEGEND_HANDLE_TEXT_PAD)
        + label_width;
    let box_height =
        fs * (2.0 * LEGEND_BORDER_PAD + rows + (rows - 1.0) * LEGEND_LABEL_SPACING);

    let axes = frame.axes();
    let right = axes.right() - LEGEND_AXES_PAD * fs;
    let bottom = axes.bottom() - LEGEND_AXES_PAD * fs;
    let left = right - box_width;
    let top = bottom - box_height;

    let frame_rect = pixel_rect(left, top, box_width, box_height);
    blend_rect(image, frame_rect, background.to_rgba(255), LEGEND_FRAME_ALPHA);
    draw_hollow_rect_mut(image, frame_rect, LEGEND_EDGE);

    for (i, entry) in legend.entries.iter().enumerate() {
        let row_center =
            top + fs * (LEGEND_BORDER_PAD + 0.5 + i as f64 * (1.0 + LEGEND_LABEL_SPACING));
        let swatch_left = left + fs * LEGEND_BORDER_PAD;
        let swatch = pixel_rect(
            swatch_left,
            row_center - fs * LEGEND_HANDLE_HEIGHT / 2.0,
            fs * LEGEND_HANDLE_LENGTH,
            fs * LEGEND_HANDLE_HEIGHT,
        );
        draw_filled_rect_mut(image, swatch, Rgb::from_hex(&entry.color)?.to_rgba(255));

        let scaled = font.as_scaled(scale);
        let text_height = (scaled.ascent() - scaled.descent()) as f64;
        let label_left = swatch_left + fs * (LEGEND_HANDLE_LENGTH + LEGEND_HANDLE_TEXT_PAD);
        draw_text_mut(
            image,
            text_color,
            label_left.round() as i32,
            (row_center - text_height / 2.0).round() as i32,
            scale,
            font,
            &entry.label,
        );
    }

    Ok(())
}

fn pixel_rect(left: f64, top: f64, width: f64, height: f64) -> Rect {
    Rect::at(left.round() as i32, top.round() as i32)
        .of_size(width.round().max(1.0) as u32, height.round().max(1.0) as u32)
}

/// Paint `color` over `rect` at partial opacity
fn blend_rect(image: &mut RgbaImage, rect: Rect, color: Rgba<u8>, opacity: f32) {
    let (width, height) = image.dimensions();
    let x0 = rect.left().max(0);
    let y0 = rect.top().max(0);
    let x1 = rect.right().min(width as i32 - 1);
    let y1 = rect.bottom().min(height as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            *pixel = interpolate(color, *pixel, opacity);
        }
    }
}
