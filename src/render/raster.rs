//! Polygon filling and outlining on an RGBA canvas.

use geo::{LineString, MultiPolygon};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_antialiased_line_segment_mut;
use imageproc::pixelops::interpolate;

use super::frame::MapFrame;

/// A ring converted to pixel coordinates
type PixelRing = Vec<(f64, f64)>;

fn ring_to_pixels(ring: &LineString<f64>, frame: &MapFrame) -> PixelRing {
    ring.0.iter().map(|&coord| frame.to_pixel(coord)).collect()
}

/// Fill every polygon of `geometry` with `color`, honouring holes.
///
/// Uses the even-odd rule, sampling at pixel centers.
pub fn fill_multipolygon(
    image: &mut RgbaImage,
    frame: &MapFrame,
    geometry: &MultiPolygon<f64>,
    color: Rgba<u8>,
) {
    for polygon in geometry {
        let rings: Vec<PixelRing> = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| ring_to_pixels(ring, frame))
            .collect();
        fill_rings(image, &rings, color);
    }
}

/// Scanline fill of closed pixel-space rings
pub fn fill_rings(image: &mut RgbaImage, rings: &[PixelRing], color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let edges: Vec<((f64, f64), (f64, f64))> = rings
        .iter()
        .flat_map(|ring| ring.windows(2).map(|pair| (pair[0], pair[1])))
        .filter(|(a, b)| a.1 != b.1)
        .collect();
    if edges.is_empty() {
        return;
    }

    let (min_y, max_y) = edges.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, (a, b)| {
        (acc.0.min(a.1).min(b.1), acc.1.max(a.1).max(b.1))
    });
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let first_row = (min_y - 0.5).ceil().max(0.0) as u32;
    let last_row = (max_y - 0.5).floor().min(height as f64 - 1.0);
    if last_row < 0.0 {
        return;
    }
    let last_row = last_row as u32;

    let mut crossings: Vec<f64> = Vec::new();
    for row in first_row..=last_row {
        let sample_y = row as f64 + 0.5;

        crossings.clear();
        for &(a, b) in &edges {
            if (a.1 <= sample_y) != (b.1 <= sample_y) {
                let t = (sample_y - a.1) / (b.1 - a.1);
                crossings.push(a.0 + t * (b.0 - a.0));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // Pixels whose centers fall inside [span[0], span[1])
            let start = (span[0] - 0.5).ceil().max(0.0);
            let end = ((span[1] - 0.5).ceil() - 1.0).min(width as f64 - 1.0);
            if end < start {
                continue;
            }
            for x in start as u32..=end as u32 {
                image.put_pixel(x, row, color);
            }
        }
    }
}

/// Outline every ring of `geometry` with an antialiased one-pixel line.
///
/// `opacity` in [0, 1] scales the stroke over what is already drawn.
pub fn stroke_multipolygon(
    image: &mut RgbaImage,
    frame: &MapFrame,
    geometry: &MultiPolygon<f64>,
    color: Rgba<u8>,
    opacity: f32,
) {
    for polygon in geometry {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let points = ring_to_pixels(ring, frame);
            stroke_ring(image, &points, color, opacity);
        }
    }
}

fn stroke_ring(image: &mut RgbaImage, points: &[(f64, f64)], color: Rgba<u8>, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pair in points.windows(2) {
        let start = to_i32(pair[0]);
        let end = to_i32(pair[1]);
        if start == end {
            continue;
        }
        draw_antialiased_line_segment_mut(image, start, end, color, |line, original, weight| {
            interpolate(line, original, weight * opacity)
        });
    }
}

fn to_i32(point: (f64, f64)) -> (i32, i32) {
    // Saturating casts keep far off-canvas points from wrapping around
    (point.0.round() as i32, point.1.round() as i32)
}
