//! Mapping from projected map coordinates to figure pixels.
//!
//! The map extent (plus a margin) is fitted into the configured axes box
//! with equal aspect. The axes box then shrinks to the fitted map and stays
//! centered in the space it was given, so annotations placed in axes
//! fractions follow the map rather than the original box.

use geo::{BoundingRect, Coord, Rect};

use crate::config::StyleConfig;
use crate::state::StateFeature;

/// Axis-aligned rectangle in pixel space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// World-to-pixel transform for one figure layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    axes: PixelRect,
    scale: f64,
    origin_x: f64,
    origin_y: f64,
}

impl MapFrame {
    /// Fit `bounds` into the axes box described by `style`
    pub fn fit(bounds: Option<Rect<f64>>, style: &StyleConfig) -> Self {
        let width = style.width as f64;
        let height = style.height as f64;
        let available = PixelRect {
            left: style.axes.left * width,
            top: (1.0 - style.axes.top) * height,
            width: (style.axes.right - style.axes.left) * width,
            height: (style.axes.top - style.axes.bottom) * height,
        };

        let Some(bounds) = bounds else {
            return Self {
                axes: available,
                scale: 1.0,
                origin_x: 0.0,
                origin_y: 0.0,
            };
        };

        // Degenerate spans still need a non-zero extent to divide by
        let span = |extent: f64| if extent > 0.0 { extent } else { 1.0 };
        let span_x = span(bounds.width());
        let span_y = span(bounds.height());
        let extent_x = span_x * (1.0 + 2.0 * style.margin);
        let extent_y = span_y * (1.0 + 2.0 * style.margin);

        let scale = (available.width / extent_x).min(available.height / extent_y);
        let axes_width = extent_x * scale;
        let axes_height = extent_y * scale;
        let axes = PixelRect {
            left: available.left + (available.width - axes_width) / 2.0,
            top: available.top + (available.height - axes_height) / 2.0,
            width: axes_width,
            height: axes_height,
        };

        let center = bounds.center();
        Self {
            axes,
            scale,
            origin_x: center.x - extent_x / 2.0,
            origin_y: center.y + extent_y / 2.0,
        }
    }

    pub fn axes(&self) -> PixelRect {
        self.axes
    }

    /// Pixels per map unit
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Projected map coordinate to pixel position
    pub fn to_pixel(&self, coord: Coord<f64>) -> (f64, f64) {
        (
            self.axes.left + (coord.x - self.origin_x) * self.scale,
            self.axes.top + (self.origin_y - coord.y) * self.scale,
        )
    }

    /// Axes-fraction position (0,0 bottom-left, 1,1 top-right) to pixels
    pub fn axes_fraction_to_pixel(&self, fx: f64, fy: f64) -> (f64, f64) {
        (
            self.axes.left + fx * self.axes.width,
            self.axes.top + (1.0 - fy) * self.axes.height,
        )
    }
}

/// Bounding box of every feature, or `None` for an empty collection
pub fn features_bounds(features: &[StateFeature]) -> Option<Rect<f64>> {
    features
        .iter()
        .filter_map(|feature| feature.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                },
            )
        })
}
