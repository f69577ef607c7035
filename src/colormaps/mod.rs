//! Colormap implementations for the choropleth fills.
//!
//! This module maps per-state change values to fill colors.

pub mod colormap;
pub mod diverging;

pub use colormap::{get_colormap, lerp_color, Colormap, Rgb};
pub use diverging::ChangeColormap;
