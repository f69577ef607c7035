//! Diverging colormaps (two hues meeting at white).
//!
//! These colormaps are suitable for signed data centered on zero.

use super::colormap::{lerp_color, Colormap, Rgb};

/// Year-over-year change map: white to green for gains, white to red for
/// losses, saturating at `saturation_limit`.
#[derive(Debug, Clone)]
pub struct ChangeColormap {
    saturation_limit: f64,
}

impl ChangeColormap {
    const GAIN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    const LOSS: Rgb = Rgb::new(1.0, 0.0, 0.0);

    pub fn new(saturation_limit: f64) -> Self {
        Self { saturation_limit }
    }
}

impl Default for ChangeColormap {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Colormap for ChangeColormap {
    fn map_value(&self, value: f64) -> Rgb {
        // Magnitudes past the limit would push channels below zero
        let t = (value.abs() / self.saturation_limit).min(1.0);
        let target = if value > 0.0 { Self::GAIN } else { Self::LOSS };
        lerp_color(Rgb::WHITE, target, t)
    }

    fn name(&self) -> &str {
        "change"
    }
}
