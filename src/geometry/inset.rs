//! Inset placement for Alaska and Hawaii.
//!
//! In the equal-area projection both states sit far from the contiguous
//! states and would dominate the map extent. Each inset subset is moved
//! close to the mainland with a fixed translate, then scaled and rotated
//! around the centroid of the whole (translated) subset.

use geo::{Centroid, MultiPolygon, Point, Rotate, Scale, Translate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::StateFeature;

/// Translate, scale and rotate applied to every feature with `statefp`.
///
/// The constants are tuned to the default Albers projection and only make
/// sense together with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsetTransform {
    pub statefp: String,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    /// Counter-clockwise rotation in degrees
    pub rotate_deg: f64,
}

impl InsetTransform {
    pub fn alaska() -> Self {
        Self {
            statefp: "02".to_string(),
            offset_x: 1_300_000.0,
            offset_y: -4_900_000.0,
            scale: 0.5,
            rotate_deg: 32.0,
        }
    }

    pub fn hawaii() -> Self {
        Self {
            statefp: "15".to_string(),
            offset_x: 5_400_000.0,
            offset_y: -1_500_000.0,
            scale: 1.0,
            rotate_deg: 24.0,
        }
    }

    /// Move a subset of geometries into place and return the pivot used for
    /// scaling and rotation, or `None` when the subset is empty.
    ///
    /// Order: translate, find the dissolved centroid of the translated
    /// subset, scale around it, rotate around it.
    pub fn apply(&self, subset: &mut [&mut MultiPolygon<f64>]) -> Option<Point<f64>> {
        if subset.is_empty() {
            return None;
        }

        for geometry in subset.iter_mut() {
            geometry.translate_mut(self.offset_x, self.offset_y);
        }

        let Some(pivot) = dissolved_centroid(subset.iter().map(|geometry| &**geometry)) else {
            warn!(
                statefp = %self.statefp,
                "Inset subset has no area, skipping scale and rotation"
            );
            return None;
        };

        for geometry in subset.iter_mut() {
            geometry.scale_around_point_mut(self.scale, self.scale, pivot);
            geometry.rotate_around_point_mut(self.rotate_deg, pivot);
        }

        Some(pivot)
    }

    /// Undo [`apply`](Self::apply) given the pivot it returned
    pub fn invert(&self, subset: &mut [&mut MultiPolygon<f64>], pivot: Point<f64>) {
        for geometry in subset.iter_mut() {
            geometry.rotate_around_point_mut(-self.rotate_deg, pivot);
            geometry.scale_around_point_mut(1.0 / self.scale, 1.0 / self.scale, pivot);
            geometry.translate_mut(-self.offset_x, -self.offset_y);
        }
    }
}

/// Centroid of the union of all polygons in `geometries`.
///
/// State boundaries do not overlap, so the area-weighted centroid of every
/// member polygon equals the centroid of the dissolved shape.
pub fn dissolved_centroid<'a, I>(geometries: I) -> Option<Point<f64>>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    let dissolved: MultiPolygon<f64> = geometries
        .into_iter()
        .flat_map(|geometry| geometry.0.iter().cloned())
        .collect();
    dissolved.centroid()
}

/// Apply every inset transform to the matching features, in place.
///
/// Features keep their order; features matching no inset are untouched.
pub fn reposition_insets(features: &mut [StateFeature], insets: &[InsetTransform]) {
    for inset in insets {
        let mut subset: Vec<&mut MultiPolygon<f64>> = features
            .iter_mut()
            .filter(|feature| feature.statefp == inset.statefp)
            .map(|feature| &mut feature.geometry)
            .collect();

        let count = subset.len();
        match inset.apply(&mut subset) {
            Some(pivot) => debug!(
                statefp = %inset.statefp,
                features = count,
                pivot_x = pivot.x(),
                pivot_y = pivot.y(),
                "Repositioned inset"
            ),
            None => debug!(statefp = %inset.statefp, "No features for inset"),
        }
    }
}
