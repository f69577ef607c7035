//! Geometry utilities: projection and inset placement.

pub mod albers;
pub mod inset;

pub use albers::{AlbersParams, AlbersProjection};
pub use inset::{dissolved_centroid, reposition_insets, InsetTransform};
