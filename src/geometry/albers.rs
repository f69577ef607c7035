//! Albers equal-area conic projection on an ellipsoid.
//!
//! The defaults reproduce ESRI:102003 (USA Contiguous Albers Equal Area
//! Conic): GRS80 ellipsoid, standard parallels 29.5N and 45.5N, origin at
//! 37.5N 96W, no false easting or northing. Formulas follow Snyder,
//! "Map Projections: A Working Manual" (1987), section 14.

use geo::{Coord, MapCoords, MultiPolygon};
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Convergence threshold for the inverse latitude iteration, in radians
#[cfg(test)]
const INVERSE_TOLERANCE: f64 = 1e-12;
#[cfg(test)]
const INVERSE_MAX_ITERATIONS: usize = 20;

/// Parameters of an Albers projection, angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlbersParams {
    pub standard_parallel_1: f64,
    pub standard_parallel_2: f64,
    pub latitude_of_origin: f64,
    pub central_meridian: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub semi_major_axis: f64,
    pub inverse_flattening: f64,
}

impl Default for AlbersParams {
    fn default() -> Self {
        Self {
            standard_parallel_1: 29.5,
            standard_parallel_2: 45.5,
            latitude_of_origin: 37.5,
            central_meridian: -96.0,
            false_easting: 0.0,
            false_northing: 0.0,
            semi_major_axis: 6_378_137.0,
            inverse_flattening: 298.257_222_101,
        }
    }
}

/// A ready-to-use projection with its constants precomputed
#[derive(Debug, Clone)]
pub struct AlbersProjection {
    params: AlbersParams,
    e: f64,
    e2: f64,
    n: f64,
    c: f64,
    rho0: f64,
}

impl AlbersProjection {
    pub fn new(params: AlbersParams) -> Result<Self> {
        if !(params.semi_major_axis > 0.0) || !(params.inverse_flattening > 1.0) {
            return Err(MapError::Config {
                message: format!("Invalid ellipsoid in projection parameters: {:?}", params),
            });
        }
        if (params.standard_parallel_1 + params.standard_parallel_2).abs() < 1e-10 {
            return Err(MapError::Config {
                message: "Standard parallels cannot be symmetric about the equator".to_string(),
            });
        }

        let f = 1.0 / params.inverse_flattening;
        let e2 = 2.0 * f - f * f;
        let e = e2.sqrt();

        let phi1 = params.standard_parallel_1.to_radians();
        let phi2 = params.standard_parallel_2.to_radians();
        let phi0 = params.latitude_of_origin.to_radians();

        let m1 = m(phi1, e2);
        let m2 = m(phi2, e2);
        let q1 = q(phi1.sin(), e, e2);
        let q2 = q(phi2.sin(), e, e2);
        let q0 = q(phi0.sin(), e, e2);

        // Tangent cone when both parallels coincide
        let n = if (phi1 - phi2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (m1 * m1 - m2 * m2) / (q2 - q1)
        };
        let c = m1 * m1 + n * q1;
        let rho0 = params.semi_major_axis * (c - n * q0).sqrt() / n;

        Ok(Self {
            params,
            e,
            e2,
            n,
            c,
            rho0,
        })
    }

    /// Project geographic degrees to metres
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let a = self.params.semi_major_axis;
        let phi = lat.to_radians();
        let dlambda = normalize_radians((lon - self.params.central_meridian).to_radians());

        // Clamp guards the poles, where rounding can push the radicand below zero
        let rho = a * (self.c - self.n * q(phi.sin(), self.e, self.e2)).max(0.0).sqrt() / self.n;
        let theta = self.n * dlambda;

        (
            self.params.false_easting + rho * theta.sin(),
            self.params.false_northing + self.rho0 - rho * theta.cos(),
        )
    }

    /// Inverse projection from metres back to geographic degrees
    #[cfg(test)]
    fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let a = self.params.semi_major_axis;
        let x = x - self.params.false_easting;
        let dy = self.rho0 - (y - self.params.false_northing);

        let sign = self.n.signum();
        let rho = (x * x + dy * dy).sqrt() * sign;
        let theta = (x * sign).atan2(dy * sign);

        let q_val = (self.c - rho * rho * self.n * self.n / (a * a)) / self.n;
        let phi = self.latitude_from_q(q_val);
        let lambda = theta / self.n;

        (
            self.params.central_meridian + lambda.to_degrees(),
            phi.to_degrees(),
        )
    }

    /// Project every coordinate of a multipolygon
    pub fn project_geometry(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|coord| {
            let (x, y) = self.project(coord.x, coord.y);
            Coord { x, y }
        })
    }

    #[cfg(test)]
    fn latitude_from_q(&self, q_val: f64) -> f64 {
        let (e, e2) = (self.e, self.e2);

        // q at the poles; beyond it the point is off the projection
        let q_pole = q(1.0, e, e2);
        if q_val.abs() >= q_pole {
            return std::f64::consts::FRAC_PI_2.copysign(q_val);
        }

        let mut phi = (q_val / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..INVERSE_MAX_ITERATIONS {
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();
            let one_minus = 1.0 - e2 * sin_phi * sin_phi;
            let delta = one_minus * one_minus / (2.0 * cos_phi)
                * (q_val / (1.0 - e2) - sin_phi / one_minus
                    + (1.0 / (2.0 * e)) * ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).ln());
            phi += delta;
            if delta.abs() < INVERSE_TOLERANCE {
                break;
            }
        }
        phi
    }
}

/// Snyder eq. 14-15
fn m(phi: f64, e2: f64) -> f64 {
    let sin_phi = phi.sin();
    phi.cos() / (1.0 - e2 * sin_phi * sin_phi).sqrt()
}

/// Snyder eq. 3-12
fn q(sin_phi: f64, e: f64, e2: f64) -> f64 {
    (1.0 - e2)
        * (sin_phi / (1.0 - e2 * sin_phi * sin_phi)
            - (1.0 / (2.0 * e)) * ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).ln())
}

/// Wrap an angle to [-pi, pi)
fn normalize_radians(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn esri_102003() -> AlbersProjection {
        AlbersProjection::new(AlbersParams::default()).unwrap()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    #[test]
    fn test_origin_projects_to_zero() {
        let projection = esri_102003();
        let (x, y) = projection.project(-96.0, 37.5);
        assert_close(x, 0.0, 1e-6);
        assert_close(y, 0.0, 1e-6);
    }

    #[test]
    fn test_symmetric_about_central_meridian() {
        let projection = esri_102003();
        let (x_east, y_east) = projection.project(-86.0, 40.0);
        let (x_west, y_west) = projection.project(-106.0, 40.0);

        assert!(x_east > 0.0);
        assert_close(x_east, -x_west, 1e-6);
        assert_close(y_east, y_west, 1e-6);
    }

    #[test]
    fn test_north_is_up() {
        let projection = esri_102003();
        let (_, y_south) = projection.project(-96.0, 30.0);
        let (_, y_north) = projection.project(-96.0, 45.0);
        assert!(y_north > y_south);

        // One degree of latitude along the central meridian is roughly 111 km
        let (_, y0) = projection.project(-96.0, 37.0);
        let (_, y1) = projection.project(-96.0, 38.0);
        assert_close(y1 - y0, 111_000.0, 2_000.0);
    }

    #[test]
    fn test_inverse_round_trip() {
        let projection = esri_102003();
        for (lon, lat) in [
            (-77.0365, 38.8977),
            (-122.4194, 37.7749),
            (-149.9003, 61.2181),
            (-157.8583, 21.3069),
            (-68.0, 47.0),
        ] {
            let (x, y) = projection.project(lon, lat);
            let (lon_back, lat_back) = projection.unproject(x, y);
            assert_close(lon_back, lon, 1e-9);
            assert_close(lat_back, lat, 1e-9);
        }
    }

    #[test]
    fn test_equal_area_across_longitudes() {
        let projection = esri_102003();
        let cell = |lon: f64| {
            polygon![
                (x: lon, y: 40.0),
                (x: lon + 1.0, y: 40.0),
                (x: lon + 1.0, y: 41.0),
                (x: lon, y: 41.0),
                (x: lon, y: 40.0),
            ]
        };

        let near = projection.project_geometry(&MultiPolygon::new(vec![cell(-97.0)]));
        let far = projection.project_geometry(&MultiPolygon::new(vec![cell(-75.0)]));

        let near_area = near.unsigned_area();
        let far_area = far.unsigned_area();
        assert!(near_area > 0.0);
        assert_close(far_area / near_area, 1.0, 1e-9);
    }

    #[test]
    fn test_rejects_symmetric_parallels() {
        let params = AlbersParams {
            standard_parallel_1: 30.0,
            standard_parallel_2: -30.0,
            ..AlbersParams::default()
        };
        assert!(AlbersProjection::new(params).is_err());
    }
}
