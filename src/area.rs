//! Farm boundary area.
//!
//! [`compute_area_acres`] is a planar shoelace over radian coordinates,
//! scaled by the earth radius and the cosine of the mean latitude. It is an
//! approximation that holds for plots of a few hectares; it is not a true
//! geodesic area. [`geodesic_area_acres`] gives the exact ellipsoidal figure
//! for comparison.

use geo::algorithm::geodesic_area::GeodesicArea;

use crate::data::{BOUNDARY_POINTS, GeoPoint};
use crate::error::{BoundaryError, Result};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Square meters per acre.
pub const SQ_METERS_PER_ACRE: f64 = 4046.86;

/// Signed shoelace sum over the closed ring, in radian².
///
/// Uses longitude as x and latitude as y: `lon_i * lat_j - lon_j * lat_i`.
pub fn signed_shoelace(points: &[GeoPoint]) -> f64 {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.longitude.to_radians() * b.latitude.to_radians();
        sum -= b.longitude.to_radians() * a.latitude.to_radians();
    }
    sum
}

/// Area of a four-point boundary in acres, rounded to three decimals.
///
/// Rejects anything other than exactly four points. Collinear or repeated
/// points give 0. NaN and infinite coordinates propagate.
pub fn compute_area_acres(points: &[GeoPoint]) -> Result<f64> {
    let corners: &[GeoPoint; BOUNDARY_POINTS] =
        points.try_into().map_err(|_| BoundaryError::InvalidInput {
            expected: BOUNDARY_POINTS,
            got: points.len(),
        })?;
    Ok(quad_area_acres(corners))
}

/// [`compute_area_acres`] for a boundary already known to be complete.
pub fn quad_area_acres(points: &[GeoPoint; BOUNDARY_POINTS]) -> f64 {
    let planar = signed_shoelace(points).abs() / 2.0;
    let mean_lat = points.iter().map(|p| p.latitude).sum::<f64>() / points.len() as f64;
    let sq_meters = planar * EARTH_RADIUS_M * EARTH_RADIUS_M * mean_lat.to_radians().cos();

    round_thousandths(sq_meters / SQ_METERS_PER_ACRE)
}

/// Ellipsoidal (WGS84) area of the same ring in acres, rounded like
/// [`compute_area_acres`]. Accepts any ring of three or more points.
pub fn geodesic_area_acres(points: &[GeoPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let ring: Vec<geo::Coord<f64>> = points.iter().map(|&p| p.into()).collect();
    let polygon = geo::Polygon::new(ring.into(), vec![]);
    round_thousandths(polygon.geodesic_area_unsigned() / SQ_METERS_PER_ACRE)
}

fn round_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn square_at_19n() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(19.0, 73.0),
            GeoPoint::new(19.0, 73.001),
            GeoPoint::new(19.001, 73.001),
            GeoPoint::new(19.001, 73.0),
        ]
    }

    fn random_quad(rng: &mut StdRng) -> Vec<GeoPoint> {
        let lat0 = rng.random_range(-60.0..60.0);
        let lon0 = rng.random_range(-170.0..170.0);
        (0..4)
            .map(|_| {
                GeoPoint::new(
                    lat0 + rng.random_range(0.0..0.01),
                    lon0 + rng.random_range(0.0..0.01),
                )
            })
            .collect()
    }

    #[test]
    fn test_reference_square() {
        let area = compute_area_acres(&square_at_19n()).unwrap();
        assert_eq!(area, 2.889);
        let corners: [GeoPoint; 4] = square_at_19n().try_into().unwrap();
        assert_eq!(quad_area_acres(&corners), area);
    }

    #[test]
    fn test_equator_square_is_larger() {
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.001),
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(0.001, 0.0),
        ];
        assert_eq!(compute_area_acres(&pts).unwrap(), 3.055);
    }

    #[test]
    fn test_rounded_to_three_decimals() {
        let area = compute_area_acres(&square_at_19n()).unwrap();
        let scaled = area * 1000.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
        assert!(area > 0.0);
    }

    #[test]
    fn test_degenerate_inputs_are_zero() {
        let same = vec![GeoPoint::new(19.0, 73.0); 4];
        assert_eq!(compute_area_acres(&same).unwrap(), 0.0);

        let line = vec![
            GeoPoint::new(19.0, 73.0),
            GeoPoint::new(19.001, 73.001),
            GeoPoint::new(19.002, 73.002),
            GeoPoint::new(19.003, 73.003),
        ];
        assert_eq!(compute_area_acres(&line).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_wrong_point_count() {
        let pts = square_at_19n();
        assert_eq!(
            compute_area_acres(&pts[..3]),
            Err(BoundaryError::InvalidInput { expected: 4, got: 3 })
        );
        let mut five = pts.clone();
        five.push(GeoPoint::new(19.0, 73.0));
        assert!(compute_area_acres(&five).is_err());
        assert!(compute_area_acres(&[]).is_err());
    }

    #[test]
    fn test_nan_propagates() {
        let mut pts = square_at_19n();
        pts[2].latitude = f64::NAN;
        assert!(compute_area_acres(&pts).unwrap().is_nan());
    }

    #[test]
    fn test_rotation_invariant() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let pts = random_quad(&mut rng);
            let base = compute_area_acres(&pts).unwrap();
            for shift in 1..4 {
                let mut rotated = pts.clone();
                rotated.rotate_left(shift);
                let area = compute_area_acres(&rotated).unwrap();
                // one rounding step of slack for summation order
                assert!((area - base).abs() <= 0.0011, "{area} vs {base}");
            }
        }
    }

    #[test]
    fn test_reversal_flips_sign_only() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let pts = random_quad(&mut rng);
            let mut reversed = pts.clone();
            reversed.reverse();
            let forward = signed_shoelace(&pts);
            let backward = signed_shoelace(&reversed);
            assert!((forward + backward).abs() < 1e-12);
            if forward.abs() > 1e-12 {
                assert_ne!(forward.signum(), backward.signum());
            }
            let a = compute_area_acres(&pts).unwrap();
            let b = compute_area_acres(&reversed).unwrap();
            assert!((a - b).abs() <= 0.0011, "{a} vs {b}");
        }
    }

    #[test]
    fn test_geodesic_reference_is_close() {
        let approx = compute_area_acres(&square_at_19n()).unwrap();
        let exact = geodesic_area_acres(&square_at_19n());
        assert!((approx - exact).abs() / exact < 0.01, "{approx} vs {exact}");
        assert_eq!(geodesic_area_acres(&square_at_19n()[..2]), 0.0);
    }
}
