use std::f64::consts::TAU;

use super::{GeoPoint, GeodesyError, PositionInfo};

/// Sphere radius tuned for Australian latitudes rather than the mean Earth radius.
pub const DEFAULT_SPHERE_RADIUS_M: f64 = 6_364_963.0;

#[cfg(test)]
pub fn position_info_default(a: &GeoPoint, b: &GeoPoint) -> Result<PositionInfo, GeodesyError> {
    position_info(a, b, DEFAULT_SPHERE_RADIUS_M)
}

/// Solve the great-circle geometry between two points on a sphere of `radius_m`.
///
/// Central angle and bearing use Vincenty's formulae with zero flattening. The
/// remaining quantities come from the triangle formed by the two
/// altitude-adjusted radii and the chord between the points.
pub fn position_info(
    a: &GeoPoint,
    b: &GeoPoint,
    radius_m: f64,
) -> Result<PositionInfo, GeodesyError> {
    if !a.is_finite() {
        return Err(GeodesyError::NonFiniteInput(*a));
    }
    if !b.is_finite() {
        return Err(GeodesyError::NonFiniteInput(*b));
    }
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(GeodesyError::InvalidRadius(radius_m));
    }

    let lat1 = a.lat_rad();
    let lat2 = b.lat_rad();
    let d_lon = b.lon_rad() - a.lon_rad();

    let sa = lat2.cos() * d_lon.sin();
    let sb = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let mut bearing = sa.atan2(sb).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if bearing >= TAU {
        bearing = 0.0;
    }

    let aa = sa.hypot(sb);
    let ab = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * d_lon.cos();
    let angle_at_centre = aa.atan2(ab);
    let great_circle_distance_m = angle_at_centre * radius_m;

    let ta = radius_m + a.alt_m;
    let tb = radius_m + b.alt_m;
    let ea = angle_at_centre.cos() * tb - ta;
    let eb = angle_at_centre.sin() * tb;
    // atan2(0, 0) is 0 for coincident points
    let elevation = ea.atan2(eb);

    let straight_distance_m = (ta * ta + tb * tb - 2.0 * ta * tb * angle_at_centre.cos())
        .max(0.0)
        .sqrt();

    if !great_circle_distance_m.is_finite() {
        return Err(GeodesyError::NonFiniteResult { a: *a, b: *b });
    }

    Ok(PositionInfo {
        angle_at_centre_deg: angle_at_centre.to_degrees(),
        angle_at_centre_rad: angle_at_centre,
        great_circle_distance_m,
        straight_distance_m,
        bearing_deg: bearing.to_degrees(),
        bearing_rad: bearing,
        elevation_deg: elevation.to_degrees(),
        elevation_rad: elevation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }

    #[test]
    fn test_adelaide_launch_fix() {
        let site = GeoPoint::surface(-34.9, 138.6);
        let fix = GeoPoint::new(-34.95, 138.62, 500.0);
        let info = position_info_default(&site, &fix).unwrap();

        assert_close(info.great_circle_distance_m, 5845.566, 0.01);
        assert_close(info.straight_distance_m, 5867.139, 0.01);
        assert_close(info.bearing_deg, 161.848, 0.001);
        assert_close(info.elevation_deg, 4.862, 0.001);
        assert_close(info.angle_at_centre_deg, 0.0526203, 1e-6);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (GeoPoint::surface(-34.9, 138.6), GeoPoint::new(-37.8, 144.9, 12000.0)),
            (GeoPoint::surface(51.5, -0.12), GeoPoint::new(40.7, -74.0, 300.0)),
            (GeoPoint::surface(0.0, 179.9), GeoPoint::new(0.5, -179.9, 0.0)),
        ];

        for (a, b) in pairs {
            let ab = position_info_default(&a, &b).unwrap();
            let ba = position_info_default(&b, &a).unwrap();
            assert_close(ab.great_circle_distance_m, ba.great_circle_distance_m, 1e-6);
            assert_close(ab.straight_distance_m, ba.straight_distance_m, 1e-6);
        }
    }

    #[test]
    fn test_coincident_points() {
        let p = GeoPoint::surface(10.0, 20.0);
        let info = position_info_default(&p, &p).unwrap();

        assert_eq!(info.great_circle_distance_m, 0.0);
        assert_eq!(info.straight_distance_m, 0.0);
        assert_eq!(info.bearing_deg, 0.0);
        assert_eq!(info.elevation_deg, 0.0);
    }

    #[test]
    fn test_due_east_on_equator() {
        let a = GeoPoint::surface(0.0, 0.0);
        let b = GeoPoint::surface(0.0, 0.1);
        let info = position_info_default(&a, &b).unwrap();

        assert_close(info.bearing_deg, 90.0, 1e-9);
        assert_close(info.great_circle_distance_m, 11108.956, 0.001);
        // Surface target dips below the local horizontal by half the central angle
        assert_close(info.elevation_deg, -0.05, 1e-9);
    }

    #[test]
    fn test_bearing_in_range() {
        let a = GeoPoint::surface(-34.9, 138.6);
        for (lat, lon) in [(-35.5, 138.0), (-34.0, 138.0), (-34.9, 138.5), (-35.0, 138.6)] {
            let info = position_info_default(&a, &GeoPoint::surface(lat, lon)).unwrap();
            assert!((0.0..360.0).contains(&info.bearing_deg), "{}", info.bearing_deg);
        }
    }

    #[test]
    fn test_radius_is_configurable() {
        let a = GeoPoint::surface(0.0, 0.0);
        let b = GeoPoint::surface(1.0, 0.0);
        let info = position_info(&a, &b, 6_371_000.0).unwrap();
        assert_close(info.great_circle_distance_m, 111_194.93, 0.01);
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let a = GeoPoint::surface(f64::NAN, 0.0);
        let b = GeoPoint::surface(0.0, 0.0);
        assert!(matches!(
            position_info_default(&a, &b),
            Err(GeodesyError::NonFiniteInput(_))
        ));
        assert!(matches!(
            position_info_default(&b, &GeoPoint::new(0.0, 0.0, f64::INFINITY)),
            Err(GeodesyError::NonFiniteInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_radius() {
        let p = GeoPoint::surface(0.0, 0.0);
        assert!(matches!(
            position_info(&p, &p, 0.0),
            Err(GeodesyError::InvalidRadius(_))
        ));
    }
}
