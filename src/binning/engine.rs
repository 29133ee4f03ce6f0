use crate::binning::ReferenceDataError;
use crate::flight::TelemetryPoint;
use crate::geodesy::{position_info, DEFAULT_SPHERE_RADIUS_M};
use crate::sites::LaunchSiteIndex;

/// Distance reported alongside "no site". Never meaningful downstream.
pub const NO_SITE_DISTANCE_KM: f64 = 999_999_999.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinningParams {
    pub radius_km: f64,
    pub alt_limit_m: f64,
    pub sphere_radius_m: f64,
}

impl Default for BinningParams {
    fn default() -> Self {
        Self {
            radius_km: 30.0,
            alt_limit_m: 5000.0,
            sphere_radius_m: DEFAULT_SPHERE_RADIUS_M,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinResult {
    pub site_id: Option<String>,
    pub distance_km: f64,
}

impl BinResult {
    pub fn none() -> Self {
        Self {
            site_id: None,
            distance_km: NO_SITE_DISTANCE_KM,
        }
    }
}

/// Assign a launch fix to the nearest site within the radius and altitude gate.
///
/// A fix above `alt_limit_m` is mid-flight data and never binned. Sites are
/// eligible when `0 < distance < radius_km`; a fix exactly on a site is
/// treated as not matching it. Ties go to the site that comes first in the
/// index.
pub fn bin_flight(
    first_fix: &TelemetryPoint,
    index: &LaunchSiteIndex,
    params: &BinningParams,
) -> Result<BinResult, ReferenceDataError> {
    let fix = first_fix.position();
    if fix.alt_m > params.alt_limit_m {
        return Ok(BinResult::none());
    }

    let mut best = BinResult::none();
    for site in index.iter() {
        let site_location = site.location();
        let info = position_info(&site_location, &fix, params.sphere_radius_m).map_err(
            |source| ReferenceDataError {
                station: site.id.clone(),
                serial: first_fix.serial.clone(),
                site: site_location,
                fix,
                source,
            },
        )?;

        let distance_km = info.great_circle_distance_m / 1000.0;
        if distance_km > 0.0 && distance_km < params.radius_km && distance_km < best.distance_km {
            best = BinResult {
                site_id: Some(site.id.clone()),
                distance_km,
            };
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::fixtures;
    use crate::geodesy::{position_info_default, GeoPoint, GeodesyError};
    use crate::sites::LaunchSite;

    fn australian_sites() -> LaunchSiteIndex {
        LaunchSiteIndex::from_sites(vec![
            LaunchSite::new("ADL", "Adelaide", -34.9, 138.6),
            LaunchSite::new("MEL", "Melbourne", -37.8, 144.9),
            LaunchSite::new("SYD", "Sydney", -33.8, 151.2),
        ])
        .unwrap()
    }

    #[test]
    fn test_bins_to_nearest_site() {
        let fix = fixtures::point("S1", -34.95, 138.62, 500.0);
        let result = bin_flight(&fix, &australian_sites(), &BinningParams::default()).unwrap();

        assert_eq!(result.site_id.as_deref(), Some("ADL"));
        assert!((result.distance_km - 5.8456).abs() < 1e-3, "{}", result.distance_km);
    }

    #[test]
    fn test_altitude_gate() {
        // About 6 km from ADL, just above the ceiling
        let fix = fixtures::point("S1", -34.95, 138.62, 5000.1);
        let result = bin_flight(&fix, &australian_sites(), &BinningParams::default()).unwrap();
        assert_eq!(result, BinResult::none());

        let fix = fixtures::point("S1", -34.95, 138.62, 5000.0);
        let result = bin_flight(&fix, &australian_sites(), &BinningParams::default()).unwrap();
        assert_eq!(result.site_id.as_deref(), Some("ADL"));
    }

    #[test]
    fn test_altitude_gate_skips_bad_sites() {
        let mut index = australian_sites();
        index
            .insert(LaunchSite::new("BAD", "Broken", f64::NAN, 0.0))
            .unwrap();
        let fix = fixtures::point("S1", -34.95, 138.62, 20000.0);
        assert_eq!(
            bin_flight(&fix, &index, &BinningParams::default()).unwrap(),
            BinResult::none()
        );
    }

    #[test]
    fn test_radius_gate_is_strict() {
        let index = australian_sites();
        let fix = fixtures::point("S1", -34.7, 138.75, 100.0);
        let distance_km = position_info_default(&GeoPoint::surface(-34.9, 138.6), &fix.position())
            .unwrap()
            .great_circle_distance_m
            / 1000.0;

        let exact = BinningParams {
            radius_km: distance_km,
            ..Default::default()
        };
        assert_eq!(bin_flight(&fix, &index, &exact).unwrap(), BinResult::none());

        let just_inside = BinningParams {
            radius_km: distance_km + 1e-6,
            ..Default::default()
        };
        assert_eq!(
            bin_flight(&fix, &index, &just_inside).unwrap().site_id.as_deref(),
            Some("ADL")
        );
    }

    #[test]
    fn test_outside_every_radius() {
        let fix = fixtures::point("S1", -31.9, 115.9, 20.0);
        assert_eq!(
            bin_flight(&fix, &australian_sites(), &BinningParams::default()).unwrap(),
            BinResult::none()
        );
    }

    // A fix exactly on a site's coordinates is not binned to it. The strict
    // `> 0` comparison is long-standing behavior and is kept as is.
    #[test]
    fn test_exact_zero_distance_is_not_binned() {
        let fix = fixtures::point("S1", -34.9, 138.6, 0.0);
        let result = bin_flight(&fix, &australian_sites(), &BinningParams::default()).unwrap();
        assert_eq!(result.site_id, None);
    }

    #[test]
    fn test_exact_zero_distance_falls_through_to_next_site() {
        let index = LaunchSiteIndex::from_sites(vec![
            LaunchSite::new("A", "On top", -34.9, 138.6),
            LaunchSite::new("B", "Nearby", -34.95, 138.62),
        ])
        .unwrap();
        let fix = fixtures::point("S1", -34.9, 138.6, 0.0);
        let result = bin_flight(&fix, &index, &BinningParams::default()).unwrap();
        assert_eq!(result.site_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_tie_goes_to_first_site() {
        let index = LaunchSiteIndex::from_sites(vec![
            LaunchSite::new("OLD", "Old pad", -34.9, 138.6),
            LaunchSite::new("NEW", "New pad", -34.9, 138.6),
        ])
        .unwrap();
        let fix = fixtures::point("S1", -34.95, 138.62, 0.0);
        let result = bin_flight(&fix, &index, &BinningParams::default()).unwrap();
        assert_eq!(result.site_id.as_deref(), Some("OLD"));
    }

    #[test]
    fn test_bad_site_is_reference_error() {
        let mut index = australian_sites();
        index
            .insert(LaunchSite::new("BAD", "Broken", f64::NAN, 138.6))
            .unwrap();
        let fix = fixtures::point("S1", -34.95, 138.62, 500.0);

        let err = bin_flight(&fix, &index, &BinningParams::default()).unwrap_err();
        assert_eq!(err.station, "BAD");
        assert_eq!(err.serial, "S1");
        assert!(matches!(err.source, GeodesyError::NonFiniteInput(_)));
        assert!(err.to_string().contains("BAD"));
    }

    #[test]
    fn test_empty_index() {
        let fix = fixtures::point("S1", -34.95, 138.62, 500.0);
        assert_eq!(
            bin_flight(&fix, &LaunchSiteIndex::new(), &BinningParams::default()).unwrap(),
            BinResult::none()
        );
    }
}
