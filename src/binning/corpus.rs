use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binning::{bin_flight, BinnedDataError, BinningParams, ReferenceDataError};
use crate::flight::FlightSummary;
use crate::sites::{LaunchSite, LaunchSiteIndex};

const PROGRESS_INTERVAL: usize = 1000;

/// A flight assigned to a launch site.
#[derive(Debug, Clone)]
pub struct LocatedFlight {
    pub site_id: String,
    pub distance_km: f64,
    /// The archive already carried a launch site for this flight.
    pub previously_sited: bool,
    pub summary: FlightSummary,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BinningReport {
    pub total: usize,
    pub located: usize,
    pub unbinned: usize,
    pub previously_sited: usize,
}

/// Bin every summary against the index.
///
/// Located flights that carry no launch site yet are annotated on all three
/// points. A flight that already had one keeps its existing annotation.
pub fn locate_flights(
    summaries: Vec<FlightSummary>,
    index: &LaunchSiteIndex,
    params: &BinningParams,
) -> Result<(Vec<LocatedFlight>, BinningReport), ReferenceDataError> {
    let mut report = BinningReport {
        total: summaries.len(),
        ..Default::default()
    };
    let mut located = Vec::new();

    for (i, mut summary) in summaries.into_iter().enumerate() {
        let count = i + 1;
        let result = bin_flight(&summary.first, index, params)?;

        match result.site_id {
            Some(site_id) => {
                if let Some(site) = index.get(&site_id) {
                    log::debug!(
                        "{}/{} - {}: {}, {:.1} km",
                        count,
                        report.total,
                        summary.serial(),
                        site.name,
                        result.distance_km
                    );
                }

                let previously_sited = summary.launch_site().is_some();
                if previously_sited {
                    report.previously_sited += 1;
                } else {
                    summary.annotate(&site_id, result.distance_km * 1000.0);
                }

                located.push(LocatedFlight {
                    site_id,
                    distance_km: result.distance_km,
                    previously_sited,
                    summary,
                });
            }
            None => {
                log::debug!("{}/{} - {}: None Found", count, report.total, summary.serial());
                report.unbinned += 1;
            }
        }

        if count % PROGRESS_INTERVAL == 0 {
            log::info!("{}/{} processed.", count, report.total);
        }
    }

    report.located = located.len();
    Ok((located, report))
}

/// Flights grouped under one launch site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteBin {
    pub site: LaunchSite,
    pub serials: Vec<String>,
    pub serial_data: BTreeMap<String, FlightSummary>,
}

/// Located flights keyed by station id.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinnedData {
    sites: BTreeMap<String, SiteBin>,
}

impl BinnedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_located(flights: &[LocatedFlight], index: &LaunchSiteIndex) -> Self {
        let mut binned = Self::new();
        for flight in flights {
            if let Some(site) = index.get(&flight.site_id) {
                binned.insert(site, flight.summary.clone());
            }
        }
        binned
    }

    /// Add a flight under `site`. A serial seen before replaces the stored
    /// summary without being listed twice.
    pub fn insert(&mut self, site: &LaunchSite, summary: FlightSummary) {
        let bin = self.sites.entry(site.id.clone()).or_insert_with(|| SiteBin {
            site: site.clone(),
            serials: Vec::new(),
            serial_data: BTreeMap::new(),
        });

        let serial = summary.serial().to_string();
        if bin.serial_data.insert(serial.clone(), summary).is_some() {
            log::debug!("Duplicate serial {} at {}, keeping latest", serial, site.id);
        } else {
            bin.serials.push(serial);
        }
    }

    #[cfg(test)]
    pub fn get(&self, site_id: &str) -> Option<&SiteBin> {
        self.sites.get(site_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SiteBin)> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn flight_count(&self) -> usize {
        self.sites.values().map(|bin| bin.serials.len()).sum()
    }

    pub fn from_file(path: &Path) -> Result<Self, BinnedDataError> {
        if !path.exists() {
            return Err(BinnedDataError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), BinnedDataError> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::fixtures;
    use tempfile::TempDir;

    fn index() -> LaunchSiteIndex {
        LaunchSiteIndex::from_sites(vec![
            LaunchSite::new("ADL", "Adelaide", -34.9, 138.6),
            LaunchSite::new("MEL", "Melbourne", -37.8, 144.9),
        ])
        .unwrap()
    }

    fn flight_at(serial: &str, lat: f64, lon: f64, alt: f64) -> FlightSummary {
        let mut summary = fixtures::summary(serial, alt, 28000.0, 100.0);
        summary.first.lat = lat;
        summary.first.lon = lon;
        summary
    }

    #[test]
    fn test_locate_and_annotate() {
        let summaries = vec![
            flight_at("A1", -34.95, 138.62, 400.0),
            flight_at("M1", -37.75, 144.95, 50.0),
            flight_at("HIGH", -34.95, 138.62, 9000.0),
            flight_at("FAR", -31.9, 115.9, 20.0),
        ];

        let (located, report) =
            locate_flights(summaries, &index(), &BinningParams::default()).unwrap();

        assert_eq!(
            report,
            BinningReport {
                total: 4,
                located: 2,
                unbinned: 2,
                previously_sited: 0,
            }
        );
        assert_eq!(located[0].site_id, "ADL");
        assert_eq!(located[1].site_id, "MEL");

        for point in located[0].summary.points() {
            assert_eq!(point.launch_site.as_deref(), Some("ADL"));
            let range_m = point.launch_site_range_estimate.unwrap();
            assert!((range_m - located[0].distance_km * 1000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_previously_sited_keeps_annotation() {
        let mut summary = flight_at("A1", -34.95, 138.62, 400.0);
        summary.annotate("LEGACY", 1234.0);

        let (located, report) =
            locate_flights(vec![summary], &index(), &BinningParams::default()).unwrap();

        assert_eq!(report.previously_sited, 1);
        assert!(located[0].previously_sited);
        assert_eq!(located[0].site_id, "ADL");
        assert_eq!(located[0].summary.launch_site(), Some("LEGACY"));
    }

    #[test]
    fn test_reference_error_aborts() {
        let mut index = index();
        index
            .insert(LaunchSite::new("BAD", "Broken", 0.0, f64::INFINITY))
            .unwrap();
        let summaries = vec![flight_at("A1", -34.95, 138.62, 400.0)];
        assert!(locate_flights(summaries, &index, &BinningParams::default()).is_err());
    }

    #[test]
    fn test_binned_data_groups_by_site() {
        let index = index();
        let summaries = vec![
            flight_at("A2", -34.95, 138.62, 400.0),
            flight_at("A1", -34.85, 138.55, 400.0),
            flight_at("M1", -37.75, 144.95, 50.0),
            flight_at("A2", -34.96, 138.63, 300.0),
        ];
        let (located, _) = locate_flights(summaries, &index, &BinningParams::default()).unwrap();
        let binned = BinnedData::from_located(&located, &index);

        assert_eq!(binned.len(), 2);
        assert_eq!(binned.flight_count(), 3);
        let adl = binned.get("ADL").unwrap();
        assert_eq!(adl.site.name, "Adelaide");
        assert_eq!(adl.serials, vec!["A2", "A1"]);
        assert_eq!(adl.serial_data["A2"].first.alt, 300.0);
    }

    #[test]
    fn test_binned_data_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binned_sites.json");
        let index = index();

        let (located, _) = locate_flights(
            vec![flight_at("A1", -34.95, 138.62, 400.0)],
            &index,
            &BinningParams::default(),
        )
        .unwrap();
        let binned = BinnedData::from_located(&located, &index);
        binned.write_file(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["ADL"]["site"]["station"], "ADL");
        assert_eq!(raw["ADL"]["serials"][0], "A1");
        assert_eq!(raw["ADL"]["serial_data"]["A1"].as_array().unwrap().len(), 3);

        assert_eq!(BinnedData::from_file(&path).unwrap(), binned);
    }

    #[test]
    fn test_binned_data_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            BinnedData::from_file(&dir.path().join("missing.json")),
            Err(BinnedDataError::NotFound(_))
        ));
    }
}
