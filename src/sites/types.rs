use serde::{Deserialize, Deserializer, Serialize};

use crate::geodesy::GeoPoint;
use crate::stats::AggregateStats;

/// A fixed launch location from the launch site dataset.
///
/// Dataset fields this tool does not use are carried in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSite {
    #[serde(rename = "station")]
    pub id: String,
    #[serde(rename = "station_name")]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(
        default,
        deserialize_with = "truncated_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub burst_altitude: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_samples: Option<usize>,
    #[serde(
        default,
        deserialize_with = "truncated_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub burst_std: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descent_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descent_samples: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descent_std: Option<f64>,
    #[serde(skip)]
    pub accumulated_stats: Option<AggregateStats>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LaunchSite {
    #[cfg(test)]
    pub fn new(id: &str, name: &str, lat: f64, lon: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            lat,
            lon,
            burst_altitude: None,
            burst_samples: None,
            burst_std: None,
            descent_rate: None,
            descent_samples: None,
            descent_std: None,
            accumulated_stats: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::surface(self.lat, self.lon)
    }

    /// Attach aggregate statistics and update the published fields.
    ///
    /// Burst values are truncated to whole meters. Descent fields are only
    /// written when descent statistics are available, so an earlier value
    /// in the dataset survives a run with too few landing samples.
    /// "Available" means at least `min_samples` landings; the older batch
    /// script required strictly more than five.
    pub fn apply_stats(&mut self, stats: &AggregateStats) {
        self.burst_altitude = Some(stats.burst_mean.trunc() as i64);
        self.burst_samples = Some(stats.burst_count);
        self.burst_std = Some(stats.burst_std.trunc() as i64);

        if let Some((mean, std)) = stats.descent() {
            self.descent_rate = Some(round1(mean));
            self.descent_samples = Some(stats.descent_count);
            self.descent_std = Some(round1(std));
        }

        self.accumulated_stats = Some(stats.clone());
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn truncated_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(|v| v.map(|f| f.trunc() as i64))
}
