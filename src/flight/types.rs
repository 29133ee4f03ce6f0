use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::flight::FlightError;
use crate::geodesy::GeoPoint;

/// One telemetry fix from a flight summary.
///
/// Fields this tool does not interpret are kept in `extra` so a republished
/// record carries everything the archive held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPoint {
    pub serial: String,
    pub datetime: DateTime<Utc>,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lon: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub alt: f64,
    #[serde(rename = "type")]
    pub sonde_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Vertical velocity in m/s, negative when descending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel_v: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_site: Option<String>,
    /// Distance from the assigned launch site, in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_site_range_estimate: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TelemetryPoint {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon, self.alt)
    }

    /// The most specific type name: `subtype` when present, else `type`.
    pub fn effective_type(&self) -> &str {
        self.subtype.as_deref().unwrap_or(&self.sonde_type)
    }
}

/// Launch, burst and landing fixes of one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TelemetryPoint>", into = "Vec<TelemetryPoint>")]
pub struct FlightSummary {
    pub first: TelemetryPoint,
    pub burst: TelemetryPoint,
    pub last: TelemetryPoint,
}

impl FlightSummary {
    pub fn serial(&self) -> &str {
        &self.first.serial
    }

    /// Launch site the archive already assigned, if any.
    pub fn launch_site(&self) -> Option<&str> {
        self.first.launch_site.as_deref()
    }

    pub fn points(&self) -> [&TelemetryPoint; 3] {
        [&self.first, &self.burst, &self.last]
    }

    pub fn points_mut(&mut self) -> [&mut TelemetryPoint; 3] {
        [&mut self.first, &mut self.burst, &mut self.last]
    }

    /// Mark all three points as launched from `site_id`.
    pub fn annotate(&mut self, site_id: &str, range_m: f64) {
        for point in self.points_mut() {
            point.launch_site = Some(site_id.to_string());
            point.launch_site_range_estimate = Some(range_m);
        }
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        for (index, point) in self.points().into_iter().enumerate() {
            if !point.position().is_finite() {
                return Err(FlightError::NonFinite {
                    serial: point.serial.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<TelemetryPoint>> for FlightSummary {
    type Error = FlightError;

    fn try_from(points: Vec<TelemetryPoint>) -> Result<Self, Self::Error> {
        let count = points.len();
        let [first, burst, last]: [TelemetryPoint; 3] = points
            .try_into()
            .map_err(|_| FlightError::InvalidPointCount(count))?;
        Ok(Self { first, burst, last })
    }
}

impl From<FlightSummary> for Vec<TelemetryPoint> {
    fn from(summary: FlightSummary) -> Self {
        vec![summary.first, summary.burst, summary.last]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(v) => Ok(v),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
