use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::atmosphere::sea_level_descent_rate;
use crate::flight::FlightSummary;

/// Marker for descent statistics that could not be computed.
pub const DESCENT_UNAVAILABLE: f64 = -999.0;

/// Type names containing this are internal markers, not sonde models.
const RESERVED_TYPE_MARKER: &str = "Sondehub";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateParams {
    pub min_samples: usize,
    /// Only landing fixes below this altitude feed the descent statistics.
    pub descent_max_alt_m: f64,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            min_samples: 5,
            descent_max_alt_m: 12000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub burst_count: usize,
    pub burst_mean: f64,
    pub burst_std: f64,
    pub descent_count: usize,
    /// Sea-level equivalent, or [`DESCENT_UNAVAILABLE`].
    pub descent_mean: f64,
    pub descent_std: f64,
    pub type_histogram: BTreeMap<String, usize>,
}

impl AggregateStats {
    /// Descent mean and standard deviation, when enough samples existed.
    pub fn descent(&self) -> Option<(f64, f64)> {
        (self.descent_mean != DESCENT_UNAVAILABLE).then_some((self.descent_mean, self.descent_std))
    }

    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "Bursts ({}): {:.0} m, {:.0} m std-dev",
            self.burst_count, self.burst_mean, self.burst_std
        );
        if let Some((mean, std)) = self.descent() {
            let _ = write!(
                line,
                "; Landing Rates ({}): {:.1} m/s, {:.1} m/s std-dev",
                self.descent_count, mean, std
            );
        }
        for (sonde_type, count) in &self.type_histogram {
            let _ = write!(line, "; {}: {}", sonde_type, count);
        }
        line
    }
}

/// Fold a site's flights into burst, descent and type statistics.
///
/// Returns `None` when fewer than `min_samples` flights have a usable burst;
/// no partial result is produced in that case. With enough bursts but too few
/// descent samples the descent fields hold [`DESCENT_UNAVAILABLE`].
pub fn aggregate<'a, I>(flights: I, params: &AggregateParams) -> Option<AggregateStats>
where
    I: IntoIterator<Item = &'a FlightSummary>,
{
    let mut bursts = Vec::new();
    let mut descents = Vec::new();
    let mut type_histogram = BTreeMap::new();

    for flight in flights {
        let first_alt = flight.first.alt;
        let burst_alt = flight.burst.alt;
        let last = &flight.last;

        // burst == first or burst == last means apogee detection failed
        if burst_alt > first_alt && burst_alt > last.alt {
            bursts.push(burst_alt);
        }

        if last.alt < burst_alt && last.alt < params.descent_max_alt_m {
            if let Some(vel_v) = last.vel_v.filter(|v| *v < 0.0) {
                descents.push(sea_level_descent_rate(vel_v, last.alt));
            }
        }

        let sonde_type = last.effective_type();
        if !sonde_type.contains(RESERVED_TYPE_MARKER) {
            *type_histogram.entry(sonde_type.to_string()).or_insert(0) += 1;
        }
    }

    if bursts.is_empty() || bursts.len() < params.min_samples {
        return None;
    }
    let (burst_mean, burst_std) = mean_std(&bursts);

    let descent_available = !descents.is_empty() && descents.len() >= params.min_samples;
    let (descent_mean, descent_std) = if descent_available {
        mean_std(&descents)
    } else {
        (DESCENT_UNAVAILABLE, DESCENT_UNAVAILABLE)
    };

    Some(AggregateStats {
        burst_count: bursts.len(),
        burst_mean,
        burst_std,
        descent_count: descents.len(),
        descent_mean,
        descent_std,
        type_histogram,
    })
}

/// Mean and population standard deviation. `values` must not be empty.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
