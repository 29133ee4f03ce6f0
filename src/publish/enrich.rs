use crate::binning::LocatedFlight;
use crate::flight::{FlightSummary, TypeTable};
use crate::publish::PublishError;

/// Produce the record to republish for a located flight: launch site and
/// range annotated, every point's type rewritten to its canonical form.
///
/// A point whose type is not in the table rejects the whole flight.
pub fn enrich(flight: &LocatedFlight, table: &TypeTable) -> Result<FlightSummary, PublishError> {
    let mut summary = flight.summary.clone();
    if summary.launch_site().is_none() {
        summary.annotate(&flight.site_id, flight.distance_km * 1000.0);
    }

    for point in summary.points_mut() {
        let canonical = table
            .normalize(point)
            .ok_or_else(|| PublishError::UnknownType {
                serial: point.serial.clone(),
                raw: point.sonde_type.clone(),
            })?;
        point.sonde_type = canonical.type_name;
        point.subtype = canonical.subtype;
    }

    Ok(summary)
}

/// `<prefix>/<station>/<serial>.json`, with path separators in the serial
/// replaced.
pub fn object_key(prefix: &str, site_id: &str, serial: &str) -> String {
    let serial = serial.replace(['/', '\\'], "_");
    if prefix.is_empty() {
        format!("{site_id}/{serial}.json")
    } else {
        format!("{}/{site_id}/{serial}.json", prefix.trim_end_matches('/'))
    }
}
