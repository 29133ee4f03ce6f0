use std::path::PathBuf;

use thiserror::Error;

use crate::geodesy::{GeoPoint, GeodesyError};

/// A configured launch site whose geometry cannot be computed. This means the
/// reference dataset is bad, so it aborts the run.
#[derive(Debug, Error)]
#[error("distance calculation failed for site {station} at {site} against {serial} at {fix}: {source}")]
pub struct ReferenceDataError {
    pub station: String,
    pub serial: String,
    pub site: GeoPoint,
    pub fix: GeoPoint,
    pub source: GeodesyError,
}

#[derive(Debug, Error)]
pub enum BinnedDataError {
    #[error("binned data file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
