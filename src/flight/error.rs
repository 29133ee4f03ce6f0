use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlightError {
    #[error("summary must contain exactly 3 points, found {0}")]
    InvalidPointCount(usize),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("non-finite position in point {index} of {serial}")]
    NonFinite { serial: String, index: usize },
    #[error("summary folder not found: {0}")]
    FolderNotFound(PathBuf),
}

impl FlightError {
    pub fn reason(&self) -> RejectReason {
        match self {
            FlightError::InvalidPointCount(_) => RejectReason::PointCount,
            FlightError::Json(_) => RejectReason::Unparseable,
            FlightError::Io(_) | FlightError::FolderNotFound(_) => RejectReason::Unreadable,
            FlightError::NonFinite { .. } => RejectReason::NonFinite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    PointCount,
    Unparseable,
    Unreadable,
    NonFinite,
}
