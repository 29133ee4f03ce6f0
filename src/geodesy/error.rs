use thiserror::Error;

use super::GeoPoint;

#[derive(Debug, Error)]
pub enum GeodesyError {
    #[error("non-finite coordinate in {0}")]
    NonFiniteInput(GeoPoint),
    #[error("invalid sphere radius: {0} m")]
    InvalidRadius(f64),
    #[error("non-finite result between {a} and {b}")]
    NonFiniteResult { a: GeoPoint, b: GeoPoint },
}
