mod error;
mod position;
mod types;

pub use error::GeodesyError;
pub use position::{position_info, DEFAULT_SPHERE_RADIUS_M};
#[cfg(test)]
pub use position::position_info_default;
pub use types::{GeoPoint, PositionInfo};
