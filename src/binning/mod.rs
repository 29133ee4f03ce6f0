mod corpus;
mod engine;
mod error;

pub use corpus::{locate_flights, BinnedData, LocatedFlight};
pub use engine::{bin_flight, BinningParams};
pub use error::{BinnedDataError, ReferenceDataError};
