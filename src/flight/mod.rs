mod error;
mod legacy;
mod loader;
mod types;

pub use error::{FlightError, RejectReason};
pub use legacy::TypeTable;
pub use loader::{discover_summary_files, load_summaries};
pub use types::{FlightSummary, TelemetryPoint};

#[cfg(test)]
pub(crate) use types::fixtures;
