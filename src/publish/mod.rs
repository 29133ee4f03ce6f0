//! Republishing of located flights to a record sink.

mod enrich;
mod error;
mod pool;
mod runner;
mod sink;

pub use enrich::{enrich, object_key};
pub use error::{PublishError, SinkError};
pub use pool::{UploadJob, UploadPool};
pub use runner::{publish_flights, PublishSettings};
pub use sink::{DirectorySink, RecordMetadata, RecordSink};
