use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::publish::SinkError;

/// Metadata stored alongside each republished record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMetadata {
    pub serial: String,
    pub launch_site: String,
    pub sonde_type: String,
    pub batch_id: Uuid,
    pub content_type: &'static str,
}

/// Destination for republished records, keyed like an object store.
pub trait RecordSink: Send + Sync {
    fn put(&self, key: &str, body: Vec<u8>, metadata: &RecordMetadata) -> Result<(), SinkError>;
}

/// Writes `<root>/<key>` plus a `<key>.meta.json` sidecar.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl RecordSink for DirectorySink {
    fn put(&self, key: &str, body: Vec<u8>, metadata: &RecordMetadata) -> Result<(), SinkError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;

        let mut meta_path = path.into_os_string();
        meta_path.push(".meta.json");
        fs::write(meta_path, serde_json::to_vec_pretty(metadata)?)?;
        Ok(())
    }
}
