use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("unrecognized sonde type {raw:?} in {serial}")]
    UnknownType { serial: String, raw: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("upload queue closed")]
    QueueClosed,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
