//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("exported clip count {actual} does not match detected {detected} minus skipped {skipped}")]
    ExportInconsistency {
        detected: usize,
        skipped: usize,
        actual: usize,
    },

    #[error("fetch task panicked: {0}")]
    TaskPanicked(String),

    #[error("Configuration error: {0}")]
    Config(#[from] hypecut_models::ConfigError),

    #[error("Detection error: {0}")]
    Detect(#[from] hypecut_detect::DetectError),

    #[error("Media error: {0}")]
    Media(#[from] hypecut_media::MediaError),

    #[error("EDL error: {0}")]
    Edl(#[from] hypecut_edl::EdlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
