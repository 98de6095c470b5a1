//! Error types for detection.

use thiserror::Error;

use hypecut_models::ConfigError;

/// Result type for detection operations.
pub type DetectResult<T> = Result<T, DetectError>;

/// Errors raised by the detection half of the pipeline.
///
/// Everything here is an input-contract violation and therefore fatal;
/// degenerate statistics (zero-variance baselines) are handled locally by
/// the detector and never surface as errors.
#[derive(Debug, Error, PartialEq)]
pub enum DetectError {
    #[error("chat events out of order: {next} arrived after {prev}")]
    UnsortedEvents { prev: f64, next: f64 },

    #[error("stream_duration must be positive, got {0}")]
    NonPositiveStreamDuration(f64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
