//! Normalized clip artifact model.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::interval::RefinedInterval;

/// A normalized, constant-frame-rate clip on disk.
///
/// Created by the normalizer and exclusively owned by its producing task
/// until handed to the EDL exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipArtifact {
    /// The refined interval this clip was cut for.
    pub source_interval: RefinedInterval,

    /// Path to the normalized clip file.
    pub path: PathBuf,

    /// Measured duration of the normalized clip, in seconds.
    pub duration: f64,

    /// Constant frame rate of the normalized clip.
    pub frame_rate: f64,
}

impl ClipArtifact {
    /// File name used in EDL `FROM CLIP NAME` comments.
    pub fn clip_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}
