//! Fetch planning models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::interval::RefinedInterval;

/// Half-open byte range `[start, end)` into the source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "byte range start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One planned partial download, produced by the fetch orchestrator and
/// consumed read-only by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FetchPlan {
    /// The interval this plan serves.
    pub interval: RefinedInterval,

    /// Byte range to request. `None` when the source has no keyframe
    /// index and the fetch collaborator must range (or fetch whole) on
    /// its own.
    pub byte_range: Option<ByteRange>,

    /// Effective start after snapping to the preceding keyframe. Never
    /// later than `interval.start`.
    pub keyframe_aligned_start: f64,

    /// How much earlier the snap moved the effective start, in seconds.
    /// Always >= 0.
    pub snap_shift: f64,
}

impl FetchPlan {
    /// Seconds of video the fetched range must cover.
    pub fn covered_duration(&self) -> f64 {
        self.interval.end - self.keyframe_aligned_start
    }

    /// Seconds into the raw fetched file at which the interval begins.
    ///
    /// A ranged fetch starts the file at the snapped keyframe, so the
    /// interval sits `snap_shift` seconds in. A rangeless fetch copied
    /// the whole asset from t=0, so the interval sits at its absolute
    /// start.
    pub fn seek_offset(&self) -> f64 {
        if self.byte_range.is_some() {
            self.snap_shift
        } else {
            self.interval.start
        }
    }
}
