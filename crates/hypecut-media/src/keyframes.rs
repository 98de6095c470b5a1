//! Keyframe index for snap alignment.

use serde::{Deserialize, Serialize};

/// One independently-decodable frame boundary in the source asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Presentation time in seconds.
    pub time: f64,
    /// Byte offset of the packet in the container.
    pub byte_offset: u64,
}

/// Sorted keyframe index, mapping timestamps to byte offsets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyframeIndex {
    entries: Vec<Keyframe>,
}

impl KeyframeIndex {
    /// Build an index, sorting entries by time.
    pub fn new(mut entries: Vec<Keyframe>) -> Self {
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The nearest keyframe at or before `time`.
    ///
    /// The snap safety invariant lives here: the returned keyframe's time
    /// is always <= `time`, so snapping can only move a start earlier.
    /// Returns `None` when `time` precedes the first keyframe.
    pub fn snap_before(&self, time: f64) -> Option<Keyframe> {
        let idx = self.entries.partition_point(|k| k.time <= time);
        idx.checked_sub(1).map(|i| self.entries[i])
    }

    /// The first keyframe at or after `time`, if any.
    ///
    /// Used as the end boundary of a byte range so the final GOP of the
    /// fetched slice stays complete.
    pub fn next_at_or_after(&self, time: f64) -> Option<Keyframe> {
        let idx = self.entries.partition_point(|k| k.time < time);
        self.entries.get(idx).copied()
    }
}
