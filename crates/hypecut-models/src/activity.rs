//! Binned chat activity models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One fixed-width slice of the chat-activity time series.
///
/// Bins are contiguous, non-overlapping, and cover `[0, stream_duration)`
/// with zero-count bins for silent periods. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivityBin {
    /// Bin start in seconds from stream start.
    pub start: f64,

    /// Bin end (`start + bin_width`).
    pub end: f64,

    /// Summed event weight inside the bin (event count when all weights
    /// are 1.0).
    pub count: f64,
}

impl ActivityBin {
    pub fn new(start: f64, end: f64, count: f64) -> Self {
        Self { start, end, count }
    }

    /// Bin width in seconds.
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// An [`ActivityBin`] annotated with its trailing-baseline statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoredBin {
    /// The underlying bin.
    pub bin: ActivityBin,

    /// Mean of the counts in the trailing window.
    pub baseline_mean: f64,

    /// Standard deviation of the counts in the trailing window.
    pub baseline_std: f64,

    /// `(count - baseline_mean) / baseline_std` when `baseline_std > 0`.
    /// A flat but populated baseline substitutes unit deviation; fewer
    /// than two prior samples score 0.0.
    pub z_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_width() {
        let bin = ActivityBin::new(30.0, 40.0, 7.0);
        assert_eq!(bin.width(), 10.0);
    }
}
