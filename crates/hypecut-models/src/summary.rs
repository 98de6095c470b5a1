//! Run summary and report models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AnalysisConfig;

/// Counts distinguishing partial success at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    /// Refined intervals produced by detection.
    pub detected: usize,

    /// Intervals whose byte range was fetched successfully.
    pub fetched: usize,

    /// Intervals skipped after a recoverable acquisition failure.
    pub skipped: usize,

    /// Clips referenced by the exported EDL.
    pub exported: usize,

    /// Chat events dropped for falling outside `[0, stream_duration)`.
    pub events_dropped: u64,
}

impl RunSummary {
    /// True when every detected interval made it into the EDL.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0 && self.exported == self.detected
    }
}

/// The durable run report written next to the EDL.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,

    /// Interval accounting.
    pub summary: RunSummary,

    /// Configuration the run executed with.
    pub analysis: AnalysisConfig,
}

impl RunReport {
    pub fn new(summary: RunSummary, analysis: AnalysisConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            finished_at: Utc::now(),
            summary,
            analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete() {
        let s = RunSummary {
            detected: 3,
            fetched: 3,
            skipped: 0,
            exported: 3,
            events_dropped: 0,
        };
        assert!(s.is_complete());

        let s = RunSummary {
            detected: 3,
            fetched: 2,
            skipped: 1,
            exported: 2,
            events_dropped: 0,
        };
        assert!(!s.is_complete());
    }
}
