//! Highlight interval models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A raw time range derived from one or more consecutive flagged bins.
///
/// Transient: discarded once refinement produces a [`RefinedInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateInterval {
    /// Start in seconds from stream start.
    pub start: f64,

    /// End in seconds, always greater than `start`.
    pub end: f64,
}

impl CandidateInterval {
    pub fn new(start: f64, end: f64) -> Self {
        debug_assert!(start < end, "interval start must precede end");
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A padded, merged highlight interval.
///
/// This is the durable hand-off between detection and acquisition: the
/// final set is sorted ascending by start and pairwise disjoint, and it
/// serializes on its own so a dry run can emit it without any downstream
/// I/O.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RefinedInterval {
    /// Start in seconds from stream start.
    pub start: f64,

    /// End in seconds, always greater than `start`.
    pub end: f64,
}

impl RefinedInterval {
    pub fn new(start: f64, end: f64) -> Self {
        debug_assert!(start < end, "interval start must precede end");
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl From<CandidateInterval> for RefinedInterval {
    fn from(c: CandidateInterval) -> Self {
        Self {
            start: c.start,
            end: c.end,
        }
    }
}
