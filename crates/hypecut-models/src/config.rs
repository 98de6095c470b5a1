//! Analysis configuration consumed by the core pipeline.
//!
//! Values only; parsing (env, CLI) is the worker's responsibility.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bin width in seconds (one minute, the original granularity).
pub const DEFAULT_BIN_WIDTH_SECS: f64 = 60.0;
/// Default rolling window in bins (20 minutes at the default bin width).
pub const DEFAULT_ROLLING_WINDOW_BINS: usize = 20;
/// Default z-score threshold for flagging a bin.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;
/// Default pre-padding in seconds (capture the build-up).
pub const DEFAULT_PADDING_PRE_SECS: f64 = 120.0;
/// Default post-padding in seconds (capture the wind-down).
pub const DEFAULT_PADDING_POST_SECS: f64 = 60.0;
/// Default merge threshold in seconds.
pub const DEFAULT_MERGE_THRESHOLD_SECS: f64 = 10.0;
/// Default concurrent fetch/normalize tasks.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 2;

/// Configuration error raised for input-contract violations.
///
/// These are fatal by design: a silently coerced bin width or padding
/// would shift every downstream interval.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("bin_width must be positive, got {0}")]
    NonPositiveBinWidth(f64),

    #[error("rolling_window must be at least 1 bin")]
    EmptyRollingWindow,

    #[error("padding must be non-negative, got pre={pre} post={post}")]
    NegativePadding { pre: f64, post: f64 },

    #[error("merge_threshold must be non-negative, got {0}")]
    NegativeMergeThreshold(f64),

    #[error("fetch_concurrency_limit must be at least 1")]
    ZeroConcurrency,
}

/// Tuning values for detection, refinement, and acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisConfig {
    /// Width of each activity bin in seconds.
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,

    /// Trailing baseline window, in bins.
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,

    /// Z-score at or above which a bin is flagged.
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,

    /// Seconds subtracted from each candidate start.
    #[serde(default = "default_padding_pre")]
    pub padding_pre: f64,

    /// Seconds added to each candidate end.
    #[serde(default = "default_padding_post")]
    pub padding_post: f64,

    /// Maximum gap, in seconds, across which neighbouring intervals merge
    /// (inclusive boundary).
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,

    /// Maximum concurrent fetch+normalize tasks.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency_limit: usize,

    /// When set, detection and refinement run fully but no fetch or
    /// transcode is issued.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_bin_width() -> f64 {
    DEFAULT_BIN_WIDTH_SECS
}
fn default_rolling_window() -> usize {
    DEFAULT_ROLLING_WINDOW_BINS
}
fn default_z_threshold() -> f64 {
    DEFAULT_Z_THRESHOLD
}
fn default_padding_pre() -> f64 {
    DEFAULT_PADDING_PRE_SECS
}
fn default_padding_post() -> f64 {
    DEFAULT_PADDING_POST_SECS
}
fn default_merge_threshold() -> f64 {
    DEFAULT_MERGE_THRESHOLD_SECS
}
fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bin_width: DEFAULT_BIN_WIDTH_SECS,
            rolling_window: DEFAULT_ROLLING_WINDOW_BINS,
            z_threshold: DEFAULT_Z_THRESHOLD,
            padding_pre: DEFAULT_PADDING_PRE_SECS,
            padding_post: DEFAULT_PADDING_POST_SECS,
            merge_threshold: DEFAULT_MERGE_THRESHOLD_SECS,
            fetch_concurrency_limit: DEFAULT_FETCH_CONCURRENCY,
            dry_run: false,
        }
    }
}

impl AnalysisConfig {
    /// Validate the configuration, surfacing contract violations before
    /// any data flows through the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bin_width > 0.0) {
            return Err(ConfigError::NonPositiveBinWidth(self.bin_width));
        }
        if self.rolling_window == 0 {
            return Err(ConfigError::EmptyRollingWindow);
        }
        if self.padding_pre < 0.0 || self.padding_post < 0.0 {
            return Err(ConfigError::NegativePadding {
                pre: self.padding_pre,
                post: self.padding_post,
            });
        }
        if self.merge_threshold < 0.0 {
            return Err(ConfigError::NegativeMergeThreshold(self.merge_threshold));
        }
        if self.fetch_concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    /// Returns a copy with dry-run enabled.
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}
