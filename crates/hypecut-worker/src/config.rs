//! Worker configuration.

use std::path::PathBuf;

use hypecut_models::AnalysisConfig;

/// Worker configuration: analysis tuning plus run-level paths and targets.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Detection and refinement tuning.
    pub analysis: AnalysisConfig,
    /// Scratch directory for raw fetched segments.
    pub work_dir: PathBuf,
    /// Directory for normalized clips, the EDL, and run reports.
    pub output_dir: PathBuf,
    /// Constant frame rate enforced on normalized clips.
    pub target_fps: f64,
    /// Rounding interval (seconds) when the source has no keyframe index.
    pub snap_fallback: f64,
    /// Title written into the EDL header.
    pub edl_title: String,
    /// Per-segment transcode timeout in seconds (0 disables).
    pub transcode_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            work_dir: PathBuf::from("/tmp/hypecut"),
            output_dir: PathBuf::from("./out"),
            target_fps: 60.0,
            snap_fallback: 10.0,
            edl_title: "Stream Highlights".to_string(),
            transcode_timeout_secs: 600,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let analysis_defaults = AnalysisConfig::default();
        Self {
            analysis: AnalysisConfig {
                bin_width: env_parse("HYPECUT_BIN_WIDTH", analysis_defaults.bin_width),
                rolling_window: env_parse(
                    "HYPECUT_ROLLING_WINDOW",
                    analysis_defaults.rolling_window,
                ),
                z_threshold: env_parse("HYPECUT_Z_THRESHOLD", analysis_defaults.z_threshold),
                padding_pre: env_parse("HYPECUT_PADDING_PRE", analysis_defaults.padding_pre),
                padding_post: env_parse("HYPECUT_PADDING_POST", analysis_defaults.padding_post),
                merge_threshold: env_parse(
                    "HYPECUT_MERGE_THRESHOLD",
                    analysis_defaults.merge_threshold,
                ),
                fetch_concurrency_limit: env_parse(
                    "HYPECUT_FETCH_CONCURRENCY",
                    analysis_defaults.fetch_concurrency_limit,
                ),
                dry_run: env_parse("HYPECUT_DRY_RUN", false),
            },
            work_dir: PathBuf::from(
                std::env::var("HYPECUT_WORK_DIR")
                    .unwrap_or_else(|_| defaults.work_dir.to_string_lossy().into_owned()),
            ),
            output_dir: PathBuf::from(
                std::env::var("HYPECUT_OUTPUT_DIR")
                    .unwrap_or_else(|_| defaults.output_dir.to_string_lossy().into_owned()),
            ),
            target_fps: env_parse("HYPECUT_TARGET_FPS", defaults.target_fps),
            snap_fallback: env_parse("HYPECUT_SNAP_FALLBACK", defaults.snap_fallback),
            edl_title: std::env::var("HYPECUT_EDL_TITLE").unwrap_or(defaults.edl_title),
            transcode_timeout_secs: env_parse(
                "HYPECUT_TRANSCODE_TIMEOUT",
                defaults.transcode_timeout_secs,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let cfg = WorkerConfig::default();
        assert!(cfg.analysis.validate().is_ok());
        assert_eq!(cfg.target_fps, 60.0);
    }
}
