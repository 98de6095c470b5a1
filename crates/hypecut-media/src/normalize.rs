//! Segment normalization: constant frame rate, standard codec profile.

use std::path::Path;

use tracing::{info, warn};

use hypecut_models::{ClipArtifact, FetchPlan};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Target encoding profile for normalized clips.
#[derive(Debug, Clone)]
pub struct NormalizeTarget {
    /// Constant output frame rate.
    pub fps: f64,
    /// Video codec.
    pub codec: String,
    /// Constant Rate Factor (quality, lower is better).
    pub crf: u8,
    /// Encoding preset.
    pub preset: String,
    /// Audio codec.
    pub audio_codec: String,
    /// Audio sample rate in Hz.
    pub audio_sample_rate: u32,
    /// Transcode timeout in seconds, if any.
    pub timeout_secs: Option<u64>,
}

impl Default for NormalizeTarget {
    fn default() -> Self {
        Self {
            fps: 60.0,
            codec: "libx264".to_string(),
            crf: 18,
            preset: "fast".to_string(),
            audio_codec: "aac".to_string(),
            audio_sample_rate: 48_000,
            timeout_secs: None,
        }
    }
}

/// Transcode a fetched raw segment into a CFR clip artifact.
///
/// The seek into the raw file comes from [`FetchPlan::seek_offset`]: the
/// lead-in of a ranged segment is `snap_shift` seconds, while a rangeless
/// whole-asset copy carries the interval at its absolute start. The output
/// is trimmed to the interval duration, so the clip matches its interval
/// frame-for-frame.
///
/// A zero-duration result is an error the caller treats as a per-interval
/// skip. The raw segment is scratch data and is removed whether or not
/// the transcode succeeds.
pub async fn normalize_segment(
    plan: &FetchPlan,
    raw: &Path,
    output: &Path,
    target: &NormalizeTarget,
) -> MediaResult<ClipArtifact> {
    if !raw.exists() {
        return Err(MediaError::FileNotFound(raw.to_path_buf()));
    }

    let cmd = build_command(plan, raw, output, target);
    let mut runner = FfmpegRunner::new();
    if let Some(timeout) = target.timeout_secs {
        runner = runner.with_timeout(timeout);
    }

    let outcome = transcode_and_probe(&runner, &cmd, output).await;

    if let Err(e) = tokio::fs::remove_file(raw).await {
        warn!(raw = %raw.display(), error = %e, "failed to remove raw segment");
    }

    let probed = outcome?;
    info!(
        output = %output.display(),
        duration = probed.duration,
        fps = probed.fps,
        "normalized segment"
    );

    Ok(ClipArtifact {
        source_interval: plan.interval,
        path: output.to_path_buf(),
        duration: probed.duration,
        frame_rate: probed.fps,
    })
}

fn build_command(
    plan: &FetchPlan,
    raw: &Path,
    output: &Path,
    target: &NormalizeTarget,
) -> FfmpegCommand {
    FfmpegCommand::new(raw, output)
        .seek(plan.seek_offset())
        .duration(plan.interval.duration())
        .frame_rate(target.fps)
        .video_codec(&target.codec)
        .crf(target.crf)
        .preset(&target.preset)
        .audio_codec(&target.audio_codec)
        .audio_sample_rate(target.audio_sample_rate)
}

async fn transcode_and_probe(
    runner: &FfmpegRunner,
    cmd: &FfmpegCommand,
    output: &Path,
) -> MediaResult<crate::probe::VideoInfo> {
    runner.run(cmd).await?;
    let probed = probe_video(output).await?;
    if probed.duration <= 0.0 {
        return Err(MediaError::ZeroDuration(output.to_path_buf()));
    }
    Ok(probed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypecut_models::{ByteRange, RefinedInterval};

    #[test]
    fn test_default_target_matches_profile() {
        let t = NormalizeTarget::default();
        assert_eq!(t.codec, "libx264");
        assert_eq!(t.crf, 18);
        assert_eq!(t.audio_sample_rate, 48_000);
    }

    fn seek_arg(cmd: &FfmpegCommand) -> String {
        let args = cmd.build_args();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        args[ss + 1].clone()
    }

    #[test]
    fn test_ranged_segment_seeks_past_snap_lead_in() {
        let plan = FetchPlan {
            interval: RefinedInterval::new(47.0, 60.0),
            byte_range: Some(ByteRange::new(1_000, 5_000)),
            keyframe_aligned_start: 44.0,
            snap_shift: 3.0,
        };
        let cmd = build_command(
            &plan,
            Path::new("/raw.ts"),
            Path::new("/out.mp4"),
            &NormalizeTarget::default(),
        );
        assert_eq!(seek_arg(&cmd), "3.000");
    }

    #[test]
    fn test_whole_asset_copy_seeks_to_absolute_start() {
        // Rangeless fallback: the raw file is the whole asset, so the cut
        // must land at the interval's absolute position, not the shift.
        let plan = FetchPlan {
            interval: RefinedInterval::new(47.0, 60.0),
            byte_range: None,
            keyframe_aligned_start: 40.0,
            snap_shift: 7.0,
        };
        let cmd = build_command(
            &plan,
            Path::new("/raw.ts"),
            Path::new("/out.mp4"),
            &NormalizeTarget::default(),
        );
        assert_eq!(seek_arg(&cmd), "47.000");
    }

    #[tokio::test]
    async fn test_raw_segment_removed_when_transcode_fails() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("segment_000.ts");
        tokio::fs::write(&raw, b"not a media container").await.unwrap();

        let plan = FetchPlan {
            interval: RefinedInterval::new(0.0, 5.0),
            byte_range: None,
            keyframe_aligned_start: 0.0,
            snap_shift: 0.0,
        };
        let result = normalize_segment(
            &plan,
            &raw,
            &dir.path().join("out.mp4"),
            &NormalizeTarget::default(),
        )
        .await;

        assert!(result.is_err());
        assert!(!raw.exists(), "failed transcode must not leak the raw segment");
    }

    #[tokio::test]
    async fn test_missing_raw_segment_errors() {
        let plan = FetchPlan {
            interval: RefinedInterval::new(0.0, 10.0),
            byte_range: None,
            keyframe_aligned_start: 0.0,
            snap_shift: 0.0,
        };
        let err = normalize_segment(
            &plan,
            Path::new("/nonexistent/raw.ts"),
            Path::new("/nonexistent/out.mp4"),
            &NormalizeTarget::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
