//! FFprobe metadata and keyframe extraction.

use std::path::Path;
use std::process::Stdio;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::keyframes::{Keyframe, KeyframeIndex};

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec
    pub codec: String,
    /// File size in bytes
    pub size: u64,
}

/// FFprobe JSON output for `-show_format -show_streams`.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// FFprobe JSON output for `-show_packets`.
#[derive(Debug, Deserialize)]
struct FfprobePackets {
    #[serde(default)]
    packets: Vec<FfprobePacket>,
}

#[derive(Debug, Deserialize)]
struct FfprobePacket {
    pts_time: Option<String>,
    pos: Option<String>,
    flags: Option<String>,
}

async fn run_ffprobe(args: &[&str], path: &Path) -> MediaResult<Vec<u8>> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }
    Ok(output.stdout)
}

/// Probe a video file for stream and container information.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let stdout = run_ffprobe(
        &[
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ],
        path,
    )
    .await?;

    let probe: FfprobeOutput = serde_json::from_slice(&stdout)?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let size = probe
        .format
        .size
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(30.0);

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        size,
    })
}

/// Build a keyframe index (timestamp -> byte offset) for a local asset.
///
/// Reads packet-level metadata for the first video stream; packets whose
/// flags carry `K` are keyframes. Packets without a position or timestamp
/// (common at container boundaries) are skipped.
pub async fn probe_keyframes(path: impl AsRef<Path>) -> MediaResult<KeyframeIndex> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let stdout = run_ffprobe(
        &[
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-select_streams",
            "v:0",
            "-show_entries",
            "packet=pts_time,pos,flags",
        ],
        path,
    )
    .await?;

    let probe: FfprobePackets = serde_json::from_slice(&stdout)?;

    let mut keyframes = Vec::new();
    for packet in &probe.packets {
        let is_key = packet
            .flags
            .as_deref()
            .map(|f| f.contains('K'))
            .unwrap_or(false);
        if !is_key {
            continue;
        }
        let (Some(pts), Some(pos)) = (
            packet.pts_time.as_ref().and_then(|t| t.parse::<f64>().ok()),
            packet.pos.as_ref().and_then(|p| p.parse::<u64>().ok()),
        ) else {
            continue;
        };
        keyframes.push(Keyframe {
            time: pts,
            byte_offset: pos,
        });
    }

    debug!(
        path = %path.display(),
        keyframes = keyframes.len(),
        "built keyframe index"
    );
    Ok(KeyframeIndex::new(keyframes))
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("30000/1001").map(|f| (f * 100.0).round()), Some(2997.0));
        assert_eq!(parse_frame_rate("60"), Some(60.0));
        assert_eq!(parse_frame_rate("30/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_packet_json_parsing() {
        let json = r#"{"packets":[
            {"pts_time":"0.000000","pos":"48","flags":"K_"},
            {"pts_time":"0.016667","pos":"9000","flags":"__"},
            {"pts_time":"2.000000","pos":"120000","flags":"K_"},
            {"flags":"K_"}
        ]}"#;
        let parsed: FfprobePackets = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.packets.len(), 4);
        let keyed: Vec<_> = parsed
            .packets
            .iter()
            .filter(|p| p.flags.as_deref().map(|f| f.contains('K')).unwrap_or(false))
            .collect();
        assert_eq!(keyed.len(), 3);
    }
}
