//! EDL assembly and CMX 3600 serialization.
//!
//! Clips are laid end to end on a single virtual timeline (no cross-fades
//! or overlaps) and serialized in the CMX 3600 dialect that DaVinci
//! Resolve and Premiere import. Assembly is pure and deterministic: the
//! same artifact sequence always yields the same document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hypecut_models::{ClipArtifact, Timecode};

/// Result type for EDL operations.
pub type EdlResult<T> = Result<T, EdlError>;

#[derive(Debug, Error, PartialEq)]
pub enum EdlError {
    #[error("clip {0} has non-positive duration")]
    NonPositiveDuration(String),

    #[error("cannot derive a timeline frame rate from an empty clip set")]
    NoFrameRate,
}

/// One edit event: a clip placed on the record timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdlEvent {
    /// 1-based event number.
    pub event_number: u32,

    /// File name of the referenced clip artifact.
    pub clip_name: String,

    /// Source in point (clip-local, starts at zero).
    pub source_in: Timecode,

    /// Source out point (clip-local).
    pub source_out: Timecode,

    /// Record in point on the assembled timeline.
    pub record_in: Timecode,

    /// Record out point on the assembled timeline.
    pub record_out: Timecode,
}

/// An assembled edit decision list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edl {
    pub title: String,
    /// Nominal timeline frame rate (non-drop-frame).
    pub fps: u32,
    pub events: Vec<EdlEvent>,
}

impl Edl {
    /// Assemble an EDL from clip artifacts in original interval order.
    ///
    /// Record times accumulate prior clip durations; the timeline frame
    /// rate is taken from the first artifact (all clips share the
    /// normalizer's CFR target).
    pub fn assemble(title: impl Into<String>, artifacts: &[ClipArtifact]) -> EdlResult<Self> {
        let fps = artifacts
            .first()
            .map(|a| a.frame_rate.round() as u32)
            .unwrap_or(30);
        if fps == 0 {
            return Err(EdlError::NoFrameRate);
        }

        let mut events = Vec::with_capacity(artifacts.len());
        let mut cursor = Timecode::zero(fps);

        for (i, artifact) in artifacts.iter().enumerate() {
            if artifact.duration <= 0.0 {
                return Err(EdlError::NonPositiveDuration(artifact.clip_name()));
            }
            let record_in = cursor;
            let record_out = record_in.advanced_by(artifact.duration);
            events.push(EdlEvent {
                event_number: (i + 1) as u32,
                clip_name: artifact.clip_name(),
                source_in: Timecode::zero(fps),
                source_out: Timecode::zero(fps).advanced_by(artifact.duration),
                record_in,
                record_out,
            });
            cursor = record_out;
        }

        Ok(Self {
            title: title.into(),
            fps,
            events,
        })
    }

    /// Serialize to CMX 3600 text.
    pub fn to_cmx3600(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("TITLE: {}\n", self.title));
        out.push_str("FCM: NON-DROP FRAME\n\n");

        for event in &self.events {
            out.push_str(&format!(
                "{:03}  AX       V     C        {} {} {} {}\n",
                event.event_number,
                event.source_in,
                event.source_out,
                event.record_in,
                event.record_out,
            ));
            out.push_str(&format!("* FROM CLIP NAME: {}\n\n", event.clip_name));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypecut_models::RefinedInterval;
    use std::path::PathBuf;

    fn artifact(name: &str, start: f64, duration: f64) -> ClipArtifact {
        ClipArtifact {
            source_interval: RefinedInterval::new(start, start + duration),
            path: PathBuf::from(format!("/tmp/clips/{name}")),
            duration,
            frame_rate: 60.0,
        }
    }

    #[test]
    fn test_record_times_accumulate_and_increase() {
        let artifacts = vec![
            artifact("clip_001.mp4", 40.0, 40.0),
            artifact("clip_002.mp4", 300.0, 25.5),
            artifact("clip_003.mp4", 900.0, 12.25),
        ];
        let edl = Edl::assemble("Highlights", &artifacts).unwrap();

        assert_eq!(edl.events.len(), 3);
        assert_eq!(edl.events[0].event_number, 1);
        assert_eq!(edl.events[0].record_in, Timecode::zero(60));

        for (event, a) in edl.events.iter().zip(&artifacts) {
            assert!(event.record_in < event.record_out);
            // out - in reproduces the clip duration exactly, in frames.
            let frames = event.record_out.frames - event.record_in.frames;
            assert_eq!(frames, (a.duration * 60.0).round() as u64);
        }
        for pair in edl.events.windows(2) {
            assert_eq!(pair[0].record_out, pair[1].record_in);
        }
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let artifacts = vec![
            artifact("clip_001.mp4", 40.0, 40.0),
            artifact("clip_002.mp4", 300.0, 25.0),
        ];
        let a = Edl::assemble("Highlights", &artifacts).unwrap();
        let b = Edl::assemble("Highlights", &artifacts).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_cmx3600(), b.to_cmx3600());
    }

    #[test]
    fn test_cmx3600_layout() {
        let artifacts = vec![artifact("clip_001.mp4", 40.0, 40.0)];
        let text = Edl::assemble("Stream Highlights", &artifacts)
            .unwrap()
            .to_cmx3600();

        assert!(text.starts_with("TITLE: Stream Highlights\n"));
        assert!(text.contains("FCM: NON-DROP FRAME"));
        assert!(text.contains(
            "001  AX       V     C        00:00:00:00 00:00:40:00 00:00:00:00 00:00:40:00"
        ));
        assert!(text.contains("* FROM CLIP NAME: clip_001.mp4"));
    }

    #[test]
    fn test_empty_artifact_set_yields_header_only() {
        let edl = Edl::assemble("Empty", &[]).unwrap();
        assert!(edl.events.is_empty());
        let text = edl.to_cmx3600();
        assert!(text.contains("TITLE: Empty"));
    }

    #[test]
    fn test_zero_duration_artifact_rejected() {
        let broken = ClipArtifact {
            source_interval: RefinedInterval::new(0.0, 10.0),
            path: PathBuf::from("/tmp/clips/clip_001.mp4"),
            duration: 0.0,
            frame_rate: 60.0,
        };
        assert_eq!(
            Edl::assemble("Bad", &[broken]).unwrap_err(),
            EdlError::NonPositiveDuration("clip_001.mp4".into())
        );
    }
}
