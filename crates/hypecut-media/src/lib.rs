//! FFmpeg CLI wrapper and bandwidth-aware acquisition for hypecut.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and async execution
//! - FFprobe metadata and keyframe-index extraction
//! - Fetch planning (keyframe snap, byte ranges) and ranged reads
//! - Constant-frame-rate normalization of fetched segments

pub mod command;
pub mod error;
pub mod fetch;
pub mod keyframes;
pub mod normalize;
pub mod probe;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use fetch::{fetch_segment, ByteRangeSource, FetchPlanner, FileSource, SourceVideo};
pub use keyframes::{Keyframe, KeyframeIndex};
pub use normalize::{normalize_segment, NormalizeTarget};
pub use probe::{probe_keyframes, probe_video, VideoInfo};
