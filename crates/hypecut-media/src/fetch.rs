//! Fetch orchestration: interval-to-byte-range planning and ranged reads.
//!
//! Planning is pure so dry runs and tests exercise snapping and bounds
//! logic without touching the network or filesystem; execution goes
//! through the [`ByteRangeSource`] trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info};

use hypecut_models::{ByteRange, FetchPlan, RefinedInterval};

use crate::error::{MediaError, MediaResult};
use crate::keyframes::KeyframeIndex;

/// Descriptor of the source asset, supplied by the ingestion collaborator.
#[derive(Debug, Clone)]
pub struct SourceVideo {
    /// Local path or mount of the seekable asset.
    pub path: PathBuf,
    /// Total size of the asset in bytes.
    pub total_bytes: u64,
    /// Keyframe index when the container was probed; absence degrades
    /// snapping to interval rounding.
    pub keyframe_index: Option<KeyframeIndex>,
}

/// Maps refined intervals to partial-download plans.
#[derive(Debug, Clone)]
pub struct FetchPlanner {
    /// Rounding interval (seconds) used when no keyframe index exists.
    snap_fallback: f64,
}

impl Default for FetchPlanner {
    fn default() -> Self {
        Self { snap_fallback: 10.0 }
    }
}

impl FetchPlanner {
    /// Create a planner. Errors when the fallback interval is not
    /// positive.
    pub fn new(snap_fallback: f64) -> MediaResult<Self> {
        if !(snap_fallback > 0.0) {
            return Err(MediaError::NonPositiveSnapFallback(snap_fallback));
        }
        Ok(Self { snap_fallback })
    }

    /// Produce one plan per interval. Pure: no I/O is issued.
    pub fn plan(&self, intervals: &[RefinedInterval], source: &SourceVideo) -> Vec<FetchPlan> {
        intervals
            .iter()
            .map(|&interval| self.plan_interval(interval, source))
            .collect()
    }

    fn plan_interval(&self, interval: RefinedInterval, source: &SourceVideo) -> FetchPlan {
        let index = source
            .keyframe_index
            .as_ref()
            .filter(|idx| !idx.is_empty());

        let plan = match index {
            Some(index) => {
                // Snap earlier, never later: a start between keyframes
                // falls back to the preceding one, and a start before the
                // first keyframe falls back to the head of the asset.
                let (aligned_start, start_offset) = match index.snap_before(interval.start) {
                    Some(kf) => (kf.time, kf.byte_offset),
                    None => (0.0, 0),
                };
                let end_offset = index
                    .next_at_or_after(interval.end)
                    .map(|kf| kf.byte_offset)
                    .unwrap_or(source.total_bytes)
                    .min(source.total_bytes);

                FetchPlan {
                    interval,
                    byte_range: Some(ByteRange::new(start_offset, end_offset)),
                    keyframe_aligned_start: aligned_start,
                    snap_shift: interval.start - aligned_start,
                }
            }
            None => {
                // Documented fallback: round down to the configured snap
                // interval and leave ranging to the fetch collaborator.
                let aligned_start =
                    (interval.start / self.snap_fallback).floor() * self.snap_fallback;
                FetchPlan {
                    interval,
                    byte_range: None,
                    keyframe_aligned_start: aligned_start,
                    snap_shift: interval.start - aligned_start,
                }
            }
        };

        debug_assert!(plan.keyframe_aligned_start <= plan.interval.start);
        debug_assert!(plan.snap_shift >= 0.0);
        debug!(
            start = interval.start,
            end = interval.end,
            aligned = plan.keyframe_aligned_start,
            shift = plan.snap_shift,
            ranged = plan.byte_range.is_some(),
            "planned fetch"
        );
        plan
    }
}

/// A seekable, byte-range-capable media source.
#[async_trait]
pub trait ByteRangeSource: Send + Sync {
    /// Total size of the asset in bytes.
    async fn size(&self) -> MediaResult<u64>;

    /// Copy `range` of the asset into `dest`, returning bytes written.
    async fn copy_range(&self, range: ByteRange, dest: &Path) -> MediaResult<u64>;
}

/// Local-file implementation of [`ByteRangeSource`].
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ByteRangeSource for FileSource {
    async fn size(&self) -> MediaResult<u64> {
        let meta = tokio::fs::metadata(&self.path).await?;
        Ok(meta.len())
    }

    async fn copy_range(&self, range: ByteRange, dest: &Path) -> MediaResult<u64> {
        let size = self.size().await?;
        if range.end > size || range.start > range.end {
            return Err(MediaError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                size,
            });
        }

        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(std::io::SeekFrom::Start(range.start)).await?;
        let mut reader = file.take(range.len());

        let mut out = tokio::fs::File::create(dest).await?;
        let written = tokio::io::copy(&mut reader, &mut out).await?;
        out.flush().await?;
        Ok(written)
    }
}

/// Execute one fetch plan, writing the raw segment to `dest`.
///
/// A plan without a byte range copies the whole asset, the keyframe-less
/// fallback where the collaborator could not provide an index.
pub async fn fetch_segment(
    source: &dyn ByteRangeSource,
    plan: &FetchPlan,
    dest: &Path,
) -> MediaResult<u64> {
    let range = match plan.byte_range {
        Some(range) => range,
        None => ByteRange::new(0, source.size().await?),
    };
    if range.is_empty() {
        return Err(MediaError::fetch_failed(format!(
            "empty byte range for interval {:.1}s..{:.1}s",
            plan.interval.start, plan.interval.end
        )));
    }

    let written = source.copy_range(range, dest).await?;
    info!(
        dest = %dest.display(),
        bytes = written,
        start = plan.keyframe_aligned_start,
        "fetched segment"
    );
    Ok(written)
}
