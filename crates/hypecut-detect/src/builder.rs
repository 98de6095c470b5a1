//! Interval refinement: padding, clamping, and sweep-merging.

use hypecut_models::{CandidateInterval, ConfigError, RefinedInterval};
use tracing::debug;

use crate::error::{DetectError, DetectResult};

/// Pad candidates, clamp to the stream bounds, and merge near-adjacent
/// intervals into the final sorted, disjoint set.
///
/// Two intervals merge when the gap between them is at most
/// `merge_threshold` seconds, inclusive, so a gap of exactly the
/// threshold still merges. Candidates sharing a start are ordered by end
/// before the sweep, making the output deterministic regardless of
/// discovery order.
pub fn refine_intervals(
    candidates: &[CandidateInterval],
    padding_pre: f64,
    padding_post: f64,
    merge_threshold: f64,
    stream_duration: f64,
) -> DetectResult<Vec<RefinedInterval>> {
    if padding_pre < 0.0 || padding_post < 0.0 {
        return Err(ConfigError::NegativePadding {
            pre: padding_pre,
            post: padding_post,
        }
        .into());
    }
    if merge_threshold < 0.0 {
        return Err(ConfigError::NegativeMergeThreshold(merge_threshold).into());
    }
    if !(stream_duration > 0.0) {
        return Err(DetectError::NonPositiveStreamDuration(stream_duration));
    }

    let mut padded: Vec<RefinedInterval> = candidates
        .iter()
        .map(|c| {
            RefinedInterval::new(
                (c.start - padding_pre).max(0.0),
                (c.end + padding_post).min(stream_duration),
            )
        })
        .collect();

    padded.sort_by(|a, b| {
        a.start
            .total_cmp(&b.start)
            .then(a.end.total_cmp(&b.end))
    });

    let merged = merge_intervals(&padded, merge_threshold);
    debug!(
        candidates = candidates.len(),
        refined = merged.len(),
        "refined highlight intervals"
    );
    Ok(merged)
}

/// Left-to-right sweep over sorted intervals, merging when the gap to the
/// running interval is within `merge_threshold`. Idempotent: re-running on
/// an already-merged set returns the same set.
pub fn merge_intervals(sorted: &[RefinedInterval], merge_threshold: f64) -> Vec<RefinedInterval> {
    let mut merged: Vec<RefinedInterval> = Vec::with_capacity(sorted.len());
    for &iv in sorted {
        match merged.last_mut() {
            Some(running) if iv.start - running.end <= merge_threshold => {
                running.end = running.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}
