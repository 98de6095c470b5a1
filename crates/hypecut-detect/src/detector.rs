//! Rolling anomaly detector over the binned activity series.
//!
//! The baseline for bin *i* is computed from bins `[i - window, i)` only,
//! strictly trailing, so a viral spike elevates its own count without
//! contaminating the baseline it is judged against. Once the spike scrolls
//! out of the window the baseline re-adapts.

use hypecut_models::{ActivityBin, CandidateInterval, ConfigError, ScoredBin};
use tracing::trace;

use crate::error::DetectResult;

/// Fixed-capacity ring buffer of recent counts with running sum and
/// sum-of-squares, giving O(1) amortized baseline updates.
#[derive(Debug)]
pub struct RollingBaseline {
    buf: Vec<f64>,
    capacity: usize,
    head: usize,
    len: usize,
    sum: f64,
    sum_sq: f64,
}

impl RollingBaseline {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(1)],
            capacity: capacity.max(1),
            head: 0,
            len: 0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a sample, evicting the oldest when the window is full.
    pub fn push(&mut self, value: f64) {
        if self.len == self.capacity {
            let old = self.buf[self.head];
            self.sum -= old;
            self.sum_sq -= old * old;
        } else {
            self.len += 1;
        }
        self.buf[self.head] = value;
        self.sum += value;
        self.sum_sq += value * value;
        self.head = (self.head + 1) % self.capacity;
    }

    pub fn mean(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.sum / self.len as f64
        }
    }

    /// Population standard deviation of the window. Fewer than two
    /// samples count as zero variance.
    pub fn std(&self) -> f64 {
        if self.len < 2 {
            return 0.0;
        }
        let mean = self.mean();
        // Running sums can go fractionally negative under cancellation.
        let var = (self.sum_sq / self.len as f64 - mean * mean).max(0.0);
        var.sqrt()
    }
}

/// Streaming z-score detector.
#[derive(Debug)]
pub struct AnomalyDetector {
    baseline: RollingBaseline,
    z_threshold: f64,
}

impl AnomalyDetector {
    pub fn new(window: usize, z_threshold: f64) -> DetectResult<Self> {
        if window == 0 {
            return Err(ConfigError::EmptyRollingWindow.into());
        }
        Ok(Self {
            baseline: RollingBaseline::new(window),
            z_threshold,
        })
    }

    /// Score one bin against the trailing baseline, then absorb its count
    /// into the window for later bins.
    pub fn score(&mut self, bin: ActivityBin) -> ScoredBin {
        let mean = self.baseline.mean();
        let std = self.baseline.std();
        // Zero-variance policy: leading bins with fewer than two prior
        // samples score 0. A flat but populated baseline substitutes unit
        // deviation, so a spike over dead-silent chat still flags while
        // constant activity scores 0 (count equals mean).
        let z_score = if self.baseline.len() < 2 {
            0.0
        } else if std > 0.0 {
            (bin.count - mean) / std
        } else {
            bin.count - mean
        };
        self.baseline.push(bin.count);
        trace!(
            start = bin.start,
            count = bin.count,
            mean,
            std,
            z_score,
            "scored bin"
        );
        ScoredBin {
            bin,
            baseline_mean: mean,
            baseline_std: std,
            z_score,
        }
    }

    /// Whether a scored bin clears the flagging threshold.
    pub fn is_flagged(&self, scored: &ScoredBin) -> bool {
        scored.z_score >= self.z_threshold
    }
}

/// Score a bin sequence and group consecutive flagged bins into candidate
/// intervals.
///
/// Only contiguous runs merge here; bridging non-adjacent candidates is
/// the interval builder's job.
pub fn detect_candidates(
    bins: &[ActivityBin],
    window: usize,
    z_threshold: f64,
) -> DetectResult<(Vec<ScoredBin>, Vec<CandidateInterval>)> {
    let mut detector = AnomalyDetector::new(window, z_threshold)?;
    let mut scored = Vec::with_capacity(bins.len());
    let mut candidates = Vec::new();
    let mut run: Option<CandidateInterval> = None;

    for &bin in bins {
        let s = detector.score(bin);
        if detector.is_flagged(&s) {
            run = Some(match run {
                Some(r) => CandidateInterval::new(r.start, bin.end),
                None => CandidateInterval::new(bin.start, bin.end),
            });
        } else if let Some(r) = run.take() {
            candidates.push(r);
        }
        scored.push(s);
    }
    if let Some(r) = run {
        candidates.push(r);
    }

    Ok((scored, candidates))
}
