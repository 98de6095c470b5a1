//! Activity binner: chat events to a fixed-width time series.
//!
//! Streaming accumulate-and-flush: bins are emitted as soon as an event
//! lands past their end, so multi-hour logs never need to sit in memory.
//! Zero-count bins are emitted for silent stretches; downstream baseline
//! math depends on gap-free coverage of `[0, stream_duration)`.

use hypecut_models::{ActivityBin, ChatEvent, ConfigError};
use tracing::debug;

use crate::error::{DetectError, DetectResult};

/// Streaming binner over a chronologically sorted event sequence.
#[derive(Debug)]
pub struct ActivityBinner {
    bin_width: f64,
    stream_duration: f64,
    /// Total bins covering `[0, stream_duration)`.
    total_bins: u64,
    /// Index of the bin currently accumulating.
    current: u64,
    current_count: f64,
    last_timestamp: Option<f64>,
    dropped: u64,
}

impl ActivityBinner {
    /// Create a binner for a stream of the given duration.
    pub fn new(bin_width: f64, stream_duration: f64) -> DetectResult<Self> {
        if !(bin_width > 0.0) {
            return Err(ConfigError::NonPositiveBinWidth(bin_width).into());
        }
        if !(stream_duration > 0.0) {
            return Err(DetectError::NonPositiveStreamDuration(stream_duration));
        }
        Ok(Self {
            bin_width,
            stream_duration,
            total_bins: (stream_duration / bin_width).ceil() as u64,
            current: 0,
            current_count: 0.0,
            last_timestamp: None,
            dropped: 0,
        })
    }

    /// Events dropped so far for falling outside `[0, stream_duration)`.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Feed one event, returning any bins completed by its arrival.
    ///
    /// Out-of-order timestamps are a contract violation of the upstream
    /// log fetcher and abort the run; out-of-range events are dropped and
    /// counted, never fatal.
    pub fn push(&mut self, event: &ChatEvent) -> DetectResult<Vec<ActivityBin>> {
        if let Some(prev) = self.last_timestamp {
            if event.timestamp < prev {
                return Err(DetectError::UnsortedEvents {
                    prev,
                    next: event.timestamp,
                });
            }
        }
        self.last_timestamp = Some(event.timestamp);

        if event.timestamp < 0.0 || event.timestamp >= self.stream_duration {
            self.dropped += 1;
            return Ok(Vec::new());
        }

        let index = (event.timestamp / self.bin_width).floor() as u64;
        let mut flushed = Vec::new();
        while self.current < index {
            flushed.push(self.take_current());
        }
        self.current_count += event.weight;
        Ok(flushed)
    }

    /// Flush the remaining bins, padding with zero counts out to
    /// `stream_duration`, and report the dropped-event count.
    pub fn finish(mut self) -> (Vec<ActivityBin>, u64) {
        let mut tail = Vec::new();
        while self.current < self.total_bins {
            tail.push(self.take_current());
        }
        if self.dropped > 0 {
            debug!(dropped = self.dropped, "events outside stream bounds were discarded");
        }
        (tail, self.dropped)
    }

    fn take_current(&mut self) -> ActivityBin {
        let start = self.current as f64 * self.bin_width;
        let bin = ActivityBin::new(start, start + self.bin_width, self.current_count);
        self.current += 1;
        self.current_count = 0.0;
        bin
    }
}

/// Bin an in-memory event sequence in one call.
///
/// Returns the full gap-free series and the count of discarded
/// out-of-range events.
pub fn bin_events<'a, I>(
    events: I,
    bin_width: f64,
    stream_duration: f64,
) -> DetectResult<(Vec<ActivityBin>, u64)>
where
    I: IntoIterator<Item = &'a ChatEvent>,
{
    let mut binner = ActivityBinner::new(bin_width, stream_duration)?;
    let mut bins = Vec::new();
    for event in events {
        bins.extend(binner.push(event)?);
    }
    let (tail, dropped) = binner.finish();
    bins.extend(tail);
    Ok((bins, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(ts: &[f64]) -> Vec<ChatEvent> {
        ts.iter().map(|&t| ChatEvent::at(t)).collect()
    }

    #[test]
    fn test_coverage_is_gap_free_and_counts_sum() {
        let evs = events(&[1.0, 2.0, 15.0, 44.9, 45.0, 59.9]);
        let (bins, dropped) = bin_events(&evs, 10.0, 60.0).unwrap();

        assert_eq!(bins.len(), 6);
        assert_eq!(dropped, 0);
        for (i, bin) in bins.iter().enumerate() {
            assert_eq!(bin.start, i as f64 * 10.0);
            assert_eq!(bin.end, bin.start + 10.0);
        }
        let total: f64 = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, evs.len() as f64);
    }

    #[test]
    fn test_silent_periods_emit_zero_bins() {
        let evs = events(&[5.0, 55.0]);
        let (bins, _) = bin_events(&evs, 10.0, 60.0).unwrap();
        let counts: Vec<f64> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_events_dropped_not_fatal() {
        let evs = events(&[-3.0, 5.0, 60.0, 100.0]);
        let (bins, dropped) = bin_events(&evs, 10.0, 60.0).unwrap();
        assert_eq!(dropped, 3);
        let total: f64 = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_unsorted_events_are_fatal() {
        let mut binner = ActivityBinner::new(10.0, 60.0).unwrap();
        binner.push(&ChatEvent::at(20.0)).unwrap();
        let err = binner.push(&ChatEvent::at(19.0)).unwrap_err();
        assert_eq!(
            err,
            DetectError::UnsortedEvents {
                prev: 20.0,
                next: 19.0
            }
        );
    }

    #[test]
    fn test_weighted_events_sum_weights() {
        let evs = vec![
            ChatEvent::weighted(1.0, 2.5),
            ChatEvent::weighted(2.0, 1.0),
        ];
        let (bins, _) = bin_events(&evs, 10.0, 20.0).unwrap();
        assert_eq!(bins[0].count, 3.5);
        assert_eq!(bins[1].count, 0.0);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(ActivityBinner::new(0.0, 60.0).is_err());
        assert!(ActivityBinner::new(10.0, 0.0).is_err());
    }

    #[test]
    fn test_non_multiple_duration_still_covered() {
        let (bins, _) = bin_events(&events(&[0.5]), 10.0, 25.0).unwrap();
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[2].start, 20.0);
    }
}
