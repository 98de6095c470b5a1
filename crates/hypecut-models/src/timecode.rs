//! Non-drop-frame timecode for EDL output.
//!
//! Record times in a CMX 3600 EDL are `HH:MM:SS:FF` at a fixed nominal
//! frame rate. Conversion from seconds rounds to the nearest frame so a
//! clip's in/out difference reproduces its duration exactly at that rate.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A frame-counted timecode at a nominal integer frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct Timecode {
    /// Total frames since timeline zero.
    pub frames: u64,

    /// Nominal frames per second (e.g. 30, 60). Fractional rates are
    /// rounded to the nearest integer for timecode arithmetic, the usual
    /// NLE convention for non-drop-frame EDLs.
    pub fps: u32,
}

impl Timecode {
    /// Timeline zero at the given rate.
    pub fn zero(fps: u32) -> Self {
        Self { frames: 0, fps }
    }

    /// Convert seconds to a timecode, rounding to the nearest frame.
    pub fn from_seconds(seconds: f64, fps: u32) -> Self {
        let frames = (seconds.max(0.0) * f64::from(fps)).round() as u64;
        Self { frames, fps }
    }

    /// Timecode advanced by the given number of seconds.
    pub fn advanced_by(self, seconds: f64) -> Self {
        let delta = (seconds.max(0.0) * f64::from(self.fps)).round() as u64;
        Self {
            frames: self.frames + delta,
            fps: self.fps,
        }
    }

    /// Seconds represented by this timecode.
    pub fn as_seconds(&self) -> f64 {
        self.frames as f64 / f64::from(self.fps)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = u64::from(self.fps.max(1));
        let ff = self.frames % fps;
        let total_secs = self.frames / fps;
        let ss = total_secs % 60;
        let mm = (total_secs / 60) % 60;
        let hh = total_secs / 3600;
        write!(f, "{:02}:{:02}:{:02}:{:02}", hh, mm, ss, ff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_display() {
        assert_eq!(Timecode::zero(30).to_string(), "00:00:00:00");
    }

    #[test]
    fn test_from_seconds_display() {
        assert_eq!(Timecode::from_seconds(90.5, 30).to_string(), "00:01:30:15");
        assert_eq!(Timecode::from_seconds(3600.0, 60).to_string(), "01:00:00:00");
    }

    #[test]
    fn test_advanced_by_is_exact_in_frames() {
        let start = Timecode::from_seconds(40.0, 60);
        let end = start.advanced_by(40.0);
        assert_eq!(end.frames - start.frames, 2400);
        assert_eq!(end.to_string(), "00:01:20:00");
    }

    #[test]
    fn test_ordering() {
        let a = Timecode::from_seconds(10.0, 30);
        let b = Timecode::from_seconds(10.5, 30);
        assert!(a < b);
    }
}
