//! Chat-activity anomaly detection and interval refinement.
//!
//! This crate is the detection half of the pipeline and is deliberately
//! pure: a single synchronous forward pass over the time series with no
//! I/O. Its output, a sorted disjoint set of
//! [`hypecut_models::RefinedInterval`], is the contract boundary the
//! acquisition half consumes.

pub mod binner;
pub mod builder;
pub mod detector;
pub mod error;

pub use binner::{bin_events, ActivityBinner};
pub use builder::{merge_intervals, refine_intervals};
pub use detector::{detect_candidates, AnomalyDetector, RollingBaseline};
pub use error::{DetectError, DetectResult};
