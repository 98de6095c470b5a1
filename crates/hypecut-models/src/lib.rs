//! Shared data models for the hypecut pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Chat events and binned activity series
//! - Candidate and refined highlight intervals
//! - Fetch plans and normalized clip artifacts
//! - Analysis configuration and run summaries
//! - Timecode conversion for EDL output

pub mod activity;
pub mod artifact;
pub mod chat;
pub mod config;
pub mod interval;
pub mod plan;
pub mod summary;
pub mod timecode;

// Re-export common types
pub use activity::{ActivityBin, ScoredBin};
pub use artifact::ClipArtifact;
pub use chat::ChatEvent;
pub use config::{AnalysisConfig, ConfigError};
pub use interval::{CandidateInterval, RefinedInterval};
pub use plan::{ByteRange, FetchPlan};
pub use summary::{RunReport, RunSummary};
pub use timecode::Timecode;
