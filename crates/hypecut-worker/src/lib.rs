//! Highlight pipeline orchestrator.
//!
//! Wires the detection crates to the acquisition/export crates: runs the
//! synchronous detection pass, then a bounded parallel fetch+normalize
//! pool, and finally EDL assembly and run reporting.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use pipeline::{Pipeline, PipelineOutput};
