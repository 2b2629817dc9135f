//! Run orchestration.
//!
//! [`state`] holds the run state machine; [`pipeline`] drives the four
//! stages through it and assembles the report.

pub mod pipeline;
pub mod state;

pub use pipeline::{run_pipeline, PipelineOptions};
pub use state::{Phase, RunState, TransitionError};
