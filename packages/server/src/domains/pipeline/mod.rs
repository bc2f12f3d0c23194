//! Pipeline domain - the background generate → extract → summarize loop
//!
//! The controller owns the only copy of [`PipelineState`]. HTTP handlers
//! drive it through `start`/`stop`/`status`; a single worker task runs the
//! iterations.

pub mod controller;
pub mod error;
pub mod iteration;
pub mod settings;
pub mod state;

pub use controller::{ControlOutcome, PipelineController};
pub use error::PipelineError;
pub use iteration::{run_iteration, IterationOutcome, IterationReport};
pub use settings::PipelineSettings;
pub use state::{PipelineState, RunState};
