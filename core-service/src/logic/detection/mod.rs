//! Detection Module
//!
//! - `workflow` - submit/resolve state machine with stale-result discard
//! - `severity` - verdict → severity mapping and risk copy

pub mod severity;
pub mod workflow;

pub use severity::Severity;
pub use workflow::{signals, DetectionPhase, DetectionWorkflow, Rejection, SubmitOutcome};
