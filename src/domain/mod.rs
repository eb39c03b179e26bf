//! Domain types for Gepetto
//!
//! - Status / RunState: step outcome taxonomy and task-run lifecycle
//! - StepResult / TaskResult: per-step and aggregate results
//! - RunEvent: progress notifications emitted while a task runs

pub mod event;
pub mod result;
pub mod status;

pub use event::{EventSink, RunEvent};
pub use result::{StepResult, TaskResult};
pub use status::{RunState, Status};
