//! Task runner - drives scripts through a reasoning backend.
//!
//! - StepExecutor opens the session and resolves one instruction at a time
//! - TaskEngine runs a whole task with fail-fast semantics

mod engine;
mod step_executor;

pub use engine::TaskEngine;
pub use step_executor::{BUDGET_EXHAUSTED, NO_COMPLETION_SIGNAL, StepExecutor, TaskRun, build_context};
