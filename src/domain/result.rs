//! Step and task results.
//!
//! A `TaskResult` is created in `Pending` when a run starts and moves through
//! `Running` to exactly one terminal state. Its duration is recorded once, by
//! `finish`, on every exit path.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::status::{RunState, Status};
use crate::task::Task;

/// Outcome of one resolved instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// The resolved instruction actually sent to the agent
    pub step: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Opaque artifact reference supplied by a collaborator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl StepResult {
    pub fn new(step: impl Into<String>, status: Status, details: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status,
            details: Some(details.into()),
            screenshot: None,
        }
    }

    pub fn success(step: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(step, Status::Success, details)
    }

    pub fn failed(step: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(step, Status::Failed, details)
    }

    pub fn error(step: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(step, Status::Error, details)
    }

    pub fn with_screenshot(mut self, reference: impl Into<String>) -> Self {
        self.screenshot = Some(reference.into());
        self
    }
}

/// Aggregate outcome of one task run.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task: Arc<Task>,
    pub state: RunState,
    /// Wall-clock time the run started
    pub execution_time: DateTime<Local>,
    pub execution_duration_ms: u64,
    pub error_message: Option<String>,
    pub step_results: Vec<StepResult>,
    finished: bool,
}

impl TaskResult {
    pub fn new(task: Arc<Task>) -> Self {
        Self {
            task,
            state: RunState::Pending,
            execution_time: Local::now(),
            execution_duration_ms: 0,
            error_message: None,
            step_results: Vec::new(),
            finished: false,
        }
    }

    /// Task-level status, `None` until the run reaches a terminal state
    pub fn status(&self) -> Option<Status> {
        self.state.status()
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Succeeded
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn start(&mut self) {
        self.state = RunState::Running;
    }

    pub(crate) fn record_step(&mut self, result: StepResult) {
        self.step_results.push(result);
    }

    pub(crate) fn succeed(&mut self) {
        self.state = RunState::Succeeded;
    }

    /// Stop at a FAILED/ERROR step, mirroring its status at task level
    pub(crate) fn short_circuit(&mut self, status: Status, resolved_step: &str) {
        self.state = RunState::from(status);
        self.error_message = Some(format!("Step failed: {}", resolved_step));
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.state = RunState::Errored;
        self.error_message = Some(message.into());
    }

    /// Record the run duration; later calls are ignored
    pub(crate) fn finish(&mut self, elapsed: Duration) {
        if self.finished {
            log::warn!("Task result for '{}' already finished", self.task.name);
            return;
        }
        self.execution_duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.finished = true;
    }

    pub fn passed_steps(&self) -> usize {
        self.step_results.iter().filter(|s| s.status.is_success()).count()
    }

    /// The step that stopped the run, if any
    pub fn failing_step(&self) -> Option<&StepResult> {
        self.step_results.iter().find(|s| !s.status.is_success())
    }
}
