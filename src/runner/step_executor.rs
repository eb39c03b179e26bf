//! Step executor - opens a backend session for a task and drives one
//! instruction at a time through it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::agent::{AgentSession, PlanRequest, ReasoningBackend};
use crate::config::Config;
use crate::domain::{EventSink, RunEvent, StepResult};
use crate::error::Result;
use crate::task::Task;

/// Details for a step whose agent stopped without reporting a verdict
pub const NO_COMPLETION_SIGNAL: &str = "step reached a terminal state without an explicit completion signal";

/// Details for a step that used up its action budget
pub const BUDGET_EXHAUSTED: &str = "exceeded the maximum number of actions for this step";

/// Live session for one task run.
///
/// Owned by a single execution and dropped when the run ends.
pub struct TaskRun {
    pub id: String,
    pub task: Arc<Task>,
    pub context: BTreeMap<String, String>,
    pub created: DateTime<Local>,
    max_actions: u32,
    session: Box<dyn AgentSession>,
    events: EventSink,
    steps_started: usize,
}

impl TaskRun {
    /// Action budget applied to each step
    pub fn max_actions(&self) -> u32 {
        self.max_actions
    }
}

impl std::fmt::Debug for TaskRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRun")
            .field("id", &self.id)
            .field("task", &self.task.name)
            .field("context", &self.context)
            .field("max_actions", &self.max_actions)
            .finish()
    }
}

/// Session metadata derived from the task and configuration
pub fn build_context(task: &Task, config: &Config) -> BTreeMap<String, String> {
    let mut context = BTreeMap::new();
    context.insert("task".to_string(), task.name.clone());
    if let Some(hostname) = config.variable("HOSTNAME") {
        context.insert("hostname".to_string(), hostname.to_string());
    }
    context
}

pub struct StepExecutor<B: ReasoningBackend + ?Sized> {
    backend: Arc<B>,
}

impl<B: ReasoningBackend + ?Sized> StepExecutor<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Open exactly one backend session for the task. No step runs here.
    pub async fn plan(&self, task: &Arc<Task>, config: &Config, events: EventSink) -> Result<TaskRun> {
        let context = build_context(task, config);
        let request = PlanRequest {
            name: task.name.clone(),
            description: task.description.clone(),
            context: context.clone(),
        };

        let session = self.backend.plan(request).await?;
        let id = session.id().to_string();
        log::info!(
            "Planned task '{}' on backend {} (session {})",
            task.name,
            self.backend.name(),
            id
        );

        Ok(TaskRun {
            id,
            task: Arc::clone(task),
            context,
            created: Local::now(),
            max_actions: config.max_steps,
            session,
            events,
            steps_started: 0,
        })
    }

    /// Drive one resolved instruction to a verdict.
    ///
    /// Backend failures are returned as errors; every other outcome is a
    /// `StepResult`.
    pub async fn step(&self, run: &mut TaskRun, instruction: &str) -> Result<StepResult> {
        run.steps_started += 1;
        let step = run.steps_started;
        run.session.begin_step(instruction);

        for action_number in 1..=run.max_actions {
            let action = run.session.next_action(instruction).await?;
            log::info!(
                "Step {} action {}/{}: {}{}",
                step,
                action_number,
                run.max_actions,
                action.name,
                if action.is_final { " (final)" } else { "" }
            );
            if let Some(reasoning) = &action.reasoning {
                log::debug!("Reasoning: {}", reasoning);
            }
            run.events.emit(RunEvent::Action {
                step,
                action: action_number as usize,
                name: action.name.clone(),
                reasoning: action.reasoning.clone(),
            });

            if let Some(signal) = action.completion {
                return Ok(StepResult::new(instruction, signal.status, signal.message));
            }
            if action.is_final {
                log::warn!("Step {} ended without a completion signal", step);
                return Ok(StepResult::error(instruction, NO_COMPLETION_SIGNAL));
            }
        }

        log::warn!("Step {} exhausted its budget of {} actions", step, run.max_actions);
        Ok(StepResult::error(instruction, BUDGET_EXHAUSTED))
    }
}
