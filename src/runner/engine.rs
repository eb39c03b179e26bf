//! Task execution engine.
//!
//! Runs a whole task: pre-flight variable validation, one backend session,
//! then each step in order until one fails. The engine never returns an
//! error; every defect ends up in the returned `TaskResult`.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use super::step_executor::StepExecutor;
use crate::agent::ReasoningBackend;
use crate::config::Config;
use crate::domain::{EventSink, RunEvent, TaskResult};
use crate::error::Result;
use crate::task::Task;
use crate::variables;

pub struct TaskEngine {
    executor: StepExecutor<dyn ReasoningBackend>,
}

impl TaskEngine {
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            executor: StepExecutor::new(backend),
        }
    }

    /// Execute a task and return its finished result
    pub async fn execute(&self, task: Arc<Task>, config: &Config) -> TaskResult {
        self.run(task, config, EventSink::none()).await
    }

    /// Execute a task, reporting progress on `tx`
    pub async fn execute_with_events(
        &self,
        task: Arc<Task>,
        config: &Config,
        tx: mpsc::UnboundedSender<RunEvent>,
    ) -> TaskResult {
        self.run(task, config, EventSink::new(tx)).await
    }

    async fn run(&self, task: Arc<Task>, config: &Config, events: EventSink) -> TaskResult {
        let started = Instant::now();
        let mut result = TaskResult::new(Arc::clone(&task));

        log::info!("Executing task '{}' ({} steps)", task.name, task.step_count());
        events.emit(RunEvent::TaskStarted {
            task: task.name.clone(),
            description: task.description.clone(),
            total_steps: task.step_count(),
        });

        if let Err(e) = self.drive(&task, config, &events, &mut result).await {
            log::error!("Task '{}' errored: {}", task.name, e);
            result.error(e.to_string());
        }

        result.finish(started.elapsed());

        if let Some(status) = result.status() {
            log::info!(
                "Task '{}' finished with {} in {}ms",
                task.name,
                status,
                result.execution_duration_ms
            );
            events.emit(RunEvent::TaskFinished {
                status,
                duration_ms: result.execution_duration_ms,
            });
        }
        result
    }

    async fn drive(&self, task: &Arc<Task>, config: &Config, events: &EventSink, result: &mut TaskResult) -> Result<()> {
        variables::validate_all_defined(task, config)?;

        let mut run = self.executor.plan(task, config, events.clone()).await?;
        result.start();

        let total = task.step_count();
        for (i, step) in task.steps.iter().enumerate() {
            let resolved = variables::resolve(step, config)?;
            events.emit(RunEvent::StepStarted {
                index: i + 1,
                total,
                instruction: resolved.clone(),
            });

            let step_result = self.executor.step(&mut run, &resolved).await?;
            let status = step_result.status;
            events.emit(RunEvent::StepFinished {
                index: i + 1,
                status,
                details: step_result.details.clone(),
            });
            result.record_step(step_result);

            if !status.is_success() {
                log::warn!("Step {}/{} {}: {}", i + 1, total, status, resolved);
                result.short_circuit(status, &resolved);
                return Ok(());
            }
        }

        result.succeed();
        Ok(())
    }
}
