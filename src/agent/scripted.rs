//! Backends that do not call a model: a scripted one for tests and a
//! dry-run one for `gepetto run --dry-run`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{AgentAction, AgentSession, PlanRequest, ReasoningBackend};
use crate::domain::Status;
use crate::error::{GepettoError, Result};
use crate::id::generate_session_id;

type Script = Arc<Mutex<VecDeque<Result<AgentAction>>>>;

/// Replays queued actions and records what it was asked.
///
/// Once the queue is empty every further action is a non-final `idle`, so a
/// step only ends through its action budget.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    actions: Script,
    plans: Arc<Mutex<Vec<PlanRequest>>>,
    instructions: Arc<Mutex<Vec<String>>>,
    steps: Arc<Mutex<Vec<String>>>,
    fail_plan: Option<String>,
}

impl ScriptedBackend {
    pub fn new(actions: Vec<AgentAction>) -> Self {
        Self::with_results(actions.into_iter().map(Ok).collect())
    }

    /// Queue that may contain backend failures
    pub fn with_results(actions: Vec<Result<AgentAction>>) -> Self {
        Self {
            actions: Arc::new(Mutex::new(actions.into())),
            ..Default::default()
        }
    }

    /// Backend whose `plan` fails with the given message
    pub fn failing_plan(message: impl Into<String>) -> Self {
        Self {
            fail_plan: Some(message.into()),
            ..Default::default()
        }
    }

    /// Sessions opened so far
    pub fn plans(&self) -> Vec<PlanRequest> {
        self.plans.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Every instruction passed to `next_action`, one entry per action
    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().map(|i| i.clone()).unwrap_or_default()
    }

    /// Instructions passed to `begin_step`, one entry per step
    pub fn steps_sent(&self) -> Vec<String> {
        self.steps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn plan(&self, request: PlanRequest) -> Result<Box<dyn AgentSession>> {
        if let Some(message) = &self.fail_plan {
            return Err(GepettoError::Backend(message.clone()));
        }
        if let Ok(mut plans) = self.plans.lock() {
            plans.push(request);
        }
        Ok(Box::new(ScriptedSession {
            id: generate_session_id("scripted"),
            actions: Arc::clone(&self.actions),
            instructions: Arc::clone(&self.instructions),
            steps: Arc::clone(&self.steps),
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedSession {
    id: String,
    actions: Script,
    instructions: Arc<Mutex<Vec<String>>>,
    steps: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AgentSession for ScriptedSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn begin_step(&mut self, instruction: &str) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push(instruction.to_string());
        }
    }

    async fn next_action(&mut self, instruction: &str) -> Result<AgentAction> {
        if let Ok(mut instructions) = self.instructions.lock() {
            instructions.push(instruction.to_string());
        }
        let next = self
            .actions
            .lock()
            .map_err(|e| GepettoError::Backend(e.to_string()))?
            .pop_front();
        next.unwrap_or_else(|| Ok(AgentAction::progress("idle")))
    }
}

/// Accepts every step without doing anything
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunBackend;

#[async_trait]
impl ReasoningBackend for DryRunBackend {
    async fn plan(&self, request: PlanRequest) -> Result<Box<dyn AgentSession>> {
        log::info!("Dry run for task '{}'", request.name);
        Ok(Box::new(DryRunSession {
            id: generate_session_id("dry-run"),
        }))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

struct DryRunSession {
    id: String,
}

#[async_trait]
impl AgentSession for DryRunSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn next_action(&mut self, instruction: &str) -> Result<AgentAction> {
        Ok(AgentAction::complete(Status::Success, format!("dry run: {}", instruction)))
    }
}
