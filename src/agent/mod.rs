//! Reasoning backend abstraction
//!
//! A backend opens one session per task run. The session is asked for the
//! next action on the current instruction until it signals completion, stops
//! on its own, or the step's action budget runs out.

pub mod complete;
pub mod llm;
pub mod scripted;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::Status;
use crate::error::Result;

pub use complete::{COMPLETE_TOOL_NAME, complete_tool_definition, parse_completion};
pub use llm::{LlmBackend, LlmSession};
pub use scripted::{DryRunBackend, ScriptedBackend};

/// Seed for a new backend session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanRequest {
    pub name: String,
    pub description: String,
    pub context: BTreeMap<String, String>,
}

/// Explicit verdict for the current instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSignal {
    pub status: Status,
    pub message: String,
}

/// One internal action taken by the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    pub name: String,
    pub reasoning: Option<String>,
    /// The agent stopped acting on this instruction
    pub is_final: bool,
    pub completion: Option<CompletionSignal>,
}

impl AgentAction {
    /// Intermediate action; the agent wants another turn
    pub fn progress(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reasoning: None,
            is_final: false,
            completion: None,
        }
    }

    /// Final action without a verdict
    pub fn stopped(name: impl Into<String>) -> Self {
        Self {
            is_final: true,
            ..Self::progress(name)
        }
    }

    /// Final action carrying a verdict
    pub fn complete(status: Status, message: impl Into<String>) -> Self {
        Self {
            name: complete::COMPLETE_TOOL_NAME.to_string(),
            reasoning: None,
            is_final: true,
            completion: Some(CompletionSignal {
                status,
                message: message.into(),
            }),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }
}

/// Opens sessions for task runs
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Open a session seeded with the task's name, description and context
    async fn plan(&self, request: PlanRequest) -> Result<Box<dyn AgentSession>>;

    fn name(&self) -> &str;
}

/// Live conversation with the agent for one task run
#[async_trait]
pub trait AgentSession: Send {
    fn id(&self) -> &str;

    /// Mark the start of a new step. Called once per step, before its first
    /// `next_action`, even when the text equals the previous step's.
    fn begin_step(&mut self, _instruction: &str) {}

    /// Ask for the next action on the current step's `instruction`
    async fn next_action(&mut self, instruction: &str) -> Result<AgentAction>;
}
