//! Progress events emitted while a task runs.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::status::Status;

/// Progress notification for console or UI consumers. Step and action
/// numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    TaskStarted {
        task: String,
        description: String,
        total_steps: usize,
    },
    StepStarted {
        index: usize,
        total: usize,
        instruction: String,
    },
    /// One internal agent action taken while working on a step
    Action {
        step: usize,
        action: usize,
        name: String,
        reasoning: Option<String>,
    },
    StepFinished {
        index: usize,
        status: Status,
        details: Option<String>,
    },
    TaskFinished {
        status: Status,
        duration_ms: u64,
    },
}

/// Optional event channel; emitting without a subscriber is a no-op.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is watching progress
            let _ = tx.send(event);
        }
    }
}
