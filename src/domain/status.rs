//! Status enums for steps and task runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a step or a whole task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The instruction was carried out and its check held.
    Success,
    /// The instruction was carried out but its check did not hold.
    Failed,
    /// The instruction could not be carried out.
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
            Status::Error => "ERROR",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    /// Case-insensitive; also accepts the `PASSED`/`FAILURE` spellings agents tend to use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "PASSED" => Ok(Status::Success),
            "FAILED" | "FAILURE" => Ok(Status::Failed),
            "ERROR" => Ok(Status::Error),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Lifecycle of a task run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Result created, variables not yet validated.
    #[default]
    Pending,
    /// Session planned, steps executing.
    Running,
    Succeeded,
    Failed,
    Errored,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Errored)
    }

    /// Task-level status for terminal states
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Succeeded => Some(Status::Success),
            Self::Failed => Some(Status::Failed),
            Self::Errored => Some(Status::Error),
            Self::Pending | Self::Running => None,
        }
    }
}

impl From<Status> for RunState {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => RunState::Succeeded,
            Status::Failed => RunState::Failed,
            Status::Error => RunState::Errored,
        }
    }
}
