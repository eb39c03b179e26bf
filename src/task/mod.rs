//! Task scripts
//!
//! A `Task` is the parsed, immutable form of a plain-language script: some
//! metadata plus the ordered list of steps handed to the agent.

mod parser;

pub use parser::{TASK_EXTENSIONS, is_task_file, parse_task, parse_task_file};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub author: Option<String>,
    pub created: Option<NaiveDate>,
    pub steps: Vec<String>,
}

impl Task {
    /// Create a task with just a name, description and steps
    pub fn new(name: impl Into<String>, description: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps,
            ..Default::default()
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
