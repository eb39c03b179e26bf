//! `result.json` record

use serde::Serialize;

use crate::domain::{Status, StepResult, TaskResult};

pub const EXECUTION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Serialized shape of a finished run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord<'a> {
    pub test_name: &'a str,
    pub test_description: &'a str,
    pub status: Option<Status>,
    pub execution_time: String,
    pub execution_duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<&'a str>,
    pub step_results: &'a [StepResult],
}

impl<'a> From<&'a TaskResult> for ResultRecord<'a> {
    fn from(result: &'a TaskResult) -> Self {
        Self {
            test_name: &result.task.name,
            test_description: &result.task.description,
            status: result.status(),
            execution_time: result.execution_time.format(EXECUTION_TIME_FORMAT).to_string(),
            execution_duration_ms: result.execution_duration_ms,
            error_message: result.error_message.as_deref(),
            step_results: &result.step_results,
        }
    }
}

pub fn render(result: &TaskResult) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(&ResultRecord::from(result))?;
    json.push('\n');
    Ok(json)
}
