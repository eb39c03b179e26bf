//! Plain-text run summary for the console

use std::fmt::Write as _;

use crate::domain::TaskResult;

pub fn render(result: &TaskResult) -> String {
    let status = result.status().map(|s| s.to_string()).unwrap_or_else(|| "PENDING".to_string());
    let mut out = String::new();
    let _ = writeln!(out, "Task: {}", result.task.name);
    let _ = writeln!(out, "Status: {}", status);
    let _ = writeln!(
        out,
        "Steps: {}/{} passed ({} executed)",
        result.passed_steps(),
        result.task.step_count(),
        result.step_results.len()
    );
    let _ = writeln!(out, "Duration: {}ms", result.execution_duration_ms);
    if let Some(message) = &result.error_message {
        let _ = writeln!(out, "Error: {}", message);
    }
    if let Some(step) = result.failing_step() {
        if let Some(details) = &step.details {
            let _ = writeln!(out, "Details: {}", details);
        }
    }
    out
}
