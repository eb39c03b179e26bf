//! Line-oriented task script parser.
//!
//! ```text
//! # Sample Task
//! description: "Check weather for a US city"
//! tags: [smoketest, weather]
//! author: "Gepetto"
//! created: "2025-03-01"
//!
//! Task:
//!   Navigate to ${HOSTNAME} and verify you are at the weather service.
//!   Search the weather for ${LOCATION}.
//! ```

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use super::Task;
use crate::error::{GepettoError, Result};

/// File extensions recognized as task scripts
pub const TASK_EXTENSIONS: &[&str] = &["gpt", "task", "test"];

/// Headers that open the steps section
const STEP_HEADERS: &[&str] = &["Task:", "Test:"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check whether a path has a task script extension
pub fn is_task_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TASK_EXTENSIONS.contains(&ext))
}

/// Read and parse a task script from disk
pub fn parse_task_file(path: &Path) -> Result<Task> {
    log::info!("Parsing task file: {}", path.display());

    if !is_task_file(path) {
        return Err(GepettoError::InvalidTask {
            path: path.display().to_string(),
            reason: format!("expected one of the extensions: {}", TASK_EXTENSIONS.join(", ")),
        });
    }

    let content = fs::read_to_string(path)?;
    let default_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("task")
        .replace('-', " ");

    parse_task(&content, &default_name).map_err(|reason| GepettoError::InvalidTask {
        path: path.display().to_string(),
        reason,
    })
}

/// Parse script text; `default_name` is used when the script has no `name:` line
pub fn parse_task(content: &str, default_name: &str) -> std::result::Result<Task, String> {
    let mut task = Task::default();
    let mut name = None;
    let mut in_steps = false;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if in_steps {
            task.steps.push(line.to_string());
            continue;
        }

        if STEP_HEADERS.contains(&line) {
            in_steps = true;
        } else if let Some(rest) = line.strip_prefix("name:") {
            name = Some(unquote(rest));
        } else if let Some(rest) = line.strip_prefix("description:") {
            task.description = unquote(rest);
        } else if let Some(rest) = line.strip_prefix("tags:") {
            task.tags = parse_tags(rest);
        } else if let Some(rest) = line.strip_prefix("author:") {
            task.author = Some(unquote(rest));
        } else if let Some(rest) = line.strip_prefix("created:") {
            let value = unquote(rest);
            let date = NaiveDate::parse_from_str(&value, DATE_FORMAT)
                .map_err(|e| format!("line {}: invalid created date '{}': {}", index + 1, value, e))?;
            task.created = Some(date);
        } else {
            log::debug!("Ignoring line {} outside the steps section: {}", index + 1, line);
        }
    }

    if task.steps.is_empty() {
        log::warn!("Task '{}' has no steps", name.as_deref().unwrap_or(default_name));
    }

    task.name = name.unwrap_or_else(|| default_name.to_string());
    Ok(task)
}

/// Take the text between the first and last double quote, or the trimmed value
fn unquote(value: &str) -> String {
    let value = value.trim();
    match (value.find('"'), value.rfind('"')) {
        (Some(start), Some(end)) if end > start => value[start + 1..end].to_string(),
        _ => value.to_string(),
    }
}

fn parse_tags(value: &str) -> std::collections::BTreeSet<String> {
    let value = value.trim();
    let value = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);

    value
        .split(',')
        .map(|tag| tag.trim().trim_matches('"').to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
